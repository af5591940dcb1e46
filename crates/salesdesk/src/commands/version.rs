pub fn run() -> anyhow::Result<()> {
    println!("salesdesk {}", env!("CARGO_PKG_VERSION"));
    println!("Question answering over sales order data");
    Ok(())
}
