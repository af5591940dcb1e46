use crate::app;
use crate::cli::GlobalArgs;

pub fn run(globals: &GlobalArgs, query: &str, k: usize) -> anyhow::Result<()> {
    let pipeline = app::build_pipeline(globals)?;
    let hits = pipeline.search(query, k)?;
    if hits.is_empty() {
        println!("No snippets indexed.");
    }
    for hit in hits {
        println!("{:.3}  #{:<5} {}", hit.distance, hit.position, hit.snippet.text);
    }
    Ok(())
}
