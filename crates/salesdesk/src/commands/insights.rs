use crate::app;
use crate::cli::GlobalArgs;
use salesdesk_insights::Catalog;

pub fn run(globals: &GlobalArgs, json: bool) -> anyhow::Result<()> {
    let store = app::load_store(globals)?;
    let catalog = Catalog::build(&store);
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.insights())?);
    } else {
        print!("{}", render(&catalog));
    }
    Ok(())
}

fn render(catalog: &Catalog) -> String {
    let mut out = String::new();
    for insight in catalog.insights() {
        out.push_str(&format!(
            "{} ({})\n  triggers: {}\n{}\n\n",
            insight.title,
            insight.key,
            insight.triggers.join(", "),
            insight.answer
        ));
    }
    out
}
