use crate::app;
use crate::cli::GlobalArgs;

pub fn run(globals: &GlobalArgs, query: &str) -> anyhow::Result<()> {
    let pipeline = app::build_pipeline(globals)?;
    let answer = pipeline.ask(query);
    println!("[{}] {}", answer.strategy, answer.text);
    Ok(())
}
