use crate::app;
use crate::cli::GlobalArgs;

pub fn run(globals: &GlobalArgs) -> anyhow::Result<()> {
    let pipeline = app::build_pipeline(globals)?;
    let mut output = serde_json::to_value(pipeline.status())?;
    output["config"] = serde_json::to_value(pipeline.config())?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
