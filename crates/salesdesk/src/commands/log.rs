use crate::app;
use crate::cli::GlobalArgs;
use anyhow::Context;
use salesdesk_telemetry::{atomic_write, ExportFormat};
use std::path::Path;

pub fn run_show(globals: &GlobalArgs) -> anyhow::Result<()> {
    let log = app::open_log(globals)?;
    print!("{}", log.render_text());
    Ok(())
}

pub fn run_export(
    globals: &GlobalArgs,
    format: ExportFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let log = app::open_log(globals)?;
    let data = log.export(format)?;
    match output {
        Some(path) => {
            atomic_write(path, data.as_bytes())
                .with_context(|| format!("cannot write {}", path.display()))?;
            eprintln!("Exported {} entries to {}", log.len(), path.display());
        }
        None => print!("{data}"),
    }
    Ok(())
}
