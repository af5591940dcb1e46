use crate::app;
use crate::cli::GlobalArgs;
use salesdesk_core::Answer;
use std::io::{BufRead, Write};

pub fn run(globals: &GlobalArgs) -> anyhow::Result<()> {
    let pipeline = app::build_pipeline(globals)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let answered = session(|q| pipeline.ask(q), stdin.lock(), stdout.lock())?;
    tracing::info!(answered, "chat session ended");
    Ok(())
}

/// Answer one query per line until EOF or `exit`. Blank lines are skipped.
fn session<R: BufRead, W: Write>(
    mut ask: impl FnMut(&str) -> Answer,
    input: R,
    mut output: W,
) -> std::io::Result<usize> {
    let mut answered = 0;
    for line in input.lines() {
        let line = line?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }
        let answer = ask(query);
        writeln!(output, "[{}] {}\n", answer.strategy, answer.text)?;
        output.flush()?;
        answered += 1;
    }
    Ok(answered)
}
