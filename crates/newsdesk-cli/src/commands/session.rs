use std::io::{BufRead, Write};

use newsdesk_core::{UserName, ValidationError};
use newsdesk_pipeline::{ClassifyError, Pipeline, StoreOutcome};

use crate::context::AppContext;

/// Classify each stdin line as `name` until EOF.
pub async fn run(ctx: &AppContext, name: &str) -> anyhow::Result<()> {
    let name = UserName::parse(name)?;
    let pipeline = ctx.pipeline().await?;

    println!(
        "Welcome, {}! Enter one article per line; Ctrl-D to finish.",
        name.as_str()
    );
    let stdin = std::io::stdin();
    serve_lines(
        &pipeline,
        &name,
        stdin.lock(),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await
}

/// One request per input line. A bad line is reported and skipped; only a
/// failing reader or writer ends the loop.
async fn serve_lines<R, W, E>(
    pipeline: &Pipeline,
    name: &UserName,
    mut input: R,
    out: &mut W,
    err: &mut E,
) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim_end_matches(['\n', '\r']),
            Err(e) => {
                writeln!(err, "error: article is not valid UTF-8: {e}")?;
                continue;
            }
        };

        match pipeline.classify(name.as_str(), line, super::now()).await {
            Ok(result) => {
                writeln!(out, "Predicted Category: {}", result.label)?;
                if let StoreOutcome::Failed(e) = &result.outcome {
                    writeln!(err, "warning: interaction not recorded: {e}")?;
                }
            }
            Err(ClassifyError::Validation(
                ValidationError::BlankText | ValidationError::NoContentTokens,
            )) => writeln!(out, "Please enter a news article.")?,
            Err(e) => writeln!(err, "error: {e}")?,
        }
    }
}
