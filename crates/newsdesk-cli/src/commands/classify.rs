use std::io::Read;

use anyhow::Context;
use newsdesk_pipeline::{Classified, StoreOutcome};

use crate::context::AppContext;

pub async fn run(
    ctx: &AppContext,
    name: &str,
    text: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read article from stdin")?;
            buf
        }
    };

    let pipeline = ctx.pipeline().await?;
    let result = pipeline.classify(name, &text, super::now()).await?;

    if json {
        println!("{}", to_json(&result));
    } else {
        println!("Predicted Category: {}", result.label);
    }
    if let StoreOutcome::Failed(err) = &result.outcome {
        eprintln!("warning: interaction not recorded: {err}");
    }
    Ok(())
}

fn to_json(result: &Classified) -> serde_json::Value {
    serde_json::json!({
        "predicted_category": result.label,
        "recorded": result.outcome.is_stored(),
        "id": result.outcome.id(),
    })
}
