use anyhow::bail;

use crate::context::AppContext;

pub async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    if ctx.settings.model_source.is_none() {
        bail!("fetch needs --model-source (or NEWSDESK_MODEL_SOURCE)");
    }
    let (model, tokenizer) = ctx.resolve_artifacts().await?;
    println!("  {:<12} {}", "Model:", model.display());
    println!("  {:<12} {}", "Tokenizer:", tokenizer.display());
    Ok(())
}
