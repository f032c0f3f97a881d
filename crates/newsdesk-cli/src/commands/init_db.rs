use anyhow::Context;
use newsdesk_store::{redact, schema};

use crate::context::AppContext;

pub async fn run(ctx: &AppContext) -> anyhow::Result<()> {
    let store = ctx.store().await?;
    store
        .ensure_schema()
        .await
        .context("create interaction table")?;
    println!(
        "Table `{}` ready in {}",
        schema::TABLE,
        redact(&ctx.settings.database_url)
    );
    Ok(())
}
