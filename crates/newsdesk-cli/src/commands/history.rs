use anyhow::Context;

use crate::context::AppContext;
use crate::display;

pub async fn run(ctx: &AppContext, limit: usize, json: bool) -> anyhow::Result<()> {
    let store = ctx.store().await?;
    let rows = store.recent(limit).await.context("read interactions")?;
    if json {
        display::print_history_json(&rows)
    } else {
        display::print_history(&rows);
        Ok(())
    }
}
