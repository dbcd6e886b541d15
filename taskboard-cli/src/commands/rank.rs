//! `taskboard rank` - compute a rank between two others

use anyhow::Result;
use taskboard::Rank;
use taskboard_config::TaskboardConfig;

/// Run the rank command.
pub fn run_rank(
    config: &TaskboardConfig,
    after: Option<String>,
    before: Option<String>,
) -> Result<i32> {
    let rank = compute(config, after, before)?;
    println!("{}", rank);
    Ok(0)
}

fn compute(config: &TaskboardConfig, after: Option<String>, before: Option<String>) -> Result<Rank> {
    let after = after.map(Rank::from);
    let before = before.map(Rank::from);
    Ok(config
        .rank
        .calculator()
        .between(after.as_ref(), before.as_ref())?)
}
