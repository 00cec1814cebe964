//! The `interviewkit usage` command.

use std::path::PathBuf;

use anyhow::Result;

use interviewkit_core::traits::{date_key, Clock, SystemClock, UsageStore};
use interviewkit_core::usage::FileUsageStore;
use interviewkit_voice::load_config_from;

pub fn execute(reset: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = FileUsageStore::new(config.usage_file.clone());

    if reset {
        store.reset()?;
        println!("Usage reset ({}).", store.path().display());
        return Ok(());
    }

    let today = date_key(SystemClock.today());
    let used = store.get(&today)?;
    let limit = config.limits.daily_limit;
    println!(
        "Interviews today: {used}/{limit} ({} remaining)",
        limit.saturating_sub(used)
    );
    Ok(())
}
