use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

/// Env files for a profile, in load order. Later files override earlier ones.
pub fn profile_env_files(profile: &str) -> [&'static str; 3] {
    match profile {
        "production" | "release" => ["config/common.env", "config/prod.env", ".secrets.env"],
        _ => ["config/common.env", "config/dev.env", ".secrets.env"],
    }
}

pub fn load_environment() -> anyhow::Result<()> {
    let profile = dotenvy::var("ROCKET_PROFILE").unwrap_or_else(|_| "development".to_string());

    for env_file in profile_env_files(&profile) {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> anyhow::Result<()> {
    if !Path::new(path).exists() {
        warn!("Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)
        .with_context(|| format!("Failed to load environment file {}", path))?;
    info!("Loaded environment from: {}", path);
    Ok(())
}
