use rocket::figment::Figment;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://student_admin.db?mode=rwc";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Server settings read from Rocket's figment (`Rocket.toml`, `ROCKET_*` variables).
/// A plain `DATABASE_URL` takes precedence over both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub cors_allowed_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            cors_allowed_origin: "*".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_figment(figment: &Figment) -> Result<Self, rocket::figment::Error> {
        let mut figment = figment.clone();

        if let Some(url) = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
        {
            figment = figment.merge(("database_url", url));
        }

        figment.extract()
    }

    pub fn load() -> Result<Self, rocket::figment::Error> {
        Self::from_figment(&rocket::Config::figment())
    }
}
