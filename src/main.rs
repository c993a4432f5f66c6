use student_admin::config::AppConfig;
use student_admin::database::{connect, initialize_schema};
use student_admin::env::load_environment;
use student_admin::error::AppError;
use student_admin::init_rocket;
use student_admin::telemetry::init_tracing;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("{0}")]
    Figment(rocket::figment::Error),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
    #[error("Server error: {0}")]
    Rocket(Box<rocket::Error>),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

impl From<rocket::figment::Error> for Error {
    fn from(value: rocket::figment::Error) -> Self {
        Error::Figment(value)
    }
}

impl From<rocket::Error> for Error {
    fn from(value: rocket::Error) -> Self {
        Error::Rocket(Box::new(value))
    }
}

#[rocket::main]
async fn main() -> Result<(), Error> {
    load_environment()?;
    let _telemetry = init_tracing()?;

    let config = AppConfig::load()?;
    let pool = connect(&config).await?;
    initialize_schema(&pool).await?;

    let _rocket = init_rocket(pool, &config).await.launch().await?;
    info!("Server shut down");

    Ok(())
}
