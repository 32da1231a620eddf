use crate::error::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Runtime configuration.
///
/// Values are layered: built-in defaults, then an optional `attendance.toml` in the working
/// directory, then `ATTENDANCE_*` environment variables. A `DATABASE_URL` variable (possibly from a
/// `.env` file) takes precedence over everything else for the database location.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Path of the `sqlite3` database file.
    pub database_url: String,
    /// Directory holding the CSV files for a bulk import.
    pub data_dir: PathBuf,
    /// Directory exported reports are written to.
    pub export_dir: PathBuf,
    /// Address the HTTP API listens on.
    pub bind_addr: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .set_default("database_url", "attendance.db")?
            .set_default("data_dir", "data")?
            .set_default("export_dir", ".")?
            .set_default("bind_addr", "127.0.0.1:3000")?
            .add_source(File::with_name("attendance").required(false))
            .add_source(Environment::with_prefix("ATTENDANCE"));

        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database_url", database_url)?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}
