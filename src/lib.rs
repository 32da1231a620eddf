//! A small student attendance tracker: students, courses, attendance records, and payments stored
//! in SQLite, with attendance statistics, CSV import/export, a command-line front end, and a
//! minimal HTTP API.

pub mod api;
pub mod cli;
pub mod display;
pub mod error;
pub mod manager;
pub mod models;
pub mod schema;
pub mod settings;
pub mod stats;
pub mod transfer;

pub use error::{Error, Result};
pub use manager::AttendanceManager;
pub use settings::Settings;

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the default of `attendance=info`.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attendance=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
