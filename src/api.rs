//! A minimal HTTP API over the roster.
//!
//! - `GET /students` lists every student.
//! - `POST /students` adds a student from a JSON body.
//!
//! Each request opens its own database connection on a blocking thread and closes it when the
//! request is done.

use crate::error::Error;
use crate::manager::AttendanceManager;
use crate::models::Student;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

// Application state that will be shared across handlers
#[derive(Clone)]
struct AppState {
    database_url: Arc<str>,
}

/// Builds the API router for the database at `database_url`.
pub fn router(database_url: impl Into<String>) -> Router {
    let state = AppState {
        database_url: Arc::from(database_url.into()),
    };

    Router::new()
        .route("/students", get(list_students).post(create_student))
        .with_state(state)
}

/// Serves the API on `bind_addr` until the process is stopped.
pub async fn serve(database_url: &str, bind_addr: &str) -> anyhow::Result<()> {
    // Create the tables up front so a bad database path fails at startup.
    AttendanceManager::open(database_url)?;

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(database_url)).await?;
    Ok(())
}

/// An error response with a JSON body of the form `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::StudentExists(_) => StatusCode::CONFLICT,
            Error::UnknownStudent(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {}", self.message);
        }

        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Runs `op` against a fresh connection on the blocking thread pool.
async fn with_manager<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut AttendanceManager) -> crate::Result<T> + Send + 'static,
{
    let database_url = Arc::clone(&state.database_url);

    let result = tokio::task::spawn_blocking(move || {
        let mut manager = AttendanceManager::open(&database_url)?;
        op(&mut manager)
    })
    .await
    .map_err(|err| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: err.to_string(),
    })?;

    Ok(result?)
}

async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, ApiError> {
    let students = with_manager(&state, |manager| manager.load_students()).await?;
    Ok(Json(students))
}

async fn create_student(
    State(state): State<AppState>,
    Json(student): Json<Student>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let new_student = student.clone();
    with_manager(&state, move |manager| manager.add_student(&new_student)).await?;

    Ok((StatusCode::CREATED, Json(student)))
}
