//! JSON API consumed by the web front end.
//!
//! Every route under `/api` identifies the caller through the header named by
//! [`AppState::user_header`], which the fronting proxy sets after login.

mod health;
mod play;
mod playlist;
mod run;
mod user;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;

use crate::{
    config,
    error::{Error, ValidationError},
    runner::Coordinator,
    store::{DefinitionStore, UserStore},
    types::User,
};

pub use health::health;

#[derive(Clone)]
pub struct AppState {
    pub definitions: Arc<dyn DefinitionStore>,
    pub users: Arc<dyn UserStore>,
    pub coordinator: Arc<Coordinator>,
    /// Lowercase name of the identity header.
    pub user_header: String,
}

impl AppState {
    pub fn new(
        definitions: Arc<dyn DefinitionStore>,
        users: Arc<dyn UserStore>,
        coordinator: Arc<Coordinator>,
    ) -> Self {
        Self {
            definitions,
            users,
            coordinator,
            user_header: config::user_header(),
        }
    }

    pub fn with_user_header(mut self, header: impl Into<String>) -> Self {
        self.user_header = header.into().to_lowercase();
        self
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/playlists", get(playlist::list))
        .route(
            "/playlist",
            get(playlist::get)
                .put(playlist::create)
                .post(playlist::update)
                .delete(playlist::delete),
        )
        .route("/playlist/play", post(play::play))
        .route("/playlist/run", get(run::run_playlist))
        .route("/playlist/run/user", get(run::run_user))
        .route("/playlist/run/users", get(run::run_users))
        .route("/user", get(user::get).post(user::update))
        .route("/users", get(user::list));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

/// `{ message, status: "success" }` body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
    pub status: &'static str,
}

impl Message {
    pub fn success(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
            status: "success",
        })
    }
}

/// Error response: `{ error, error_text, status: "error" }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    error_text: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            status,
            error_text: error.clone(),
            error,
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn unauthorized(error: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, error) = match &err {
            Error::Validation(ValidationError::NotLinked) => {
                (StatusCode::BAD_REQUEST, "spotify not linked".to_string())
            }
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "invalid playlist".to_string()),
            Error::InvalidInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Error::NotFound { entity, .. } => (StatusCode::NOT_FOUND, format!("no {entity} found")),
            Error::AlreadyRunning(_) => (StatusCode::CONFLICT, "playlist already running".to_string()),
            Error::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.clone()),
            Error::Transient { .. } | Error::Provider(_) => {
                (StatusCode::BAD_GATEWAY, "provider error".to_string())
            }
            _ => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        Self {
            status,
            error,
            error_text: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.error,
                "error_text": self.error_text,
                "status": "error",
            })),
        )
            .into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        let username = parts
            .headers
            .get(state.user_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::unauthorized("not logged in"))?
            .to_string();

        let user = match state.users.get_user(&username).await? {
            Some(user) => user,
            None => {
                tracing::info!(user = %username, "provisioning new user");
                let user = User::new(&username);
                state.users.save_user(user.clone()).await?;
                user
            }
        };

        if user.locked {
            return Err(ApiError::unauthorized("account locked"));
        }
        Ok(CurrentUser(user))
    }
}

/// Rejects non-admin callers.
pub fn require_admin(user: &User) -> ApiResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::unauthorized("unauthorized"))
    }
}
