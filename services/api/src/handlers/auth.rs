use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::Router;
use shopledger::auth::{Credentials, NewUser, Permission, Session, User, UserUpdate};
use shopledger::domain::UserId;
use shopledger::error::{AppError, ServiceError};

use crate::extract::{Json, Path};
use crate::infra::{ApiContext, CurrentUser};

pub(crate) fn router() -> Router<ApiContext> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/users", get(list_users).post(create_user))
        .route("/api/v1/users/:id", patch(update_user))
}

/// First-run sign-up; refused once any account exists.
async fn register(
    State(context): State<ApiContext>,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let auth = context.ledger.auth.clone();
    let user = off_runtime(move || auth.register(new_user)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(context): State<ApiContext>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Session>, AppError> {
    let auth = context.ledger.auth.clone();
    Ok(Json(off_runtime(move || auth.login(credentials)).await?))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

async fn list_users(
    State(context): State<ApiContext>,
    current: CurrentUser,
) -> Result<Json<Vec<User>>, AppError> {
    current.require(Permission::ManageUsers)?;
    Ok(Json(context.ledger.auth.list_users()?))
}

async fn create_user(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    current.require(Permission::ManageUsers)?;
    let auth = context.ledger.auth.clone();
    let user = off_runtime(move || auth.create_user(new_user)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(context): State<ApiContext>,
    current: CurrentUser,
    Path(id): Path<u64>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>, AppError> {
    current.require(Permission::ManageUsers)?;
    let auth = context.ledger.auth.clone();
    Ok(Json(
        off_runtime(move || auth.update_user(UserId(id), update)).await?,
    ))
}

/// Runs password hashing or verification on the blocking pool.
async fn off_runtime<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(work)
        .await
        .map_err(axum::Error::new)?;
    Ok(outcome?)
}
