use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::{hash_password, is_valid_email, AuthUser},
    error::ApiError,
    state::AppState,
    users::{
        dto::{CreateUserRequest, DeleteUserResponse, PublicUser, UpdateUserRequest},
        repo::User,
    },
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        // Account creation is deliberately unauthenticated, matching the
        // deployed access-control model.
        .route("/users", post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    if payload.password.len() < 6 {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::EmailTaken);
    }

    let hash = hash_password(&payload.password)?;
    // The pre-check above can race a concurrent signup; the unique index
    // is authoritative and still surfaces as a conflict.
    let user = User::create(&state.db, &payload.email, &hash, &payload.name)
        .await
        .map_err(duplicate_email_to_conflict)?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Option<PublicUser>>, ApiError> {
    if let Some(email) = &payload.email {
        if !is_valid_email(email) {
            return Err(ApiError::BadRequest("Invalid email".into()));
        }
    }

    if matches!(&payload.password, Some(plain) if plain.len() < 6) {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    // An incoming password is re-hashed; the stored hash is never the
    // plaintext.
    let password_hash = match &payload.password {
        Some(plain) => Some(hash_password(plain)?),
        None => None,
    };

    let updated = User::update(
        &state.db,
        id,
        payload.name.as_deref(),
        payload.email.as_deref(),
        password_hash.as_deref(),
    )
    .await
    .map_err(duplicate_email_to_conflict)?;

    // Unknown id is a null body, not an error.
    Ok(Json(updated.map(PublicUser::from)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let deleted = User::delete(&state.db, id).await?;
    if deleted {
        info!(user_id = %id, "user deleted");
    }
    Ok(Json(DeleteUserResponse { deleted }))
}

/// Changing an email to one another account holds trips the `users`
/// unique index; that is a conflict, not an internal error.
fn duplicate_email_to_conflict(e: anyhow::Error) -> ApiError {
    let unique = e
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique {
        ApiError::EmailTaken
    } else {
        ApiError::Internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::DatabaseError;
    use time::OffsetDateTime;

    #[test]
    fn public_user_serialization_has_no_password_field() {
        let response = PublicUser {
            id: Uuid::new_v4(),
            name: "Administrator".into(),
            email: "admin@example.com".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("admin@example.com"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn update_request_fields_are_optional() {
        let payload: UpdateUserRequest = serde_json::from_str(r#"{"name":"New Name"}"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("New Name"));
        assert!(payload.email.is_none());
        assert!(payload.password.is_none());
    }

    #[tokio::test]
    async fn update_rejects_short_password_before_touching_store() {
        let state = AppState::fake();
        let payload = UpdateUserRequest {
            name: None,
            email: None,
            password: Some("123".into()),
        };
        let err = update_user(
            State(state),
            AuthUser(Uuid::new_v4()),
            Path(Uuid::new_v4()),
            Json(payload),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[derive(Debug)]
    struct FakeUniqueViolation;

    impl std::fmt::Display for FakeUniqueViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message())
        }
    }

    impl std::error::Error for FakeUniqueViolation {}

    impl sqlx::error::DatabaseError for FakeUniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"users_email_key\""
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some("23505".into())
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn unique_violation_maps_to_email_taken() {
        let db_err = sqlx::Error::Database(Box::new(FakeUniqueViolation));
        let err = duplicate_email_to_conflict(db_err.into());
        assert!(matches!(err, ApiError::EmailTaken));
    }

    #[test]
    fn other_store_errors_stay_internal() {
        let err = duplicate_email_to_conflict(anyhow::anyhow!("connection refused"));
        assert!(matches!(err, ApiError::Internal(_)));

        let db_err = sqlx::Error::RowNotFound;
        let err = duplicate_email_to_conflict(db_err.into());
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
