//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::db::{User, UserRepo};
use crate::models::ValidationError;
use crate::policy::Actor;
use super::error::ApiError;
use super::server::AppState;

/// The user behind the request's bearer token.
///
/// Rejects with 401 when the header is missing or malformed, the token
/// fails verification, or its subject no longer matches a user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.0.id, self.0.role_id)
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::unauthorized("not authenticated"))?;

        let claims = state.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            ApiError::unauthorized("could not validate credentials")
        })?;

        let user = UserRepo::new(&state.pool)
            .find_by_email(&claims.sub)
            .await?
            .ok_or(ApiError::unauthorized("could not validate credentials"))?;

        Ok(Self(user))
    }
}

/// Token from an `Authorization: Bearer <token>` header (scheme is case-insensitive).
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extract a numeric id from the path
pub struct ValidId(pub i32);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        let id = id.parse::<i32>().map_err(|_| {
            ApiError::Validation(ValidationError::InvalidFormat {
                field: "id",
                reason: "must be an integer",
            })
        })?;

        Ok(Self(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/tasks");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected() {
        use axum::routing::get;
        use axum::Router;
        use tower::ServiceExt;

        async fn handler(ValidId(id): ValidId) -> String {
            id.to_string()
        }

        let app: Router = Router::new().route("/items/{id}", get(handler));

        let ok = app
            .clone()
            .oneshot(Request::builder().uri("/items/42").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), axum::http::StatusCode::OK);

        let bad = app
            .oneshot(Request::builder().uri("/items/abc").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(bad.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
