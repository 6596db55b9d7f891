use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::Error;
use crate::models::user::CurrentUser;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_authorization"})),
        )
            .into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"bad_authorization"})),
        )
            .into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"unsupported_scheme"})),
        )
            .into_response();
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => {
            req.extensions_mut().insert(data.claims);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error":"invalid_token"})),
            )
                .into_response()
        }
    }
}

/// Resolves the verified caller; requires `require_bearer_auth` upstream.
#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| Error::Unauthorized("missing_authorization".to_string()))?;
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| Error::Unauthorized("invalid_subject".to_string()))?;
        let address = state.directory.recruiter_address(id).await?;

        Ok(CurrentUser {
            id,
            role: claims.role,
            address,
        })
    }
}
