use axum::{response::IntoResponse, Json};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::auth_dto::{LoginPayload, LoginResponse};
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Login stub: no credential check happens here and no route requires the
/// returned token. The endpoint exists so clients can keep their login flow.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Session token issued", body = Json<LoginResponse>)
    )
)]
#[axum::debug_handler]
pub async fn login(Json(payload): Json<LoginPayload>) -> Result<impl IntoResponse> {
    payload.validate()?;

    let config = crate::config::get_config();
    let exp = (chrono::Utc::now() + chrono::Duration::hours(12)).timestamp() as usize;
    let claims = Claims {
        sub: payload.username,
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
    .map_err(|e| crate::error::Error::Internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
    }))
}
