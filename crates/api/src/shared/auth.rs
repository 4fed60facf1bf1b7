use crate::error::DeadlinerError;
use actix_web::HttpRequest;
use deadliner_domain::{User, ID};
use deadliner_infra::DeadlinerContext;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Claims carried by the bearer token of a `User`
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: ID,
    /// Expiration as a unix timestamp in seconds
    pub exp: i64,
}

/// Creates a HS256 bearer token for the given `User` that expires at `exp` (seconds)
pub fn create_user_token(user_id: &ID, secret: &str, exp: i64) -> anyhow::Result<String> {
    let claims = Claims {
        user_id: user_id.clone(),
        exp,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

fn parse_authtoken_header(token_header_value: &str) -> Option<&str> {
    let mut parts = token_header_value.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

fn decode_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?
    .claims;
    Ok(claims)
}

/// Resolves the active `User` making the request from the `Authorization` header
pub async fn protect_route(
    req: &HttpRequest,
    ctx: &DeadlinerContext,
) -> Result<User, DeadlinerError> {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(parse_authtoken_header)
        .ok_or_else(|| {
            DeadlinerError::Unauthorized(
                "Missing or malformed Authorization header, expected: Bearer <token>".into(),
            )
        })?;

    let claims = decode_token(token, &ctx.config.jwt_secret).map_err(|e| {
        warn!("Rejected bearer token: {:?}", e);
        DeadlinerError::Unauthorized("Invalid or expired bearer token".into())
    })?;

    match ctx.repos.users.find(&claims.user_id).await {
        Some(user) if user.is_active => Ok(user),
        _ => Err(DeadlinerError::Unauthorized(format!(
            "The user with id: {}, is not an active user",
            claims.user_id
        ))),
    }
}

/// Admin routes require the configured admin api key in the `x-api-key` header
pub fn protect_admin_route(
    req: &HttpRequest,
    ctx: &DeadlinerContext,
) -> Result<(), DeadlinerError> {
    let api_key = req
        .headers()
        .get("x-api-key")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| DeadlinerError::Unauthorized("Missing x-api-key header".into()))?;

    if api_key != ctx.config.admin_api_key {
        return Err(DeadlinerError::Unauthorized("Invalid api key".into()));
    }
    Ok(())
}
