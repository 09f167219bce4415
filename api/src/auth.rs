use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde::Serialize;

const MIN_TOKEN_LENGTH: usize = 10;

#[derive(Serialize)]
pub struct AuthError {
    pub error: String,
    pub message: String,
}

// Bearer-token gate for the /api routes. Validates presence and shape
// only; session-cookie login is handled outside this service.
pub async fn auth_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<AuthError>)> {
    let auth_header = headers.get("authorization").ok_or_else(|| {
        unauthorized("missing_authorization", "Authorization header is required")
    })?;

    let auth_str = auth_header.to_str().map_err(|_| {
        unauthorized("invalid_header", "Invalid authorization header format")
    })?;

    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        unauthorized(
            "invalid_authorization",
            "Authorization header must start with 'Bearer '",
        )
    })?;

    if !validate_token(token) {
        return Err(unauthorized(
            "invalid_token",
            "Token is too short or invalid",
        ));
    }

    log::info!(
        "authentication successful for token: {}...{}",
        &token[..4],
        &token[token.len() - 4..]
    );
    Ok(next.run(request).await)
}

pub fn validate_token(token: &str) -> bool {
    token.len() > MIN_TOKEN_LENGTH && token.chars().all(|c| !c.is_whitespace())
}

fn unauthorized(error: &str, message: &str) -> (StatusCode, Json<AuthError>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(AuthError {
            error: error.to_string(),
            message: message.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_tokens_are_rejected() {
        assert!(!validate_token(""));
        assert!(!validate_token("short"));
        assert!(!validate_token("exactly10c"));
    }

    #[test]
    fn tokens_with_whitespace_are_rejected() {
        assert!(!validate_token("token with spaces"));
    }

    #[test]
    fn reasonable_tokens_pass() {
        assert!(validate_token("a-perfectly-fine-token"));
    }
}
