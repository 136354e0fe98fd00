use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;
use crate::state::AppState;

/// Extracts one cookie value from a `Cookie` header string.
fn cookie_value<'a>(header_value: &'a str, name: &str) -> Option<&'a str> {
    header_value.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Admin guard for the trigger surface: forwards the `access_token`
/// cookie to the external validation endpoint. Skipped entirely in
/// development mode.
pub async fn validate_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.config.is_development() {
        return Ok(next.run(request).await);
    }

    let access_token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| cookie_value(value, "access_token"))
        .map(str::to_owned)
        .ok_or(AppError::AuthError)?;

    let validate_uri = state
        .config
        .validate_uri_admin
        .clone()
        .ok_or_else(|| AppError::ConfigurationError("VALIDATE_URI_ADMIN not configured".into()))?;

    let response = reqwest::Client::new()
        .get(&validate_uri)
        .header("Cookie", format!("access_token={}", access_token))
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Authentication server request failed: {}", e);
            AppError::AuthError
        })?;

    if !response.status().is_success() {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_among_other_cookies() {
        let header = "session=abc; access_token=tok123; theme=dark";
        assert_eq!(cookie_value(header, "access_token"), Some("tok123"));
    }

    #[test]
    fn missing_cookie_yields_none() {
        assert_eq!(cookie_value("session=abc", "access_token"), None);
        assert_eq!(cookie_value("", "access_token"), None);
    }

    #[test]
    fn name_must_match_exactly() {
        assert_eq!(cookie_value("xaccess_token=oops", "access_token"), None);
    }
}
