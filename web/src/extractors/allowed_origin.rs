use crate::extractors::RejectionType;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use log::*;
use service::AppState;

/// The request's `Origin` header, present and on the configured allow-list.
pub(crate) struct AllowedOrigin(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AllowedOrigin {
    type Rejection = RejectionType;

    async fn from_request_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let origin = parts
            .headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok());

        match origin {
            Some(origin) if app_state.config.is_origin_allowed(origin) => {
                Ok(AllowedOrigin(origin.to_string()))
            }
            Some(origin) => {
                warn!("Rejecting request from disallowed origin {origin}");
                Err((StatusCode::FORBIDDEN, "Origin not allowed".to_string()))
            }
            None => {
                warn!("Rejecting request without an Origin header");
                Err((StatusCode::FORBIDDEN, "Origin required".to_string()))
            }
        }
    }
}
