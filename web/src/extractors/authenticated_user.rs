use crate::error::Error;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use domain::error::{DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind};
use domain::{jwt, Id};
use log::*;
use serde::Deserialize;
use service::AppState;

#[derive(Debug, Deserialize)]
struct TokenParams {
    token: Option<String>,
}

/// The user identified by the access token in the `token` query parameter.
pub(crate) struct AuthenticatedUserId(pub Id);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUserId {
    type Rejection = Error;

    // Browsers cannot attach headers to an EventSource, so the token travels in the query string.
    async fn from_request_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = Query::<TokenParams>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(params)| params.token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                debug!("Request to {} carries no access token", parts.uri.path());
                DomainError {
                    source: None,
                    error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                        EntityErrorKind::Unauthenticated,
                    )),
                }
            })?;

        let secret = app_state.config.jwt_secret().ok_or_else(|| {
            error!("No JWT secret configured, cannot verify access tokens");
            DomainError {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        })?;

        let user_id = jwt::verify_access_token(&token, secret).inspect_err(|e| {
            debug!("Rejecting access token: {e}");
        })?;

        Ok(AuthenticatedUserId(user_id))
    }
}
