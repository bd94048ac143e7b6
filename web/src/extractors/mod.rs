pub(crate) mod allowed_origin;
pub(crate) mod authenticated_user;

use axum::http::StatusCode;

type RejectionType = (StatusCode, String);
