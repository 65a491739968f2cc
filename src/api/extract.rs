//! Request extractors that report rejections as JSON `{"error": ...}` bodies.

use crate::types::AppError;
use axum::extract::FromRequest;

/// [`axum::Json`] whose rejection becomes [`AppError::InvalidInput`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);
