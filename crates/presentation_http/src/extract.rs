//! Extractors that reject with the JSON error body

use axum::extract::{FromRequestParts, Path, Query};

use crate::error::ApiError;

/// `Query` whose rejection is an [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `Path` whose rejection is an [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
