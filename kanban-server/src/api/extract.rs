//! Extractors whose rejections surface as validation errors

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

use crate::domain::DomainError;

/// `Json<T>` that rejects malformed bodies with a 400 `{error}`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(DomainError))]
pub struct ApiJson<T>(pub T);

/// `Path<T>` that rejects malformed ids with a 400 `{error}`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(DomainError))]
pub struct ApiPath<T>(pub T);

/// `Query<T>` that rejects missing or malformed parameters with a 400 `{error}`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(DomainError))]
pub struct ApiQuery<T>(pub T);
