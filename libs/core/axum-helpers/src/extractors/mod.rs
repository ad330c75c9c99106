//! Custom extractors for Axum handlers.
//!
//! Rejections are [`AppError`](crate::errors::AppError)s, so every extraction
//! failure renders the same JSON error body as handler errors.

pub mod id_path;
pub mod validated_json;
pub mod validated_query;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
