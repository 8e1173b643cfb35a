/// Error types shared across content server crates.
///
/// These errors represent failures in infrastructure components (Redis, the content
/// store client) that are common to any server fronting the CMS. Application-specific
/// errors should be defined in each server crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("content store error: {0}")]
    Store(#[from] crate::sanity::SanityClientError),
}
