pub mod content_api;
pub mod error;
pub mod redis;
pub mod sanity;
