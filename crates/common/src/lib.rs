//! Shared types for keyrelay: the API key secret and configuration errors

mod api_key;
mod error;

pub use api_key::ApiKey;
pub use error::{Error, Result};
