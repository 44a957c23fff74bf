//! Error handling for the AdBoard Rust client

use std::fmt;
use thiserror::Error;

/// Unified error type for the AdBoard Rust client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The backend rejected or failed a fetch/subscribe call
    #[error("Backend error: {0}")]
    Backend(String),

    /// A category, hoarding, or document does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Field-level input validation failures
    #[error("Validation error: {0}")]
    Validation(String),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new backend error
    pub fn backend<T: fmt::Display>(msg: T) -> Self {
        Error::Backend(msg.to_string())
    }

    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(msg: T) -> Self {
        Error::NotFound(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// A message suitable for showing to an end user in a toast or banner.
    ///
    /// Auth errors carry backend codes; the mapping mirrors what the web
    /// client historically displayed for each of them.
    pub fn user_message(&self) -> String {
        match self {
            Error::Auth(code) => match code.as_str() {
                "user-not-found" => "User does not exist. Please sign up first.".to_string(),
                "wrong-password" | "invalid-credential" => {
                    "Invalid email or password.".to_string()
                }
                "email-already-in-use" => {
                    "Email is already in use. Please login instead.".to_string()
                }
                "weak-password" => "Password should be at least 6 characters.".to_string(),
                "invalid-email" => "Please enter a valid email address.".to_string(),
                "too-many-requests" => {
                    "Too many failed attempts. Please try again later.".to_string()
                }
                other => format!("Authentication failed: {}", other),
            },
            Error::NotFound(_) => "The requested resource was not found.".to_string(),
            Error::Validation(msg) => msg.clone(),
            Error::Backend(_) | Error::Http(_) => {
                "Something went wrong talking to the server. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}
