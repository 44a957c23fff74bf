//! Types for authentication and user management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::auth::Session;

/// Authentication response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The user data
    pub user: Option<User>,

    /// The session data
    pub session: Option<Session>,

    /// Any error code returned by the auth service
    pub error: Option<String>,

    /// The error description
    #[serde(rename = "error_description")]
    pub error_description: Option<String>,
}

/// User data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: String,

    /// The user's email address
    pub email: Option<String>,

    /// The user's display name
    #[serde(rename = "display_name")]
    pub display_name: Option<String>,

    /// The user's phone number
    pub phone: Option<String>,

    /// Profile photo URL
    #[serde(rename = "photo_url")]
    pub photo_url: Option<String>,

    /// The sign-in provider ("password", "google", ...)
    pub provider: Option<String>,

    /// Additional profile fields
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// The creation time
    #[serde(rename = "created_at")]
    pub created_at: Option<String>,
}

/// Profile attributes that can be updated
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserAttributes {
    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Display name
    #[serde(rename = "display_name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Profile photo URL
    #[serde(rename = "photo_url", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Supported OAuth sign-in providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    /// Google OAuth
    Google,
}

impl OAuthProvider {
    /// The provider identifier used in auth URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }
}
