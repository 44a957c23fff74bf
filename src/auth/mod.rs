//! Authentication and user management for the AdBoard backend

mod session;
mod types;

use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;

pub use session::*;
pub use types::*;

/// An auth-state change delivered to subscribers: the signed-in user, or
/// `None` after sign-out
#[derive(Debug, Clone)]
pub struct AuthChange {
    /// The current user, if any
    pub user: Option<User>,
}

/// Client for the authentication service
pub struct Auth {
    /// The base URL for the backend
    url: String,

    /// The anonymous API key
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: Arc<Mutex<Option<Session>>>,

    /// Auth-state change notifications
    changes: broadcast::Sender<AuthChange>,

    /// Client options
    #[allow(dead_code)]
    options: ClientOptions,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(url: &str, key: &str, client: Client, options: ClientOptions) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(Mutex::new(None)),
            changes,
            options,
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn store_session(&self, response: &AuthResponse) {
        if let Some(ref session) = response.session {
            let mut current_session = self.session.lock().unwrap();
            *current_session = Some(session.clone());
        }
        let _ = self.changes.send(AuthChange {
            user: response.user.clone(),
        });
    }

    fn check_auth_error(response: AuthResponse) -> Result<AuthResponse, Error> {
        if let Some(code) = response.error {
            return Err(Error::auth(code));
        }
        Ok(response)
    }

    /// Subscribe to auth-state changes (sign-in and sign-out events)
    pub fn on_auth_state_change(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }

    /// Sign up a new user with email and password
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthResponse, Error> {
        if password.len() < 6 {
            return Err(Error::auth("weak-password"));
        }

        let url = self.get_auth_url("/signup");

        let mut body = HashMap::new();
        body.insert("email".to_string(), email.to_string());
        body.insert("password".to_string(), password.to_string());
        if let Some(name) = display_name {
            body.insert("display_name".to_string(), name.to_string());
        }

        let result = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(&body)?
            .execute::<AuthResponse>()
            .await?;
        let result = Self::check_auth_error(result)?;

        self.store_session(&result);
        Ok(result)
    }

    /// Sign in a user with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, Error> {
        let url = self.get_auth_url("/token?grant_type=password");

        let mut body = HashMap::new();
        body.insert("email".to_string(), email.to_string());
        body.insert("password".to_string(), password.to_string());

        let result = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(&body)?
            .execute::<AuthResponse>()
            .await?;
        let result = Self::check_auth_error(result)?;

        self.store_session(&result);
        Ok(result)
    }

    /// The URL to redirect a user to for OAuth sign-in
    pub fn sign_in_with_oauth_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, Error> {
        let mut url = url::Url::parse(&self.get_auth_url("/authorize"))?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to);
        Ok(url.to_string())
    }

    /// Complete an OAuth sign-in with the tokens returned on the redirect
    pub async fn exchange_oauth_session(&self, access_token: &str) -> Result<AuthResponse, Error> {
        let url = self.get_auth_url("/user");

        let user = Fetch::get(&self.client, &url)
            .header("apikey", &self.key)
            .bearer_auth(access_token)
            .execute::<User>()
            .await?;

        let session = Session::new(
            access_token.to_string(),
            String::new(),
            user.id.clone(),
            3600,
        );
        let response = AuthResponse {
            user: Some(user),
            session: Some(session),
            error: None,
            error_description: None,
        };
        self.store_session(&response);
        Ok(response)
    }

    /// Sign out the current user
    pub async fn sign_out(&self) -> Result<(), Error> {
        let url = self.get_auth_url("/logout");

        let token = {
            let current_session = self.session.lock().unwrap();
            match *current_session {
                Some(ref session) => session.access_token.clone(),
                None => return Err(Error::auth("Not logged in")),
            }
        };

        Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .bearer_auth(&token)
            .execute_raw()
            .await?;

        {
            let mut current_session = self.session.lock().unwrap();
            *current_session = None;
        }
        let _ = self.changes.send(AuthChange { user: None });

        Ok(())
    }

    /// Reset a user's password
    pub async fn reset_password_for_email(&self, email: &str) -> Result<(), Error> {
        let url = self.get_auth_url("/recover");

        let mut body = HashMap::new();
        body.insert("email".to_string(), email.to_string());

        Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .json(&body)?
            .execute_raw()
            .await?;

        Ok(())
    }

    /// Get the user data for the currently authenticated user
    pub async fn get_user(&self) -> Result<User, Error> {
        let url = self.get_auth_url("/user");

        let token = {
            let current_session = self.session.lock().unwrap();
            match *current_session {
                Some(ref session) => session.access_token.clone(),
                None => return Err(Error::auth("Not logged in")),
            }
        };

        let user = Fetch::get(&self.client, &url)
            .header("apikey", &self.key)
            .bearer_auth(&token)
            .execute::<User>()
            .await?;

        Ok(user)
    }

    /// Update the current user's profile
    pub async fn update(&self, attributes: UserAttributes) -> Result<User, Error> {
        let url = self.get_auth_url("/user");

        let token = {
            let current_session = self.session.lock().unwrap();
            match *current_session {
                Some(ref session) => session.access_token.clone(),
                None => return Err(Error::auth("Not logged in")),
            }
        };

        let user = Fetch::put(&self.client, &url)
            .header("apikey", &self.key)
            .bearer_auth(&token)
            .json(&attributes)?
            .execute::<User>()
            .await?;

        let _ = self.changes.send(AuthChange {
            user: Some(user.clone()),
        });
        Ok(user)
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        let current_session = self.session.lock().unwrap();
        current_session.clone()
    }

    /// Set the session (e.g. restored from persisted state)
    pub fn set_session(&self, session: Session) {
        let mut current_session = self.session.lock().unwrap();
        *current_session = Some(session);
    }
}
