//! AdBoard Rust Client Library
//!
//! A Rust client for the AdBoard hoarding-rental backend, providing access
//! to the category catalog and its live hoarding queries, authentication,
//! bookings, and image CDN URL resolution.

pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod media;
pub mod normalize;
pub mod profile;
pub mod query;
pub mod store;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::Auth;
use crate::bookings::BookingsClient;
use crate::catalog::CatalogClient;
use crate::config::ClientOptions;
use crate::media::ImageCdn;
use crate::profile::ProfileClient;
use crate::store::{DocumentStore, RestDocumentStore};

/// The main entry point for the AdBoard Rust client
pub struct AdBoard {
    /// The base URL for the backend project
    pub url: String,
    /// The anonymous API key
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client for user management and authentication
    pub auth: Auth,
    /// Client options
    pub options: ClientOptions,
    /// The document store backing the catalog and bookings clients
    store: Arc<dyn DocumentStore>,
}

impl AdBoard {
    /// Create a new AdBoard client
    ///
    /// # Example
    ///
    /// ```
    /// use adboard_client::AdBoard;
    ///
    /// let adboard = AdBoard::new("https://your-project.adboard.app", "your-anon-key");
    /// ```
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new AdBoard client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use adboard_client::{config::ClientOptions, AdBoard};
    /// use std::time::Duration;
    ///
    /// let options = ClientOptions::default().with_watch_interval(Duration::from_secs(10));
    /// let adboard = AdBoard::new_with_options(
    ///     "https://your-project.adboard.app",
    ///     "your-anon-key",
    ///     options,
    /// );
    /// ```
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Self {
        let http_client = Client::new();
        let store: Arc<dyn DocumentStore> = Arc::new(RestDocumentStore::new(
            url,
            key,
            http_client.clone(),
            options.clone(),
        ));
        Self::new_with_store(url, key, options, http_client, store)
    }

    /// Create a client over an explicitly provided document store.
    ///
    /// This is the seam for test doubles: the catalog and bookings clients
    /// only ever talk to the injected store.
    pub fn new_with_store(
        url: &str,
        key: &str,
        options: ClientOptions,
        http_client: Client,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let auth = Auth::new(url, key, http_client.clone(), options.clone());

        Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
            auth,
            options,
            store,
        }
    }

    /// Get a reference to the auth client for user management and
    /// authentication
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Create a catalog client for category and hoarding queries
    pub fn catalog(&self) -> CatalogClient {
        CatalogClient::new(self.store.clone(), &self.options)
    }

    /// Create a bookings client for bookings, coupons and contact messages
    pub fn bookings(&self) -> BookingsClient {
        BookingsClient::new(self.store.clone(), &self.options)
    }

    /// Create a profile client for user documents
    pub fn profiles(&self) -> ProfileClient {
        ProfileClient::new(self.store.clone(), &self.options)
    }

    /// Create an image CDN URL resolver
    pub fn media(&self) -> ImageCdn {
        ImageCdn::new(&self.options)
    }

    /// The underlying document store
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::catalog::{CatalogClient, Category, CategorySubscription, CategoryView, MapFeed};
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::normalize::HoardingRecord;
    pub use crate::profile::{ProfileClient, ProfileUpdate, UserProfile};
    pub use crate::query::{paginate, Filter, Page, PriceRange};
    pub use crate::AdBoard;
}
