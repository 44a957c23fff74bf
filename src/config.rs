//! Configuration options for the AdBoard client

use std::time::Duration;

/// Configuration options for the AdBoard client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// How often a live subscription polls the backend for a fresh snapshot
    pub watch_interval: Duration,

    /// The collection holding categories (hoardings live in a sub-collection
    /// under each category document)
    pub categories_collection: String,

    /// The collection holding bookings
    pub bookings_collection: String,

    /// The collection holding user profile documents
    pub users_collection: String,

    /// The collection holding contact messages
    pub contact_messages_collection: String,

    /// The collection holding coupons
    pub coupons_collection: String,

    /// Base URL of the image CDN used to resolve stored image ids
    pub cdn_base_url: String,

    /// Placeholder image URL used when a record has no usable image
    pub placeholder_image_url: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            watch_interval: Duration::from_secs(5),
            categories_collection: "categories".to_string(),
            bookings_collection: "bookings".to_string(),
            users_collection: "users".to_string(),
            contact_messages_collection: "contactMessages".to_string(),
            coupons_collection: "coupons".to_string(),
            cdn_base_url: "https://res.cloudinary.com/adboard/image/upload".to_string(),
            placeholder_image_url: "https://placehold.co/800x450?text=No+Image".to_string(),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the subscription poll interval
    pub fn with_watch_interval(mut self, value: Duration) -> Self {
        self.watch_interval = value;
        self
    }

    /// Set the categories collection name
    pub fn with_categories_collection(mut self, value: &str) -> Self {
        self.categories_collection = value.to_string();
        self
    }

    /// Set the bookings collection name
    pub fn with_bookings_collection(mut self, value: &str) -> Self {
        self.bookings_collection = value.to_string();
        self
    }

    /// Set the users collection name
    pub fn with_users_collection(mut self, value: &str) -> Self {
        self.users_collection = value.to_string();
        self
    }

    /// Set the contact messages collection name
    pub fn with_contact_messages_collection(mut self, value: &str) -> Self {
        self.contact_messages_collection = value.to_string();
        self
    }

    /// Set the coupons collection name
    pub fn with_coupons_collection(mut self, value: &str) -> Self {
        self.coupons_collection = value.to_string();
        self
    }

    /// Set the image CDN base URL
    pub fn with_cdn_base_url(mut self, value: &str) -> Self {
        self.cdn_base_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the placeholder image URL
    pub fn with_placeholder_image_url(mut self, value: &str) -> Self {
        self.placeholder_image_url = value.to_string();
        self
    }
}
