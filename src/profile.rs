//! User profile documents in the `users` collection
//!
//! A profile document is created on first sign-in and never overwritten by a
//! later one; profile edits write only the submitted fields so concurrent
//! data under the same document survives.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::auth::User;
use crate::config::ClientOptions;
use crate::error::Error;
use crate::normalize::unwrap_timestamp;
use crate::store::{Document, DocumentStore};

/// A user's profile document
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    /// The owning user's id; doubles as the document id
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Phone number; empty until the user fills it in
    pub phone: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// Profile image URL or CDN public id
    pub profile_image: String,
    /// Access role; defaults to "customer"
    pub role: String,
    /// Creation time, if the document carries one
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    fn from_document(doc: &Document) -> Self {
        let string = |key: &str| {
            doc.data
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            user_id: doc.id.clone(),
            name: string("name"),
            email: string("email"),
            phone: string("phone"),
            address: string("address"),
            city: string("city"),
            profile_image: string("profileImage"),
            role: {
                let role = string("role");
                if role.is_empty() {
                    "customer".to_string()
                } else {
                    role
                }
            },
            created_at: doc.data.get("createdAt").and_then(unwrap_timestamp),
        }
    }
}

/// Fields a user can change on their own profile. `None` fields are left
/// untouched by [`ProfileClient::update_profile`].
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New phone number
    pub phone: Option<String>,
    /// New street address
    pub address: Option<String>,
    /// New city
    pub city: Option<String>,
    /// New profile image URL or CDN public id
    pub profile_image: Option<String>,
}

/// Client for user profile documents
#[derive(Clone)]
pub struct ProfileClient {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl ProfileClient {
    /// Create a new profile client over an injected document store
    pub fn new(store: Arc<dyn DocumentStore>, options: &ClientOptions) -> Self {
        Self {
            store,
            collection: options.users_collection.clone(),
        }
    }

    /// Create the profile document for a newly signed-in user.
    ///
    /// Returns `true` if a document was created, `false` if one already
    /// existed. An existing document is never touched, so repeated sign-ins
    /// cannot reset a profile the user has edited.
    pub async fn ensure_profile(&self, user: &User) -> Result<bool, Error> {
        if self.store.get(&self.collection, &user.id).await?.is_some() {
            return Ok(false);
        }

        let mut data = Map::new();
        data.insert(
            "name".to_string(),
            Value::String(user.display_name.clone().unwrap_or_default()),
        );
        data.insert(
            "email".to_string(),
            Value::String(user.email.clone().unwrap_or_default()),
        );
        data.insert("phone".to_string(), Value::String(String::new()));
        data.insert("address".to_string(), Value::String(String::new()));
        data.insert("city".to_string(), Value::String(String::new()));
        data.insert("profileImage".to_string(), Value::String(String::new()));
        data.insert("role".to_string(), Value::String("customer".to_string()));
        data.insert(
            "createdAt".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        self.store.set(&self.collection, &user.id, data).await?;
        tracing::info!(user_id = %user.id, "user profile created");
        Ok(true)
    }

    /// Fetch a user's profile, `None` if it was never created
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, Error> {
        Ok(self
            .store
            .get(&self.collection, user_id)
            .await?
            .as_ref()
            .map(UserProfile::from_document))
    }

    /// Apply a partial profile edit: only the submitted fields are written,
    /// everything else in the document is preserved.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), Error> {
        let mut data = self
            .store
            .get(&self.collection, user_id)
            .await?
            .map(|d| d.data)
            .unwrap_or_default();

        let fields = [
            ("name", &update.name),
            ("phone", &update.phone),
            ("address", &update.address),
            ("city", &update.city),
            ("profileImage", &update.profile_image),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                data.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        self.store.set(&self.collection, user_id, data).await
    }
}
