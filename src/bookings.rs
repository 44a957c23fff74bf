//! Bookings, rental quotes, coupons and contact messages

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::normalize::unwrap_timestamp;
use crate::store::{Document, DocumentStore};

/// A booking request to be written to the backend
#[derive(Debug, Clone)]
pub struct NewBooking {
    /// The authenticated user's id
    pub user_id: String,
    /// The user's display name
    pub user_name: String,
    /// The user's email
    pub user_email: String,
    /// The user's phone number, if provided
    pub user_phone: Option<String>,
    /// The booked hoarding's document id
    pub hoarding_id: String,
    /// The booked hoarding's display title
    pub hoarding_title: String,
    /// The booked hoarding's address
    pub hoarding_address: String,
    /// Rental start
    pub start_date: DateTime<Utc>,
    /// Rental end
    pub end_date: DateTime<Utc>,
    /// Total price for the rental period
    pub total_price: f64,
    /// Booking status; defaults to "pending"
    pub status: Option<String>,
}

impl NewBooking {
    /// Field-level validation, naming the first missing field.
    ///
    /// Blocks submission; never silently swallowed by the caller.
    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            ("userId", &self.user_id),
            ("userName", &self.user_name),
            ("userEmail", &self.user_email),
            ("hoardingId", &self.hoarding_id),
            ("hoardingTitle", &self.hoarding_title),
            ("hoardingAddress", &self.hoarding_address),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::validation(format!("Missing required field: {}", name)));
            }
        }
        if self.total_price <= 0.0 {
            return Err(Error::validation("Missing required field: totalPrice"));
        }
        Ok(())
    }
}

/// A booking as stored by the backend
#[derive(Debug, Clone)]
pub struct Booking {
    /// The booking document id
    pub id: String,
    /// The booking user's id
    pub user_id: String,
    /// The booked hoarding's title
    pub hoarding_title: String,
    /// The booking status
    pub status: String,
    /// Total price
    pub total_price: f64,
    /// Creation time, if the document carries one
    pub created_at: Option<DateTime<Utc>>,
    /// The raw document fields
    pub data: Map<String, Value>,
}

impl Booking {
    fn from_document(doc: &Document) -> Self {
        let string = |key: &str| {
            doc.data
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            id: doc.id.clone(),
            user_id: string("userId"),
            hoarding_title: string("hoardingTitle"),
            status: {
                let s = string("status");
                if s.is_empty() {
                    "pending".to_string()
                } else {
                    s
                }
            },
            total_price: doc
                .data
                .get("totalPrice")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            created_at: doc.data.get("createdAt").and_then(unwrap_timestamp),
            data: doc.data.clone(),
        }
    }
}

/// A price quote for a rental period
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Monthly price times duration
    pub base_amount: f64,
    /// Discount applied by the coupon, if any
    pub discount: f64,
    /// Rounded, non-negative final amount
    pub total: f64,
}

/// Compute the total for a rental: base = monthly price x months, coupon
/// codes `WELCOME10` (10% off) and `FEST20` (20% off) applied
/// case-insensitively, final amount rounded and floored at zero.
pub fn quote(monthly_price: f64, months: u32, coupon: Option<&str>) -> Quote {
    let base_amount = monthly_price.max(0.0) * f64::from(months.max(1));
    let discount = match coupon.map(|c| c.trim().to_uppercase()) {
        Some(code) if code == "WELCOME10" => 0.1 * base_amount,
        Some(code) if code == "FEST20" => 0.2 * base_amount,
        _ => 0.0,
    };
    Quote {
        base_amount,
        discount,
        total: (base_amount - discount).round().max(0.0),
    }
}

/// A discount coupon
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    /// The coupon code
    pub code: String,
    /// Percentage discount, 0..=100
    pub percent_off: f64,
    /// Expiry, if the coupon has one
    pub expires_at: Option<DateTime<Utc>>,
}

impl Coupon {
    fn from_document(doc: &Document) -> Self {
        Self {
            code: doc
                .data
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or(&doc.id)
                .to_string(),
            percent_off: doc
                .data
                .get("percentOff")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            expires_at: doc.data.get("expiresAt").and_then(unwrap_timestamp),
        }
    }

    /// Whether the coupon is still usable at the given instant
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

/// A message from the public contact form (admin view)
#[derive(Debug, Clone)]
pub struct ContactMessage {
    /// The message document id
    pub id: String,
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Message body
    pub message: String,
    /// Submission time, if recorded
    pub created_at: Option<DateTime<Utc>>,
}

/// Client for bookings, coupons and contact messages
#[derive(Clone)]
pub struct BookingsClient {
    store: Arc<dyn DocumentStore>,
    bookings_collection: String,
    coupons_collection: String,
    contact_messages_collection: String,
}

impl BookingsClient {
    /// Create a new bookings client over an injected document store
    pub fn new(store: Arc<dyn DocumentStore>, options: &ClientOptions) -> Self {
        Self {
            store,
            bookings_collection: options.bookings_collection.clone(),
            coupons_collection: options.coupons_collection.clone(),
            contact_messages_collection: options.contact_messages_collection.clone(),
        }
    }

    /// Validate and create a booking, returning its id
    pub async fn create(&self, booking: &NewBooking) -> Result<String, Error> {
        booking.validate()?;

        let mut data = Map::new();
        data.insert("userId".to_string(), Value::String(booking.user_id.clone()));
        data.insert(
            "userName".to_string(),
            Value::String(booking.user_name.clone()),
        );
        data.insert(
            "userEmail".to_string(),
            Value::String(booking.user_email.clone()),
        );
        data.insert(
            "userPhone".to_string(),
            Value::String(booking.user_phone.clone().unwrap_or_default()),
        );
        data.insert(
            "hoardingId".to_string(),
            Value::String(booking.hoarding_id.clone()),
        );
        data.insert(
            "hoardingTitle".to_string(),
            Value::String(booking.hoarding_title.clone()),
        );
        data.insert(
            "hoardingAddress".to_string(),
            Value::String(booking.hoarding_address.clone()),
        );
        data.insert(
            "startDate".to_string(),
            Value::String(booking.start_date.to_rfc3339()),
        );
        data.insert(
            "endDate".to_string(),
            Value::String(booking.end_date.to_rfc3339()),
        );
        data.insert("totalPrice".to_string(), Value::from(booking.total_price));
        data.insert(
            "status".to_string(),
            Value::String(
                booking
                    .status
                    .clone()
                    .unwrap_or_else(|| "pending".to_string()),
            ),
        );
        data.insert(
            "createdAt".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        let id = self.store.add(&self.bookings_collection, data).await?;
        tracing::info!(booking_id = %id, "booking created");
        Ok(id)
    }

    /// A user's bookings, newest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>, Error> {
        let docs = self.store.list(&self.bookings_collection).await?;
        let mut bookings: Vec<Booking> = docs
            .iter()
            .map(Booking::from_document)
            .filter(|b| b.user_id == user_id)
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    /// Coupons that have not expired
    pub async fn active_coupons(&self) -> Result<Vec<Coupon>, Error> {
        let now = Utc::now();
        let docs = self.store.list(&self.coupons_collection).await?;
        Ok(docs
            .iter()
            .map(Coupon::from_document)
            .filter(|c| c.is_active(now))
            .collect())
    }

    /// All contact messages, newest first (admin view)
    pub async fn contact_messages(&self) -> Result<Vec<ContactMessage>, Error> {
        let docs = self.store.list(&self.contact_messages_collection).await?;
        let mut messages: Vec<ContactMessage> = docs
            .iter()
            .map(|doc| {
                let string = |key: &str| {
                    doc.data
                        .get(key)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                ContactMessage {
                    id: doc.id.clone(),
                    name: string("name"),
                    email: string("email"),
                    message: string("message"),
                    created_at: doc.data.get("createdAt").and_then(unwrap_timestamp),
                }
            })
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }
}
