//! Profile documents against the fake backend: first-sign-in creation and
//! merge-style updates

mod common;

use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use adboard_client::auth::User;
use adboard_client::config::ClientOptions;
use adboard_client::profile::{ProfileClient, ProfileUpdate};

use common::{doc, MemoryDocumentStore};

fn user(id: &str, name: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        email: Some(email.to_string()),
        display_name: Some(name.to_string()),
        phone: None,
        photo_url: None,
        provider: None,
        metadata: HashMap::new(),
        created_at: None,
    }
}

fn profiles(store: &Arc<MemoryDocumentStore>) -> ProfileClient {
    ProfileClient::new(store.clone(), &ClientOptions::default())
}

#[tokio::test]
async fn first_sign_in_creates_the_profile_once() {
    common::init_tracing();
    let store = MemoryDocumentStore::new();
    let client = profiles(&store);
    let asha = user("u1", "Asha", "asha@example.com");

    assert!(client.ensure_profile(&asha).await.unwrap());

    let profile = client.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.name, "Asha");
    assert_eq!(profile.email, "asha@example.com");
    assert_eq!(profile.role, "customer");
    assert!(profile.created_at.is_some());

    // A later sign-in finds the document and leaves it alone.
    assert!(!client.ensure_profile(&asha).await.unwrap());
}

#[tokio::test]
async fn existing_profile_is_never_overwritten() {
    let store = MemoryDocumentStore::new();
    store.set_documents(
        "users",
        vec![doc(
            "u1",
            json!({ "name": "Asha", "role": "admin", "phone": "98765" }),
        )],
    );
    let client = profiles(&store);

    assert!(!client.ensure_profile(&user("u1", "Asha Renamed", "new@example.com")).await.unwrap());

    let profile = client.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.name, "Asha");
    assert_eq!(profile.role, "admin");
    assert_eq!(profile.phone, "98765");
}

#[tokio::test]
async fn update_touches_only_submitted_fields() {
    let store = MemoryDocumentStore::new();
    let client = profiles(&store);
    client
        .ensure_profile(&user("u1", "Asha", "asha@example.com"))
        .await
        .unwrap();

    let update = ProfileUpdate {
        phone: Some("98765".to_string()),
        city: Some("Kolhapur".to_string()),
        ..ProfileUpdate::default()
    };
    client.update_profile("u1", &update).await.unwrap();

    let profile = client.get_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.phone, "98765");
    assert_eq!(profile.city, "Kolhapur");
    // Untouched fields survive the edit.
    assert_eq!(profile.name, "Asha");
    assert_eq!(profile.email, "asha@example.com");
    assert_eq!(profile.role, "customer");
}

#[tokio::test]
async fn missing_profile_reads_as_none() {
    let store = MemoryDocumentStore::new();
    let client = profiles(&store);
    assert!(client.get_profile("ghost").await.unwrap().is_none());
}
