//! Integration tests for Marquee
//!
//! These tests run the real TMDB client and Appwrite trending store against
//! local fake servers, and drive the orchestrators through them.

#[path = "integration/support.rs"]
mod support;

#[path = "integration/appwrite_store.rs"]
mod appwrite_store;
#[path = "integration/orchestration.rs"]
mod orchestration;
#[path = "integration/tmdb_client.rs"]
mod tmdb_client;
