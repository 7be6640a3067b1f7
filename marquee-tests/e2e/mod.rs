//! End-to-end tests for Marquee
//!
//! These tests drive a complete `DiscoverySession` the way the terminal
//! front end does: raw keystrokes in, snapshots out.

#[path = "../integration/support.rs"]
mod support;

mod discovery_workflow;
mod hosted_services;
