//! Browser plumbing of the street guard dashboard: build-time configuration,
//! the backend API client and small helpers. The Yew app in `main.rs` builds
//! on it.

pub mod config;
pub mod request;
pub mod utils;
