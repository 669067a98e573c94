//! Session authentication.
//!
//! This module provides:
//! - In-memory token storage shared by every request of a session
//! - Single-flight token refresh with request queuing
//! - Sign-in, restore and sign-out flows

mod refresh;
mod service;
mod token_store;

pub use refresh::{REFRESH_PATH, Recovery, RefreshCoordinator};
pub use service::{AuthService, LOGIN_PATH, ME_PATH};
pub use token_store::TokenStore;
