//! Persist Bridge — key-value persistence gateway for the app shell.
//!
//! Three platform storage backends (plain local, OS-keychain secure, and
//! cloud-synced backup) behind one dispatch surface, exposed over a JSON
//! WebSocket bridge.

pub mod backend;
pub mod bridge;
pub mod config;
pub mod error;
pub mod gateway;
