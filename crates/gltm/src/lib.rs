//! Lifecycle management for GitLab access tokens.
//!
//! A token belongs to exactly one owner: a user (personal access tokens), a
//! group, or a project. Every invocation follows the same path:
//!
//! ```text
//! selector ─▶ owner::resolve_owner ─▶ locator::locate_token ─▶ lifecycle::{create,rotate,delete,list}
//!                                                                   │
//!                                                  output (record) ◀┴▶ secret::SecretSink
//! ```
//!
//! All host traffic goes through the [`host::HostClient`] trait so the core
//! logic can be exercised without a live GitLab instance.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod locator;
pub mod logging;
pub mod model;
pub mod output;
pub mod owner;
pub mod scope;
pub mod secret;

pub use error::{HostError, Operation, TokenError};
pub use host::HostClient;
pub use model::{CreateRequest, ExpiryDate, IssuedToken, Owner, OwnerKind, Secret, Token};
pub use scope::TokenScope;
