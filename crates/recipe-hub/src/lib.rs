//! Recipe Hub
//!
//! A small recipe catalog site: session-based accounts with an admin panel,
//! a timed cooking quiz and recipe search backed by the FatSecret Platform API.
//!
//! # Features
//!
//! - **Session auth**: Argon2id password hashes, signed session cookies, admin gate
//! - **OAuth2 client credentials**: cached FatSecret access tokens with single-flight refresh
//! - **Quiz**: random question sets, server-side deadline, HMAC-signed share links
//! - **Pluggable storage**: in-memory or JSON documents on disk
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use recipe_hub::{config::Config, server::Server, store::FileStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = Arc::new(FileStore::open(config.data_dir.clone()).await?);
//!     Server::new(&config, store)?.run(3000).await
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod quiz;
pub mod server;
pub mod session;
pub mod store;

pub use client::FatSecretClient;
pub use config::Config;
pub use error::{ApiError, AppError, AuthError, ClientError, QuizError, StoreError};
pub use server::Server;
