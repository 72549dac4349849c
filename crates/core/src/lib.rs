//! # UniCare Core
//!
//! Client-side building blocks of the clinic portal.
//!
//! ## Responsibilities
//!
//! - Startup configuration ([`PortalConfig`]) and the persisted session flags
//!   ([`Session`], [`SessionStore`])
//! - The REST client ([`ApiClient`]) with error normalisation into [`ApiError`]
//! - Serde models for the API's JSON ([`models`])
//! - Per-screen services that validate input with the shared rule tables before sending
//!   ([`services`])
//! - Display helpers for timestamps and clock times ([`common`])
//!
//! Nothing here reads process-wide state: binaries resolve configuration once and pass
//! it in.

pub mod client;
pub mod common;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use client::{ApiClient, ProgressFn, UploadFile, UploadProgress};
pub use config::PortalConfig;
pub use error::{ApiError, PortalError, PortalResult};
pub use session::{Session, SessionStore};
