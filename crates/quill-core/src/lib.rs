//! Core types and trait definitions for the quill operator console.
//!
//! This crate has no HTTP or database dependencies. It defines
//! the managed collections ([`post::Post`], [`listing::Listing`]),
//! the seams to the remote API ([`api::ResourceApi`], [`api::AuthApi`]) and
//! to durable client storage ([`storage::KeyValueStore`]), and the
//! [`credential::CredentialStore`] that sits on top of the latter.

pub mod api;
pub mod credential;
pub mod error;
pub mod list_field;
pub mod listing;
pub mod post;
pub mod resource;
pub mod storage;

pub use error::{Error, Result};
