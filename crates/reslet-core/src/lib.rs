//! # reslet-core — Domain Primitives
//!
//! Shared domain vocabulary for the reslet rental platform. This crate is
//! deliberately free of I/O: identifier newtypes, the user role enum, and
//! validation errors. Everything HTTP- or storage-shaped lives in
//! `reslet-api`; everything that talks to an external collaborator lives in
//! `reslet-upstream`.

pub mod error;
pub mod identity;
pub mod role;

pub use error::ValidationError;
pub use identity::{ApplicationId, EmailAddress, MessageId, PropertyId, UserId};
pub use role::Role;
