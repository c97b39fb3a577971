//! # API Route Modules
//!
//! Route modules for the rental platform's HTTP surface:
//!
//! - `auth` — login entry point, Google OAuth redirect + callback, logout.
//! - `properties` — public property listings (JSON).
//! - `tenant` — tenant dashboard, rental-application intake, and rent
//!   payments via the external card-payment collaborator.
//! - `landlord` — landlord dashboard, tenant linking, application review.
//! - `mailbox` — internal mail between linked tenants and landlords.
//! - `contact` — public contact form relayed to the email collaborator.

pub mod auth;
pub mod contact;
pub mod landlord;
pub mod mailbox;
pub mod properties;
pub mod tenant;
