//! Cryptographic primitives for the Switchboard control plane.
//!
//! This crate is deliberately small and dependency-light; everything in it
//! is part of an external contract:
//!
//! - [`canonical_json`] + [`sha256_hex`] define the byte sequences behind
//!   `planHash` and `eventHash`, so audit logs and plans are verifiable by
//!   third parties.
//! - [`api_key`] defines the `sk_agent_<hex>` key format, its SHA-256
//!   at-rest form, and constant-time verification.
//! - [`password`] wraps bcrypt for admin credentials.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod api_key;
pub mod canonical;
pub mod hash;
pub mod password;

pub use api_key::{generate_api_key, hash_api_key, verify_api_key, API_KEY_PREFIX};
pub use canonical::canonical_json;
pub use hash::sha256_hex;
pub use password::{hash_password, verify_password, PasswordError};
