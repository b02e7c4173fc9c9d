//! Authentication primitives.
//!
//! Only token validation lives here: credential storage and login belong
//! to the platform's session service, which issues the tokens this API
//! verifies.

pub mod jwt;
