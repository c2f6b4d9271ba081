//! Credential domain: access-token secret, acting-user identifier, process-wide credential.

pub mod credential;
pub mod id;
pub mod secret;

pub use credential::*;
pub use id::*;
pub use secret::*;
