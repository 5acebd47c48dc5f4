//! Server side of the U2F protocol: challenge issuance plus verification of
//! the signed registration and authentication responses produced by a
//! hardware token through the browser's `u2f` API.
//!
//! Storage of registration records, transport, and attestation chain policy
//! live above this crate; verification of the wire messages lives here.

mod attestation;
mod authentication;
mod base64url;
mod challenge;
mod client_data;
mod constants;
mod error;
mod key_handle;
mod public_key;
mod registration;
mod session;

pub use attestation::{AcceptAllAttestations, AttestationCertificate, AttestationPolicy};
pub use authentication::AuthenticationResult;
pub use challenge::Challenge;
pub use constants::U2F_VERSION;
pub use error::Error;
pub use key_handle::KeyHandle;
pub use public_key::PublicKey;
pub use registration::RegistrationResult;
pub use session::SessionContext;
