use std::fmt;

use serde::Serialize;

use crate::attestation::{AcceptAllAttestations, AttestationPolicy};
use crate::authentication::{self, AuthenticationResult};
use crate::challenge::Challenge;
use crate::constants::U2F_VERSION;
use crate::error::Error;
use crate::key_handle::KeyHandle;
use crate::public_key::PublicKey;
use crate::registration::{self, RegistrationResult};

/// Challenge object passed to `u2f.register` in the browser.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationChallenge<'a> {
    challenge: &'a str,
    version: &'a str,
    app_id: &'a str,
}

/// Challenge object passed to `u2f.sign` in the browser.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticationChallenge<'a> {
    key_handle: String,
    version: &'a str,
    challenge: &'a str,
    app_id: &'a str,
}

/// Per-flow server state: the challenge in flight, the relying party
/// identity, and (for authentication) the registered credential.
///
/// A session is configured through the setters, consumed by one or more
/// challenge/verify cycles, and dropped when the flow ends. Each setter
/// replaces any prior value.
pub struct SessionContext {
    challenge: Option<Challenge>,
    app_id: Option<String>,
    origin: Option<String>,
    key_handle: Option<KeyHandle>,
    user_key: Option<PublicKey>,
    attestation_policy: Box<dyn AttestationPolicy>,
}

impl SessionContext {
    pub fn new() -> SessionContext {
        SessionContext {
            challenge: None,
            app_id: None,
            origin: None,
            key_handle: None,
            user_key: None,
            attestation_policy: Box::new(AcceptAllAttestations),
        }
    }

    /// Inject a challenge instead of generating one, e.g. when the flow is
    /// resumed from storage. Must be the 43-character websafe form.
    pub fn set_challenge(&mut self, challenge: &str) -> Result<(), Error> {
        self.challenge = Some(Challenge::parse(challenge)?);
        Ok(())
    }

    pub fn set_app_id(&mut self, app_id: &str) {
        self.app_id = Some(app_id.to_owned());
    }

    pub fn set_origin(&mut self, origin: &str) {
        self.origin = Some(origin.to_owned());
    }

    /// Store the registered credential id, as returned by
    /// [`RegistrationResult::key_handle`].
    pub fn set_key_handle(&mut self, key_handle: &str) -> Result<(), Error> {
        self.key_handle = Some(KeyHandle::from_base64url(key_handle)?);
        Ok(())
    }

    /// Decode and store the registered user key from its raw 65-byte form.
    pub fn set_public_key(&mut self, public_key: &[u8]) -> Result<(), Error> {
        self.user_key = Some(PublicKey::from_raw(public_key)?);
        Ok(())
    }

    pub fn set_attestation_policy(&mut self, policy: Box<dyn AttestationPolicy>) {
        self.attestation_policy = policy;
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    /// Generate a challenge if none is set yet. Later calls within the same
    /// session keep the first challenge.
    pub fn ensure_challenge(&mut self) -> Result<(), Error> {
        if self.challenge.is_none() {
            self.challenge = Some(Challenge::generate()?);
        }
        Ok(())
    }

    /// The JSON challenge object for a registration flow.
    pub fn registration_challenge(&mut self) -> Result<String, Error> {
        self.ensure_challenge()?;
        let message = RegistrationChallenge {
            challenge: self.require_challenge()?.as_str(),
            version: U2F_VERSION,
            app_id: self.require_app_id()?,
        };
        Ok(serde_json::to_string(&message)?)
    }

    /// The JSON challenge object for an authentication flow. Requires a
    /// stored key handle.
    pub fn authentication_challenge(&mut self) -> Result<String, Error> {
        let key_handle = self
            .key_handle
            .as_ref()
            .ok_or(Error::Unconfigured("key handle"))?
            .to_base64url();
        self.ensure_challenge()?;
        let message = AuthenticationChallenge {
            key_handle,
            version: U2F_VERSION,
            challenge: self.require_challenge()?.as_str(),
            app_id: self.require_app_id()?,
        };
        Ok(serde_json::to_string(&message)?)
    }

    /// Verify a registration response against this session.
    pub fn registration_verify(&mut self, response: &str) -> Result<RegistrationResult, Error> {
        registration::verify(self, response)
    }

    /// Verify an authentication response against this session.
    pub fn authentication_verify(&self, response: &str) -> Result<AuthenticationResult, Error> {
        authentication::verify(self, response)
    }

    pub(crate) fn require_challenge(&self) -> Result<&Challenge, Error> {
        self.challenge.as_ref().ok_or(Error::Unconfigured("challenge"))
    }

    pub(crate) fn require_app_id(&self) -> Result<&str, Error> {
        self.app_id.as_deref().ok_or(Error::Unconfigured("app id"))
    }

    pub(crate) fn require_origin(&self) -> Result<&str, Error> {
        self.origin.as_deref().ok_or(Error::Unconfigured("origin"))
    }

    pub(crate) fn require_user_key(&self) -> Result<&PublicKey, Error> {
        self.user_key.as_ref().ok_or(Error::Unconfigured("user key"))
    }

    pub(crate) fn attestation_policy(&self) -> &dyn AttestationPolicy {
        self.attestation_policy.as_ref()
    }
}

impl Default for SessionContext {
    fn default() -> SessionContext {
        SessionContext::new()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("challenge", &self.challenge)
            .field("app_id", &self.app_id)
            .field("origin", &self.origin)
            .field("key_handle", &self.key_handle)
            .field("user_key", &self.user_key)
            .finish()
    }
}
