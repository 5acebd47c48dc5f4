use openssl::ecdsa::EcdsaSig;
use openssl::sha;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::attestation::AttestationCertificate;
use crate::base64url;
use crate::client_data::ClientData;
use crate::constants::{PUBLIC_KEY_LEN, REGISTRATION_RESERVED_BYTE};
use crate::error::Error;
use crate::key_handle::KeyHandle;
use crate::public_key::PublicKey;
use crate::session::SessionContext;

/// The response handed back by `u2f.register` in the browser.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationResponse {
    registration_data: String,
    client_data: String,
}

/// Decoded registration data:
///
/// ```text
/// +--------------------------------------------------------------------+
/// | 1    | 65         | 1      | L          | implied    | to end      |
/// | 0x05 | public key | kh len | key handle | cert (DER) | signature   |
/// +--------------------------------------------------------------------+
/// ```
struct RegistrationData {
    user_public_key: [u8; PUBLIC_KEY_LEN],
    key_handle: KeyHandle,
    attestation_certificate: AttestationCertificate,
    signature: EcdsaSig,
}

impl RegistrationData {
    fn from_bytes(data: &[u8]) -> Result<RegistrationData, Error> {
        // Minimum: reserved byte, public key, key handle length byte and
        // room for a signature.
        if data.len() <= 1 + PUBLIC_KEY_LEN + 1 + 64 {
            return Err(Error::Format("registration data too short"));
        }
        if data[0] != REGISTRATION_RESERVED_BYTE {
            return Err(Error::Format("reserved byte mismatch"));
        }

        let mut user_public_key = [0u8; PUBLIC_KEY_LEN];
        user_public_key.copy_from_slice(&data[1..1 + PUBLIC_KEY_LEN]);

        let key_handle_len = data[66] as usize;
        debug!(key_handle_len, "parsed registration key handle length");
        if data.len() < 67 + key_handle_len + 4 {
            return Err(Error::Format("registration data truncated at key handle"));
        }
        let key_handle = KeyHandle::from_bytes(&data[67..67 + key_handle_len])?;

        // The certificate length is implied by its DER header. Attestation
        // certificates all carry the two-byte length form: 0x30 0x82 hi lo.
        let cert_offset = 67 + key_handle_len;
        if data[cert_offset] != 0x30 || data[cert_offset + 1] != 0x82 {
            return Err(Error::Format("attestation certificate framing"));
        }
        let cert_len =
            ((data[cert_offset + 2] as usize) << 8) + data[cert_offset + 3] as usize + 4;
        if data.len() <= cert_offset + cert_len {
            return Err(Error::Format("registration data truncated at certificate"));
        }
        let attestation_certificate =
            AttestationCertificate::from_der(&data[cert_offset..cert_offset + cert_len])?;

        let signature = EcdsaSig::from_der(&data[cert_offset + cert_len..])
            .map_err(|_| Error::Format("undecodable registration signature"))?;

        Ok(RegistrationData {
            user_public_key,
            key_handle,
            attestation_certificate,
            signature,
        })
    }
}

/// Everything the relying party needs to keep after a successful
/// registration.
#[derive(Debug)]
pub struct RegistrationResult {
    key_handle: String,
    public_key_raw: [u8; PUBLIC_KEY_LEN],
    public_key: PublicKey,
    attestation_certificate: AttestationCertificate,
    attestation_certificate_pem: String,
}

impl RegistrationResult {
    /// The newly issued credential id, Base64URL encoded.
    pub fn key_handle(&self) -> &str {
        &self.key_handle
    }

    /// The raw 65-byte user public key, as fed back into
    /// [`SessionContext::set_public_key`] before authentication.
    pub fn public_key_bytes(&self) -> &[u8] {
        &self.public_key_raw
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn attestation_certificate(&self) -> &AttestationCertificate {
        &self.attestation_certificate
    }

    pub fn attestation_certificate_pem(&self) -> &str {
        &self.attestation_certificate_pem
    }
}

pub(crate) fn verify(
    ctx: &mut SessionContext,
    response: &str,
) -> Result<RegistrationResult, Error> {
    let response: RegistrationResponse = serde_json::from_str(response)?;

    let data = base64url::decode_wire(&response.registration_data)?;
    trace!("registrationData: {}", hex::encode(&data));
    let registration = RegistrationData::from_bytes(&data)?;

    let attestation_key = registration.attestation_certificate.public_key()?;
    ctx.attestation_policy()
        .validate(&registration.attestation_certificate)?;

    let (client_data, client_data_raw) = ClientData::from_wire(&response.client_data)?;
    trace!("clientData: {}", String::from_utf8_lossy(&client_data_raw));

    ctx.ensure_challenge()?;
    if !ctx.require_challenge()?.matches(&client_data.challenge) {
        return Err(Error::Challenge);
    }
    if ctx.require_origin()? != client_data.origin {
        return Err(Error::Origin);
    }

    let application_parameter = sha::sha256(ctx.require_app_id()?.as_bytes());
    let challenge_parameter = sha::sha256(&client_data_raw);

    let mut digest = sha::Sha256::new();
    digest.update(&[0u8]);
    digest.update(&application_parameter);
    digest.update(&challenge_parameter);
    digest.update(registration.key_handle.as_ref());
    digest.update(&registration.user_public_key);
    let digest = digest.finish();

    if !registration.signature.verify(&digest, &attestation_key)? {
        return Err(Error::Signature);
    }
    debug!("registration attestation signature verified");

    let public_key = PublicKey::from_raw(&registration.user_public_key)?;
    let attestation_certificate_pem = registration.attestation_certificate.to_pem()?;

    Ok(RegistrationResult {
        key_handle: registration.key_handle.to_base64url(),
        public_key_raw: registration.user_public_key,
        public_key,
        attestation_certificate_pem,
        attestation_certificate: registration.attestation_certificate,
    })
}
