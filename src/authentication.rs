use byteorder::{BigEndian, ByteOrder};
use openssl::ecdsa::EcdsaSig;
use openssl::sha;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::base64url;
use crate::client_data::ClientData;
use crate::constants::{COUNTER_LEN, USER_PRESENCE_FLAG};
use crate::error::Error;
use crate::key_handle::KeyHandle;
use crate::session::SessionContext;

/// The response handed back by `u2f.sign` in the browser.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticationResponse {
    signature_data: String,
    client_data: String,
    key_handle: String,
}

/// Decoded signature data:
///
/// ```text
/// +----------------------------------------+
/// | 1        | 4       | to end            |
/// | presence | counter | signature         |
/// +----------------------------------------+
/// ```
struct SignatureData {
    user_presence: u8,
    counter: [u8; COUNTER_LEN],
    signature: EcdsaSig,
}

impl SignatureData {
    fn from_bytes(data: &[u8]) -> Result<SignatureData, Error> {
        if data.len() <= 1 + COUNTER_LEN {
            return Err(Error::Format("signature data too short"));
        }

        let user_presence = data[0];
        if user_presence & USER_PRESENCE_FLAG == 0 {
            return Err(Error::Format("user presence not asserted"));
        }

        let mut counter = [0u8; COUNTER_LEN];
        counter.copy_from_slice(&data[1..1 + COUNTER_LEN]);

        let signature = EcdsaSig::from_der(&data[1 + COUNTER_LEN..])
            .map_err(|_| Error::Format("undecodable assertion signature"))?;

        Ok(SignatureData {
            user_presence,
            counter,
            signature,
        })
    }
}

/// Outcome of a verified assertion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AuthenticationResult {
    verified: bool,
    counter: u32,
    user_presence: u8,
}

impl AuthenticationResult {
    /// Success marker. The verifier only hands out results after the
    /// signature checks out, so this is true on every returned value; it
    /// stays with the struct so the outcome survives persistence.
    pub fn verified(&self) -> bool {
        self.verified
    }

    /// The device's monotonic counter, decoded from the wire. Whether it
    /// strictly increased since the last assertion is the caller's call.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// The raw user presence byte. Bit 0 is always set here, the verifier
    /// rejects assertions without it.
    pub fn user_presence(&self) -> u8 {
        self.user_presence
    }
}

pub(crate) fn verify(
    ctx: &SessionContext,
    response: &str,
) -> Result<AuthenticationResult, Error> {
    let response: AuthenticationResponse = serde_json::from_str(response)?;
    // Presence of the field is part of the message shape; the credential
    // itself is identified by the session's stored key handle.
    let _ = KeyHandle::from_base64url(&response.key_handle)?;

    let data = base64url::decode_wire(&response.signature_data)?;
    trace!("signatureData: {}", hex::encode(&data));
    let signature_data = SignatureData::from_bytes(&data)?;

    let (client_data, client_data_raw) = ClientData::from_wire(&response.client_data)?;
    trace!("clientData: {}", String::from_utf8_lossy(&client_data_raw));

    let challenge = ctx.challenge().ok_or(Error::Challenge)?;
    if !challenge.matches(&client_data.challenge) {
        return Err(Error::Challenge);
    }
    if ctx.require_origin()? != client_data.origin {
        return Err(Error::Origin);
    }

    let application_parameter = sha::sha256(ctx.require_app_id()?.as_bytes());
    let challenge_parameter = sha::sha256(&client_data_raw);

    // Unlike registration there is no leading reserved byte, and the key
    // handle and public key are not part of the signed message.
    let mut digest = sha::Sha256::new();
    digest.update(&application_parameter);
    digest.update(&[signature_data.user_presence]);
    digest.update(&signature_data.counter);
    digest.update(&challenge_parameter);
    let digest = digest.finish();

    let user_key = ctx.require_user_key()?;
    if !signature_data
        .signature
        .verify(&digest, user_key.as_ec_key())?
    {
        return Err(Error::Signature);
    }
    debug!("assertion signature verified");

    Ok(AuthenticationResult {
        verified: true,
        counter: BigEndian::read_u32(&signature_data.counter),
        user_presence: signature_data.user_presence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // Captured from the same YubiKey credential as the registration vector.
    const APP_ID: &str = "https://u2ftest.enonet.errno.eu";
    const AUTH_CHALLENGE: &str = "8LE_-7Rd1vB3Otn3vJ7GyiwRQtYPMv-BWliCejH0d4Y";
    const AUTH_CLIENT_DATA: &str =
        "eyJjaGFsbGVuZ2UiOiI4TEVfLTdSZDF2QjNPdG4zdko3R3lpd1JRdFlQTXYtQldsaUNlakgwZDRZ\
     Iiwib3JpZ2luIjoiaHR0cHM6Ly91MmZ0ZXN0LmVub25ldC5lcnJuby5ldSIsInR5cCI6Im5hdmln\
     YXRvci5pZC5nZXRBc3NlcnRpb24ifQ";
    const AUTH_SIGNATURE_DATA: &str =
        "AQAAAQEwRAIgKdM9cmCLZDxntY-dT_OXbcVA1D5ewQunXVC-CYZ65pUCIAIOUBsu-dOmTym0ITZt\
     6x75BFUSGlqYRuH5JKBcyO3M";
    const AUTH_KEY_HANDLE: &str =
        "eW3zVxEF8gPsG8eT9cgllzmSzkPdHVlXXV8m52ncX6KL8pJ1loVvhwZqrSsRpUN81HZlHRPQCkww\
     J5MhoMAlFA";
    const AUTH_PUBLIC_KEY: &str =
        "BH/1OYyjBV6gAencAGWMJr3R40bzu3voPhZz2eyYr2KE2GFg3Fgir22dFQ9MFnZfiRkpIHQtcybf\
     aU4pCU0HnpA=";

    fn configured_session() -> SessionContext {
        let mut ctx = SessionContext::new();
        ctx.set_app_id(APP_ID);
        ctx.set_origin(APP_ID);
        ctx.set_challenge(AUTH_CHALLENGE).unwrap();
        ctx.set_key_handle(AUTH_KEY_HANDLE).unwrap();
        ctx.set_public_key(&base64::decode(AUTH_PUBLIC_KEY).unwrap())
            .unwrap();
        ctx
    }

    fn response_json(signature_data: &str, client_data: &str) -> String {
        serde_json::json!({
            "signatureData": signature_data,
            "clientData": client_data,
            "keyHandle": AUTH_KEY_HANDLE,
        })
        .to_string()
    }

    #[test]
    fn verifies_yubikey_assertion() {
        let mut ctx = configured_session();
        let result = verify(&mut ctx, &response_json(AUTH_SIGNATURE_DATA, AUTH_CLIENT_DATA))
            .unwrap();
        assert!(result.verified());
        assert_eq!(result.counter(), 257);
        assert_eq!(result.user_presence(), 1);
    }

    #[test]
    fn rejects_cleared_presence_bit() {
        let mut ctx = configured_session();
        let mut data = base64::decode_config(AUTH_SIGNATURE_DATA, base64::URL_SAFE_NO_PAD).unwrap();
        data[0] = 0x00;
        let tampered = base64::encode_config(&data, base64::URL_SAFE_NO_PAD);
        assert_matches!(
            verify(&mut ctx, &response_json(&tampered, AUTH_CLIENT_DATA)),
            Err(Error::Format(_))
        );
    }

    #[test]
    fn rejects_short_signature_data() {
        let mut ctx = configured_session();
        let short = base64::encode_config(&[0x01, 0, 0, 0, 42], base64::URL_SAFE_NO_PAD);
        assert_matches!(
            verify(&mut ctx, &response_json(&short, AUTH_CLIENT_DATA)),
            Err(Error::Format(_))
        );
    }

    #[test]
    fn rejects_tampered_counter() {
        let mut ctx = configured_session();
        let mut data = base64::decode_config(AUTH_SIGNATURE_DATA, base64::URL_SAFE_NO_PAD).unwrap();
        data[4] ^= 0xff;
        let tampered = base64::encode_config(&data, base64::URL_SAFE_NO_PAD);
        assert_matches!(
            verify(&mut ctx, &response_json(&tampered, AUTH_CLIENT_DATA)),
            Err(Error::Signature)
        );
    }

    #[test]
    fn rejects_challenge_mismatch() {
        let mut ctx = configured_session();
        ctx.set_challenge(&"x".repeat(43)).unwrap();
        assert_matches!(
            verify(&mut ctx, &response_json(AUTH_SIGNATURE_DATA, AUTH_CLIENT_DATA)),
            Err(Error::Challenge)
        );
    }

    #[test]
    fn rejects_origin_mismatch() {
        let mut ctx = configured_session();
        ctx.set_origin("https://evil.example.com");
        assert_matches!(
            verify(&mut ctx, &response_json(AUTH_SIGNATURE_DATA, AUTH_CLIENT_DATA)),
            Err(Error::Origin)
        );
    }

    #[test]
    fn missing_user_key_is_reported() {
        let mut ctx = SessionContext::new();
        ctx.set_app_id(APP_ID);
        ctx.set_origin(APP_ID);
        ctx.set_challenge(AUTH_CHALLENGE).unwrap();
        assert_matches!(
            verify(&mut ctx, &response_json(AUTH_SIGNATURE_DATA, AUTH_CLIENT_DATA)),
            Err(Error::Unconfigured("user key"))
        );
    }

    #[test]
    fn unset_challenge_is_a_challenge_error() {
        let mut ctx = SessionContext::new();
        ctx.set_app_id(APP_ID);
        ctx.set_origin(APP_ID);
        assert_matches!(
            verify(&mut ctx, &response_json(AUTH_SIGNATURE_DATA, AUTH_CLIENT_DATA)),
            Err(Error::Challenge)
        );
    }

    #[test]
    fn counter_decodes_big_endian() {
        let sig_der = {
            let data =
                base64::decode_config(AUTH_SIGNATURE_DATA, base64::URL_SAFE_NO_PAD).unwrap();
            data[5..].to_vec()
        };
        let mut data = vec![0x01, 0xb3, 0xb2, 0xb1, 0xb0];
        data.extend_from_slice(&sig_der);
        let parsed = SignatureData::from_bytes(&data).unwrap();
        assert_eq!(
            BigEndian::read_u32(&parsed.counter),
            0xb3 * 0x0100_0000 + 0xb2 * 0x0001_0000 + 0xb1 * 0x0000_0100 + 0xb0
        );
    }
}
