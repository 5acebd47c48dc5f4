use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::base64url;
use crate::constants::{CHALLENGE_B64U_LEN, CHALLENGE_RAW_LEN};
use crate::error::Error;

/// A 32-byte nonce in its wire form: 43 characters of Base64URL, no padding.
#[derive(Clone, Eq, PartialEq)]
pub struct Challenge(String);

impl Challenge {
    /// Validate a caller-supplied challenge string.
    pub fn parse(challenge: &str) -> Result<Challenge, Error> {
        if challenge.len() != CHALLENGE_B64U_LEN {
            return Err(Error::Challenge);
        }
        if !challenge.bytes().all(is_base64url_byte) {
            return Err(Error::Challenge);
        }
        Ok(Challenge(challenge.to_owned()))
    }

    /// Draw a fresh nonce from the system RNG.
    pub fn generate() -> Result<Challenge, Error> {
        let mut nonce = [0u8; CHALLENGE_RAW_LEN];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|err| Error::Crypto(format!("system rng: {}", err)))?;
        Ok(Challenge(base64url::encode(&nonce)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against the challenge echoed in clientData.
    pub(crate) fn matches(&self, echoed: &str) -> bool {
        self.0.as_bytes().ct_eq(echoed.as_bytes()).unwrap_u8() == 1
    }
}

fn is_base64url_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

impl AsRef<str> for Challenge {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Challenge")
    }
}
