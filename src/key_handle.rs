use std::fmt;

use subtle::ConstantTimeEq;

use crate::base64url;
use crate::constants::MAX_KEY_HANDLE_LEN;
use crate::error::Error;

/// Opaque credential id issued by the device at registration and presented
/// back at authentication.
#[derive(Clone, Eq, PartialEq)]
pub struct KeyHandle(Vec<u8>);

impl KeyHandle {
    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<KeyHandle, Error> {
        if bytes.len() > MAX_KEY_HANDLE_LEN {
            return Err(Error::Format("key handle too long"));
        }
        Ok(KeyHandle(bytes.to_vec()))
    }

    pub(crate) fn from_base64url(encoded: &str) -> Result<KeyHandle, Error> {
        KeyHandle::from_bytes(&base64url::decode_wire(encoded)?)
    }

    pub fn eq_consttime(&self, other: &KeyHandle) -> bool {
        self.0.ct_eq(&other.0).unwrap_u8() == 1
    }

    pub fn to_base64url(&self) -> String {
        base64url::encode(&self.0)
    }
}

impl AsRef<[u8]> for KeyHandle {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyHandle")
    }
}
