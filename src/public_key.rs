use std::fmt;

use openssl::bn::BigNumContext;
use openssl::ec::{EcGroup, EcKey, EcPoint, PointConversionForm};
use openssl::nid::Nid;
use openssl::pkey::Public;

use crate::constants::{EC_POINT_FORMAT_UNCOMPRESSED, PUBLIC_KEY_LEN};
use crate::error::Error;

/// A user key: a point on P-256, decoded from the raw ANSI X9.62 form.
pub struct PublicKey(EcKey<Public>);

impl PublicKey {
    /// Decode the 65-byte wire form: the uncompressed-point tag 0x04
    /// followed by the X and Y coordinates, 32 bytes each.
    pub fn from_raw(bytes: &[u8]) -> Result<PublicKey, Error> {
        if bytes.len() != PUBLIC_KEY_LEN {
            return Err(Error::Crypto(format!(
                "expected {} byte public key, found {}",
                PUBLIC_KEY_LEN,
                bytes.len()
            )));
        }
        if bytes[0] != EC_POINT_FORMAT_UNCOMPRESSED {
            return Err(Error::Crypto(String::from("expected uncompressed point")));
        }
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1)?;
        let mut ctx = BigNumContext::new()?;
        let point = EcPoint::from_bytes(&group, bytes, &mut ctx)?;
        let key = EcKey::from_public_key(&group, &point)?;
        key.check_key()?;
        Ok(PublicKey(key))
    }

    /// Dump the key back into its raw 65-byte form.
    pub fn to_raw(&self) -> Result<Vec<u8>, Error> {
        let mut ctx = BigNumContext::new()?;
        let bytes = self.0.public_key().to_bytes(
            self.0.group(),
            PointConversionForm::UNCOMPRESSED,
            &mut ctx,
        )?;
        Ok(bytes)
    }

    pub(crate) fn as_ec_key(&self) -> &EcKey<Public> {
        &self.0
    }
}

impl Clone for PublicKey {
    fn clone(&self) -> PublicKey {
        PublicKey(self.0.clone())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PublicKey")
    }
}
