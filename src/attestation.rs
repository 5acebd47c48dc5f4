use std::fmt;

use openssl::ec::EcKey;
use openssl::pkey::Public;
use openssl::x509::X509;

use crate::error::Error;

/// The X.509 certificate baked into the device, used to sign the
/// registration assertion.
pub struct AttestationCertificate(X509);

impl AttestationCertificate {
    pub(crate) fn from_der(der: &[u8]) -> Result<AttestationCertificate, Error> {
        Ok(AttestationCertificate(X509::from_der(der)?))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        Ok(self.0.to_der()?)
    }

    pub fn to_pem(&self) -> Result<String, Error> {
        let pem = self.0.to_pem()?;
        String::from_utf8(pem).map_err(|_| Error::Crypto(String::from("non-utf8 PEM output")))
    }

    /// The attestation public key embedded in the certificate.
    pub(crate) fn public_key(&self) -> Result<EcKey<Public>, Error> {
        Ok(self.0.public_key()?.ec_key()?)
    }
}

impl Clone for AttestationCertificate {
    fn clone(&self) -> AttestationCertificate {
        AttestationCertificate(self.0.clone())
    }
}

impl fmt::Debug for AttestationCertificate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AttestationCertificate")
    }
}

/// Hook for judging device provenance during registration.
///
/// Invoked with the attestation certificate after it is parsed out of the
/// registration data and before any echo checks or signature work. Rejecting
/// aborts the registration with the returned error.
pub trait AttestationPolicy {
    fn validate(&self, certificate: &AttestationCertificate) -> Result<(), Error>;
}

/// The default policy: every certificate passes. Chain validation against a
/// metadata service belongs to a layer above this crate.
pub struct AcceptAllAttestations;

impl AttestationPolicy for AcceptAllAttestations {
    fn validate(&self, _certificate: &AttestationCertificate) -> Result<(), Error> {
        Ok(())
    }
}
