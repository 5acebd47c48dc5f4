use serde::Deserialize;

use crate::base64url;
use crate::error::Error;

/// The subset of the clientData object the browser echoes back that the
/// verifier actually checks. Other fields (typ, cid_pubkey, ...) are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct ClientData {
    pub challenge: String,
    pub origin: String,
}

impl ClientData {
    /// Decode the Base64 wire field and parse the JSON inside.
    ///
    /// Returns the decoded bytes as well: the challenge parameter is the
    /// SHA-256 of exactly these bytes, not of any re-serialization.
    pub(crate) fn from_wire(encoded: &str) -> Result<(ClientData, Vec<u8>), Error> {
        let raw = base64url::decode_wire(encoded)?;
        let parsed = serde_json::from_slice(&raw)?;
        Ok((parsed, raw))
    }
}
