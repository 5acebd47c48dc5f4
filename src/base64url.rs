use crate::error::Error;

/// Base64URL without padding, the encoding the U2F client API re-decodes.
pub(crate) fn encode(data: &[u8]) -> String {
    base64::encode_config(data, base64::URL_SAFE_NO_PAD)
}

/// Decode a wire payload field.
///
/// Browsers emit websafe Base64, but some client libraries hand the fields
/// through a standard-alphabet encoder instead. Accept both.
pub(crate) fn decode_wire(data: &str) -> Result<Vec<u8>, Error> {
    match base64::decode_config(data, base64::URL_SAFE_NO_PAD) {
        Ok(bytes) => Ok(bytes),
        Err(_) => Ok(base64::decode(data)?),
    }
}
