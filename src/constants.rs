pub(crate) const CHALLENGE_RAW_LEN: usize = 32;
/// 32 bytes of Base64URL without padding.
pub(crate) const CHALLENGE_B64U_LEN: usize = 43;

/// Raw ANSI X9.62 uncompressed P-256 point: 0x04 || X (32 bytes) || Y (32 bytes).
pub(crate) const PUBLIC_KEY_LEN: usize = 65;
pub(crate) const EC_POINT_FORMAT_UNCOMPRESSED: u8 = 0x04;

pub(crate) const COUNTER_LEN: usize = 4;

/// The length field is a single byte, so handles cap out at 255.
pub(crate) const MAX_KEY_HANDLE_LEN: usize = 255;

/// First byte of the registration data, for legacy reasons always 0x05.
pub(crate) const REGISTRATION_RESERVED_BYTE: u8 = 0x05;

/// Bit 0 of the user presence byte, set when the user touched the device.
pub(crate) const USER_PRESENCE_FLAG: u8 = 0x01;

pub const U2F_VERSION: &str = "U2F_V2";
