//! Time-based one-time codes for the login two-factor step
//!
//! RFC 6238 with the vendor's parameters: HMAC-SHA-1, 30-second step,
//! 6 digits, base32 shared secret.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha1::Sha1;
use thiserror::Error;

const STEP_SECONDS: u64 = 30;
const CODE_DIGITS: u32 = 6;

#[derive(Debug, Error)]
pub enum TotpError {
    #[error("TOTP secret must not be empty")]
    EmptySecret,
    #[error("TOTP secret contains a character outside the base32 alphabet: {0:?}")]
    InvalidBase32(char),
    #[error("system clock is before the unix epoch")]
    ClockBeforeEpoch,
}

/// Generate the code for the current 30-second window
pub fn generate(secret: &str, now: SystemTime) -> Result<String, TotpError> {
    let unix_seconds = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| TotpError::ClockBeforeEpoch)?
        .as_secs();
    generate_at(secret, unix_seconds)
}

/// Generate the code for an explicit unix timestamp
pub fn generate_at(secret: &str, unix_seconds: u64) -> Result<String, TotpError> {
    let key = decode_base32(secret)?;
    if key.is_empty() {
        return Err(TotpError::EmptySecret);
    }

    let counter = unix_seconds / STEP_SECONDS;
    let mut mac =
        <Hmac<Sha1> as Mac>::new_from_slice(&key).map_err(|_| TotpError::EmptySecret)?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // dynamic truncation per RFC 4226 §5.3
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);

    let code = binary % 10u32.pow(CODE_DIGITS);
    Ok(format!("{:0width$}", code, width = CODE_DIGITS as usize))
}

/// RFC 4648 base32, case-insensitive; padding, spaces and dashes are
/// ignored since secrets are often displayed in groups
fn decode_base32(secret: &str) -> Result<Vec<u8>, TotpError> {
    let mut bits: u32 = 0;
    let mut bit_count: u32 = 0;
    let mut out = Vec::new();

    for c in secret.chars() {
        if c == '=' || c == ' ' || c == '-' {
            continue;
        }
        let upper = c.to_ascii_uppercase();
        let value = match upper {
            'A'..='Z' => upper as u32 - 'A' as u32,
            '2'..='7' => upper as u32 - '2' as u32 + 26,
            _ => return Err(TotpError::InvalidBase32(c)),
        };
        bits = (bits << 5) | value;
        bit_count += 5;
        if bit_count >= 8 {
            bit_count -= 8;
            out.push((bits >> bit_count) as u8);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // base32 of the RFC 6238 test secret "12345678901234567890"
    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn decodes_base32() {
        assert_eq!(decode_base32("GEZDGNBV").unwrap(), b"12345");
        assert_eq!(decode_base32("gezd gnbv").unwrap(), b"12345");
    }

    #[test]
    fn rejects_non_alphabet_characters() {
        assert!(matches!(
            decode_base32("GEZ1"),
            Err(TotpError::InvalidBase32('1'))
        ));
    }

    #[test]
    fn matches_rfc_6238_sha1_vectors() {
        assert_eq!(generate_at(RFC_SECRET, 59).unwrap(), "287082");
        assert_eq!(generate_at(RFC_SECRET, 1111111109).unwrap(), "081804");
        assert_eq!(generate_at(RFC_SECRET, 1234567890).unwrap(), "005924");
    }

    #[test]
    fn code_is_stable_within_a_window(){
        assert_eq!(
            generate_at(RFC_SECRET, 60).unwrap(),
            generate_at(RFC_SECRET, 89).unwrap()
        );
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(generate_at("", 59), Err(TotpError::EmptySecret)));
    }
}
