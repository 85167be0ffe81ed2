//! CHAP (Challenge-Handshake Authentication Protocol) Support
//!
//! CHAP-Password as defined in RFC 2865 Section 5.3. Without a CHAP-Challenge
//! attribute the challenge is the Request Authenticator.

use thiserror::Error;

/// CHAP-Password value length: 1 byte identifier + 16 byte response
pub const CHAP_PASSWORD_LENGTH: usize = 17;

/// CHAP response structure
///
/// A CHAP response consists of:
/// - CHAP Identifier (1 byte)
/// - CHAP Response (16 bytes MD5 hash)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapResponse {
    /// CHAP identifier (must match the challenge)
    pub ident: u8,
    /// MD5 hash of (ident + password + challenge)
    pub response: [u8; 16],
}

impl ChapResponse {
    /// Create a new CHAP response from raw bytes (exactly 17)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChapError> {
        if bytes.len() != CHAP_PASSWORD_LENGTH {
            return Err(ChapError::InvalidLength(bytes.len()));
        }

        let ident = bytes[0];
        let mut response = [0u8; 16];
        response.copy_from_slice(&bytes[1..CHAP_PASSWORD_LENGTH]);

        Ok(ChapResponse { ident, response })
    }

    /// Convert CHAP response to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(CHAP_PASSWORD_LENGTH);
        bytes.push(self.ident);
        bytes.extend_from_slice(&self.response);
        bytes
    }
}

/// Compute the expected CHAP response: MD5(CHAP Identifier + Password + Challenge)
pub fn compute_chap_response(ident: u8, password: &str, challenge: &[u8]) -> [u8; 16] {
    let mut context = md5::Context::new();
    context.consume([ident]);
    context.consume(password.as_bytes());
    context.consume(challenge);
    context.compute().0
}

/// Verify a CHAP response against a known plaintext password
pub fn verify_chap_response(chap_response: &ChapResponse, password: &str, challenge: &[u8]) -> bool {
    let expected = compute_chap_response(chap_response.ident, password, challenge);
    chap_response.response == expected
}

/// CHAP-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChapError {
    #[error("Invalid CHAP-Password length: expected 17 bytes, got {0}")]
    InvalidLength(usize),
}
