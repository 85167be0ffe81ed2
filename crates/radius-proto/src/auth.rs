//! Shared secrets, User-Password obfuscation and authenticator calculation
//! (RFC 2865 Sections 3 and 5.2)

use rand::Rng;
use serde::Deserialize;
use std::fmt;

/// User-Password block size; also the MD5 digest size
pub const BLOCK_SIZE: usize = 16;

/// Per-NAS shared secret
///
/// Never printed: `Debug` is redacted and there is no `Display` or `Serialize`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        SharedSecret(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SharedSecret {
    fn from(secret: String) -> Self {
        SharedSecret(secret.into_bytes())
    }
}

impl From<&str> for SharedSecret {
    fn from(secret: &str) -> Self {
        SharedSecret(secret.as_bytes().to_vec())
    }
}

impl From<&[u8]> for SharedSecret {
    fn from(secret: &[u8]) -> Self {
        SharedSecret(secret.to_vec())
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// MD5(secret + salt)
fn keyed_digest(secret: &SharedSecret, salt: &[u8]) -> [u8; BLOCK_SIZE] {
    let mut context = md5::Context::new();
    context.consume(secret.as_bytes());
    context.consume(salt);
    context.compute().0
}

/// Generate a random Request Authenticator (16 bytes) per RFC 2865 Section 3
pub fn generate_request_authenticator() -> [u8; 16] {
    let mut rng = rand::rng();
    let mut authenticator = [0u8; 16];
    rng.fill(&mut authenticator);
    authenticator
}

/// Calculate Response Authenticator per RFC 2865 Section 3
///
/// Response Authenticator = MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)
///
/// `encoded` is the complete response packet with the *request* authenticator
/// still in the authenticator field.
pub fn calculate_response_authenticator(encoded: &[u8], secret: &SharedSecret) -> [u8; 16] {
    let mut context = md5::Context::new();
    context.consume(encoded);
    context.consume(secret.as_bytes());
    context.compute().0
}

/// Verify the Response Authenticator of an encoded response packet
pub fn verify_response_authenticator(
    response: &[u8],
    request_authenticator: &[u8; 16],
    secret: &SharedSecret,
) -> bool {
    if response.len() < 20 {
        return false;
    }
    let mut data = response.to_vec();
    data[4..20].copy_from_slice(request_authenticator);
    calculate_response_authenticator(&data, secret)[..] == response[4..20]
}

/// Calculate an Accounting-Request Authenticator per RFC 2866 Section 3
///
/// Request Authenticator = MD5(Code + ID + Length + 16 zero octets + Attributes + Secret)
///
/// `encoded` is the complete request; its authenticator field is ignored.
pub fn calculate_accounting_request_authenticator(encoded: &[u8], secret: &SharedSecret) -> [u8; 16] {
    let mut context = md5::Context::new();
    context.consume(&encoded[..encoded.len().min(4)]);
    context.consume([0u8; 16]);
    context.consume(encoded.get(20..).unwrap_or_default());
    context.consume(secret.as_bytes());
    context.compute().0
}

/// Verify the Request Authenticator of an encoded Accounting-Request
pub fn verify_accounting_request_authenticator(request: &[u8], secret: &SharedSecret) -> bool {
    if request.len() < 20 {
        return false;
    }
    calculate_accounting_request_authenticator(request, secret)[..] == request[4..20]
}

/// Encrypt User-Password attribute per RFC 2865 Section 5.2
///
/// The password is zero-padded to a multiple of 16 bytes (at least one block),
/// then each block is XORed with b(i), where b(1) = MD5(secret + request
/// authenticator) and b(i+1) = MD5(secret + ciphertext block i).
pub fn encrypt_user_password(
    password: &str,
    secret: &SharedSecret,
    authenticator: &[u8; 16],
) -> Vec<u8> {
    let mut padded = password.as_bytes().to_vec();
    let blocks = padded.len().div_ceil(BLOCK_SIZE).max(1);
    padded.resize(blocks * BLOCK_SIZE, 0);

    let mut result = Vec::with_capacity(padded.len());
    let mut b = keyed_digest(secret, authenticator);

    for chunk in padded.chunks(BLOCK_SIZE) {
        let start = result.len();
        result.extend(chunk.iter().zip(b.iter()).map(|(p, k)| p ^ k));
        b = keyed_digest(secret, &result[start..]);
    }

    result
}

/// Decrypt User-Password attribute per RFC 2865 Section 5.2
///
/// The plaintext is cut at the first zero byte (padding). A trailing partial
/// block is XORed with the leading bytes of its key block. Invalid UTF-8 is
/// replaced rather than rejected.
pub fn decrypt_user_password(
    encrypted: &[u8],
    secret: &SharedSecret,
    authenticator: &[u8; 16],
) -> String {
    let mut result = Vec::with_capacity(encrypted.len());
    let mut b = keyed_digest(secret, authenticator);

    for chunk in encrypted.chunks(BLOCK_SIZE) {
        result.extend(chunk.iter().zip(b.iter()).map(|(c, k)| c ^ k));
        b = keyed_digest(secret, chunk);
    }

    if let Some(end) = result.iter().position(|&byte| byte == 0) {
        result.truncate(end);
    }

    String::from_utf8_lossy(&result).into_owned()
}
