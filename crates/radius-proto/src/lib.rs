//! RADIUS Protocol Implementation
//!
//! Wire-level RADIUS as defined in RFC 2865: packet and attribute codecs,
//! User-Password obfuscation and authenticator calculation.
//!
//! # Features
//!
//! - Packet encoding and decoding with the RFC 2865 header checks
//! - Typed values for the RFC 2865 attributes 1-27 (except 17 and 21)
//! - Per-attribute strictness toggles for length and value validation
//! - MD5-based password encryption
//! - Request/Response Authenticator calculation
//!
//! # Example
//!
//! ```rust
//! use radius_proto::{Attribute, AttributeType, Code, DecodeOptions, Packet, SharedSecret};
//! use radius_proto::auth::generate_request_authenticator;
//!
//! let secret = SharedSecret::from("testing123");
//!
//! // Create an Access-Request packet
//! let req_auth = generate_request_authenticator();
//! let mut packet = Packet::new(Code::AccessRequest, 1, req_auth);
//! packet.add_attribute(Attribute::user_name("alice").unwrap());
//! packet.add_attribute(Attribute::user_password("password", &secret, req_auth).unwrap());
//!
//! // Encode to bytes and back
//! let bytes = packet.encode().unwrap();
//! let decoded = Packet::decode(&bytes, &secret, &DecodeOptions::default()).unwrap();
//! let password = decoded.find_attribute(AttributeType::UserPassword).unwrap();
//! assert_eq!(password.as_str(), Some("password"));
//! ```

pub mod attributes;
pub mod auth;
pub mod chap;
pub mod packet;
pub mod validation;

pub use attributes::{Attribute, AttributeError, AttributeType, AttributeValue};
pub use auth::{
    calculate_accounting_request_authenticator, calculate_response_authenticator,
    decrypt_user_password, encrypt_user_password, generate_request_authenticator,
    verify_accounting_request_authenticator, verify_response_authenticator, SharedSecret,
};
pub use chap::{compute_chap_response, verify_chap_response, ChapError, ChapResponse};
pub use packet::{Code, DecodeOptions, ErrorKind, Packet, PacketError, UnknownAttributePolicy};
pub use validation::{Strictness, ValidationConfig};
