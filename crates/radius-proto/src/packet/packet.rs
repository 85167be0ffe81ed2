use super::Code;
use crate::attributes::{Attribute, AttributeError, AttributeType};
use crate::auth::{calculate_response_authenticator, SharedSecret};
use crate::validation::ValidationConfig;
use std::fmt;
use thiserror::Error;

/// Coarse classification of decode failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidCode,
    InvalidLength,
    InvalidAuthenticator,
    InvalidAttribute,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::InvalidCode => "INVALID_CODE",
            ErrorKind::InvalidLength => "INVALID_LENGTH",
            ErrorKind::InvalidAuthenticator => "INVALID_AUTHENTICATOR",
            ErrorKind::InvalidAttribute => "INVALID_ATTRIBUTE",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("Packet too large: {0} bytes")]
    PacketTooLarge(usize),
    #[error("Packet too short: {0} bytes")]
    PacketTooShort(usize),
    #[error("Length field {declared} does not match packet length {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("Invalid packet code: {0}")]
    InvalidCode(u8),
    #[error("Invalid authenticator length: {0}")]
    InvalidAuthenticator(usize),
    #[error("Incomplete attribute header at offset {offset}: {remaining} bytes left")]
    IncompleteAttribute { offset: usize, remaining: usize },
    #[error("Invalid attribute length {length} at offset {offset}")]
    InvalidAttributeLength { offset: usize, length: usize },
    #[error("Attribute at offset {offset} overruns the packet: length {length}, {remaining} bytes left")]
    AttributeOverrun {
        offset: usize,
        length: usize,
        remaining: usize,
    },
    #[error("Unknown attribute type {attr_type} at offset {offset}")]
    UnknownAttribute { offset: usize, attr_type: u8 },
    #[error("Invalid attribute at offset {offset}: {source}")]
    Attribute {
        offset: usize,
        #[source]
        source: AttributeError,
    },
}

impl PacketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PacketError::PacketTooLarge(_)
            | PacketError::PacketTooShort(_)
            | PacketError::LengthMismatch { .. } => ErrorKind::InvalidLength,
            PacketError::InvalidCode(_) => ErrorKind::InvalidCode,
            PacketError::InvalidAuthenticator(_) => ErrorKind::InvalidAuthenticator,
            PacketError::IncompleteAttribute { .. }
            | PacketError::InvalidAttributeLength { .. }
            | PacketError::AttributeOverrun { .. }
            | PacketError::UnknownAttribute { .. }
            | PacketError::Attribute { .. } => ErrorKind::InvalidAttribute,
        }
    }
}

/// What the decoder does with attribute types missing from the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownAttributePolicy {
    /// Fail with `PacketError::UnknownAttribute`
    #[default]
    Reject,
    /// Drop the attribute once its header has been checked
    Skip,
}

/// Decoder settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub validation: ValidationConfig,
    pub unknown_attributes: UnknownAttributePolicy,
}

impl DecodeOptions {
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_unknown_attributes(mut self, policy: UnknownAttributePolicy) -> Self {
        self.unknown_attributes = policy;
        self
    }
}

/// RADIUS Packet structure as defined in RFC 2865 Section 3
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Code      |  Identifier   |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// |                         Authenticator                         |
/// |                                                               |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attributes ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
///
/// A decoded packet is read-only; outbound packets are assembled with
/// [`Packet::new`] or [`Packet::reply`] and [`Packet::add_attribute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    code: Code,
    identifier: u8,
    length: usize,
    authenticator: [u8; 16],
    attributes: Vec<Attribute>,
}

impl Packet {
    /// Minimum RADIUS packet size (20 bytes: 1 code + 1 id + 2 length + 16 authenticator)
    pub const MIN_PACKET_SIZE: usize = 20;
    /// Maximum RADIUS packet size (4096 bytes as per RFC 2865)
    pub const MAX_PACKET_SIZE: usize = 4096;

    pub fn new(code: Code, identifier: u8, authenticator: [u8; 16]) -> Self {
        Packet {
            code,
            identifier,
            length: Self::MIN_PACKET_SIZE,
            authenticator,
            attributes: Vec::new(),
        }
    }

    /// Start a response to `request`: same identifier, request authenticator
    /// kept until [`Packet::encode_response`] replaces it
    pub fn reply(request: &Packet, code: Code) -> Self {
        Self::new(code, request.identifier, request.authenticator)
    }

    /// Append an attribute; the length grows by its canonical encoded size
    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.length += Attribute::HEADER_LENGTH + attribute.encode_value().len();
        self.attributes.push(attribute);
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn identifier(&self) -> u8 {
        self.identifier
    }

    /// Declared length for decoded packets, computed length for built ones
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn authenticator(&self) -> &[u8; 16] {
        &self.authenticator
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Decode packet from bytes
    ///
    /// `secret` is the NAS shared secret, used by User-Password.
    pub fn decode(
        data: &[u8],
        secret: &SharedSecret,
        options: &DecodeOptions,
    ) -> Result<Self, PacketError> {
        if data.len() > Self::MAX_PACKET_SIZE {
            return Err(PacketError::PacketTooLarge(data.len()));
        }
        if data.len() < Self::MIN_PACKET_SIZE {
            return Err(PacketError::PacketTooShort(data.len()));
        }

        let code = Code::from_u8(data[0]).ok_or(PacketError::InvalidCode(data[0]))?;
        let identifier = data[1];

        let declared = u16::from_be_bytes([data[2], data[3]]) as usize;
        if declared != data.len() {
            return Err(PacketError::LengthMismatch {
                declared,
                actual: data.len(),
            });
        }

        let authenticator: [u8; 16] = data[4..Self::MIN_PACKET_SIZE]
            .try_into()
            .map_err(|_| PacketError::InvalidAuthenticator(data[4..].len().min(16)))?;

        let mut attributes = Vec::new();
        let mut offset = Self::MIN_PACKET_SIZE;

        while offset < data.len() {
            let remaining = data.len() - offset;
            if remaining < Attribute::HEADER_LENGTH {
                return Err(PacketError::IncompleteAttribute { offset, remaining });
            }

            let type_id = data[offset];
            let length = data[offset + 1] as usize;
            if length < Attribute::HEADER_LENGTH {
                return Err(PacketError::InvalidAttributeLength { offset, length });
            }
            if length > remaining {
                return Err(PacketError::AttributeOverrun {
                    offset,
                    length,
                    remaining,
                });
            }

            match AttributeType::from_u8(type_id) {
                Some(attr_type) => {
                    let attribute = Attribute::decode(
                        attr_type,
                        data,
                        offset,
                        offset + length,
                        secret,
                        options.validation.get(attr_type),
                    )
                    .map_err(|source| PacketError::Attribute { offset, source })?;
                    attributes.push(attribute);
                }
                None => match options.unknown_attributes {
                    UnknownAttributePolicy::Reject => {
                        return Err(PacketError::UnknownAttribute {
                            offset,
                            attr_type: type_id,
                        });
                    }
                    UnknownAttributePolicy::Skip => {}
                },
            }

            offset += length;
        }

        Ok(Packet {
            code,
            identifier,
            length: declared,
            authenticator,
            attributes,
        })
    }

    /// Encode packet to bytes, authenticator field written as-is
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let mut buffer = Vec::with_capacity(self.length);
        buffer.push(self.code.as_u8());
        buffer.push(self.identifier);
        // Length is filled in once attributes are written
        buffer.extend_from_slice(&[0, 0]);
        buffer.extend_from_slice(&self.authenticator);

        for attr in &self.attributes {
            let offset = buffer.len();
            let bytes = attr
                .encode()
                .map_err(|source| PacketError::Attribute { offset, source })?;
            buffer.extend_from_slice(&bytes);
        }

        let total_length = buffer.len();
        if total_length > Self::MAX_PACKET_SIZE {
            return Err(PacketError::PacketTooLarge(total_length));
        }
        buffer[2..4].copy_from_slice(&(total_length as u16).to_be_bytes());

        Ok(buffer)
    }

    /// Encode a response, replacing the request authenticator held in this
    /// packet with MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)
    pub fn encode_response(&self, secret: &SharedSecret) -> Result<Vec<u8>, PacketError> {
        let mut buffer = self.encode()?;
        let response_authenticator = calculate_response_authenticator(&buffer, secret);
        buffer[4..Self::MIN_PACKET_SIZE].copy_from_slice(&response_authenticator);
        Ok(buffer)
    }

    /// Find first attribute by type
    pub fn find_attribute(&self, attr_type: AttributeType) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.attr_type() == attr_type)
    }

    /// Find all attributes by type, in packet order
    pub fn find_all_attributes(&self, attr_type: AttributeType) -> Vec<&Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.attr_type() == attr_type)
            .collect()
    }
}
