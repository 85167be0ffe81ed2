use super::types::AttributeType;
use crate::auth::{decrypt_user_password, encrypt_user_password, SharedSecret};
use crate::chap::{ChapResponse, CHAP_PASSWORD_LENGTH};
use crate::validation::Strictness;
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Attribute-level decode and validation failures
///
/// The packet decoder wraps these into `PacketError::Attribute`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("{attr_type}: Invalid length: {length}")]
    InvalidLength { attr_type: AttributeType, length: usize },
    #[error("{attr_type}: Invalid value: {value}")]
    InvalidValue { attr_type: AttributeType, value: String },
    #[error("{attr_type}: value of {length} bytes is too short to decode (need {needed})")]
    Truncated {
        attr_type: AttributeType,
        length: usize,
        needed: usize,
    },
    #[error("{attr_type}: value of {length} bytes exceeds the 253 byte maximum")]
    TooLong { attr_type: AttributeType, length: usize },
    #[error("{attr_type}: attribute window {start}..{end} lies outside a {packet_length} byte packet")]
    OutOfBounds {
        attr_type: AttributeType,
        start: usize,
        end: usize,
        packet_length: usize,
    },
}

/// Special values of address-like attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSelection {
    /// The user chooses (0xFFFFFFFF)
    User,
    /// The NAS chooses (Framed-IP-Address 0xFFFFFFFE, Login-IP-Host 0, Framed-IPX-Network 0xFFFFFFFE)
    Nas,
    /// A concrete address
    Specific,
}

/// User-Password: the recovered plaintext plus what is needed to re-obfuscate it
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword {
    password: String,
    secret: SharedSecret,
    authenticator: [u8; 16],
}

impl UserPassword {
    pub fn new(password: impl Into<String>, secret: SharedSecret, authenticator: [u8; 16]) -> Self {
        UserPassword {
            password: password.into(),
            secret,
            authenticator,
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Request Authenticator the ciphertext is bound to
    pub fn authenticator(&self) -> &[u8; 16] {
        &self.authenticator
    }

    fn encrypt(&self) -> Vec<u8> {
        encrypt_user_password(&self.password, &self.secret, &self.authenticator)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("password", &"<redacted>")
            .field("secret", &self.secret)
            .finish()
    }
}

/// Vendor-Specific value (RFC 2865 Section 5.26)
///
/// The vendor string after the Vendor-Id is carried byte for byte and not
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorSpecific {
    pub vendor_id: u32,
    pub data: Vec<u8>,
}

/// Sub-attribute view over a vendor string in the recommended RFC 2865 layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorAttribute<'a> {
    pub vendor_type: u8,
    pub length: u8,
    pub value: &'a [u8],
}

impl VendorSpecific {
    /// Split the vendor string into type / length / value, if it has a header
    pub fn sub_attribute(&self) -> Option<VendorAttribute<'_>> {
        match self.data.as_slice() {
            [vendor_type, length, value @ ..] => Some(VendorAttribute {
                vendor_type: *vendor_type,
                length: *length,
                value,
            }),
            _ => None,
        }
    }
}

/// Decoded value, one variant per registered attribute kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    UserName(String),
    UserPassword(UserPassword),
    ChapPassword(ChapResponse),
    NasIpAddress(Ipv4Addr),
    NasPort(u32),
    ServiceType(u32),
    FramedProtocol(u32),
    FramedIpAddress(Ipv4Addr),
    FramedIpNetmask(Ipv4Addr),
    FramedRouting(u32),
    FilterId(String),
    FramedMtu(u32),
    FramedCompression(u32),
    LoginIpHost(Ipv4Addr),
    LoginService(u32),
    LoginTcpPort(u32),
    ReplyMessage(String),
    CallbackNumber(String),
    CallbackId(String),
    FramedRoute(String),
    FramedIpxNetwork(u32),
    State(Vec<u8>),
    Class(Vec<u8>),
    VendorSpecific(VendorSpecific),
    SessionTimeout(u32),
}

/// Framed-MTU bounds (RFC 2865 Section 5.12)
pub const FRAMED_MTU_MIN: u32 = 64;
pub const FRAMED_MTU_MAX: u32 = 65535;

impl AttributeValue {
    pub fn attr_type(&self) -> AttributeType {
        match self {
            AttributeValue::UserName(_) => AttributeType::UserName,
            AttributeValue::UserPassword(_) => AttributeType::UserPassword,
            AttributeValue::ChapPassword(_) => AttributeType::ChapPassword,
            AttributeValue::NasIpAddress(_) => AttributeType::NasIpAddress,
            AttributeValue::NasPort(_) => AttributeType::NasPort,
            AttributeValue::ServiceType(_) => AttributeType::ServiceType,
            AttributeValue::FramedProtocol(_) => AttributeType::FramedProtocol,
            AttributeValue::FramedIpAddress(_) => AttributeType::FramedIpAddress,
            AttributeValue::FramedIpNetmask(_) => AttributeType::FramedIpNetmask,
            AttributeValue::FramedRouting(_) => AttributeType::FramedRouting,
            AttributeValue::FilterId(_) => AttributeType::FilterId,
            AttributeValue::FramedMtu(_) => AttributeType::FramedMtu,
            AttributeValue::FramedCompression(_) => AttributeType::FramedCompression,
            AttributeValue::LoginIpHost(_) => AttributeType::LoginIpHost,
            AttributeValue::LoginService(_) => AttributeType::LoginService,
            AttributeValue::LoginTcpPort(_) => AttributeType::LoginTcpPort,
            AttributeValue::ReplyMessage(_) => AttributeType::ReplyMessage,
            AttributeValue::CallbackNumber(_) => AttributeType::CallbackNumber,
            AttributeValue::CallbackId(_) => AttributeType::CallbackId,
            AttributeValue::FramedRoute(_) => AttributeType::FramedRoute,
            AttributeValue::FramedIpxNetwork(_) => AttributeType::FramedIpxNetwork,
            AttributeValue::State(_) => AttributeType::State,
            AttributeValue::Class(_) => AttributeType::Class,
            AttributeValue::VendorSpecific(_) => AttributeType::VendorSpecific,
            AttributeValue::SessionTimeout(_) => AttributeType::SessionTimeout,
        }
    }

    /// Canonical wire representation of the value (without the type/length header)
    pub fn encode_value(&self) -> Vec<u8> {
        match self {
            AttributeValue::UserName(s)
            | AttributeValue::FilterId(s)
            | AttributeValue::ReplyMessage(s)
            | AttributeValue::CallbackNumber(s)
            | AttributeValue::CallbackId(s)
            | AttributeValue::FramedRoute(s) => s.as_bytes().to_vec(),
            AttributeValue::UserPassword(password) => password.encrypt(),
            AttributeValue::ChapPassword(chap) => chap.to_bytes(),
            AttributeValue::NasIpAddress(ip)
            | AttributeValue::FramedIpAddress(ip)
            | AttributeValue::FramedIpNetmask(ip)
            | AttributeValue::LoginIpHost(ip) => ip.octets().to_vec(),
            AttributeValue::NasPort(n)
            | AttributeValue::ServiceType(n)
            | AttributeValue::FramedProtocol(n)
            | AttributeValue::FramedRouting(n)
            | AttributeValue::FramedMtu(n)
            | AttributeValue::FramedCompression(n)
            | AttributeValue::LoginService(n)
            | AttributeValue::LoginTcpPort(n)
            | AttributeValue::FramedIpxNetwork(n)
            | AttributeValue::SessionTimeout(n) => n.to_be_bytes().to_vec(),
            AttributeValue::State(bytes) | AttributeValue::Class(bytes) => bytes.clone(),
            AttributeValue::VendorSpecific(vsa) => {
                let mut buffer = Vec::with_capacity(4 + vsa.data.len());
                buffer.extend_from_slice(&vsa.vendor_id.to_be_bytes());
                buffer.extend_from_slice(&vsa.data);
                buffer
            }
        }
    }

    /// Special-value interpretation for address-like kinds, `None` for the rest
    pub fn address_selection(&self) -> Option<AddressSelection> {
        match self {
            AttributeValue::FramedIpAddress(ip) => Some(match u32::from(*ip) {
                0xFFFF_FFFF => AddressSelection::User,
                0xFFFF_FFFE => AddressSelection::Nas,
                _ => AddressSelection::Specific,
            }),
            AttributeValue::LoginIpHost(ip) => Some(match u32::from(*ip) {
                0xFFFF_FFFF => AddressSelection::User,
                0 => AddressSelection::Nas,
                _ => AddressSelection::Specific,
            }),
            AttributeValue::FramedIpxNetwork(network) => Some(match network {
                0xFFFF_FFFE => AddressSelection::Nas,
                _ => AddressSelection::Specific,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::UserName(s)
            | AttributeValue::FilterId(s)
            | AttributeValue::ReplyMessage(s)
            | AttributeValue::CallbackNumber(s)
            | AttributeValue::CallbackId(s)
            | AttributeValue::FramedRoute(s) => write!(f, "{:?}", s),
            AttributeValue::UserPassword(_) => f.write_str("<redacted>"),
            AttributeValue::ChapPassword(chap) => write!(f, "ident={}", chap.ident),
            AttributeValue::NasIpAddress(ip)
            | AttributeValue::FramedIpAddress(ip)
            | AttributeValue::FramedIpNetmask(ip)
            | AttributeValue::LoginIpHost(ip) => write!(f, "{}", ip),
            AttributeValue::ServiceType(n)
            | AttributeValue::FramedProtocol(n)
            | AttributeValue::FramedRouting(n)
            | AttributeValue::FramedCompression(n)
            | AttributeValue::LoginService(n) => match self.attr_type().value_name(*n) {
                Some(name) => write!(f, "{} ({})", n, name),
                None => write!(f, "{}", n),
            },
            AttributeValue::NasPort(n)
            | AttributeValue::FramedMtu(n)
            | AttributeValue::LoginTcpPort(n)
            | AttributeValue::FramedIpxNetwork(n)
            | AttributeValue::SessionTimeout(n) => write!(f, "{}", n),
            AttributeValue::State(bytes) | AttributeValue::Class(bytes) => {
                write!(f, "0x")?;
                bytes.iter().try_for_each(|b| write!(f, "{:02x}", b))
            }
            AttributeValue::VendorSpecific(vsa) => {
                write!(f, "vendor={} ({} bytes)", vsa.vendor_id, vsa.data.len())
            }
        }
    }
}

/// Length rule on the whole attribute (type + length + value)
#[derive(Debug, Clone, Copy)]
enum LengthRule {
    Exact(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl LengthRule {
    fn for_type(attr_type: AttributeType) -> Self {
        match attr_type {
            AttributeType::UserName
            | AttributeType::FilterId
            | AttributeType::ReplyMessage
            | AttributeType::CallbackNumber
            | AttributeType::CallbackId
            | AttributeType::FramedRoute
            | AttributeType::State
            | AttributeType::Class => LengthRule::AtLeast(3),
            AttributeType::UserPassword => LengthRule::Between(18, 130),
            AttributeType::ChapPassword => LengthRule::Exact(Attribute::HEADER_LENGTH + CHAP_PASSWORD_LENGTH),
            AttributeType::VendorSpecific => LengthRule::AtLeast(7),
            _ => LengthRule::Exact(6),
        }
    }

    fn accepts(self, length: usize) -> bool {
        match self {
            LengthRule::Exact(n) => length == n,
            LengthRule::AtLeast(n) => length >= n,
            LengthRule::Between(min, max) => (min..=max).contains(&length),
        }
    }
}

fn check_length(
    attr_type: AttributeType,
    length: usize,
    strictness: Strictness,
) -> Result<(), AttributeError> {
    if !LengthRule::for_type(attr_type).accepts(length) && strictness.enforces_length() {
        return Err(AttributeError::InvalidLength { attr_type, length });
    }
    Ok(())
}

fn check_value(value: &AttributeValue, strictness: Strictness) -> Result<(), AttributeError> {
    let attr_type = value.attr_type();
    let valid = match value {
        AttributeValue::FramedMtu(mtu) => (FRAMED_MTU_MIN..=FRAMED_MTU_MAX).contains(mtu),
        AttributeValue::ServiceType(n)
        | AttributeValue::FramedProtocol(n)
        | AttributeValue::FramedRouting(n)
        | AttributeValue::FramedCompression(n)
        | AttributeValue::LoginService(n) => attr_type.value_name(*n).is_some(),
        _ => true,
    };

    if !valid && strictness.enforces_value() {
        return Err(AttributeError::InvalidValue {
            attr_type,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn leading(attr_type: AttributeType, value: &[u8], needed: usize) -> Result<&[u8], AttributeError> {
    value.get(..needed).ok_or(AttributeError::Truncated {
        attr_type,
        length: value.len(),
        needed,
    })
}

fn integer(attr_type: AttributeType, value: &[u8]) -> Result<u32, AttributeError> {
    let b = leading(attr_type, value, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn ipv4(attr_type: AttributeType, value: &[u8]) -> Result<Ipv4Addr, AttributeError> {
    let b = leading(attr_type, value, 4)?;
    Ok(Ipv4Addr::new(b[0], b[1], b[2], b[3]))
}

fn text(value: &[u8]) -> String {
    String::from_utf8_lossy(value).into_owned()
}

/// Structural parse of a value; strictness is applied by the caller
fn parse_value(
    attr_type: AttributeType,
    value: &[u8],
    packet: &[u8],
    secret: &SharedSecret,
) -> Result<AttributeValue, AttributeError> {
    Ok(match attr_type {
        AttributeType::UserName => AttributeValue::UserName(text(value)),
        AttributeType::UserPassword => {
            let mut authenticator = [0u8; 16];
            authenticator.copy_from_slice(&packet[4..20]);
            let password = decrypt_user_password(value, secret, &authenticator);
            AttributeValue::UserPassword(UserPassword::new(password, secret.clone(), authenticator))
        }
        AttributeType::ChapPassword => {
            let bytes = leading(attr_type, value, CHAP_PASSWORD_LENGTH)?;
            let chap = ChapResponse::from_bytes(bytes).map_err(|_| AttributeError::Truncated {
                attr_type,
                length: value.len(),
                needed: CHAP_PASSWORD_LENGTH,
            })?;
            AttributeValue::ChapPassword(chap)
        }
        AttributeType::NasIpAddress => AttributeValue::NasIpAddress(ipv4(attr_type, value)?),
        AttributeType::NasPort => AttributeValue::NasPort(integer(attr_type, value)?),
        AttributeType::ServiceType => AttributeValue::ServiceType(integer(attr_type, value)?),
        AttributeType::FramedProtocol => AttributeValue::FramedProtocol(integer(attr_type, value)?),
        AttributeType::FramedIpAddress => AttributeValue::FramedIpAddress(ipv4(attr_type, value)?),
        AttributeType::FramedIpNetmask => AttributeValue::FramedIpNetmask(ipv4(attr_type, value)?),
        AttributeType::FramedRouting => AttributeValue::FramedRouting(integer(attr_type, value)?),
        AttributeType::FilterId => AttributeValue::FilterId(text(value)),
        AttributeType::FramedMtu => AttributeValue::FramedMtu(integer(attr_type, value)?),
        AttributeType::FramedCompression => {
            AttributeValue::FramedCompression(integer(attr_type, value)?)
        }
        AttributeType::LoginIpHost => AttributeValue::LoginIpHost(ipv4(attr_type, value)?),
        AttributeType::LoginService => AttributeValue::LoginService(integer(attr_type, value)?),
        AttributeType::LoginTcpPort => AttributeValue::LoginTcpPort(integer(attr_type, value)?),
        AttributeType::ReplyMessage => AttributeValue::ReplyMessage(text(value)),
        AttributeType::CallbackNumber => AttributeValue::CallbackNumber(text(value)),
        AttributeType::CallbackId => AttributeValue::CallbackId(text(value)),
        AttributeType::FramedRoute => AttributeValue::FramedRoute(text(value)),
        AttributeType::FramedIpxNetwork => {
            AttributeValue::FramedIpxNetwork(integer(attr_type, value)?)
        }
        AttributeType::State => AttributeValue::State(value.to_vec()),
        AttributeType::Class => AttributeValue::Class(value.to_vec()),
        AttributeType::VendorSpecific => AttributeValue::VendorSpecific(VendorSpecific {
            vendor_id: integer(attr_type, value)?,
            data: value[4..].to_vec(),
        }),
        AttributeType::SessionTimeout => AttributeValue::SessionTimeout(integer(attr_type, value)?),
    })
}

/// RADIUS Attribute as defined in RFC 2865 Section 5
///
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Type      |    Length     |  Value ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Keeps the declared length and the raw value bytes next to the decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    length: usize,
    raw: Vec<u8>,
    value: AttributeValue,
}

impl Attribute {
    /// Type + length header size; also the minimum attribute length
    pub const HEADER_LENGTH: usize = 2;
    /// Maximum attribute length (255 bytes including type and length)
    pub const MAX_LENGTH: usize = 255;
    /// Maximum value length (253 bytes)
    pub const MAX_VALUE_LENGTH: usize = 253;

    /// Build an outbound attribute from a value
    pub fn new(value: AttributeValue) -> Result<Self, AttributeError> {
        let raw = value.encode_value();
        if raw.len() > Self::MAX_VALUE_LENGTH {
            return Err(AttributeError::TooLong {
                attr_type: value.attr_type(),
                length: raw.len(),
            });
        }
        Ok(Attribute {
            length: Self::HEADER_LENGTH + raw.len(),
            raw,
            value,
        })
    }

    /// Decode the attribute occupying `packet[start..end]`
    ///
    /// `packet` is the whole packet; User-Password reads the Request
    /// Authenticator from it and decrypts with `secret`. Length and value
    /// violations are raised according to `strictness`; a value too short to
    /// be read at all is always an error.
    pub fn decode(
        attr_type: AttributeType,
        packet: &[u8],
        start: usize,
        end: usize,
        secret: &SharedSecret,
        strictness: Strictness,
    ) -> Result<Self, AttributeError> {
        if packet.len() < 20 || start + Self::HEADER_LENGTH > end || end > packet.len() {
            return Err(AttributeError::OutOfBounds {
                attr_type,
                start,
                end,
                packet_length: packet.len(),
            });
        }

        let length = end - start;
        check_length(attr_type, length, strictness)?;

        let raw = &packet[start + Self::HEADER_LENGTH..end];
        let value = parse_value(attr_type, raw, packet, secret)?;
        check_value(&value, strictness)?;

        Ok(Attribute {
            length,
            raw: raw.to_vec(),
            value,
        })
    }

    /// Re-check this attribute's length and value against `strictness`
    pub fn validate(&self, strictness: Strictness) -> Result<(), AttributeError> {
        check_length(self.attr_type(), self.length, strictness)?;
        check_value(&self.value, strictness)
    }

    /// Encode attribute to bytes (header + canonical value)
    pub fn encode(&self) -> Result<Vec<u8>, AttributeError> {
        let value = self.encode_value();
        if value.len() > Self::MAX_VALUE_LENGTH {
            return Err(AttributeError::TooLong {
                attr_type: self.attr_type(),
                length: value.len(),
            });
        }

        let mut buffer = Vec::with_capacity(Self::HEADER_LENGTH + value.len());
        buffer.push(self.attr_type().as_u8());
        buffer.push((Self::HEADER_LENGTH + value.len()) as u8);
        buffer.extend_from_slice(&value);
        Ok(buffer)
    }

    pub fn encode_value(&self) -> Vec<u8> {
        self.value.encode_value()
    }

    pub fn attr_type(&self) -> AttributeType {
        self.value.attr_type()
    }

    pub fn name(&self) -> &'static str {
        self.attr_type().name()
    }

    /// Declared length, header included
    pub fn length(&self) -> usize {
        self.length
    }

    /// Value bytes exactly as received (or as first encoded)
    pub fn raw_value(&self) -> &[u8] {
        &self.raw
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// Text value of string kinds
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            AttributeValue::UserName(s)
            | AttributeValue::FilterId(s)
            | AttributeValue::ReplyMessage(s)
            | AttributeValue::CallbackNumber(s)
            | AttributeValue::CallbackId(s)
            | AttributeValue::FramedRoute(s) => Some(s),
            AttributeValue::UserPassword(password) => Some(password.password()),
            _ => None,
        }
    }

    /// Value of 32-bit integer kinds
    pub fn as_integer(&self) -> Option<u32> {
        match self.value {
            AttributeValue::NasPort(n)
            | AttributeValue::ServiceType(n)
            | AttributeValue::FramedProtocol(n)
            | AttributeValue::FramedRouting(n)
            | AttributeValue::FramedMtu(n)
            | AttributeValue::FramedCompression(n)
            | AttributeValue::LoginService(n)
            | AttributeValue::LoginTcpPort(n)
            | AttributeValue::FramedIpxNetwork(n)
            | AttributeValue::SessionTimeout(n) => Some(n),
            _ => None,
        }
    }

    /// Value of IPv4 address kinds
    pub fn as_ipv4(&self) -> Option<Ipv4Addr> {
        match self.value {
            AttributeValue::NasIpAddress(ip)
            | AttributeValue::FramedIpAddress(ip)
            | AttributeValue::FramedIpNetmask(ip)
            | AttributeValue::LoginIpHost(ip) => Some(ip),
            _ => None,
        }
    }

    /// Value of opaque kinds (State, Class)
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            AttributeValue::State(bytes) | AttributeValue::Class(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn user_name(name: impl Into<String>) -> Result<Self, AttributeError> {
        Self::new(AttributeValue::UserName(name.into()))
    }

    /// User-Password obfuscated with `secret` and the request's authenticator
    pub fn user_password(
        password: impl Into<String>,
        secret: &SharedSecret,
        authenticator: [u8; 16],
    ) -> Result<Self, AttributeError> {
        Self::new(AttributeValue::UserPassword(UserPassword::new(
            password,
            secret.clone(),
            authenticator,
        )))
    }

    pub fn chap_password(response: ChapResponse) -> Result<Self, AttributeError> {
        Self::new(AttributeValue::ChapPassword(response))
    }

    pub fn nas_ip_address(ip: Ipv4Addr) -> Result<Self, AttributeError> {
        Self::new(AttributeValue::NasIpAddress(ip))
    }

    pub fn nas_port(port: u32) -> Result<Self, AttributeError> {
        Self::new(AttributeValue::NasPort(port))
    }

    pub fn reply_message(message: impl Into<String>) -> Result<Self, AttributeError> {
        Self::new(AttributeValue::ReplyMessage(message.into()))
    }

    pub fn state(state: impl Into<Vec<u8>>) -> Result<Self, AttributeError> {
        Self::new(AttributeValue::State(state.into()))
    }

    pub fn class(class: impl Into<Vec<u8>>) -> Result<Self, AttributeError> {
        Self::new(AttributeValue::Class(class.into()))
    }

    pub fn session_timeout(seconds: u32) -> Result<Self, AttributeError> {
        Self::new(AttributeValue::SessionTimeout(seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 20 byte header (authenticator 0x01..) followed by one attribute
    fn packet_with(attr_type: u8, value: &[u8]) -> Vec<u8> {
        let mut packet = vec![1u8, 1, 0, 0];
        packet.extend(1u8..=16);
        packet.push(attr_type);
        packet.push((value.len() + 2) as u8);
        packet.extend_from_slice(value);
        let len = packet.len() as u16;
        packet[2..4].copy_from_slice(&len.to_be_bytes());
        packet
    }

    fn decode(attr_type: AttributeType, value: &[u8], strictness: Strictness) -> Result<Attribute, AttributeError> {
        let packet = packet_with(attr_type.as_u8(), value);
        Attribute::decode(attr_type, &packet, 20, packet.len(), &SharedSecret::from("secret"), strictness)
    }

    #[test]
    fn test_user_name() {
        let attr = decode(AttributeType::UserName, b"abcde", Strictness::STRICT).unwrap();
        assert_eq!(attr.as_str(), Some("abcde"));
        assert_eq!(attr.length(), 7);
        assert_eq!(attr.name(), "User-Name");
        assert_eq!(attr.encode().unwrap(), vec![1, 7, b'a', b'b', b'c', b'd', b'e']);
    }

    #[test]
    fn test_empty_text_length_strictness() {
        let err = decode(AttributeType::ReplyMessage, b"", Strictness::STRICT).unwrap_err();
        assert_eq!(
            err,
            AttributeError::InvalidLength {
                attr_type: AttributeType::ReplyMessage,
                length: 2
            }
        );

        let attr = decode(AttributeType::ReplyMessage, b"", Strictness::LENIENT).unwrap();
        assert_eq!(attr.as_str(), Some(""));
    }

    #[test]
    fn test_integer_kinds() {
        let attr = decode(AttributeType::NasPort, &[0, 0, 0x01, 0x00], Strictness::STRICT).unwrap();
        assert_eq!(attr.as_integer(), Some(256));
        assert_eq!(attr.encode_value(), vec![0, 0, 1, 0]);

        let attr = decode(AttributeType::SessionTimeout, &3600u32.to_be_bytes(), Strictness::STRICT).unwrap();
        assert_eq!(attr.value(), &AttributeValue::SessionTimeout(3600));
    }

    #[test]
    fn test_integer_wrong_length() {
        let err = decode(AttributeType::SessionTimeout, &[0, 0, 0, 0, 1], Strictness::STRICT).unwrap_err();
        assert!(matches!(err, AttributeError::InvalidLength { length: 7, .. }));

        // Lenient: reads the leading four bytes
        let attr = decode(AttributeType::SessionTimeout, &[0, 0, 0, 9, 1], Strictness::LENIENT).unwrap();
        assert_eq!(attr.as_integer(), Some(9));
        assert_eq!(attr.length(), 7);
    }

    #[test]
    fn test_truncated_integer_fails_even_when_lenient() {
        let err = decode(AttributeType::NasPort, &[1, 2, 3], Strictness::LENIENT).unwrap_err();
        assert_eq!(
            err,
            AttributeError::Truncated {
                attr_type: AttributeType::NasPort,
                length: 3,
                needed: 4
            }
        );
    }

    #[test]
    fn test_enumerated_values() {
        let attr = decode(AttributeType::ServiceType, &2u32.to_be_bytes(), Strictness::STRICT).unwrap();
        assert_eq!(attr.value().to_string(), "2 (FRAMED)");

        let err = decode(AttributeType::ServiceType, &99u32.to_be_bytes(), Strictness::STRICT).unwrap_err();
        assert!(matches!(err, AttributeError::InvalidValue { attr_type: AttributeType::ServiceType, .. }));

        let lenient_value = Strictness {
            strict: true,
            strict_length: true,
            strict_value: false,
        };
        let attr = decode(AttributeType::ServiceType, &99u32.to_be_bytes(), lenient_value).unwrap();
        assert_eq!(attr.as_integer(), Some(99));
    }

    #[test]
    fn test_login_service_gap() {
        assert!(decode(AttributeType::LoginService, &8u32.to_be_bytes(), Strictness::STRICT).is_ok());
        assert!(decode(AttributeType::LoginService, &7u32.to_be_bytes(), Strictness::STRICT).is_err());
    }

    #[test]
    fn test_framed_mtu_range() {
        for mtu in [64u32, 1500, 65535] {
            assert!(decode(AttributeType::FramedMtu, &mtu.to_be_bytes(), Strictness::STRICT).is_ok());
        }
        for mtu in [0u32, 63, 65536] {
            assert!(decode(AttributeType::FramedMtu, &mtu.to_be_bytes(), Strictness::STRICT).is_err());
            assert!(decode(AttributeType::FramedMtu, &mtu.to_be_bytes(), Strictness::LENIENT).is_ok());
        }
    }

    #[test]
    fn test_framed_ip_address_selection() {
        let user = decode(AttributeType::FramedIpAddress, &[255, 255, 255, 255], Strictness::STRICT).unwrap();
        assert_eq!(user.value().address_selection(), Some(AddressSelection::User));

        let nas = decode(AttributeType::FramedIpAddress, &[255, 255, 255, 254], Strictness::STRICT).unwrap();
        assert_eq!(nas.value().address_selection(), Some(AddressSelection::Nas));

        let specific = decode(AttributeType::FramedIpAddress, &[10, 0, 0, 1], Strictness::STRICT).unwrap();
        assert_eq!(specific.as_ipv4(), Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(specific.value().address_selection(), Some(AddressSelection::Specific));
    }

    #[test]
    fn test_login_ip_host_selection() {
        let nas = decode(AttributeType::LoginIpHost, &[0, 0, 0, 0], Strictness::STRICT).unwrap();
        assert_eq!(nas.value().address_selection(), Some(AddressSelection::Nas));

        let user = decode(AttributeType::LoginIpHost, &[255, 255, 255, 255], Strictness::STRICT).unwrap();
        assert_eq!(user.value().address_selection(), Some(AddressSelection::User));
    }

    #[test]
    fn test_opaque_values_round_trip_unmodified() {
        let state = [0u8, 0xFF, 0x10, 0x00, 0x7F];
        let attr = decode(AttributeType::State, &state, Strictness::STRICT).unwrap();
        assert_eq!(attr.as_bytes(), Some(&state[..]));
        assert_eq!(attr.encode_value(), state.to_vec());

        let class = decode(AttributeType::Class, b"\x00\x01", Strictness::STRICT).unwrap();
        assert_eq!(class.raw_value(), b"\x00\x01");
        assert_eq!(class.encode_value(), class.raw_value().to_vec());
    }

    #[test]
    fn test_chap_password() {
        let mut value = vec![0x42];
        value.extend_from_slice(&[0xAB; 16]);
        let attr = decode(AttributeType::ChapPassword, &value, Strictness::STRICT).unwrap();
        match attr.value() {
            AttributeValue::ChapPassword(chap) => {
                assert_eq!(chap.ident, 0x42);
                assert_eq!(chap.response, [0xAB; 16]);
            }
            other => panic!("unexpected value {:?}", other),
        }
        assert_eq!(attr.encode_value(), value);

        assert!(decode(AttributeType::ChapPassword, &value[..16], Strictness::STRICT).is_err());
    }

    #[test]
    fn test_vendor_specific() {
        // Vendor 9 (Cisco), sub-attribute 1, length 5, "abc"
        let value = [0, 0, 0, 9, 1, 5, b'a', b'b', b'c'];
        let attr = decode(AttributeType::VendorSpecific, &value, Strictness::STRICT).unwrap();
        let AttributeValue::VendorSpecific(vsa) = attr.value() else {
            panic!("expected Vendor-Specific");
        };
        assert_eq!(vsa.vendor_id, 9);
        let sub = vsa.sub_attribute().unwrap();
        assert_eq!(sub.vendor_type, 1);
        assert_eq!(sub.length, 5);
        assert_eq!(sub.value, b"abc");
        assert_eq!(attr.encode_value(), value.to_vec());
    }

    #[test]
    fn test_vendor_specific_minimum_length() {
        let err = decode(AttributeType::VendorSpecific, &[0, 0, 0, 9], Strictness::STRICT).unwrap_err();
        assert!(matches!(err, AttributeError::InvalidLength { length: 6, .. }));

        let attr = decode(AttributeType::VendorSpecific, &[0, 0, 0, 9], Strictness::LENIENT).unwrap();
        let AttributeValue::VendorSpecific(vsa) = attr.value() else {
            panic!("expected Vendor-Specific");
        };
        assert!(vsa.sub_attribute().is_none());
    }

    #[test]
    fn test_user_password_decrypts_with_packet_authenticator() {
        let secret = SharedSecret::from("secret");
        let authenticator: [u8; 16] = core::array::from_fn(|i| i as u8 + 1);
        let ciphertext = encrypt_user_password("hello", &secret, &authenticator);

        let attr = decode(AttributeType::UserPassword, &ciphertext, Strictness::STRICT).unwrap();
        assert_eq!(attr.as_str(), Some("hello"));
        assert_eq!(attr.encode_value(), ciphertext);
    }

    #[test]
    fn test_user_password_length_bounds() {
        assert!(decode(AttributeType::UserPassword, &[0u8; 15], Strictness::STRICT).is_err());
        assert!(decode(AttributeType::UserPassword, &[0u8; 129], Strictness::STRICT).is_err());
        assert!(decode(AttributeType::UserPassword, &[0u8; 128], Strictness::STRICT).is_ok());
    }

    #[test]
    fn test_validate_outbound_attribute() {
        let attr = Attribute::new(AttributeValue::FramedMtu(10)).unwrap();
        assert!(attr.validate(Strictness::STRICT).is_err());
        assert!(attr.validate(Strictness::LENIENT).is_ok());

        let attr = Attribute::reply_message("").unwrap();
        assert!(attr.validate(Strictness::STRICT).is_err());
    }

    #[test]
    fn test_max_value_length() {
        assert!(Attribute::class(vec![0u8; 253]).is_ok());
        assert!(matches!(
            Attribute::class(vec![0u8; 254]),
            Err(AttributeError::TooLong { length: 254, .. })
        ));
    }

    #[test]
    fn test_window_outside_packet() {
        let packet = packet_with(1, b"abc");
        let err = Attribute::decode(
            AttributeType::UserName,
            &packet,
            20,
            packet.len() + 1,
            &SharedSecret::from("s"),
            Strictness::STRICT,
        )
        .unwrap_err();
        assert!(matches!(err, AttributeError::OutOfBounds { .. }));
    }

    #[test]
    fn test_password_never_displayed() {
        let attr = Attribute::user_password("hunter2", &SharedSecret::from("s"), [0u8; 16]).unwrap();
        assert!(!format!("{:?}", attr).contains("hunter2"));
        assert!(!attr.value().to_string().contains("hunter2"));
    }
}
