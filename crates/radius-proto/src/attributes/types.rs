use std::fmt;

/// RADIUS attribute types understood by the decoder (RFC 2865 Section 5)
///
/// This enum is the attribute registry: a type id that has no variant here is
/// reported as an unknown attribute by the packet decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AttributeType {
    /// User-Name (1) - RFC 2865
    UserName = 1,
    /// User-Password (2) - RFC 2865
    UserPassword = 2,
    /// CHAP-Password (3) - RFC 2865
    ChapPassword = 3,
    /// NAS-IP-Address (4) - RFC 2865
    NasIpAddress = 4,
    /// NAS-Port (5) - RFC 2865
    NasPort = 5,
    /// Service-Type (6) - RFC 2865
    ServiceType = 6,
    /// Framed-Protocol (7) - RFC 2865
    FramedProtocol = 7,
    /// Framed-IP-Address (8) - RFC 2865
    FramedIpAddress = 8,
    /// Framed-IP-Netmask (9) - RFC 2865
    FramedIpNetmask = 9,
    /// Framed-Routing (10) - RFC 2865
    FramedRouting = 10,
    /// Filter-Id (11) - RFC 2865
    FilterId = 11,
    /// Framed-MTU (12) - RFC 2865
    FramedMtu = 12,
    /// Framed-Compression (13) - RFC 2865
    FramedCompression = 13,
    /// Login-IP-Host (14) - RFC 2865
    LoginIpHost = 14,
    /// Login-Service (15) - RFC 2865
    LoginService = 15,
    /// Login-TCP-Port (16) - RFC 2865
    LoginTcpPort = 16,
    /// Reply-Message (18) - RFC 2865
    ReplyMessage = 18,
    /// Callback-Number (19) - RFC 2865
    CallbackNumber = 19,
    /// Callback-Id (20) - RFC 2865
    CallbackId = 20,
    /// Framed-Route (22) - RFC 2865
    FramedRoute = 22,
    /// Framed-IPX-Network (23) - RFC 2865
    FramedIpxNetwork = 23,
    /// State (24) - RFC 2865
    State = 24,
    /// Class (25) - RFC 2865
    Class = 25,
    /// Vendor-Specific (26) - RFC 2865
    VendorSpecific = 26,
    /// Session-Timeout (27) - RFC 2865
    SessionTimeout = 27,
}

/// Service-Type values (RFC 2865 Section 5.6)
const SERVICE_TYPE_VALUES: &[(u32, &str)] = &[
    (1, "LOGIN"),
    (2, "FRAMED"),
    (3, "CALLBACK_LOGIN"),
    (4, "CALLBACK_FRAMED"),
    (5, "OUTBOUND"),
    (6, "ADMINISTRATIVE"),
    (7, "NAS_PROMPT"),
    (8, "AUTHENTICATE_ONLY"),
    (9, "CALLBACK_NAS_PROMPT"),
    (10, "CALL_CHECK"),
    (11, "CALLBACK_ADMINISTRATIVE"),
];

/// Framed-Protocol values (RFC 2865 Section 5.7)
const FRAMED_PROTOCOL_VALUES: &[(u32, &str)] = &[
    (1, "PPP"),
    (2, "SLIP"),
    (3, "ARAP"),
    (4, "GANDALF_SLML"),
    (5, "XYLOGICS_IPX_SLIP"),
    (6, "X75_SYNC"),
];

/// Framed-Routing values (RFC 2865 Section 5.10)
const FRAMED_ROUTING_VALUES: &[(u32, &str)] = &[
    (0, "NONE"),
    (1, "SEND"),
    (2, "LISTEN"),
    (3, "SEND_AND_LISTEN"),
];

/// Framed-Compression values (RFC 2865 Section 5.13)
const FRAMED_COMPRESSION_VALUES: &[(u32, &str)] = &[
    (0, "NONE"),
    (1, "VJ_TCP_IP"),
    (2, "IPX"),
    (3, "STAC_LZS"),
];

/// Login-Service values (RFC 2865 Section 5.15); 7 is unassigned
const LOGIN_SERVICE_VALUES: &[(u32, &str)] = &[
    (0, "TELNET"),
    (1, "RLOGIN"),
    (2, "TCP_CLEAR"),
    (3, "PORTMASTER"),
    (4, "LAT"),
    (5, "X25_PAD"),
    (6, "X25_T3POS"),
    (8, "TCP_CLEAR_QUIET"),
];

impl AttributeType {
    /// Every registered attribute type, in type-id order
    pub const ALL: [AttributeType; 25] = [
        AttributeType::UserName,
        AttributeType::UserPassword,
        AttributeType::ChapPassword,
        AttributeType::NasIpAddress,
        AttributeType::NasPort,
        AttributeType::ServiceType,
        AttributeType::FramedProtocol,
        AttributeType::FramedIpAddress,
        AttributeType::FramedIpNetmask,
        AttributeType::FramedRouting,
        AttributeType::FilterId,
        AttributeType::FramedMtu,
        AttributeType::FramedCompression,
        AttributeType::LoginIpHost,
        AttributeType::LoginService,
        AttributeType::LoginTcpPort,
        AttributeType::ReplyMessage,
        AttributeType::CallbackNumber,
        AttributeType::CallbackId,
        AttributeType::FramedRoute,
        AttributeType::FramedIpxNetwork,
        AttributeType::State,
        AttributeType::Class,
        AttributeType::VendorSpecific,
        AttributeType::SessionTimeout,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(AttributeType::UserName),
            2 => Some(AttributeType::UserPassword),
            3 => Some(AttributeType::ChapPassword),
            4 => Some(AttributeType::NasIpAddress),
            5 => Some(AttributeType::NasPort),
            6 => Some(AttributeType::ServiceType),
            7 => Some(AttributeType::FramedProtocol),
            8 => Some(AttributeType::FramedIpAddress),
            9 => Some(AttributeType::FramedIpNetmask),
            10 => Some(AttributeType::FramedRouting),
            11 => Some(AttributeType::FilterId),
            12 => Some(AttributeType::FramedMtu),
            13 => Some(AttributeType::FramedCompression),
            14 => Some(AttributeType::LoginIpHost),
            15 => Some(AttributeType::LoginService),
            16 => Some(AttributeType::LoginTcpPort),
            18 => Some(AttributeType::ReplyMessage),
            19 => Some(AttributeType::CallbackNumber),
            20 => Some(AttributeType::CallbackId),
            22 => Some(AttributeType::FramedRoute),
            23 => Some(AttributeType::FramedIpxNetwork),
            24 => Some(AttributeType::State),
            25 => Some(AttributeType::Class),
            26 => Some(AttributeType::VendorSpecific),
            27 => Some(AttributeType::SessionTimeout),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Dictionary name, e.g. `User-Name`
    pub fn name(self) -> &'static str {
        match self {
            AttributeType::UserName => "User-Name",
            AttributeType::UserPassword => "User-Password",
            AttributeType::ChapPassword => "CHAP-Password",
            AttributeType::NasIpAddress => "NAS-IP-Address",
            AttributeType::NasPort => "NAS-Port",
            AttributeType::ServiceType => "Service-Type",
            AttributeType::FramedProtocol => "Framed-Protocol",
            AttributeType::FramedIpAddress => "Framed-IP-Address",
            AttributeType::FramedIpNetmask => "Framed-IP-Netmask",
            AttributeType::FramedRouting => "Framed-Routing",
            AttributeType::FilterId => "Filter-Id",
            AttributeType::FramedMtu => "Framed-MTU",
            AttributeType::FramedCompression => "Framed-Compression",
            AttributeType::LoginIpHost => "Login-IP-Host",
            AttributeType::LoginService => "Login-Service",
            AttributeType::LoginTcpPort => "Login-TCP-Port",
            AttributeType::ReplyMessage => "Reply-Message",
            AttributeType::CallbackNumber => "Callback-Number",
            AttributeType::CallbackId => "Callback-Id",
            AttributeType::FramedRoute => "Framed-Route",
            AttributeType::FramedIpxNetwork => "Framed-IPX-Network",
            AttributeType::State => "State",
            AttributeType::Class => "Class",
            AttributeType::VendorSpecific => "Vendor-Specific",
            AttributeType::SessionTimeout => "Session-Timeout",
        }
    }

    /// Look up a type by its dictionary name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Closed value set for enumerated integer attributes, `None` for other kinds
    pub fn enumerated_values(self) -> Option<&'static [(u32, &'static str)]> {
        match self {
            AttributeType::ServiceType => Some(SERVICE_TYPE_VALUES),
            AttributeType::FramedProtocol => Some(FRAMED_PROTOCOL_VALUES),
            AttributeType::FramedRouting => Some(FRAMED_ROUTING_VALUES),
            AttributeType::FramedCompression => Some(FRAMED_COMPRESSION_VALUES),
            AttributeType::LoginService => Some(LOGIN_SERVICE_VALUES),
            _ => None,
        }
    }

    /// Symbolic name of an enumerated value, e.g. Service-Type 2 => `FRAMED`
    pub fn value_name(self, value: u32) -> Option<&'static str> {
        self.enumerated_values()?
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, name)| *name)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
