//! RADIUS attribute registry and typed attribute values

mod attribute;
mod types;

pub use attribute::{
    AddressSelection, Attribute, AttributeError, AttributeValue, UserPassword, VendorAttribute,
    VendorSpecific, FRAMED_MTU_MAX, FRAMED_MTU_MIN,
};
pub use types::AttributeType;
