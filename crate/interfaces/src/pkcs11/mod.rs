pub mod attribute;
mod interface;
pub mod mechanism;
mod return_value;
mod types;

pub use attribute::{Attribute, AttributeValue};
pub use interface::{Pkcs11Api, Pkcs11Result};
pub use mechanism::{Mechanism, MechanismType};
pub use return_value::ReturnValue;
pub use types::{
    ObjectHandle, PrivateKeyHandle, PublicKeyHandle, SessionFlags, SessionHandle, SlotId,
    TokenFlags, TokenInfo, UserType,
};
