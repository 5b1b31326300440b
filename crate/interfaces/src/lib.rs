//! Copyright 2024 JaCarta tester developers

mod pkcs11;

pub use pkcs11::{
    Attribute, AttributeValue, Mechanism, MechanismType, ObjectHandle, Pkcs11Api, Pkcs11Result,
    PrivateKeyHandle, PublicKeyHandle, ReturnValue, SessionFlags, SessionHandle, SlotId,
    TokenFlags, TokenInfo, UserType, attribute, mechanism,
};
