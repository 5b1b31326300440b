//! Object attributes used in key generation templates.
//!
//! Templates are configuration: they decide whether generated keys are token objects,
//! whether the private key can ever leave the token, and which GOST parameter sets are
//! used. They can be read from a configuration file, e.g. in TOML:
//!
//! ```toml
//! [[public_key_template]]
//! type = "token"
//! value = true
//!
//! [[public_key_template]]
//! type = "gostr3410_params"
//! value = "06072a850302022301"
//! ```

use serde::{Deserialize, Serialize};

pub const CKA_CLASS: u64 = 0x0000_0000;
pub const CKA_TOKEN: u64 = 0x0000_0001;
pub const CKA_PRIVATE: u64 = 0x0000_0002;
pub const CKA_LABEL: u64 = 0x0000_0003;
pub const CKA_KEY_TYPE: u64 = 0x0000_0100;
pub const CKA_ID: u64 = 0x0000_0102;
pub const CKA_SENSITIVE: u64 = 0x0000_0103;
pub const CKA_SIGN: u64 = 0x0000_0108;
pub const CKA_VERIFY: u64 = 0x0000_010A;
pub const CKA_DERIVE: u64 = 0x0000_010C;
pub const CKA_EXTRACTABLE: u64 = 0x0000_0162;
pub const CKA_GOSTR3410_PARAMS: u64 = 0x0000_0250;
pub const CKA_GOSTR3411_PARAMS: u64 = 0x0000_0251;

pub const CKO_PUBLIC_KEY: u64 = 0x0000_0002;
pub const CKO_PRIVATE_KEY: u64 = 0x0000_0003;

pub const CKK_GOSTR3410: u64 = 0x0000_0030;

/// DER encoded OID 1.2.643.2.2.35.1 (CryptoPro-A curve)
pub const GOSTR3410_CRYPTOPRO_A_PARAMS: &[u8] =
    &[0x06, 0x07, 0x2a, 0x85, 0x03, 0x02, 0x02, 0x23, 0x01];

/// DER encoded OID 1.2.643.7.1.1.2.2 (GOST R 34.11-2012, 256 bits)
pub const GOSTR3411_2012_256_PARAMS: &[u8] =
    &[0x06, 0x08, 0x2a, 0x85, 0x03, 0x07, 0x01, 0x01, 0x02, 0x02];

/// A single `CK_ATTRIBUTE` of a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Attribute {
    Class(u64),
    KeyType(u64),
    Token(bool),
    Private(bool),
    Sensitive(bool),
    Extractable(bool),
    Sign(bool),
    Verify(bool),
    Derive(bool),
    Label(String),
    Id(#[serde(with = "hex")] Vec<u8>),
    Gostr3410Params(#[serde(with = "hex")] Vec<u8>),
    Gostr3411Params(#[serde(with = "hex")] Vec<u8>),
}

/// The value of an attribute, before it is encoded for the native library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    Bool(bool),
    Ulong(u64),
    Bytes(&'a [u8]),
}

impl Attribute {
    /// The `CKA_` type of this attribute
    #[must_use]
    pub const fn attribute_type(&self) -> u64 {
        match self {
            Self::Class(_) => CKA_CLASS,
            Self::KeyType(_) => CKA_KEY_TYPE,
            Self::Token(_) => CKA_TOKEN,
            Self::Private(_) => CKA_PRIVATE,
            Self::Sensitive(_) => CKA_SENSITIVE,
            Self::Extractable(_) => CKA_EXTRACTABLE,
            Self::Sign(_) => CKA_SIGN,
            Self::Verify(_) => CKA_VERIFY,
            Self::Derive(_) => CKA_DERIVE,
            Self::Label(_) => CKA_LABEL,
            Self::Id(_) => CKA_ID,
            Self::Gostr3410Params(_) => CKA_GOSTR3410_PARAMS,
            Self::Gostr3411Params(_) => CKA_GOSTR3411_PARAMS,
        }
    }

    #[must_use]
    pub fn value(&self) -> AttributeValue<'_> {
        match self {
            Self::Class(v) | Self::KeyType(v) => AttributeValue::Ulong(*v),
            Self::Token(b)
            | Self::Private(b)
            | Self::Sensitive(b)
            | Self::Extractable(b)
            | Self::Sign(b)
            | Self::Verify(b)
            | Self::Derive(b) => AttributeValue::Bool(*b),
            Self::Label(label) => AttributeValue::Bytes(label.as_bytes()),
            Self::Id(bytes) | Self::Gostr3410Params(bytes) | Self::Gostr3411Params(bytes) => {
                AttributeValue::Bytes(bytes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Attribute, AttributeValue, CKA_GOSTR3410_PARAMS, GOSTR3410_CRYPTOPRO_A_PARAMS};

    #[test]
    fn test_deserialize_template() {
        let json = r#"[
            {"type": "token", "value": true},
            {"type": "gostr3410_params", "value": "06072a850302022301"},
            {"type": "label", "value": "test key"}
        ]"#;
        let template: Vec<Attribute> = serde_json::from_str(json).unwrap();
        assert_eq!(
            template,
            vec![
                Attribute::Token(true),
                Attribute::Gostr3410Params(GOSTR3410_CRYPTOPRO_A_PARAMS.to_vec()),
                Attribute::Label("test key".to_owned()),
            ]
        );
        assert_eq!(template[1].attribute_type(), CKA_GOSTR3410_PARAMS);
        assert_eq!(template[0].value(), AttributeValue::Bool(true));
    }
}
