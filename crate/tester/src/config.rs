use std::fmt::{self, Debug, Formatter};

use jacarta_interfaces::{
    Attribute, Mechanism,
    attribute::{
        CKK_GOSTR3410, CKO_PRIVATE_KEY, CKO_PUBLIC_KEY, GOSTR3410_CRYPTOPRO_A_PARAMS,
        GOSTR3411_2012_256_PARAMS,
    },
    mechanism::{CKM_GOSTR3410_KEY_PAIR_GEN, CKM_GOSTR3410_WITH_GOSTR3411_12_256},
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::Plaintext;

/// Model string of the tokens this tester is written for
pub const JACARTA_GOST_MODEL: &str = "JaCarta GOST 2.0";

/// Factory default user PIN of JaCarta GOST 2.0 tokens
pub const DEFAULT_USER_PIN: &str = "1234567890";

/// `CKA_ID` shared by the generated public and private keys
const KEY_PAIR_ID: u32 = 2012;

/// Configuration of a test run.
///
/// Every field has a default: an empty TOML file yields a configuration for a JaCarta GOST
/// 2.0 token with its factory PIN.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TesterConfig {
    /// The substring the token model must contain
    pub model: String,

    /// The user PIN used to log in
    #[serde(skip_serializing)]
    pub user_pin: Zeroizing<String>,

    /// Template of the generated GOST public key
    pub public_key_template: Vec<Attribute>,

    /// Template of the generated GOST private key
    pub private_key_template: Vec<Attribute>,

    /// Hex encoded 128 byte payload to sign instead of random data
    pub payload: Option<Plaintext>,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            model: JACARTA_GOST_MODEL.to_owned(),
            user_pin: Zeroizing::new(DEFAULT_USER_PIN.to_owned()),
            public_key_template: default_public_key_template(),
            private_key_template: default_private_key_template(),
            payload: None,
        }
    }
}

impl Debug for TesterConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TesterConfig")
            .field("model", &self.model)
            .field("user_pin", &"****")
            .field("public_key_template", &self.public_key_template)
            .field("private_key_template", &self.private_key_template)
            .field("payload", &self.payload)
            .finish()
    }
}

impl TesterConfig {
    /// The mechanism used to generate the GOST R 34.10-2012 (256 bits) key pair
    #[must_use]
    pub const fn key_pair_mechanism() -> Mechanism {
        Mechanism::new(CKM_GOSTR3410_KEY_PAIR_GEN)
    }

    /// The mechanism used both to sign and to verify
    #[must_use]
    pub const fn signature_mechanism() -> Mechanism {
        Mechanism::new(CKM_GOSTR3410_WITH_GOSTR3411_12_256)
    }
}

fn key_pair_id() -> Vec<u8> {
    KEY_PAIR_ID.to_be_bytes().to_vec()
}

fn default_public_key_template() -> Vec<Attribute> {
    vec![
        Attribute::Class(CKO_PUBLIC_KEY),
        Attribute::KeyType(CKK_GOSTR3410),
        Attribute::Token(true),
        Attribute::Private(false),
        Attribute::Verify(true),
        Attribute::Id(key_pair_id()),
        Attribute::Gostr3410Params(GOSTR3410_CRYPTOPRO_A_PARAMS.to_vec()),
        Attribute::Gostr3411Params(GOSTR3411_2012_256_PARAMS.to_vec()),
    ]
}

fn default_private_key_template() -> Vec<Attribute> {
    vec![
        Attribute::Class(CKO_PRIVATE_KEY),
        Attribute::KeyType(CKK_GOSTR3410),
        Attribute::Token(true),
        Attribute::Private(true),
        Attribute::Sensitive(true),
        Attribute::Extractable(false),
        Attribute::Sign(true),
        Attribute::Derive(false),
        Attribute::Id(key_pair_id()),
        Attribute::Gostr3410Params(GOSTR3410_CRYPTOPRO_A_PARAMS.to_vec()),
        Attribute::Gostr3411Params(GOSTR3411_2012_256_PARAMS.to_vec()),
    ]
}
