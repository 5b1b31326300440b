//! GOST key generation, signature and verification over an authenticated session.
//!
//! Every operation of this module requires an [`AuthenticatedSession`], which only the
//! session controller hands out after a successful login. Key handles borrow the session
//! they were generated in and cannot outlive it.

use std::fmt::{self, Debug, Formatter};

use jacarta_interfaces::{
    Pkcs11Api, PrivateKeyHandle, PublicKeyHandle, ReturnValue, SessionHandle,
};
use jacarta_logger::{debug, info};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    TesterConfig, TokenTestError, TokenTestResult,
    error::CallKind,
};

/// Size of the signed payload
pub const PLAINTEXT_LENGTH: usize = 128;

/// Capacity of the signature buffer: a GOST R 34.10-2012 (256 bits) signature
pub const SIGNATURE_CAPACITY: usize = 64;

#[derive(Error, Debug)]
pub enum PlaintextError {
    #[error("the payload must be {PLAINTEXT_LENGTH} bytes long, got {0}")]
    Length(usize),

    #[error("the payload is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// The data signed then verified during a run.
///
/// Immutable once created; sign and verify read the same bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Plaintext([u8; PLAINTEXT_LENGTH]);

impl Plaintext {
    /// Fresh random data from the thread-local CSPRNG
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = [0_u8; PLAINTEXT_LENGTH];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PLAINTEXT_LENGTH] {
        &self.0
    }
}

impl From<[u8; PLAINTEXT_LENGTH]> for Plaintext {
    fn from(bytes: [u8; PLAINTEXT_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Plaintext {
    type Error = PlaintextError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; PLAINTEXT_LENGTH]>::try_from(bytes)
            .map(Self)
            .map_err(|_| PlaintextError::Length(bytes.len()))
    }
}

impl TryFrom<String> for Plaintext {
    type Error = PlaintextError;

    fn try_from(hex_payload: String) -> Result<Self, Self::Error> {
        Self::try_from(hex::decode(hex_payload.trim())?.as_slice())
    }
}

impl From<Plaintext> for String {
    fn from(plaintext: Plaintext) -> Self {
        hex::encode(plaintext.0)
    }
}

impl Debug for Plaintext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Plaintext({})", hex::encode(self.0))
    }
}

/// A signature as produced by the token: a fixed capacity buffer and the length reported
/// by `C_Sign`
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    buffer: [u8; SIGNATURE_CAPACITY],
    len: usize,
}

impl Signature {
    /// The populated bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

/// A logged in session on the token
pub struct AuthenticatedSession<'a> {
    api: &'a dyn Pkcs11Api,
    session: SessionHandle,
}

impl<'a> AuthenticatedSession<'a> {
    pub(crate) const fn new(api: &'a dyn Pkcs11Api, session: SessionHandle) -> Self {
        Self { api, session }
    }

    #[must_use]
    pub const fn handle(&self) -> SessionHandle {
        self.session
    }

    /// Generate a GOST key pair on the token with the configured templates
    pub fn generate_key_pair(&self, config: &TesterConfig) -> TokenTestResult<KeyPair<'_>> {
        let mechanism = TesterConfig::key_pair_mechanism();
        debug!("generating key pair with {mechanism}");
        let (public_key, private_key) = self
            .api
            .generate_key_pair(
                self.session,
                &mechanism,
                &config.public_key_template,
                &config.private_key_template,
            )
            .map_err(|code| TokenTestError::classify(CallKind::Crypto, "C_GenerateKeyPair", code))?;
        debug!("generated key pair, public key: {public_key:?}");
        Ok(KeyPair {
            session: self,
            public_key,
            private_key,
        })
    }
}

/// The key pair generated during a run. Its handles are only valid in the session that
/// produced them.
pub struct KeyPair<'s> {
    session: &'s AuthenticatedSession<'s>,
    public_key: PublicKeyHandle,
    private_key: PrivateKeyHandle,
}

impl KeyPair<'_> {
    #[must_use]
    pub const fn public_key(&self) -> PublicKeyHandle {
        self.public_key
    }

    /// Sign `plaintext` with the private key.
    ///
    /// A signature that does not fit the 64 byte buffer is an error: it is never
    /// truncated.
    pub fn sign(&self, plaintext: &Plaintext) -> TokenTestResult<Signature> {
        let api = self.session.api;
        let session = self.session.session;
        let mechanism = TesterConfig::signature_mechanism();
        api.sign_init(session, &mechanism, self.private_key)
            .map_err(|code| TokenTestError::classify(CallKind::Crypto, "C_SignInit", code))?;

        let mut buffer = [0_u8; SIGNATURE_CAPACITY];
        let len = match api.sign(session, plaintext.as_bytes(), &mut buffer) {
            Ok(len) => len,
            Err(ReturnValue::BUFFER_TOO_SMALL) => {
                return Err(TokenTestError::UnexpectedSignatureLength {
                    produced: None,
                    capacity: SIGNATURE_CAPACITY,
                });
            }
            Err(code) => {
                return Err(TokenTestError::classify(CallKind::Crypto, "C_Sign", code));
            }
        };
        if len > SIGNATURE_CAPACITY {
            return Err(TokenTestError::UnexpectedSignatureLength {
                produced: Some(len),
                capacity: SIGNATURE_CAPACITY,
            });
        }
        info!("signed {PLAINTEXT_LENGTH} bytes with {mechanism}: {len} byte signature");
        Ok(Signature { buffer, len })
    }

    /// Verify `signature` over `plaintext` with the public key.
    ///
    /// An invalid signature fails with [`TokenTestError::VerificationFailed`]; any other
    /// non-OK status is an operation failure.
    pub fn verify(&self, plaintext: &Plaintext, signature: &[u8]) -> TokenTestResult<()> {
        let api = self.session.api;
        let session = self.session.session;
        let mechanism = TesterConfig::signature_mechanism();
        api.verify_init(session, &mechanism, self.public_key)
            .map_err(|code| TokenTestError::classify(CallKind::Crypto, "C_VerifyInit", code))?;
        match api.verify(session, plaintext.as_bytes(), signature) {
            Ok(()) => Ok(()),
            Err(ReturnValue::SIGNATURE_INVALID | ReturnValue::SIGNATURE_LEN_RANGE) => {
                Err(TokenTestError::VerificationFailed)
            }
            Err(code) => Err(TokenTestError::classify(CallKind::Crypto, "C_Verify", code)),
        }
    }
}
