//! Copyright 2024 JaCarta tester developers
//!
//! Exercises a JaCarta GOST 2.0 token through any [`jacarta_interfaces::Pkcs11Api`]
//! implementation: the token slot is resolved, a user session opened, a GOST key pair
//! generated, and a random payload signed then verified. Each phase is reported to an
//! [`EventSink`] and every run ends with exactly one [`TestOutcome`].

mod config;
mod controller;
mod directory;
mod error;
mod outcome;
mod pipeline;
mod reporter;
mod runner;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_USER_PIN, JACARTA_GOST_MODEL, TesterConfig};
pub use controller::{DetachSignal, SessionController, TOKEN_LABEL};
pub use directory::TokenDirectory;
pub use error::{DiscoveryError, ErrorCategory, PinError, TokenTestError, TokenTestResult};
pub use outcome::{Diagnostic, Milestone, Phase, TestOutcome};
pub use pipeline::{
    AuthenticatedSession, KeyPair, PLAINTEXT_LENGTH, Plaintext, PlaintextError,
    SIGNATURE_CAPACITY, Signature,
};
pub use reporter::{ChannelSink, Event, EventSink, Reporter};
pub use runner::{RunHandle, RunnerError, TokenTester};
