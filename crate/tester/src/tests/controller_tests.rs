use std::sync::Arc;

use jacarta_interfaces::{Pkcs11Api, ReturnValue, SlotId};

use super::{RecordingSink, soft_token::SoftToken};
use crate::{
    DetachSignal, Diagnostic, DiscoveryError, ErrorCategory, Milestone, Phase, PinError,
    Plaintext, Reporter, SessionController, TOKEN_LABEL, TestOutcome, TesterConfig,
    TokenTestError,
};

const CRYPTO_CALLS: [&str; 5] = [
    "C_GenerateKeyPair",
    "C_SignInit",
    "C_Sign",
    "C_VerifyInit",
    "C_Verify",
];

/// Run the test sequence once and return the outcome handed to the sink
fn run(token: &Arc<SoftToken>, config: &TesterConfig, detach: DetachSignal) -> TestOutcome {
    let (outcome, _) = run_recorded(token, config, detach);
    outcome
}

fn run_recorded(
    token: &Arc<SoftToken>,
    config: &TesterConfig,
    detach: DetachSignal,
) -> (TestOutcome, Arc<RecordingSink>) {
    let sink = RecordingSink::new();
    let reporter = Reporter::new(sink.clone());
    let api: Arc<dyn Pkcs11Api> = token.clone();
    let controller = SessionController::new(api, detach);
    let outcome = controller.run_test_sequence(config, &reporter);
    let outcome = reporter.finish(outcome);
    assert_eq!(sink.outcomes.lock().unwrap().as_slice(), &[outcome.clone()]);
    (outcome, sink)
}

#[test]
fn test_happy_path() {
    jacarta_logger::log_init(None);
    let token = Arc::new(SoftToken::jacarta());
    let (outcome, sink) = run_recorded(&token, &TesterConfig::default(), DetachSignal::default());
    assert_eq!(outcome, TestOutcome::Success);
    assert_eq!(
        sink.milestones(),
        vec![
            Milestone::SlotResolved,
            Milestone::SessionOpen,
            Milestone::Authenticated,
            Milestone::KeysGenerated,
            Milestone::Signed,
            Milestone::Verified,
        ]
    );
    assert!(sink.diagnostics.lock().unwrap().is_empty());

    // the signed notification carries the hex encoded signature
    let notifications = sink.notifications.lock().unwrap();
    assert_eq!(notifications[4].1.len(), 128);

    assert_eq!(
        token.calls(),
        vec![
            "C_Initialize",
            "C_GetSlotList",
            "C_GetTokenInfo",
            "C_OpenSession",
            "C_Login",
            "C_GenerateKeyPair",
            "C_SignInit",
            "C_Sign",
            "C_VerifyInit",
            "C_Verify",
            "C_Logout",
            "C_CloseSession",
            "C_Finalize",
        ]
    );
    assert_eq!(token.open_sessions(), 0);
}

#[test]
fn test_configured_payload_is_signed() {
    let token = Arc::new(SoftToken::jacarta());
    let config = TesterConfig {
        payload: Some(Plaintext::from([0x5A; 128])),
        ..TesterConfig::default()
    };
    assert!(run(&token, &config, DetachSignal::default()).is_success());
}

#[test]
fn test_no_slots() {
    let token = Arc::new(SoftToken::with_models(&[]));
    let (outcome, sink) = run_recorded(&token, &TesterConfig::default(), DetachSignal::default());
    assert_eq!(
        outcome,
        TestOutcome::Failure {
            phase: Phase::Discovery,
            cause: TokenTestError::Discovery(DiscoveryError::NoSlots),
        }
    );
    assert_eq!(outcome.category(), Some(ErrorCategory::Discovery));
    assert!(outcome.to_string().contains("no slots"));
    assert!(sink.milestones().is_empty());
    assert_eq!(token.calls(), vec!["C_Initialize", "C_GetSlotList", "C_Finalize"]);
}

#[test]
fn test_token_not_present() {
    let token = Arc::new(SoftToken::with_models(&["JaCarta PKI", "Rutoken ECP"]));
    let outcome = run(&token, &TesterConfig::default(), DetachSignal::default());
    assert_eq!(
        outcome,
        TestOutcome::Failure {
            phase: Phase::Discovery,
            cause: TokenTestError::Discovery(DiscoveryError::TokenNotPresent),
        }
    );
    assert!(outcome.to_string().contains("token not present"));
    for call in ["C_OpenSession", "C_Login"].iter().chain(CRYPTO_CALLS.iter()) {
        assert_eq!(token.count(call), 0, "{call} must not be called");
    }
    assert_eq!(token.count("C_Finalize"), 1);
}

#[test]
fn test_pin_locked() {
    let token = Arc::new(SoftToken::jacarta());
    token.fail("C_Login", ReturnValue::PIN_LOCKED);
    let (outcome, sink) = run_recorded(&token, &TesterConfig::default(), DetachSignal::default());
    assert_eq!(
        outcome,
        TestOutcome::Failure {
            phase: Phase::Login,
            cause: TokenTestError::Pin(PinError::Locked),
        }
    );
    assert_eq!(outcome.category(), Some(ErrorCategory::PinLocked));
    assert!(outcome.cause().and_then(TokenTestError::hint).is_some());
    for call in CRYPTO_CALLS {
        assert_eq!(token.count(call), 0, "{call} must not be called");
    }
    // logout is still attempted on the open session, its refusal is a diagnostic
    let calls = token.calls();
    assert_eq!(
        &calls[calls.len() - 3..],
        &["C_Logout", "C_CloseSession", "C_Finalize"]
    );
    assert_eq!(
        sink.diagnostics.lock().unwrap().as_slice(),
        &[Diagnostic {
            operation: "C_Logout",
            code: ReturnValue::USER_NOT_LOGGED_IN,
        }]
    );
    assert_eq!(token.open_sessions(), 0);
}

#[test]
fn test_pin_not_initialized() {
    let token = Arc::new(SoftToken::jacarta());
    token.fail("C_Login", ReturnValue::USER_PIN_NOT_INITIALIZED);
    let outcome = run(&token, &TesterConfig::default(), DetachSignal::default());
    assert_eq!(outcome.phase(), Some(Phase::Login));
    assert_eq!(outcome.category(), Some(ErrorCategory::PinUninitialized));
}

#[test]
fn test_wrong_pin_is_an_operation_failure() {
    let token = Arc::new(SoftToken::jacarta());
    let config = TesterConfig {
        user_pin: "00000000".to_owned().into(),
        ..TesterConfig::default()
    };
    let outcome = run(&token, &config, DetachSignal::default());
    assert_eq!(
        outcome,
        TestOutcome::Failure {
            phase: Phase::Login,
            cause: TokenTestError::Session {
                operation: "C_Login",
                code: ReturnValue::PIN_INCORRECT,
            },
        }
    );
    assert_eq!(outcome.category(), Some(ErrorCategory::OperationFailed));
}

#[test]
fn test_already_initialized_and_logged_in_are_accepted() {
    let token = Arc::new(SoftToken::jacarta());
    token.fail("C_Initialize", ReturnValue::CRYPTOKI_ALREADY_INITIALIZED);
    token.fail("C_Login", ReturnValue::USER_ALREADY_LOGGED_IN);
    // the soft token did not record the login, so the crypto calls are refused
    let outcome = run(&token, &TesterConfig::default(), DetachSignal::default());
    assert_eq!(outcome.phase(), Some(Phase::GenerateKeyPair));
    assert_eq!(
        outcome.cause().and_then(TokenTestError::code),
        Some(ReturnValue::USER_NOT_LOGGED_IN)
    );
}

#[test]
fn test_initialize_failure() {
    let token = Arc::new(SoftToken::jacarta());
    token.fail("C_Initialize", ReturnValue::HOST_MEMORY);
    let outcome = run(&token, &TesterConfig::default(), DetachSignal::default());
    assert_eq!(
        outcome,
        TestOutcome::Failure {
            phase: Phase::Initialize,
            cause: TokenTestError::Library {
                operation: "C_Initialize",
                code: ReturnValue::HOST_MEMORY,
            },
        }
    );
    assert_eq!(token.calls(), vec!["C_Initialize", "C_Finalize"]);
}

#[test]
fn test_verification_failure_is_reported_as_such() {
    let token = Arc::new(SoftToken::jacarta());
    token.fail("C_Verify", ReturnValue::SIGNATURE_INVALID);
    let (outcome, sink) = run_recorded(&token, &TesterConfig::default(), DetachSignal::default());
    assert_eq!(
        outcome,
        TestOutcome::Failure {
            phase: Phase::Verify,
            cause: TokenTestError::VerificationFailed,
        }
    );
    assert_eq!(outcome.category(), Some(ErrorCategory::VerificationFailed));
    assert_eq!(sink.milestones().last(), Some(&Milestone::Signed));
    assert_eq!(token.count("C_Logout"), 1);
}

#[test]
fn test_detach_during_sign() {
    let token = Arc::new(SoftToken::jacarta());
    let detach = DetachSignal::default();
    token.detach_on("C_Sign", detach.clone());
    let (outcome, sink) = run_recorded(&token, &TesterConfig::default(), detach);
    assert_eq!(
        outcome,
        TestOutcome::Failure {
            phase: Phase::Sign,
            cause: TokenTestError::DeviceDetached,
        }
    );
    assert_eq!(outcome.category(), Some(ErrorCategory::DeviceDetached));
    assert_eq!(token.count("C_Verify"), 0);
    // one teardown
    assert_eq!(token.count("C_Logout"), 1);
    assert_eq!(token.count("C_CloseSession"), 1);
    assert_eq!(token.count("C_Finalize"), 1);
    assert_eq!(sink.outcomes.lock().unwrap().len(), 1);
}

#[test]
fn test_detach_before_run() {
    let token = Arc::new(SoftToken::jacarta());
    let detach = DetachSignal::default();
    detach.raise();
    let outcome = run(&token, &TesterConfig::default(), detach);
    assert_eq!(
        outcome,
        TestOutcome::Failure {
            phase: Phase::Initialize,
            cause: TokenTestError::DeviceDetached,
        }
    );
    assert!(token.calls().is_empty());
}

#[test]
fn test_device_removed_status_is_a_detach() {
    let token = Arc::new(SoftToken::jacarta());
    token.fail("C_OpenSession", ReturnValue::DEVICE_REMOVED);
    let outcome = run(&token, &TesterConfig::default(), DetachSignal::default());
    assert_eq!(outcome.phase(), Some(Phase::OpenSession));
    assert_eq!(outcome.category(), Some(ErrorCategory::DeviceDetached));
    assert_eq!(token.count("C_CloseSession"), 0);
    assert_eq!(token.count("C_Finalize"), 1);
}

#[test]
fn test_removed_reader_during_discovery_is_a_directory_fault() {
    let token = Arc::new(SoftToken::with_models(&["Other", "JaCarta GOST 2.0"]));
    token.fail("C_GetTokenInfo", ReturnValue::TOKEN_NOT_PRESENT);
    let outcome = run(&token, &TesterConfig::default(), DetachSignal::default());
    assert_eq!(
        outcome,
        TestOutcome::Failure {
            phase: Phase::Discovery,
            cause: TokenTestError::Discovery(DiscoveryError::Directory {
                operation: "C_GetTokenInfo",
                slot: Some(SlotId(1)),
                code: ReturnValue::TOKEN_NOT_PRESENT,
            }),
        }
    );
    assert_eq!(outcome.category(), Some(ErrorCategory::Discovery));
    assert_eq!(token.count("C_OpenSession"), 0);
    assert_eq!(token.count("C_Finalize"), 1);
}

#[test]
fn test_teardown_errors_are_diagnostics() {
    let token = Arc::new(SoftToken::jacarta());
    token.fail("C_Sign", ReturnValue::FUNCTION_FAILED);
    token.fail("C_Logout", ReturnValue::GENERAL_ERROR);
    token.fail("C_Finalize", ReturnValue::GENERAL_ERROR);
    let (outcome, sink) = run_recorded(&token, &TesterConfig::default(), DetachSignal::default());
    // the primary cause is kept
    assert_eq!(
        outcome,
        TestOutcome::Failure {
            phase: Phase::Sign,
            cause: TokenTestError::CryptoOperation {
                operation: "C_Sign",
                code: ReturnValue::FUNCTION_FAILED,
            },
        }
    );
    assert_eq!(
        sink.diagnostics.lock().unwrap().as_slice(),
        &[
            Diagnostic {
                operation: "C_Logout",
                code: ReturnValue::GENERAL_ERROR
            },
            Diagnostic {
                operation: "C_Finalize",
                code: ReturnValue::GENERAL_ERROR
            },
        ]
    );
    // close is still attempted after a failed logout, finalize comes last
    let calls = token.calls();
    assert_eq!(
        &calls[calls.len() - 3..],
        &["C_Logout", "C_CloseSession", "C_Finalize"]
    );
}

#[test]
fn test_init_token() {
    let token = Arc::new(SoftToken::jacarta());
    let sink = RecordingSink::new();
    let reporter = Reporter::new(sink.clone());
    let api: Arc<dyn Pkcs11Api> = token.clone();
    let controller = SessionController::new(api, DetachSignal::default());
    let outcome = controller.run_init_token(&TesterConfig::default(), "87654321", &reporter);
    let outcome = reporter.finish(outcome);
    assert!(outcome.is_success());
    assert_eq!(token.initialized_label().as_deref(), Some(TOKEN_LABEL));
    assert_eq!(
        sink.milestones(),
        vec![Milestone::SlotResolved, Milestone::TokenInitialized]
    );
    assert_eq!(
        token.calls(),
        vec![
            "C_Initialize",
            "C_GetSlotList",
            "C_GetTokenInfo",
            "C_InitToken",
            "C_Finalize"
        ]
    );
}
