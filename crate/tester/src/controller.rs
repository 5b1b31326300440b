use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use jacarta_interfaces::{Pkcs11Api, ReturnValue, SessionFlags, SessionHandle, SlotId, UserType};
use jacarta_logger::{debug, info, warn};

use crate::{
    AuthenticatedSession, Diagnostic, Milestone, Phase, Plaintext, Reporter, TestOutcome,
    TesterConfig, TokenDirectory, TokenTestError, error::CallKind,
};

/// Label written by the token initialization flow
pub const TOKEN_LABEL: &str = "JaCarta GOST 2.0";

/// Raised when the token goes away while a run is in flight
#[derive(Debug, Clone, Default)]
pub struct DetachSignal(Arc<AtomicBool>);

impl DetachSignal {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

type StepResult<T> = Result<T, (Phase, TokenTestError)>;

/// Drives one test run against the token, from library initialization to teardown.
///
/// The controller owns the library and the session for the duration of the run; the
/// session is released and the library finalized exactly once, whatever the outcome.
pub struct SessionController {
    api: Arc<dyn Pkcs11Api>,
    detach: DetachSignal,
}

impl SessionController {
    #[must_use]
    pub fn new(api: Arc<dyn Pkcs11Api>, detach: DetachSignal) -> Self {
        Self { api, detach }
    }

    /// Run the full sequence: resolve the token, open a session, log in, generate a key
    /// pair, sign a payload and verify the signature.
    ///
    /// Milestones are reported as they are reached; the returned outcome is the one to
    /// hand to [`Reporter::finish`].
    pub fn run_test_sequence(&self, config: &TesterConfig, reporter: &Reporter) -> TestOutcome {
        let mut resources = RunResources::new(self.api.as_ref(), reporter);
        let result = self.test_sequence(config, reporter, &mut resources);
        resources.release();
        into_outcome(result)
    }

    /// Initialize the token found in the first matching slot with `so_pin` and the
    /// JaCarta label
    pub fn run_init_token(
        &self,
        config: &TesterConfig,
        so_pin: &str,
        reporter: &Reporter,
    ) -> TestOutcome {
        let mut resources = RunResources::new(self.api.as_ref(), reporter);
        let result = self.init_token_sequence(config, so_pin, reporter, &mut resources);
        resources.release();
        into_outcome(result)
    }

    fn test_sequence(
        &self,
        config: &TesterConfig,
        reporter: &Reporter,
        resources: &mut RunResources<'_>,
    ) -> StepResult<()> {
        let slot = self.enter(config, reporter, resources)?;

        // resources are recorded as soon as they exist, a detach may still fail the step
        let session = self.step(Phase::OpenSession, || {
            let session = self
                .api
                .open_session(slot, SessionFlags::RW_SESSION | SessionFlags::SERIAL_SESSION)
                .map_err(|code| {
                    TokenTestError::classify(CallKind::Session, "C_OpenSession", code)
                })?;
            resources.session = Some(session);
            Ok(session)
        })?;
        reporter.notify(Milestone::SessionOpen, &format!("session {session}"));

        self.step(Phase::Login, || self.login(session, &config.user_pin))?;
        reporter.notify(Milestone::Authenticated, "logged in as user");

        let authenticated = AuthenticatedSession::new(self.api.as_ref(), session);
        let key_pair = self.step(Phase::GenerateKeyPair, || {
            authenticated.generate_key_pair(config)
        })?;
        reporter.notify(
            Milestone::KeysGenerated,
            &format!("public key {:?}", key_pair.public_key()),
        );

        let plaintext = config.payload.clone().unwrap_or_else(Plaintext::random);
        debug!("payload: {plaintext:?}");
        let signature = self.step(Phase::Sign, || key_pair.sign(&plaintext))?;
        reporter.notify(Milestone::Signed, &signature.to_hex());

        self.step(Phase::Verify, || {
            key_pair.verify(&plaintext, signature.as_bytes())
        })?;
        reporter.notify(Milestone::Verified, "signature is valid");
        Ok(())
    }

    fn init_token_sequence(
        &self,
        config: &TesterConfig,
        so_pin: &str,
        reporter: &Reporter,
        resources: &mut RunResources<'_>,
    ) -> StepResult<()> {
        let slot = self.enter(config, reporter, resources)?;
        self.step(Phase::InitToken, || {
            self.api
                .init_token(slot, so_pin, TOKEN_LABEL)
                .map_err(|code| TokenTestError::classify(CallKind::Library, "C_InitToken", code))
        })?;
        reporter.notify(
            Milestone::TokenInitialized,
            &format!("token in slot {slot} labeled {TOKEN_LABEL:?}"),
        );
        Ok(())
    }

    /// Initialize the library and resolve the token slot
    fn enter(
        &self,
        config: &TesterConfig,
        reporter: &Reporter,
        resources: &mut RunResources<'_>,
    ) -> StepResult<SlotId> {
        self.step(Phase::Initialize, || {
            resources.initialize_attempted = true;
            match self.api.initialize() {
                Ok(()) => Ok(()),
                Err(ReturnValue::CRYPTOKI_ALREADY_INITIALIZED) => {
                    warn!("the PKCS#11 library was already initialized");
                    Ok(())
                }
                Err(code) => Err(TokenTestError::classify(
                    CallKind::Library,
                    "C_Initialize",
                    code,
                )),
            }
        })?;

        let slot = self.step(Phase::Discovery, || {
            TokenDirectory::new(self.api.as_ref())
                .find_slot_by_model_substring(&config.model)
                .map_err(TokenTestError::Discovery)
        })?;
        reporter.notify(Milestone::SlotResolved, &format!("slot {slot}"));
        Ok(slot)
    }

    fn login(&self, session: SessionHandle, pin: &str) -> Result<(), TokenTestError> {
        match self.api.login(session, UserType::User, pin) {
            Ok(()) => Ok(()),
            Err(ReturnValue::USER_ALREADY_LOGGED_IN) => {
                warn!("user already logged in on session {session}");
                Ok(())
            }
            Err(code) => Err(TokenTestError::classify(CallKind::Session, "C_Login", code)),
        }
    }

    /// Run a token call as part of `phase`, observing the detach signal before and after.
    ///
    /// A detach takes precedence over whatever status the call returned.
    fn step<T>(
        &self,
        phase: Phase,
        call: impl FnOnce() -> Result<T, TokenTestError>,
    ) -> StepResult<T> {
        if self.detach.is_raised() {
            return Err((phase, TokenTestError::DeviceDetached));
        }
        let result = call();
        if self.detach.is_raised() {
            return Err((phase, TokenTestError::DeviceDetached));
        }
        result.map_err(|cause| (phase, cause))
    }
}

fn into_outcome(result: StepResult<()>) -> TestOutcome {
    match result {
        Ok(()) => TestOutcome::Success,
        Err((phase, cause)) => TestOutcome::Failure { phase, cause },
    }
}

/// What a run acquired on the token, released in reverse order exactly once.
///
/// Release errors are reported as diagnostics and never replace the outcome.
struct RunResources<'a> {
    api: &'a dyn Pkcs11Api,
    reporter: &'a Reporter,
    initialize_attempted: bool,
    session: Option<SessionHandle>,
    released: bool,
}

impl<'a> RunResources<'a> {
    const fn new(api: &'a dyn Pkcs11Api, reporter: &'a Reporter) -> Self {
        Self {
            api,
            reporter,
            initialize_attempted: false,
            session: None,
            released: false,
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(session) = self.session.take() {
            // logout is attempted even if login failed, a refusal is only a diagnostic
            self.attempt("C_Logout", || self.api.logout(session));
            self.attempt("C_CloseSession", || self.api.close_session(session));
        }
        if self.initialize_attempted {
            self.attempt("C_Finalize", || self.api.finalize());
        }
        info!("run resources released");
    }

    fn attempt(&self, operation: &'static str, call: impl FnOnce() -> Result<(), ReturnValue>) {
        if let Err(code) = call() {
            self.reporter.diagnose(&Diagnostic { operation, code });
        }
    }
}

impl Drop for RunResources<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
