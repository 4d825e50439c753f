use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{MoveError, Moveable, testing::Times};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Unexpected invocation {0}: strict mock has no matching setup")]
    UnexpectedInvocation(String),
    #[error("Invocation {0} matched a setup without a return value")]
    MissingReturnValue(String),
    #[error("Setup for {0} cannot return a value")]
    ValueOnFail(String),
    #[error("Setup for {0} was cleared by reset")]
    StaleSetup(String),
    #[error("Expected {call} to be invoked {expected}, but it was invoked {actual} times")]
    CallCountMismatch {
        call: String,
        expected: Times,
        actual: usize,
    },
    #[error("Setups never matched: {}", .0.join(", "))]
    UnmatchedSetups(Vec<String>),
}

/// How the mock treats invocations that match no setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockBehavior {
    /// Unmatched invocations panic
    #[default]
    Strict,
    /// Unmatched invocations return `0` or `Ok(())`
    Loose,
}

/// Argument matcher for the integer-taking operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Any,
    Is(i32),
}

impl Arg {
    pub fn any() -> Self {
        Arg::Any
    }

    pub fn is(value: i32) -> Self {
        Arg::Is(value)
    }

    pub fn matches(&self, value: i32) -> bool {
        match self {
            Arg::Any => true,
            Arg::Is(expected) => *expected == value,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Any => write!(f, "any"),
            Arg::Is(value) => write!(f, "{}", value),
        }
    }
}

/// Pattern describing which invocations a setup or verification applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    MoveOnce,
    MoveTo(Arg),
    MoveExactlyTo(Arg),
    Fail,
}

impl Call {
    pub fn matches(&self, invocation: &Invocation) -> bool {
        match (self, invocation) {
            (Call::MoveOnce, Invocation::MoveOnce) => true,
            (Call::MoveTo(arg), Invocation::MoveTo(value)) => arg.matches(*value),
            (Call::MoveExactlyTo(arg), Invocation::MoveExactlyTo(value)) => arg.matches(*value),
            (Call::Fail, Invocation::Fail) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::MoveOnce => write!(f, "move_once()"),
            Call::MoveTo(arg) => write!(f, "move_to({})", arg),
            Call::MoveExactlyTo(arg) => write!(f, "move_exactly_to({})", arg),
            Call::Fail => write!(f, "fail()"),
        }
    }
}

/// A recorded call with its concrete argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    MoveOnce,
    MoveTo(i32),
    MoveExactlyTo(i32),
    Fail,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::MoveOnce => write!(f, "move_once()"),
            Invocation::MoveTo(value) => write!(f, "move_to({})", value),
            Invocation::MoveExactlyTo(value) => write!(f, "move_exactly_to({})", value),
            Invocation::Fail => write!(f, "fail()"),
        }
    }
}

#[derive(Debug, Clone)]
enum Response {
    Value(i32),
    Failure(MoveError),
}

#[derive(Debug)]
struct SetupEntry {
    call: Call,
    response: Option<Response>,
    verifiable: bool,
    matched: usize,
}

#[derive(Debug, Default)]
struct MockState {
    setups: Vec<SetupEntry>,
    invocations: Vec<Invocation>,
    /// Bumped by every reset so setups programmed earlier can be told apart
    generation: u64,
}

/// Programmable stand-in for [`Moveable`].
///
/// Clones share setups and recorded invocations, so a clone kept by the test
/// can verify calls made through a copy that was moved into a
/// [`Carton`](crate::Carton). When several setups match an invocation the one
/// programmed last wins.
#[derive(Clone, Debug)]
pub struct MockMoveable {
    behavior: MockBehavior,
    state: Arc<Mutex<MockState>>,
}

impl Default for MockMoveable {
    fn default() -> Self {
        Self::new(MockBehavior::default())
    }
}

impl MockMoveable {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn strict() -> Self {
        Self::new(MockBehavior::Strict)
    }

    pub fn loose() -> Self {
        Self::new(MockBehavior::Loose)
    }

    pub fn behavior(&self) -> MockBehavior {
        self.behavior
    }

    /// Program a response for invocations matching `call`
    pub fn setup(&self, call: Call) -> Setup<'_> {
        debug!(%call, "Programming mock setup");
        let mut state = self.lock();
        state.setups.push(SetupEntry {
            call,
            response: None,
            verifiable: false,
            matched: 0,
        });
        Setup {
            mock: self,
            call,
            index: state.setups.len() - 1,
            generation: state.generation,
        }
    }

    /// All invocations recorded so far, in call order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock().invocations.clone()
    }

    pub fn invocation_count(&self) -> usize {
        self.lock().invocations.len()
    }

    /// Check how many recorded invocations match `call`
    pub fn verify(&self, call: Call, times: Times) -> Result<(), VerificationError> {
        let actual = self
            .lock()
            .invocations
            .iter()
            .filter(|invocation| call.matches(invocation))
            .count();
        if times.matches(actual) {
            Ok(())
        } else {
            Err(VerificationError::CallCountMismatch {
                call: call.to_string(),
                expected: times,
                actual,
            })
        }
    }

    /// Every setup marked [`Setup::verifiable`] must have matched at least once
    pub fn verify_verifiable(&self) -> Result<(), VerificationError> {
        self.verify_setups(|setup| setup.verifiable)
    }

    /// Every setup must have matched at least once, verifiable or not
    pub fn verify_all(&self) -> Result<(), VerificationError> {
        self.verify_setups(|_| true)
    }

    /// Forget all setups and recorded invocations
    pub fn reset(&self) {
        let mut state = self.lock();
        state.setups.clear();
        state.invocations.clear();
        state.generation += 1;
    }

    fn verify_setups(
        &self,
        include: impl Fn(&SetupEntry) -> bool,
    ) -> Result<(), VerificationError> {
        let unmatched: Vec<String> = self
            .lock()
            .setups
            .iter()
            .filter(|setup| include(setup) && setup.matched == 0)
            .map(|setup| setup.call.to_string())
            .collect();
        if unmatched.is_empty() {
            Ok(())
        } else {
            Err(VerificationError::UnmatchedSetups(unmatched))
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A strict-mode panic never happens while the lock is held, but a
        // panicking test body might; the state is still consistent then.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the invocation and look up the response of the latest matching setup.
    /// `Err` means no setup matched.
    fn record(&self, invocation: Invocation) -> Result<Option<Response>, ()> {
        let mut state = self.lock();
        state.invocations.push(invocation);
        match state
            .setups
            .iter_mut()
            .rev()
            .find(|setup| setup.call.matches(&invocation))
        {
            Some(setup) => {
                setup.matched += 1;
                Ok(setup.response.clone())
            }
            None => Err(()),
        }
    }

    fn invoke_value(&self, invocation: Invocation) -> i32 {
        trace!(%invocation, "Mock invoked");
        match self.record(invocation) {
            Ok(Some(Response::Value(value))) => value,
            Ok(Some(Response::Failure(err))) => panic!("{}: {}", invocation, err),
            Ok(None) if self.behavior == MockBehavior::Strict => {
                panic!(
                    "{}",
                    VerificationError::MissingReturnValue(invocation.to_string())
                )
            }
            Ok(None) => 0,
            Err(()) => {
                self.unmatched(invocation);
                0
            }
        }
    }

    fn unmatched(&self, invocation: Invocation) {
        if self.behavior == MockBehavior::Strict {
            warn!(%invocation, "Strict mock received an unexpected invocation");
            panic!(
                "{}",
                VerificationError::UnexpectedInvocation(invocation.to_string())
            );
        }
    }
}

impl Moveable for MockMoveable {
    fn move_once(&self) -> i32 {
        self.invoke_value(Invocation::MoveOnce)
    }

    fn move_to(&self, target: i32) -> i32 {
        self.invoke_value(Invocation::MoveTo(target))
    }

    fn move_exactly_to(&self, target: i32) -> i32 {
        self.invoke_value(Invocation::MoveExactlyTo(target))
    }

    fn fail(&self) -> Result<(), MoveError> {
        trace!(invocation = %Invocation::Fail, "Mock invoked");
        match self.record(Invocation::Fail) {
            Ok(Some(Response::Failure(err))) => Err(err),
            Ok(_) => Ok(()),
            Err(()) => {
                self.unmatched(Invocation::Fail);
                Ok(())
            }
        }
    }
}

/// Builder returned by [`MockMoveable::setup`]
pub struct Setup<'a> {
    mock: &'a MockMoveable,
    call: Call,
    index: usize,
    generation: u64,
}

impl Setup<'_> {
    /// Panics for [`Call::Fail`], which has no value to return
    pub fn returns(self, value: i32) -> Self {
        if self.call == Call::Fail {
            panic!("{}", VerificationError::ValueOnFail(self.call.to_string()));
        }
        self.update(|setup| setup.response = Some(Response::Value(value)))
    }

    /// Fail with [`MoveError::Failed`]
    pub fn fails(self) -> Self {
        self.fails_with(MoveError::Failed)
    }

    /// For `fail()` the error is returned; the integer operations panic with it
    pub fn fails_with(self, err: MoveError) -> Self {
        self.update(|setup| setup.response = Some(Response::Failure(err)))
    }

    /// Include this setup in [`MockMoveable::verify_verifiable`]
    pub fn verifiable(self) -> Self {
        self.update(|setup| setup.verifiable = true)
    }

    /// Panics if the mock was reset after this setup was programmed
    fn update(self, apply: impl FnOnce(&mut SetupEntry)) -> Self {
        let applied = {
            let mut guard = self.mock.lock();
            let state = &mut *guard;
            match state.setups.get_mut(self.index) {
                Some(setup) if state.generation == self.generation => {
                    apply(setup);
                    true
                }
                _ => false,
            }
        };
        if !applied {
            panic!("{}", VerificationError::StaleSetup(self.call.to_string()));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn test_returns_programmed_values() {
        let mock = MockMoveable::strict();
        mock.setup(Call::MoveOnce).returns(2);
        mock.setup(Call::MoveTo(Arg::is(2))).returns(4);
        mock.setup(Call::MoveExactlyTo(Arg::any())).returns(8);

        assert_eq!(mock.move_once(), 2);
        assert_eq!(mock.move_to(2), 4);
        assert_eq!(mock.move_exactly_to(1234), 8);
        assert_eq!(mock.move_exactly_to(-1), 8);
    }

    #[test]
    fn test_fail_returns_programmed_error() {
        let mock = MockMoveable::strict();
        mock.setup(Call::Fail).fails();
        assert_eq!(mock.fail(), Err(MoveError::Failed));

        mock.setup(Call::Fail)
            .fails_with(MoveError::Custom("jammed".to_string()));
        assert_eq!(mock.fail(), Err(MoveError::Custom("jammed".to_string())));
    }

    #[test]
    fn test_latest_matching_setup_wins() {
        let mock = MockMoveable::strict();
        mock.setup(Call::MoveTo(Arg::any())).returns(1);
        mock.setup(Call::MoveTo(Arg::is(5))).returns(50);

        assert_eq!(mock.move_to(5), 50);
        assert_eq!(mock.move_to(6), 1);
    }

    #[test]
    #[should_panic(expected = "Unexpected invocation move_once()")]
    fn test_strict_rejects_unprogrammed_call() {
        let mock = MockMoveable::strict();
        mock.move_once();
    }

    #[test]
    #[should_panic(expected = "Unexpected invocation move_to(3)")]
    fn test_strict_rejects_unmatched_argument() {
        let mock = MockMoveable::strict();
        mock.setup(Call::MoveTo(Arg::is(2))).returns(4);
        mock.move_to(3);
    }

    #[test]
    #[should_panic(expected = "Unexpected invocation fail()")]
    fn test_strict_rejects_unprogrammed_fail() {
        let mock = MockMoveable::strict();
        let _ = mock.fail();
    }

    #[test]
    #[should_panic(expected = "without a return value")]
    fn test_strict_requires_return_value() {
        let mock = MockMoveable::strict();
        mock.setup(Call::MoveOnce).verifiable();
        mock.move_once();
    }

    #[test]
    #[should_panic(expected = "move_once(): Move failed")]
    fn test_failure_on_value_operation_panics() {
        let mock = MockMoveable::strict();
        mock.setup(Call::MoveOnce).fails();
        mock.move_once();
    }

    #[test]
    fn test_loose_returns_defaults() {
        let mock = MockMoveable::loose();
        assert_eq!(mock.move_once(), 0);
        assert_eq!(mock.move_to(10), 0);
        assert_eq!(mock.move_exactly_to(10), 0);
        assert!(mock.fail().is_ok());
        assert_eq!(mock.invocation_count(), 4);
    }

    #[test]
    fn test_strict_failure_is_recorded_and_lock_survives() {
        let mock = MockMoveable::strict();
        let result = catch_unwind(AssertUnwindSafe(|| mock.move_once()));
        assert!(result.is_err());

        // State is still usable after the panic
        assert_eq!(mock.invocations(), vec![Invocation::MoveOnce]);
        mock.setup(Call::MoveOnce).returns(1);
        assert_eq!(mock.move_once(), 1);
    }

    #[test]
    fn test_verify_counts_matching_invocations() {
        let mock = MockMoveable::strict();
        mock.setup(Call::MoveOnce).returns(2);
        mock.setup(Call::MoveTo(Arg::any())).returns(0);
        mock.move_once();
        mock.move_once();
        mock.move_to(1);
        mock.move_to(2);
        mock.move_to(2);

        assert!(mock.verify(Call::MoveOnce, Times::AtLeast(2)).is_ok());
        assert!(mock.verify(Call::MoveTo(Arg::is(2)), Times::Exactly(2)).is_ok());
        assert!(mock.verify(Call::MoveTo(Arg::any()), Times::Exactly(3)).is_ok());
        assert!(mock.verify(Call::Fail, Times::Never).is_ok());

        let err = mock.verify(Call::MoveOnce, Times::AtLeast(3)).unwrap_err();
        assert_eq!(
            err,
            VerificationError::CallCountMismatch {
                call: "move_once()".to_string(),
                expected: Times::AtLeast(3),
                actual: 2,
            }
        );
        assert!(err.to_string().contains("at least 3 times"));
    }

    #[test]
    fn test_verify_verifiable_reports_unmatched() {
        let mock = MockMoveable::strict();
        mock.setup(Call::MoveOnce).returns(2).verifiable();
        mock.setup(Call::MoveTo(Arg::is(2))).returns(4).verifiable();
        mock.setup(Call::MoveExactlyTo(Arg::any())).returns(8);

        mock.move_once();
        let err = mock.verify_verifiable().unwrap_err();
        assert_eq!(
            err,
            VerificationError::UnmatchedSetups(vec!["move_to(2)".to_string()])
        );

        mock.move_to(2);
        assert!(mock.verify_verifiable().is_ok());

        // Not verifiable, so only verify_all notices it
        let err = mock.verify_all().unwrap_err();
        assert!(err.to_string().contains("move_exactly_to(any)"));
    }

    #[test]
    fn test_clones_share_state() {
        let mock = MockMoveable::strict();
        let handle = mock.clone();
        mock.setup(Call::MoveOnce).returns(7).verifiable();

        assert_eq!(handle.move_once(), 7);
        assert!(mock.verify(Call::MoveOnce, Times::Once).is_ok());
        assert!(mock.verify_verifiable().is_ok());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mock = MockMoveable::loose();
        mock.setup(Call::MoveOnce).returns(3).verifiable();
        mock.move_once();
        mock.reset();

        assert_eq!(mock.invocation_count(), 0);
        assert!(mock.verify_verifiable().is_ok());
        assert_eq!(mock.move_once(), 0);
    }

    #[test]
    #[should_panic(expected = "Setup for fail() cannot return a value")]
    fn test_fail_setup_rejects_return_value() {
        let mock = MockMoveable::strict();
        mock.setup(Call::Fail).returns(7);
    }

    #[test]
    fn test_fail_setup_still_accepts_failures() {
        let mock = MockMoveable::strict();
        mock.setup(Call::Fail).fails().verifiable();
        assert_eq!(mock.fail(), Err(MoveError::Failed));
        assert!(mock.verify_verifiable().is_ok());
    }

    #[test]
    #[should_panic(expected = "Setup for move_once() was cleared by reset")]
    fn test_setup_programmed_before_reset_is_stale() {
        let mock = MockMoveable::strict();
        let handle = mock.clone();
        let setup = mock.setup(Call::MoveOnce);
        handle.reset();
        setup.returns(1);
    }

    #[test]
    fn test_setup_after_reset_is_not_confused_with_older_one() {
        let mock = MockMoveable::strict();
        let handle = mock.clone();
        let stale = mock.setup(Call::MoveTo(Arg::is(1)));
        handle.reset();
        mock.setup(Call::MoveOnce).returns(3);

        // The stale builder must not edit the new setup at the same index
        let result = catch_unwind(AssertUnwindSafe(|| {
            stale.returns(99);
        }));
        assert!(result.is_err());
        assert_eq!(mock.move_once(), 3);
    }

    #[test]
    fn test_default_is_strict() {
        assert_eq!(MockMoveable::default().behavior(), MockBehavior::Strict);
    }
}
