#![cfg(any(test, feature = "testing"))]

// Test support for moveable-common
//
// MockMoveable is a programmable stand-in for the Moveable trait: program
// responses per call pattern, then check call counts afterwards. Strict mocks
// panic on any invocation that was not programmed.
//
// BufferFixture gives each test a fresh in-memory buffer and closes it on
// drop, including when the test body panics.

pub mod fixture;
pub mod mock_moveable;
pub mod times;

pub use fixture::{BufferFixture, TeardownCounter};
pub use mock_moveable::{
    Arg, Call, Invocation, MockBehavior, MockMoveable, Setup, VerificationError,
};
pub use times::Times;
