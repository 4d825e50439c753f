use moveable_common::testing::VerificationError;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("{0}")]
    Verification(#[from] VerificationError),
    #[error("{operation} returned {actual}, expected {expected}")]
    UnexpectedValue {
        operation: String,
        expected: i32,
        actual: i32,
    },
    #[error("{0} was expected to fail but succeeded")]
    MissingFailure(&'static str),
}
