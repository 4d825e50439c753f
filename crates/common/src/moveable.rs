use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Move failed")]
    Failed,
    #[error("{0}")]
    Custom(String),
}

/// Capability to move something around.
///
/// Implementations supply every operation; there are no default bodies.
pub trait Moveable {
    /// Moves by one implementation-defined step and reports the new position.
    fn move_once(&self) -> i32;
    /// Moves towards `target` and reports the resulting position.
    fn move_to(&self, target: i32) -> i32;
    /// Moves precisely onto `target` and reports the resulting position.
    fn move_exactly_to(&self, target: i32) -> i32;
    /// Signals a failure. Conforming implementations always return `Err`.
    fn fail(&self) -> Result<(), MoveError>;
}

impl<M: Moveable + ?Sized> Moveable for &M {
    fn move_once(&self) -> i32 {
        (**self).move_once()
    }

    fn move_to(&self, target: i32) -> i32 {
        (**self).move_to(target)
    }

    fn move_exactly_to(&self, target: i32) -> i32 {
        (**self).move_exactly_to(target)
    }

    fn fail(&self) -> Result<(), MoveError> {
        (**self).fail()
    }
}

impl<M: Moveable + ?Sized> Moveable for Box<M> {
    fn move_once(&self) -> i32 {
        (**self).move_once()
    }

    fn move_to(&self, target: i32) -> i32 {
        (**self).move_to(target)
    }

    fn move_exactly_to(&self, target: i32) -> i32 {
        (**self).move_exactly_to(target)
    }

    fn fail(&self) -> Result<(), MoveError> {
        (**self).fail()
    }
}
