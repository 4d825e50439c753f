use thiserror::Error;
use tracing::debug;

use crate::Moveable;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartonError {
    #[error("Carton failed unconditionally")]
    Unconditional,
}

/// Container owning exactly one [`Moveable`].
///
/// The capability is public so callers can invoke it directly or reassign it.
#[derive(Debug, Clone)]
pub struct Carton<M> {
    pub moveable: M,
}

impl<M: Moveable> Carton<M> {
    pub fn new(moveable: M) -> Self {
        Self { moveable }
    }

    pub fn moveable(&self) -> &M {
        &self.moveable
    }

    pub fn moveable_mut(&mut self) -> &mut M {
        &mut self.moveable
    }

    /// Swap in a new capability, returning the previous one
    pub fn replace_moveable(&mut self, moveable: M) -> M {
        std::mem::replace(&mut self.moveable, moveable)
    }

    pub fn into_inner(self) -> M {
        self.moveable
    }

    /// Always fails. This path is independent of the owned capability.
    pub fn fail(&self) -> Result<(), CartonError> {
        debug!("Carton failing unconditionally");
        Err(CartonError::Unconditional)
    }
}
