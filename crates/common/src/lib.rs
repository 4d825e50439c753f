mod buffer;
mod carton;
mod moveable;
pub mod testing;

pub use buffer::MemoryBuffer;
pub use carton::{Carton, CartonError};
pub use moveable::{MoveError, Moveable};
