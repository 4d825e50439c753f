use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use tracing::debug;

use crate::MemoryBuffer;

/// Shared count of completed fixture teardowns
#[derive(Clone, Debug, Default)]
pub struct TeardownCounter(Arc<AtomicUsize>);

impl TeardownCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Per-test fixture owning a fresh [`MemoryBuffer`].
///
/// Creating the fixture is the setup phase; dropping it is the teardown
/// phase, which closes the buffer. Drop also runs while unwinding, so a
/// failing test body still gets its teardown.
#[derive(Debug)]
pub struct BufferFixture {
    buffer: MemoryBuffer,
    teardowns: Option<TeardownCounter>,
}

impl BufferFixture {
    pub fn setup() -> Self {
        debug!("Before: allocating memory buffer");
        Self {
            buffer: MemoryBuffer::new(),
            teardowns: None,
        }
    }

    /// Setup that reports its teardown to `counter`
    pub fn setup_with_counter(counter: TeardownCounter) -> Self {
        let mut fixture = Self::setup();
        fixture.teardowns = Some(counter);
        fixture
    }

    /// Run `body` between setup and teardown
    pub fn run<R>(body: impl FnOnce(&mut BufferFixture) -> R) -> R {
        let mut fixture = Self::setup();
        body(&mut fixture)
    }

    /// Like [`BufferFixture::run`], reporting the teardown to `counter`
    pub fn run_counted<R>(
        counter: TeardownCounter,
        body: impl FnOnce(&mut BufferFixture) -> R,
    ) -> R {
        let mut fixture = Self::setup_with_counter(counter);
        body(&mut fixture)
    }

    pub fn buffer(&self) -> &MemoryBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut MemoryBuffer {
        &mut self.buffer
    }
}

impl Drop for BufferFixture {
    fn drop(&mut self) {
        debug!("After: releasing memory buffer");
        if self.buffer.close() {
            if let Some(counter) = &self.teardowns {
                counter.increment();
            }
        }
    }
}
