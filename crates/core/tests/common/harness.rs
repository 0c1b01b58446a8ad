//! Address space fixtures.

use std::sync::Arc;

use rv32mem_core::diag::CollectingSink;
use rv32mem_core::mem::AddressSpace;

/// Installs a test-friendly `tracing` subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// An address space whose diagnostics are captured for assertions.
#[derive(Debug)]
pub struct TestSpace {
    /// The space under test.
    pub space: AddressSpace,
    /// Every diagnostic the space reported.
    pub sink: Arc<CollectingSink>,
}

impl TestSpace {
    /// Creates a zero-filled space of `size` bytes at `base`.
    ///
    /// # Panics
    ///
    /// If construction fails.
    pub fn new(size: usize, base: u32) -> Self {
        init_tracing();
        let sink = Arc::new(CollectingSink::new());
        let space = AddressSpace::with_sink(size, base, sink.clone()).unwrap();
        Self { space, sink }
    }

    /// Creates a space whose every byte is `fill`, then clears the captured diagnostics.
    pub fn filled(size: usize, base: u32, fill: u8) -> Self {
        let mut fixture = Self::new(size, base);
        let pattern = vec![fill; size];
        let _ = rv32mem_core::loader::load_image(&mut fixture.space, Some(pattern.as_slice()), base).unwrap();
        let _ = fixture.sink.take();
        fixture
    }

    /// Copy of the current buffer contents.
    pub fn snapshot(&self) -> Vec<u8> {
        self.space.bytes().unwrap().to_vec()
    }
}
