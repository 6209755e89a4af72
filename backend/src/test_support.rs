//! Test utilities for the albaran crate.
//!
//! In-memory implementations of every driven port, shared by unit tests in
//! `src/` and integration tests in `tests/`. Compiled for tests and behind
//! the `test-support` feature.

mod clock;
mod doubles;
mod harness;
mod memory_store;

pub use clock::MutableClock;
pub use doubles::{
    FakePasswordHasher, FakeTokenService, InMemoryContentStore, RecordingNotifier, StubRenderer,
};
pub use harness::{SAMPLE_PASSWORD, TEST_FRONTEND_URL, TestApp, build_app, sample_user};
pub use memory_store::InMemoryStore;
