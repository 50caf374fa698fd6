//! Workspace-level integration tests for storekit.
//!
//! The actual suites live in `tests/`; this library target exists so the
//! package builds on its own.
