//! Internal test modules - whitebox tests with crate access
//!
//! Acceptance tests drive the demo through the harness in
//! `crate::test_harness` and assert on the rendered screen.
