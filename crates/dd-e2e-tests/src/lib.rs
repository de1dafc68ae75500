//! Test-only crate. See `tests/` for the cross-crate suites.
