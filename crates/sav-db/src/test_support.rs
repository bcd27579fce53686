//! Shared test utilities for sav-db integration tests.
