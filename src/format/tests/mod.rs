//! Tests for the project payload and its JSON encoding.

mod project_tests;
mod roundtrip_tests;
