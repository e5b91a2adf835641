//! Integration tests for staff-harvest
//!
//! These tests use wiremock to stand in for directory sites and the
//! chat-completions endpoint.

mod fetch_tests;
mod harvest_tests;
mod llm_tests;
