//! Integration tests

mod client_tests;
