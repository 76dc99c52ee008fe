//! Router-level tests against the in-memory datastore

mod api_tests;
