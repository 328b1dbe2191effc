//! Integration tests driving the HTTP API and the store implementations.

mod dev_backend_test;
mod helpers;

mod health_test;
mod issue_test;
mod postgres_test;
mod verify_test;
