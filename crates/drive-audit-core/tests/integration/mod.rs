//! Integration tests.

mod audit_scenarios;
mod pagination;
