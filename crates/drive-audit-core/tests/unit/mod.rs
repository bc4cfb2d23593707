//! Unit-level property tests.

mod walker_properties;
