//! Cross-module tests.
//!
//! - `scenario.rs`: the two query paths over one uncertain field
//! - `loading.rs`: descriptor files through to point queries
//! - `helpers.rs`: fixture builders shared by both

mod helpers;
