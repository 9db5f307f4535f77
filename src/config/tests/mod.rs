//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `field_resolution`: Token, locator, policy, and run mode resolution
//! - `validation`: Configuration consistency validation tests

mod field_resolution;
mod helpers;
mod precedence;
