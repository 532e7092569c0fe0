//! Core domain types
//!
//! These types describe the work devop hands to external services and what
//! comes back. They are independent of any one vendor API; the `dto` module
//! holds the wire formats and their conversions into these types.

pub mod job;
pub mod release;
