//! Temporal aggregation of cleaned grid frames
//!
//! This module groups a [`GridFrame`](crate::frame::GridFrame) by
//! (latitude, longitude, 12-hour bucket) and reduces each field with the
//! statistic its rule table asks for.
//!
//! # Organization
//!
//! - [`operations`]: aggregation functions and the running accumulator
//! - [`rules`]: declarative field → statistic tables per step type
//! - [`bucket`]: 12-hour bucket alignment
//! - [`group`]: the group-by-aggregate itself

pub mod bucket;
pub mod group;
pub mod operations;
pub mod rules;

pub use bucket::{bucket_start, BUCKET_SECONDS};
pub use group::{aggregate, AggregatedFrame, BucketKey};
pub use operations::{Accumulator, AggFunc};
pub use rules::{rules_for, AggRule, ACCUM_RULES, INSTANT_RULES};
