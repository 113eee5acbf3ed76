#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shapes raw inspection search results for display.
//!
//! * [`dedup`] collapses repeat inspections into the latest one per
//!   establishment and orders history views.
//! * [`group`] buckets records by street address for map annotations.
//!
//! Everything here is synchronous and pure: inputs are borrowed and never
//! modified.

pub mod dedup;
pub mod group;

pub use dedup::{filter_old_duplicates, sort_history};
pub use group::{CameraTarget, ProximityGroups, group_by_address, single_group};
