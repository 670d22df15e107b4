//! Scenario tests
//!
//! `build` covers the first build of a fresh funnel, `rebuild` the
//! incremental outcomes of later builds.

pub mod failures;
