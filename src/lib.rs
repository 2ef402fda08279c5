//! Benchmarking toolkit for distributed key-value stores: agents that
//! supervise a database process on each cluster member, a coordinator that
//! fans a test group out to them, and a batch pipeline that folds the
//! client-observed latency logs into CSV/JSON report artifacts.

pub mod agent;
pub mod args;
pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod inspect;
pub mod logger;
pub mod metrics;
pub mod report;
