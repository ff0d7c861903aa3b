//! Argsync Core
//!
//! Core library for reconciling provider configuration arguments:
//! diff desired vs. current state and apply the resulting mutations
//! through a bounded worker pool.

pub mod argument;
pub mod differ;
pub mod plan;
pub mod pool;
pub mod reconciler;
pub mod store;
