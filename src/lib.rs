//! Marketrun - purchasing-workflow core.
//!
//! Customers decompose a Purchase into Necessaries (categories of need) and
//! Goods (line items); Operators price and fulfill them through an
//! assignment/status pipeline. This crate owns the purchase lifecycle state
//! machine, the assignment engine, the derived-aggregate computation, and
//! the repurchase (clone) operation. Request marshaling and authentication
//! live outside; every operation here takes an explicit [`domain::Actor`].

pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod storage;
pub mod validation;

pub use error::{CoreError, Result};
