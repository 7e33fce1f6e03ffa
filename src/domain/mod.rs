//! Core domain types and logic.

pub mod account;
pub mod backtest;
pub mod bar;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod position;
pub mod signal;
pub mod strategy;
