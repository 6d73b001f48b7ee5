//! Shared utilities used across sv-scatter modules

pub mod glob;
