//! Core library for preparing social random-walk sequence data

pub mod config;
pub mod error;
pub mod graph;
pub mod data;
pub mod walk;
pub mod assemble;
pub mod storage;
pub mod pipeline;

pub use anyhow::{Result, anyhow};
pub use error::PrepError;
