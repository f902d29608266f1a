//! MCAT - MSOT Cluster Analysis Toolkit core
//!
//! MCAT describes every configurable piece of an analysis as a parameter
//! holder:
//! 1. Fixed settings structs declare their parameters once per type
//! 2. User-extensible collections add and remove parameters at run time
//!
//! # Architecture
//!
//! - `parameters`: descriptors, values, holders, traversal, change events,
//!   JSON documents and the type registry
//! - `data`: typed data slots and the providers that fill them
//! - `project`: the project, its samples and the analysis settings
//! - `validity`: user-facing reports of what is missing or invalid

pub mod cli;
pub mod data;
pub mod error;
pub mod parameters;
pub mod project;
pub mod validity;

pub use error::{McatError, Result};
