// src/lib.rs

//! Work report library: classify, filter and group work artifacts into
//! per-destination reports.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
