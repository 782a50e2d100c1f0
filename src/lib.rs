//! Answer benchmark library
//!
//! Drives a question answering program through a question list, scores
//! its answers by keyword overlap and reports on the results.

pub mod answer;
pub mod benchmark;
pub mod config;
pub mod questions;
pub mod report;
pub mod wiki;
