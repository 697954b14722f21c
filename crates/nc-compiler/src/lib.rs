//! Nutcracker Filter List Compiler
//!
//! This crate compiles the `removeparam` subset of ABP/uBO filter lists into
//! rule snapshots for `nc-core`.

pub mod parser;
pub mod optimizer;
pub mod sources;

pub use optimizer::{optimize_rules, OptimizeStats};
pub use parser::{parse_filter_list, parse_filter_list_with_stats, parse_line, LineOutcome, ParseStats, SkipReason};
pub use sources::{compile_sources, FilterSource, ListReport, SourceSetReport};
