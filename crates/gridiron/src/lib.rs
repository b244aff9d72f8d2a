#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gridiron-analytics/gridiron/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod merge;
pub mod pipeline;
pub mod teams;

// Re-export main types from sub-crates
pub use gridiron_data as data;
pub use gridiron_model as model;
pub use gridiron_output as output;

pub use merge::{DatasetMerger, MergeError, MergeOutcome};
pub use pipeline::{
    LoadedInputs, ModelSource, OutputPaths, PipelineConfig, PipelineError, PipelineOutput, Stage,
    compute, load, run, write,
};
pub use teams::TeamAliases;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
