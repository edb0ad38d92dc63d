//! Engagement Flux - Cross-platform engagement datasets from social media exports
//!
//! Flux turns raw Instagram and TikTok export documents into one canonical,
//! row-per-post table through a deterministic pipeline: extraction →
//! normalization → validity filtering → engagement metric → feature
//! derivation → dataset assembly.
//!
//! ## Modules
//!
//! - **Pipeline**: Process export documents into an assembled [`Dataset`]
//! - **Report**: Per-platform aggregates over one dataset
//! - **Compare**: Per-platform aggregates over the shared columns of two tables

pub mod adapters;
pub mod compare;
pub mod dataset;
pub mod diagnostics;
pub mod engagement;
pub mod error;
pub mod features;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod types;

pub use adapters::{InstagramAdapter, SourceAdapter, TikTokAdapter};
pub use compare::{Comparison, SharedRow};
pub use dataset::{Dataset, PipelineSummary, COLUMNS, SHARED_COLUMNS};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use engagement::EngagementPolicy;
pub use error::ComputeError;
pub use pipeline::{instagram_to_dataset, process_documents, tiktok_to_dataset};
pub use report::PlatformReport;
pub use types::{
    CanonicalRecord, CaptionBin, DerivedFeatures, EnrichedRecord, Platform, RawDocument,
    RawPostNode,
};

/// Flux version
pub const FLUX_VERSION: &str = env!("CARGO_PKG_VERSION");
