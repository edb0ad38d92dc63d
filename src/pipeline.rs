//! Pipeline orchestration
//!
//! This module provides the public API for Engagement Flux.
//! It orchestrates the full pipeline from raw export documents to an
//! assembled dataset.

use crate::adapters::SourceAdapter;
use crate::dataset::Dataset;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::engagement::EngagementPolicy;
use crate::error::ComputeError;
use crate::features::FeatureDeriver;
use crate::normalizer::Normalizer;
use crate::types::{EnrichedRecord, Platform, RawDocument, RawPostNode};
use rayon::prelude::*;
use tracing::{debug, info};

/// Convert Instagram export documents into an assembled dataset.
///
/// # Example
/// ```ignore
/// let dataset = instagram_to_dataset(&documents, &TracingSink);
/// dataset.write_csv_path(Path::new("cleaned_instagram.csv"))?;
/// ```
pub fn instagram_to_dataset(documents: &[RawDocument], sink: &dyn DiagnosticSink) -> Dataset {
    process_documents(Platform::Instagram.adapter(), documents, sink)
}

/// Convert TikTok export documents into an assembled dataset.
pub fn tiktok_to_dataset(documents: &[RawDocument], sink: &dyn DiagnosticSink) -> Dataset {
    process_documents(Platform::TikTok.adapter(), documents, sink)
}

/// Process documents through the full pipeline.
///
/// Pipeline stages:
/// 1. SourceAdapter::extract - Pull raw post nodes out of each document
/// 2. Normalizer - Map nodes to canonical records, drop invalid timestamps
/// 3. EngagementPolicy - Compute the rate, drop records without a denominator
/// 4. FeatureDeriver - Compute derived features
/// 5. Dataset - Append in extraction order
///
/// Never fails: skipped documents are reported to `sink` and the result may be
/// empty.
pub fn process_documents(
    adapter: &dyn SourceAdapter,
    documents: &[RawDocument],
    sink: &dyn DiagnosticSink,
) -> Dataset {
    let platform = adapter.platform();
    let mut dataset = Dataset::new(platform);

    // Stage 1: Extract raw nodes; indexed collect keeps document order
    let extracted: Vec<Result<Vec<RawPostNode>, ComputeError>> = documents
        .par_iter()
        .map(|document| adapter.extract(&document.contents))
        .collect();

    let mut nodes = Vec::new();
    for (document, result) in documents.iter().zip(extracted) {
        match result {
            Ok(found) => {
                debug!(document = %document.name, nodes = found.len(), "extracted posts");
                nodes.extend(found);
            }
            Err(e) => {
                sink.report(&Diagnostic {
                    document: document.name.clone(),
                    reason: e.to_string(),
                });
                dataset.summary_mut().skipped_documents += 1;
            }
        }
    }

    {
        let summary = dataset.summary_mut();
        summary.documents = documents.len();
        summary.raw_nodes = nodes.len();
    }

    let policy = adapter.engagement_policy();

    for node in &nodes {
        // Stage 2: Normalize and apply the timestamp filter
        let Some((record, timestamp)) = Normalizer::normalize(adapter, node) else {
            continue;
        };
        dataset.summary_mut().valid_timestamps += 1;

        // Stage 3: Engagement rate under the platform's denominator policy
        let Some(engagement_rate) = policy.rate(&record) else {
            continue;
        };

        // Stage 4: Derive features
        let features = FeatureDeriver::derive(&record, timestamp, engagement_rate);

        // Stage 5: Assemble
        dataset.push(EnrichedRecord {
            platform,
            record,
            features,
        });
    }

    let summary = dataset.summary();
    info!(
        platform = %platform,
        documents = summary.documents,
        skipped_documents = summary.skipped_documents,
        raw_nodes = summary.raw_nodes,
        valid_timestamps = summary.valid_timestamps,
        survivors = summary.survivors,
        policy = ?policy,
        "assembled dataset"
    );

    if policy == EngagementPolicy::PositiveViewsDenominator {
        debug!(
            dropped_zero_views = summary.valid_timestamps - summary.survivors,
            "dropped records without views"
        );
    }

    dataset
}
