//! ERIC fulltext PDF fetcher.
//!
//! ERIC serves each document at `https://files.eric.ed.gov/fulltext/<ID>.pdf`.
//! Withdrawn documents answer 404; those end up as placeholders instead.

use super::{HttpFetcher, describe_download, politeness_delay};
use crate::catalog::{ERIC_DOCS, ERIC_RESOURCE, EricDoc};
use crate::config::CorpusConfig;
use crate::error::CorpusResult;
use crate::layout::{CorpusLayout, file_stem};
use crate::models::{ExtractionInfo, FetchOutcome, MetadataSidecar};
use crate::sidecar;
use tracing::{error, info, instrument};

/// Sidecar for a downloaded ERIC document.
fn eric_sidecar(doc: &EricDoc) -> MetadataSidecar {
    MetadataSidecar {
        id: Some(doc.item_id()),
        title: Some(doc.title.to_string()),
        resource_type: Some(ERIC_RESOURCE),
        year: Some(doc.year),
        eric_id: Some(doc.eric_id.to_string()),
        extraction: Some(ExtractionInfo::pending()),
        ..Default::default()
    }
}

#[instrument(level = "info", skip_all, fields(eric_id = %doc.eric_id))]
async fn fetch_doc(
    fetcher: &HttpFetcher,
    layout: &CorpusLayout,
    config: &CorpusConfig,
    doc: &EricDoc,
) -> CorpusResult<String> {
    let url = doc.url(&config.eric_base_url);
    let dest = layout.source_path(ERIC_RESOURCE, &doc.file_name());
    fetcher.download(&url, &dest, config.download_timeout()).await?;

    let (source_info, file_info) = describe_download(layout, &dest, &url)?;
    let sidecar_data = MetadataSidecar {
        source_info: Some(source_info),
        file_info: Some(file_info),
        ..eric_sidecar(doc)
    };
    sidecar::save(
        &layout.metadata_path(ERIC_RESOURCE, &file_stem(&dest)),
        &sidecar_data,
    )?;
    Ok(layout.relative(&dest))
}

/// Download every ERIC document in the catalog, one at a time.
#[instrument(level = "info", skip_all)]
pub async fn fetch_all(
    fetcher: &HttpFetcher,
    layout: &CorpusLayout,
    config: &CorpusConfig,
) -> Vec<FetchOutcome> {
    let mut outcomes = Vec::with_capacity(ERIC_DOCS.len());

    for doc in ERIC_DOCS {
        info!(eric_id = doc.eric_id, title = doc.title, "Downloading ERIC document");
        let outcome = match fetch_doc(fetcher, layout, config, doc).await {
            Ok(path) => FetchOutcome::downloaded(doc.eric_id, doc.title, path, None),
            Err(e) => {
                error!(url = %doc.url(&config.eric_base_url), error = %e, "ERIC download failed");
                FetchOutcome::failed(doc.eric_id, doc.title, e)
            }
        };
        outcomes.push(outcome);
        politeness_delay(config.eric_delay_ms).await;
    }

    let downloaded = outcomes.iter().filter(|o| o.is_downloaded()).count();
    info!(downloaded, attempted = outcomes.len(), "ERIC documents done");
    outcomes
}
