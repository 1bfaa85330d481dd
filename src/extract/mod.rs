//! Turning saved source artifacts into plain text.
//!
//! - [`pdf`]: every PDF under `sources/<type>/`, page by page
//! - [`html`]: blog pages, main-content only

pub mod html;
pub mod pdf;

use crate::error::CorpusResult;
use std::path::Path;

/// Write an extracted text artifact, creating its directory.
pub fn write_text(path: &Path, text: &str) -> CorpusResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}
