//! Output generation for the corpus manifest and the download report.
//!
//! # Submodules
//!
//! - [`manifest`]: Scans the corpus tree and writes `manifest.json`
//! - [`results`]: Writes `download_results.json` after a fetch run
//!
//! # Output Structure
//!
//! ```text
//! <root>/
//! ├── manifest.json           # every item, classified, with statistics
//! └── download_results.json   # per-item outcomes of the last fetch run
//! ```

pub mod manifest;
pub mod results;
