//! Publishing: app directories, index pages, version control.
//!
//! # Submodules
//!
//! - [`files`]: writes app bundles under `docs/<lang>/<year>/<MM-DD>/`
//!   and rescans the tree into [`crate::models::AppRecord`]s
//! - [`indexes`]: regenerates the per-language and root listing pages
//! - [`git`]: stages, commits and pushes the docs tree
//!
//! # Output structure
//!
//! ```text
//! docs/
//! ├── index.html            # root language selector
//! ├── ja/
//! │   ├── index.html        # Japanese listing page
//! │   └── 2026/01-15/       # one app: index.html, style.css, app.js, metadata.json
//! └── en/
//!     ├── index.html
//!     └── 2026/01-15/
//! ```

pub mod files;
pub mod git;
pub mod indexes;
