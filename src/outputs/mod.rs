//! Output generation for the newsletter.
//!
//! # Submodules
//!
//! - [`html`]: Renders [`ReportSections`](crate::models::ReportSections) and the narrative to a page
//! - [`markdown`]: Builds the link validation report
//! - [`site`]: Writes the artifacts to disk
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── index.html             # Newsletter page
//! ├── style.css              # Created once, never overwritten
//! ├── competitor_report.md   # Competitor analysis
//! └── link_report.md         # Link validation summary
//! ```

pub mod html;
pub mod markdown;
pub mod site;
