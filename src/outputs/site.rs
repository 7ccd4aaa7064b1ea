//! Writes the newsletter artifacts into the output directory.
//!
//! # Artifacts
//!
//! | File | Policy |
//! |------|--------|
//! | `index.html` | overwritten every run |
//! | `style.css` | written only when absent |
//! | `competitor_report.md` | overwritten every run, may be empty |
//! | `link_report.md` | overwritten every run |

use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Stylesheet shipped with the page.
pub const STYLE_CSS: &str = concat!(
    ".container{max-width:960px;margin:2rem auto;padding:0 1rem}",
    "body{font-family:-apple-system,BlinkMacSystemFont,Segoe UI,Roboto,Helvetica,Arial,sans-serif;",
    "color:#1f2937;background:#f9fafb}",
    "h1,h2{color:#111827}",
    ".section{background:#fff;border:1px solid #e5e7eb;border-radius:12px;padding:1rem;margin:1rem 0}",
    ".item{padding:.5rem 0;border-top:1px dashed #e5e7eb}",
    ".item:first-child{border-top:none}",
    ".meta{font-size:.875rem;color:#6b7280}",
);

/// Write `index.html`, creating the directory and stylesheet as needed.
///
/// Returns the path of the written page.
#[instrument(level = "info", skip(html), fields(out_dir = %out_dir.display()))]
pub async fn write_page(out_dir: &Path, html: &str) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(out_dir).await?;
    let index_path = out_dir.join("index.html");
    fs::write(&index_path, html).await?;
    info!(path = %index_path.display(), bytes = html.len(), "Wrote index.html");

    let style_path = out_dir.join("style.css");
    if !fs::try_exists(&style_path).await? {
        fs::write(&style_path, STYLE_CSS).await?;
        info!(path = %style_path.display(), "Wrote default stylesheet");
    }
    Ok(index_path)
}

/// Write a Markdown report named `file_name` into `out_dir`.
#[instrument(level = "info", skip(contents), fields(out_dir = %out_dir.display()))]
pub async fn write_report(
    out_dir: &Path,
    file_name: &str,
    contents: &str,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(out_dir).await?;
    let path = out_dir.join(file_name);
    fs::write(&path, contents).await?;
    info!(path = %path.display(), bytes = contents.len(), "Wrote report");
    Ok(())
}
