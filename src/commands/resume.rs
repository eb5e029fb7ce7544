//! Render the résumé

use anyhow::Result;
use std::path::Path;

use crate::resume;
use crate::Folio;

/// Render the résumé as Markdown (or HTML) to a file or stdout
pub async fn run(folio: &Folio, html: bool, output: Option<&Path>) -> Result<()> {
    let content = folio.site_content().await?;
    let today = chrono::Local::now().date_naive();

    let rendered = if html {
        resume::render_html(&content, today)
    } else {
        resume::render_markdown(&content, today)
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, rendered).await?;
            tracing::info!("Wrote résumé to {:?}", path);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
