//! Build the public content file

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::content::SiteContent;
use crate::Folio;

/// Name of the aggregated content file inside the public directory
pub const CONTENT_FILE: &str = "content.json";

/// Aggregate all public content and write `<public_dir>/content.json`
pub async fn run(folio: &Folio) -> Result<PathBuf> {
    let start = std::time::Instant::now();

    let content = folio.site_content().await?;
    let item_count: usize = content.sections.values().map(|s| s.items.len()).sum();
    let path = write_content(&folio.public_dir, &content).await?;

    tracing::info!(
        "Built {} sections ({} items) in {:.2}s",
        content.sections.len(),
        item_count,
        start.elapsed().as_secs_f64()
    );
    Ok(path)
}

/// Write `content` to `<public_dir>/content.json` through a temp file
pub async fn write_content(public_dir: &Path, content: &SiteContent) -> Result<PathBuf> {
    tokio::fs::create_dir_all(public_dir).await?;
    let path = public_dir.join(CONTENT_FILE);
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, serde_json::to_string_pretty(content)?).await?;
    tokio::fs::rename(&tmp, &path).await?;
    Ok(path)
}

/// Rebuild whenever content, dictionaries or the config change
pub async fn watch(folio: &Folio) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<DebounceEventResult>();

    let mut debouncer =
        new_debouncer(Duration::from_millis(500), move |res: DebounceEventResult| {
            let _ = tx.send(res);
        })?;

    for dir in [&folio.content_dir, &folio.i18n_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = folio.base_dir.join("_config.yml");
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    while let Some(result) = rx.recv().await {
        match result {
            Ok(events) => {
                // Ignore our own temp files from atomic writes
                let relevant = events
                    .iter()
                    .any(|e| !e.path.to_string_lossy().ends_with(".tmp"));
                if !relevant {
                    continue;
                }

                // Config edits can change categories and directories
                let current = match Folio::new(&folio.base_dir) {
                    Ok(current) => current,
                    Err(e) => {
                        tracing::error!("Failed to reload config: {}", e);
                        continue;
                    }
                };

                tracing::info!("Content changed, rebuilding...");
                if let Err(e) = run(&current).await {
                    tracing::error!("Build failed: {}", e);
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_writes_public_sections() {
        let dir = tempfile::TempDir::new().unwrap();
        crate::commands::init::init_site(dir.path()).unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        let path = run(&folio).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["profile"]["author"], "John Doe");
        assert_eq!(json["sections"]["skills"]["label"], "Skills");
        assert_eq!(json["sections"]["skills"]["items"][1]["id"], "typescript");
        assert!(json["sections"].get("guestbook").is_none());
        assert_eq!(json["strings"]["sections.blog"], "Blog");
    }
}
