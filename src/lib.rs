//! folio-rs: portfolio content engine
//!
//! This crate keeps resume-like portfolio content (skills, experience,
//! projects, ...) in ordered per-category lists, provides an admin back
//! office to reorder and prune them, and assembles the public content
//! consumed by page renderers.

pub mod chat;
pub mod commands;
pub mod config;
pub mod content;
pub mod i18n;
pub mod reorder;
pub mod resume;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main portfolio application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory (one YAML file per category)
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Language dictionaries directory
    pub i18n_dir: PathBuf,
}

impl Folio {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let i18n_dir = base_dir.join(&config.i18n_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            i18n_dir,
        })
    }

    /// File store over the content directory
    pub fn store(&self) -> content::FileStore {
        content::FileStore::new(&self.content_dir, self.config.category_names())
    }

    /// Language dictionaries for the configured language
    pub fn i18n(&self) -> Result<i18n::I18n> {
        let mut i18n = i18n::I18n::new(&self.config.language);
        i18n.load_languages(&self.i18n_dir)?;
        Ok(i18n)
    }

    /// Assemble all public content
    pub async fn site_content(&self) -> Result<content::SiteContent> {
        let i18n = self.i18n()?;
        let content = content::aggregate(&self.store(), &self.config, &i18n).await?;
        Ok(content)
    }

    /// Fail unless `category` is configured
    pub fn check_category(&self, category: &str) -> Result<()> {
        if self.config.category(category).is_none() {
            anyhow::bail!(
                "Unknown category: {}. Available: {}",
                category,
                self.config.category_names().join(", ")
            );
        }
        Ok(())
    }
}
