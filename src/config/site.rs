//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub i18n_dir: String,

    // Content
    pub categories: Vec<CategoryConfig>,

    // Back office
    #[serde(default)]
    pub admin: AdminConfig,

    // Chat widget
    #[serde(default)]
    pub chat: ChatConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            i18n_dir: "languages".to_string(),

            categories: default_categories(),

            admin: AdminConfig::default(),
            chat: ChatConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Look up a configured category by name
    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Names of all configured categories, in configured order
    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// Categories that are published to the site
    pub fn public_categories(&self) -> impl Iterator<Item = &CategoryConfig> {
        self.categories.iter().filter(|c| c.public)
    }
}

fn default_categories() -> Vec<CategoryConfig> {
    [
        ("skills", true),
        ("education", true),
        ("experience", true),
        ("projects", true),
        ("testimonials", true),
        ("guestbook", false),
        ("blog", true),
    ]
    .into_iter()
    .map(|(name, public)| CategoryConfig {
        name: name.to_string(),
        public,
        label: None,
    })
    .collect()
}

/// A content category managed from the back office
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default)]
    pub label: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Back office configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required by the admin API (open when unset)
    pub token: Option<String>,
    /// Rewrite orders to 0..N-1 after a delete
    pub renormalize_on_delete: bool,
}

/// Chat widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub fallback: String,
    #[serde(default)]
    pub rules: Vec<ChatRuleConfig>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            fallback: "I'm not sure about that. Try asking about skills, projects or experience."
                .to_string(),
            rules: Vec::new(),
        }
    }
}

/// A keyword rule for the chat widget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRuleConfig {
    pub keywords: Vec<String>,
    pub reply: String,
}
