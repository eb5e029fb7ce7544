//! Content aggregation - assembles every public category into one object

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::item::Item;
use super::store::{ContentStore, StoreError};
use crate::config::SiteConfig;
use crate::i18n::I18n;

/// Site owner details shown on every page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
}

impl Profile {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
        }
    }
}

/// One rendered category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub label: String,
    pub items: Vec<Item>,
}

/// Everything page renderers need, in display order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteContent {
    pub profile: Profile,
    pub sections: IndexMap<String, Section>,
    #[serde(default)]
    pub strings: IndexMap<String, String>,
}

impl SiteContent {
    pub fn section(&self, category: &str) -> Option<&Section> {
        self.sections.get(category)
    }
}

/// Fetch every public category and assemble the site content
pub async fn aggregate<S>(
    store: &S,
    config: &SiteConfig,
    i18n: &I18n,
) -> Result<SiteContent, StoreError>
where
    S: ContentStore + ?Sized,
{
    let mut sections = IndexMap::new();

    for category in config.public_categories() {
        let items = store.fetch_items(&category.name).await?;
        tracing::debug!("Aggregated {} items from {}", items.len(), category.name);
        sections.insert(
            category.name.clone(),
            Section {
                label: i18n.section_label(category),
                items,
            },
        );
    }

    Ok(SiteContent {
        profile: Profile::from_config(config),
        sections,
        strings: i18n.strings(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryConfig;
    use crate::content::MemoryStore;

    fn config() -> SiteConfig {
        SiteConfig {
            author: "Ada".to_string(),
            categories: vec![
                CategoryConfig {
                    name: "projects".to_string(),
                    public: true,
                    label: None,
                },
                CategoryConfig {
                    name: "guestbook".to_string(),
                    public: false,
                    label: None,
                },
                CategoryConfig {
                    name: "skills".to_string(),
                    public: true,
                    label: Some("Toolbox".to_string()),
                },
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_aggregate_public_sections_in_config_order() {
        let store = MemoryStore::with_categories(["skills", "projects", "guestbook"]);
        store.set_items(
            "projects",
            vec![
                Item::new("b", 1).with_field("title", "Second"),
                Item::new("a", 0).with_field("title", "First"),
            ],
        );
        store.set_items("guestbook", vec![Item::new("g", 0)]);

        let content = aggregate(&store, &config(), &I18n::default()).await.unwrap();

        let names: Vec<_> = content.sections.keys().cloned().collect();
        assert_eq!(names, vec!["projects", "skills"]);
        assert_eq!(content.profile.author, "Ada");

        let projects = content.section("projects").unwrap();
        assert_eq!(projects.label, "Projects");
        assert_eq!(projects.items[0].title(), "First");
        assert_eq!(content.section("skills").unwrap().label, "Toolbox");
        assert!(content.section("guestbook").is_none());
    }

    #[tokio::test]
    async fn test_aggregate_fails_on_missing_category() {
        let store = MemoryStore::with_categories(["projects"]);
        let err = aggregate(&store, &config(), &I18n::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownCategory(name) if name == "skills"));
    }

    #[test]
    fn test_serializes_flat_item_fields() {
        let content = SiteContent {
            profile: Profile::from_config(&config()),
            sections: IndexMap::from([(
                "skills".to_string(),
                Section {
                    label: "Skills".to_string(),
                    items: vec![Item::new("rust", 0).with_field("title", "Rust")],
                },
            )]),
            strings: IndexMap::new(),
        };

        let json = serde_json::to_value(&content).unwrap();
        let item = &json["sections"]["skills"]["items"][0];
        assert_eq!(item["id"], "rust");
        assert_eq!(item["order"], 0);
        assert_eq!(item["title"], "Rust");
    }
}
