//! Rewrite stored orders to 0..N-1

use anyhow::Result;

use crate::content::store;
use crate::Folio;

/// Normalize one category, or every configured category
pub async fn run(folio: &Folio, category: Option<&str>) -> Result<()> {
    let categories = match category {
        Some(category) => {
            folio.check_category(category)?;
            vec![category.to_string()]
        }
        None => folio.config.category_names(),
    };

    let file_store = folio.store();
    for category in categories {
        if store::normalize(&file_store, &category).await? {
            println!("Normalized {}", category);
        } else {
            tracing::debug!("{} already normalized", category);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentStore;

    #[tokio::test]
    async fn test_delete_then_normalize() {
        let dir = tempfile::TempDir::new().unwrap();
        crate::commands::init::init_site(dir.path()).unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        crate::commands::delete::run(&folio, "skills", "rust")
            .await
            .unwrap();
        let orders: Vec<_> = folio
            .store()
            .fetch_items("skills")
            .await
            .unwrap()
            .iter()
            .map(|i| i.order)
            .collect();
        assert_eq!(orders, vec![1, 2]);

        run(&folio, None).await.unwrap();
        let orders: Vec<_> = folio
            .store()
            .fetch_items("skills")
            .await
            .unwrap()
            .iter()
            .map(|i| i.order)
            .collect();
        assert_eq!(orders, vec![0, 1]);
    }
}
