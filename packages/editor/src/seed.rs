//! First-run content for singleton documents.

use pharmasite_common::{defaults, DocPath, PageName, SettingsName};
use pharmasite_store::{to_fields, DocumentStore, Fields, StoreResult, WriteOptions};
use serde_json::json;
use tracing::info;

fn seeds() -> StoreResult<Vec<(DocPath, Fields)>> {
    let mut about = Fields::new();
    about.insert("values".to_string(), defaults::about_values());
    about.insert("title".to_string(), json!("About Us"));

    Ok(vec![
        (SettingsName::Website.doc_path(), to_fields(&defaults::website_settings())?),
        (SettingsName::Admin.doc_path(), to_fields(&defaults::admin_settings())?),
        (SettingsName::Footer.doc_path(), to_fields(&defaults::footer_settings())?),
        (PageName::About.doc_path(), about),
    ])
}

/// Write default settings and page content that do not exist yet. Existing
/// documents are left alone. Returns the paths written.
pub async fn seed_defaults(store: &dyn DocumentStore) -> StoreResult<Vec<DocPath>> {
    let mut written = Vec::new();

    for (path, data) in seeds()? {
        if store.get_document(&path).await?.is_some() {
            continue;
        }
        store.write_document(&path, data, WriteOptions::replace()).await?;
        written.push(path);
    }

    if !written.is_empty() {
        info!(count = written.len(), "Seeded default content");
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmasite_store::{AccessRules, ContentStore, Principal};

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = ContentStore::in_memory(AccessRules::default());
        let service = store.client(Principal::Service);

        let first = seed_defaults(&service).await.unwrap();
        assert_eq!(first.len(), 4);
        assert!(seed_defaults(&service).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_keeps_existing() {
        let store = ContentStore::in_memory(AccessRules::default());
        let service = store.client(Principal::Service);
        let mut footer = Fields::new();
        footer.insert("phone".to_string(), json!("555"));
        service
            .write_document(&SettingsName::Footer.doc_path(), footer, WriteOptions::merge())
            .await
            .unwrap();

        seed_defaults(&service).await.unwrap();
        let doc = service
            .get_document(&SettingsName::Footer.doc_path())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.data["phone"], "555");
        assert!(doc.data.get("brandName").is_none());
    }
}
