//! Recipe storage backed by a flat JSON file.
//!
//! The whole file is read into memory when the store opens. Every successful
//! mutation rewrites the file (temp file + rename) before it becomes visible
//! to readers, so a failed save leaves both disk and memory unchanged.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::memory::RecipeCollection;
use crate::store::types::{short_id, Recipe, RecipeInput};
use crate::store::{RecipeStore, StoreError, StoreResult};

/// Recipes persisted as a JSON array on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    collection: RwLock<RecipeCollection>,
}

impl FileStore {
    /// Open the file at `path`, creating an empty one if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, b"[]")?;
            tracing::info!(path = %path.display(), "Created empty recipes file");
            return Ok(Self {
                path,
                collection: RwLock::new(RecipeCollection::default()),
            });
        }

        let content = fs::read_to_string(&path)?;
        let records: Vec<Recipe> = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&content)?
        };

        let (collection, assigned) = Self::normalize(records)?;
        if assigned > 0 {
            fs::write(&path, serde_json::to_vec_pretty(collection.records())?)?;
            tracing::warn!(assigned, "Assigned ids to recipes loaded without one");
        }

        tracing::info!(
            path = %path.display(),
            recipes = collection.len(),
            "Loaded recipes file"
        );
        Ok(Self {
            path,
            collection: RwLock::new(collection),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Give id-less records an id and reject duplicates.
    fn normalize(records: Vec<Recipe>) -> StoreResult<(RecipeCollection, usize)> {
        let mut seen = HashSet::new();
        for recipe in records.iter().filter(|r| !r.id.is_empty()) {
            if !seen.insert(recipe.id.clone()) {
                return Err(StoreError::Corrupt(format!("duplicate recipe id {}", recipe.id)));
            }
        }

        let mut assigned = 0;
        let normalized = records
            .into_iter()
            .map(|mut recipe| {
                if recipe.id.is_empty() {
                    recipe.id = loop {
                        let candidate = short_id();
                        if seen.insert(candidate.clone()) {
                            break candidate;
                        }
                    };
                    assigned += 1;
                }
                recipe
            })
            .collect();

        Ok((RecipeCollection::from_records(normalized), assigned))
    }

    /// Apply `op` to a copy of the collection, persist it, then publish it.
    async fn mutate<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&mut RecipeCollection) -> StoreResult<T> + Send,
        T: Send,
    {
        let mut guard = self.collection.write().await;
        let mut next = guard.clone();
        let out = op(&mut next)?;
        self.persist(next.records()).await?;
        *guard = next;
        Ok(out)
    }

    async fn persist(&self, records: &[Recipe]) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), recipes = records.len(), "Recipes file saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "recipes.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RecipeStore for FileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn insert(&self, input: RecipeInput) -> StoreResult<Recipe> {
        let recipe = self.mutate(|c| Ok(c.insert(input))).await?;
        tracing::debug!(id = %recipe.id, "Recipe inserted");
        Ok(recipe)
    }

    async fn find_all(&self) -> StoreResult<Vec<Recipe>> {
        Ok(self.collection.read().await.records().to_vec())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Recipe> {
        self.collection.read().await.get(id)
    }

    async fn update_by_id(&self, id: &str, input: RecipeInput) -> StoreResult<Recipe> {
        self.mutate(|c| c.update(id, input)).await
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Recipe> {
        self.mutate(|c| c.remove(id)).await
    }

    async fn find_by_tag(&self, tag: &str) -> StoreResult<Vec<Recipe>> {
        Ok(self.collection.read().await.with_tag(tag))
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.collection.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn input(name: &str, tags: &[&str]) -> RecipeInput {
        RecipeInput {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ingredients: vec![],
            instructions: vec![],
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_created_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("recipes.json");

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.path(), path.as_path());
        assert!(store.find_all().await.unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_mutations_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recipes.json");

        let store = FileStore::open(&path).unwrap();
        let soup = store.insert(input("Soup", &["dinner"])).await.unwrap();
        let cake = store.insert(input("Cake", &["dessert"])).await.unwrap();
        store.update_by_id(&soup.id, input("Stew", &["dinner"])).await.unwrap();
        store.delete_by_id(&cake.id).await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        let all = reopened.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, soup.id);
        assert_eq!(all[0].name, "Stew");
        assert_eq!(all[0].published_at, soup.published_at);
        assert!(!dir.path().join("recipes.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_loads_existing_array_and_assigns_missing_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        fs::write(
            &path,
            r#"[
                {"id":"c0283p3d0cvuglq85log","name":"Oregano Marinated Chicken","tags":["main","chicken"],"ingredients":["4 chicken breasts"],"instructions":["Grill"],"publishedAt":"2021-01-17T19:28:52.803062+01:00"},
                {"name":"Pancakes","tags":["Breakfast"],"publishedAt":"2021-01-17T19:28:52Z"}
            ]"#,
        )
        .unwrap();

        let store = FileStore::open(&path).unwrap();
        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "c0283p3d0cvuglq85log");
        assert!(!all[1].id.is_empty());
        assert_eq!(store.find_by_tag("breakfast").await.unwrap().len(), 1);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.find_all().await.unwrap()[1].id, all[1].id);
    }

    #[test]
    fn test_duplicate_ids_are_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        fs::write(
            &path,
            r#"[{"id":"a","name":"A","publishedAt":"2021-01-17T19:28:52Z"},
                {"id":"a","name":"B","publishedAt":"2021-01-17T19:28:52Z"}]"#,
        )
        .unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        fs::write(&path, "{not json").unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_failed_save_leaves_state_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        let store = FileStore::open(&path).unwrap();
        store.insert(input("Soup", &[])).await.unwrap();

        // A directory in place of the temp file makes the write fail.
        fs::create_dir(dir.path().join("recipes.json.tmp")).unwrap();

        assert!(store.insert(input("Cake", &[])).await.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
