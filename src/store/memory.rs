//! In-process recipe storage.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::store::types::{short_id, Recipe, RecipeInput};
use crate::store::{RecipeStore, StoreError, StoreResult};

/// Ordered recipe collection with the store semantics but no locking.
///
/// Shared by the memory and file backends; callers hold the lock.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecipeCollection {
    records: Vec<Recipe>,
}

impl RecipeCollection {
    pub fn from_records(records: Vec<Recipe>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Recipe] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Generate an id not present in the collection.
    pub fn fresh_id(&self) -> String {
        loop {
            let id = short_id();
            if !self.contains(&id) {
                return id;
            }
        }
    }

    pub fn insert(&mut self, input: RecipeInput) -> Recipe {
        let recipe = Recipe::new(self.fresh_id(), input, Utc::now());
        self.records.push(recipe.clone());
        recipe
    }

    pub fn get(&self, id: &str) -> StoreResult<Recipe> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn update(&mut self, id: &str, input: RecipeInput) -> StoreResult<Recipe> {
        let recipe = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        recipe.apply(input);
        Ok(recipe.clone())
    }

    pub fn remove(&mut self, id: &str) -> StoreResult<Recipe> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.records.remove(index))
    }

    pub fn with_tag(&self, tag: &str) -> Vec<Recipe> {
        self.records.iter().filter(|r| r.has_tag(tag)).cloned().collect()
    }
}

/// Recipes held in process memory for the lifetime of the service.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collection: RwLock<RecipeCollection>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, input: RecipeInput) -> StoreResult<Recipe> {
        let recipe = self.collection.write().await.insert(input);
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
        self.collection.write().await.update(id, input)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Recipe> {
        self.collection.write().await.remove(id)
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
    use std::collections::HashSet;
    use std::sync::Arc;

    fn input(name: &str, tags: &[&str]) -> RecipeInput {
        RecipeInput {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ingredients: vec!["salt".into()],
            instructions: vec!["mix".into()],
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let store = MemoryStore::new();
        let before = Utc::now();
        let recipe = store.insert(input("Soup", &["dinner"])).await.unwrap();

        assert!(!recipe.id.is_empty());
        assert!(recipe.published_at >= before);
        assert_eq!(store.find_by_id(&recipe.id).await.unwrap(), recipe);
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let store = MemoryStore::new();
        assert!(store.find_all().await.unwrap().is_empty());

        let a = store.insert(input("A", &[])).await.unwrap();
        let b = store.insert(input("B", &[])).await.unwrap();
        let c = store.insert(input("C", &[])).await.unwrap();

        let ids: Vec<_> = store.find_all().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[tokio::test]
    async fn test_update_unknown_id_creates_nothing() {
        let store = MemoryStore::new();
        let err = store.update_by_id("missing", input("X", &[])).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_preserves_id_and_published_at() {
        let store = MemoryStore::new();
        let created = store.insert(input("Soup", &["dinner"])).await.unwrap();
        let updated = store
            .update_by_id(&created.id, input("Stew", &["lunch"]))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.published_at, created.published_at);
        assert_eq!(updated.name, "Stew");
        assert_eq!(store.find_by_id(&created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let created = store.insert(input("Soup", &[])).await.unwrap();

        assert!(store.delete_by_id("missing").await.unwrap_err().is_not_found());

        let removed = store.delete_by_id(&created.id).await.unwrap();
        assert_eq!(removed, created);
        assert!(store.find_all().await.unwrap().is_empty());
        assert!(store.delete_by_id(&created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_find_by_tag_case_insensitive() {
        let store = MemoryStore::new();
        let cake = store.insert(input("Cake", &["Dessert"])).await.unwrap();
        store.insert(input("Soup", &["dinner"])).await.unwrap();

        let found = store.find_by_tag("dessert").await.unwrap();
        assert_eq!(found, vec![cake]);
        assert!(store.find_by_tag("breakfast").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_get_unique_ids() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert(input(&format!("R{}", i), &[])).await.unwrap().id
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 50);
        assert_eq!(store.count().await.unwrap(), 50);
    }
}
