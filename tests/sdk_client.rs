//! The Rust SDK against a file-backed server.

use std::sync::Arc;

use recipes_api::store::FileStore;
use recipes_sdk::{RecipeClient, RecipeInput};

mod common;

fn pancakes() -> RecipeInput {
    RecipeInput::new("Pancakes")
        .tag("Breakfast")
        .ingredient("flour")
        .ingredient("milk")
        .instruction("whisk")
        .instruction("fry")
}

#[tokio::test]
async fn test_sdk_crud() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path().join("recipes.json")).unwrap());
    let (addr, shutdown) = common::spawn_server(store).await;
    let client = RecipeClient::new(&common::base_url(addr));

    let created = client.create(&pancakes()).await.unwrap();
    assert_eq!(created.instructions, vec!["whisk", "fry"]);
    assert!(!created.published_at.is_empty());

    assert_eq!(client.get(&created.id).await.unwrap(), created);
    assert_eq!(client.list().await.unwrap(), vec![created.clone()]);
    assert_eq!(client.search("breakfast").await.unwrap(), vec![created.clone()]);

    let updated = client
        .update(&created.id, &RecipeInput::new("Crepes").tag("brunch"))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.published_at, created.published_at);
    assert!(client.search("breakfast").await.unwrap().is_empty());

    let removed = client.delete(&created.id).await.unwrap();
    assert_eq!(removed, updated);

    let err = client.get(&created.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Recipe not found"));

    let err = client.search("").await.unwrap_err();
    assert_eq!(err.status(), Some(400));

    shutdown.trigger();
}

#[tokio::test]
async fn test_records_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.json");

    let created = {
        let store = Arc::new(FileStore::open(&path).unwrap());
        let (addr, shutdown) = common::spawn_server(store).await;
        let client = RecipeClient::new(&common::base_url(addr));
        let created = client.create(&pancakes()).await.unwrap();
        shutdown.trigger();
        created
    };

    let store = Arc::new(FileStore::open(&path).unwrap());
    let (addr, shutdown) = common::spawn_server(store).await;
    let client = RecipeClient::new(&common::base_url(addr));

    assert_eq!(client.list().await.unwrap(), vec![created]);
    shutdown.trigger();
}
