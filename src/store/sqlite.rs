//! Recipe storage in an embedded SQLite database.
//!
//! Each recipe is one row; the sequence fields are stored as JSON documents.
//! `seq` preserves insertion order, `id` is a database-side object id
//! (UUID v4, 32 hex characters).

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use uuid::Uuid;

use crate::store::types::{Recipe, RecipeInput};
use crate::store::{RecipeStore, StoreError, StoreResult};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS recipes (
        seq          INTEGER PRIMARY KEY AUTOINCREMENT,
        id           TEXT    NOT NULL UNIQUE,
        name         TEXT    NOT NULL,
        tags         TEXT    NOT NULL DEFAULT '[]',
        ingredients  TEXT    NOT NULL DEFAULT '[]',
        instructions TEXT    NOT NULL DEFAULT '[]',
        published_at TEXT    NOT NULL
    );
";

const COLUMNS: &str = "id, name, tags, ingredients, instructions, published_at";

/// Recipes stored in a SQLite database file (or in memory).
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "Opened recipes database");
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `op` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("database lock poisoned".into()))?;
            op(&guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

/// Raw column values before JSON and timestamp decoding.
struct RecipeRow {
    id: String,
    name: String,
    tags: String,
    ingredients: String,
    instructions: String,
    published_at: String,
}

impl RecipeRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            tags: row.get(2)?,
            ingredients: row.get(3)?,
            instructions: row.get(4)?,
            published_at: row.get(5)?,
        })
    }

    fn into_recipe(self) -> StoreResult<Recipe> {
        let published_at = DateTime::parse_from_rfc3339(&self.published_at)
            .map_err(|e| StoreError::Corrupt(format!("recipe {} has invalid published_at: {}", self.id, e)))?
            .with_timezone(&Utc);

        Ok(Recipe {
            tags: serde_json::from_str(&self.tags)?,
            ingredients: serde_json::from_str(&self.ingredients)?,
            instructions: serde_json::from_str(&self.instructions)?,
            id: self.id,
            name: self.name,
            published_at,
        })
    }
}

/// Attempts made to find an unused id before giving up.
const MAX_ID_ATTEMPTS: usize = 3;

fn object_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

/// Insert `recipe`, drawing a new id from `next_id` while its id is taken.
fn insert_with_retry(
    conn: &Connection,
    mut recipe: Recipe,
    mut next_id: impl FnMut() -> String,
) -> StoreResult<Recipe> {
    let tags = serde_json::to_string(&recipe.tags)?;
    let ingredients = serde_json::to_string(&recipe.ingredients)?;
    let instructions = serde_json::to_string(&recipe.instructions)?;
    let published_at = recipe.published_at.to_rfc3339_opts(SecondsFormat::Nanos, true);

    let mut attempt = 1;
    loop {
        let inserted = conn.execute(
            &format!("INSERT INTO recipes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)", COLUMNS),
            params![recipe.id, recipe.name, tags, ingredients, instructions, published_at],
        );
        match inserted {
            Ok(_) => break,
            Err(e) if is_unique_violation(&e) && attempt < MAX_ID_ATTEMPTS => {
                tracing::warn!(id = %recipe.id, attempt, "Generated recipe id already taken");
                recipe.id = next_id();
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::debug!(id = %recipe.id, "Recipe inserted");
    Ok(recipe)
}

fn select_one(conn: &Connection, id: &str) -> StoreResult<Option<Recipe>> {
    conn.query_row(
        &format!("SELECT {} FROM recipes WHERE id = ?1", COLUMNS),
        params![id],
        RecipeRow::from_row,
    )
    .optional()?
    .map(RecipeRow::into_recipe)
    .transpose()
}

fn select_all(conn: &Connection) -> StoreResult<Vec<Recipe>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM recipes ORDER BY seq", COLUMNS))?;
    let rows = stmt.query_map([], RecipeRow::from_row)?;

    let mut recipes = Vec::new();
    for row in rows {
        recipes.push(row?.into_recipe()?);
    }
    Ok(recipes)
}

#[async_trait]
impl RecipeStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn insert(&self, input: RecipeInput) -> StoreResult<Recipe> {
        let recipe = Recipe::new(object_id(), input, Utc::now());
        self.with_conn(move |conn| insert_with_retry(conn, recipe, object_id))
            .await
    }

    async fn find_all(&self) -> StoreResult<Vec<Recipe>> {
        self.with_conn(select_all).await
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Recipe> {
        let id = id.to_string();
        self.with_conn(move |conn| select_one(conn, &id)?.ok_or(StoreError::NotFound(id)))
            .await
    }

    async fn update_by_id(&self, id: &str, input: RecipeInput) -> StoreResult<Recipe> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE recipes SET name = ?2, tags = ?3, ingredients = ?4, instructions = ?5 WHERE id = ?1",
                params![
                    id,
                    input.name,
                    serde_json::to_string(&input.tags)?,
                    serde_json::to_string(&input.ingredients)?,
                    serde_json::to_string(&input.instructions)?,
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
            select_one(conn, &id)?.ok_or(StoreError::NotFound(id))
        })
        .await
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Recipe> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let recipe = match select_one(conn, &id)? {
                Some(recipe) => recipe,
                None => return Err(StoreError::NotFound(id)),
            };
            conn.execute("DELETE FROM recipes WHERE id = ?1", params![id])?;
            Ok(recipe)
        })
        .await
    }

    async fn find_by_tag(&self, tag: &str) -> StoreResult<Vec<Recipe>> {
        let tag = tag.to_string();
        self.with_conn(move |conn| {
            Ok(select_all(conn)?.into_iter().filter(|r| r.has_tag(&tag)).collect())
        })
        .await
    }

    async fn count(&self) -> StoreResult<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}
