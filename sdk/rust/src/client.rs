use std::fmt;

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub published_at: String, // RFC 3339, assigned by the server
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeInput {
    pub name: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl RecipeInput {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn ingredient(mut self, ingredient: &str) -> Self {
        self.ingredients.push(ingredient.to_string());
        self
    }

    pub fn instruction(mut self, step: &str) -> Self {
        self.instructions.push(step.to_string());
        self
    }
}

#[derive(Debug)]
pub enum ClientError {
    Http(reqwest::Error),
    /// Non-success status with the server's `error` message.
    Api { status: u16, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::Api { status, .. } => Some(*status),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Http(e) => write!(f, "Request failed: {}", e),
            ClientError::Api { status, message } => {
                write!(f, "Recipes API returned error status {}: {}", status, message)
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Http(e) => Some(e),
            ClientError::Api { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct RecipeClient {
    client: Client,
    base_url: String,
}

impl RecipeClient {
    pub fn new(api_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/api/v1/recipes", api_url.trim_end_matches('/')),
        }
    }

    pub async fn create(&self, input: &RecipeInput) -> Result<Recipe, ClientError> {
        let resp = self.client.post(&self.base_url).json(input).send().await?;
        decode(resp).await
    }

    pub async fn list(&self) -> Result<Vec<Recipe>, ClientError> {
        let resp = self.client.get(&self.base_url).send().await?;
        decode(resp).await
    }

    pub async fn get(&self, id: &str) -> Result<Recipe, ClientError> {
        let resp = self.client.get(self.recipe_url(id)).send().await?;
        decode(resp).await
    }

    /// Replace the fields of recipe `id`. The id and publish time are kept.
    pub async fn update(&self, id: &str, input: &RecipeInput) -> Result<Recipe, ClientError> {
        let resp = self.client.put(self.recipe_url(id)).json(input).send().await?;
        decode(resp).await
    }

    /// Delete recipe `id`, returning the removed record.
    pub async fn delete(&self, id: &str) -> Result<Recipe, ClientError> {
        let resp = self.client.delete(self.recipe_url(id)).send().await?;
        decode(resp).await
    }

    /// Recipes carrying `tag`, compared case-insensitively by the server.
    pub async fn search(&self, tag: &str) -> Result<Vec<Recipe>, ClientError> {
        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("tag", tag)])
            .send()
            .await?;
        decode(resp).await
    }

    fn recipe_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await?;
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(resp.json().await?)
}
