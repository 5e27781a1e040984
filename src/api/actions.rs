use crate::client::KentaaClient;
use crate::error::Error;
use crate::http::encode_path_segment;
use crate::request::{query_pairs, RequestDescriptor};
use serde_json::{json, Map, Value};
use std::fmt::Display;

const LOCATION: &str = "actions";
const LIST_KEY: &str = "actions";

/// Client for the `actions` resource.
/// See https://developer.kentaa.nl/kentaa-api/#actions
pub struct Actions<'a> {
    client: &'a KentaaClient,
}

impl<'a> Actions<'a> {
    pub(crate) fn new(client: &'a KentaaClient) -> Self {
        Self { client }
    }

    /// The entire list of actions, fetched across all pages.
    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Vec<Value>, Error> {
        self.client
            .fetch_all(LOCATION, LIST_KEY, &query_pairs(query))
            .await
    }

    /// One action, by numeric id or slug.
    pub async fn get(&self, id: impl Display, query: &[(&str, &str)]) -> Result<Value, Error> {
        let path = format!("{}/{}", LOCATION, encode_path_segment(&id.to_string()));
        self.client
            .request(RequestDescriptor::get(path, query_pairs(query)))
            .await
    }

    /// Create an action. `owner_id`, `title` and `description` are required
    /// by the API; anything else goes in `extra`.
    pub async fn create(
        &self,
        owner_id: u64,
        title: &str,
        description: &str,
        extra: Option<Map<String, Value>>,
    ) -> Result<Value, Error> {
        let mut body = extra.unwrap_or_default();
        body.insert("owner_id".to_string(), json!(owner_id));
        body.insert("title".to_string(), json!(title));
        body.insert("description".to_string(), json!(description));
        self.client
            .request(RequestDescriptor::post(LOCATION, Value::Object(body)))
            .await
    }

    /// Update an existing action.
    pub async fn update(&self, action_id: u64, body: Map<String, Value>) -> Result<Value, Error> {
        let path = format!("{}/{}", LOCATION, action_id);
        self.client
            .request(RequestDescriptor::patch(path, Value::Object(body)))
            .await
    }
}
