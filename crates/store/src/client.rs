//! Generic document-store adapter over the OpenSearch-compatible REST API.
//! Registries build store-native queries; this client only knows about
//! indexes, document ids and JSON bodies.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use sift_core::{Error, Result};
use tracing::{error, info};

/// Store-side cap on search result size.
const MAX_QUERY_SIZE: usize = 10_000;

pub struct SearchStore {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl SearchStore {
    /// `accept_invalid_certs` opts in to self-signed certificates on dev
    /// clusters; production settings leave it off.
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|err| Error::Store(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Whether a document with `id` exists in `index`.
    pub async fn exists(&self, index: &str, id: &str) -> Result<bool> {
        let url = format!("{}/{}/_doc/{}", self.base_url, index, id);
        let resp = self
            .http
            .head(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|err| self.fail("EXISTS", index, err))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(self.fail("EXISTS", index, format!("http {status}"))),
        }
    }

    /// Runs `query` against `index` and returns the matching documents. The
    /// raw response nests each document under `hits.hits[]._source`; this
    /// flattens it and injects `_id` as an `id` field before deserializing.
    pub async fn read<T: DeserializeOwned>(&self, index: &str, query: Value) -> Result<Vec<T>> {
        let url = format!("{}/{}/_search", self.base_url, index);
        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&json!({ "size": MAX_QUERY_SIZE, "query": query }))
            .send()
            .await
            .map_err(|err| self.fail("READ", index, err))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(self.fail("READ", index, format!("http {status}")));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|err| self.fail("READ", index, err))?;

        info!(index, "READ");
        flatten_hits(body).map_err(|err| self.fail("READ", index, err))
    }

    /// Creates a document. With an explicit id this is a conditional create:
    /// if the id is already taken the existing document is left untouched and
    /// `None` is returned. Without an id the store generates one.
    pub async fn create(
        &self,
        index: &str,
        document: Value,
        document_id: Option<&str>,
    ) -> Result<Option<String>> {
        match document_id {
            Some(id) => {
                let url = format!("{}/{}/_create/{}?refresh=true", self.base_url, index, id);
                let resp = self
                    .http
                    .put(&url)
                    .basic_auth(&self.username, Some(&self.password))
                    .json(&document)
                    .send()
                    .await
                    .map_err(|err| self.fail("CREATE", index, err))?;

                let status = resp.status();
                if status == StatusCode::CONFLICT {
                    return Ok(None);
                }
                if !status.is_success() {
                    return Err(self.fail("CREATE", index, format!("http {status}")));
                }

                info!(index, document_id = id, "CREATE");
                Ok(Some(id.to_string()))
            }
            None => {
                let url = format!("{}/{}/_doc?refresh=true", self.base_url, index);
                let resp = self
                    .http
                    .post(&url)
                    .basic_auth(&self.username, Some(&self.password))
                    .json(&document)
                    .send()
                    .await
                    .map_err(|err| self.fail("CREATE", index, err))?;

                let status = resp.status();
                if !status.is_success() {
                    return Err(self.fail("CREATE", index, format!("http {status}")));
                }

                let body: Value = resp
                    .json()
                    .await
                    .map_err(|err| self.fail("CREATE", index, err))?;
                let id = body
                    .get("_id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| self.fail("CREATE", index, "response missing _id"))?
                    .to_string();

                info!(index, document_id = %id, "CREATE");
                Ok(Some(id))
            }
        }
    }

    /// Creates an index with explicit mappings. Returns false when the index
    /// already exists, leaving it untouched.
    pub async fn create_index(&self, index: &str, body: Value) -> Result<bool> {
        let url = format!("{}/{}", self.base_url, index);
        let resp = self
            .http
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|err| self.fail("CREATE_INDEX", index, err))?;

        let status = resp.status();
        if status.is_success() {
            info!(index, "CREATE_INDEX");
            return Ok(true);
        }

        let detail = resp.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST
            && detail.contains("resource_already_exists_exception")
        {
            return Ok(false);
        }

        Err(self.fail("CREATE_INDEX", index, format!("http {status}: {detail}")))
    }

    /// Merges `partial` into an existing document. Returns false when the
    /// document does not exist.
    pub async fn update(&self, index: &str, id: &str, partial: Value) -> Result<bool> {
        let url = format!("{}/{}/_update/{}?refresh=true", self.base_url, index, id);
        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&json!({ "doc": partial }))
            .send()
            .await
            .map_err(|err| self.fail("UPDATE", index, err))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(self.fail("UPDATE", index, format!("http {status}")));
        }

        info!(index, document_id = id, "UPDATE");
        Ok(true)
    }

    fn fail(&self, op: &str, index: &str, detail: impl std::fmt::Display) -> Error {
        let message = format!("{op} on index <{index}>: {detail}");
        error!(%message, "store operation failed");
        Error::Store(message)
    }
}

fn flatten_hits<T: DeserializeOwned>(body: Value) -> std::result::Result<Vec<T>, String> {
    let hits = body
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .ok_or_else(|| "search response missing hits.hits".to_string())?;

    let mut documents = Vec::with_capacity(hits.len());
    for hit in hits {
        let id = hit
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| "hit missing _id".to_string())?
            .to_string();
        let mut source = hit
            .get("_source")
            .cloned()
            .ok_or_else(|| format!("hit <{id}> missing _source"))?;

        if let Some(fields) = source.as_object_mut() {
            fields.insert("id".to_string(), Value::String(id));
        }

        documents.push(serde_json::from_value(source).map_err(|err| err.to_string())?);
    }

    Ok(documents)
}
