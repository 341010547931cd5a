use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use catalog::LayerRecord;
use reqwest::{StatusCode, Url};
use tracing::{debug, info, warn};

use crate::BackendError;
use crate::protocol::{
    ClearResponse, LayerListResponse, QueryRequest, QueryResponse, ResolvedQuery,
    SaveLayerRequest,
};

pub const ANALYZE_PATH: [&str; 2] = ["api", "analyze"];
pub const LAYERS_PATH: [&str; 2] = ["api", "layers"];

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Answers natural-language imagery prompts.
///
/// Methods return boxed futures for dyn-compatibility.
pub trait QueryBackend: Send + Sync {
    fn analyze(&self, request: QueryRequest)
        -> BoxFuture<'_, Result<QueryResponse, BackendError>>;
}

/// Sends `prompt` and turns the answer into a layer.
///
/// Blank prompts fail before any request is made. Nothing local changes on
/// failure; the caller decides what to show.
pub async fn resolve_prompt(
    backend: &dyn QueryBackend,
    prompt: &str,
    opacity: f64,
) -> Result<ResolvedQuery, BackendError> {
    let request = QueryRequest::new(prompt)?;
    let prompt = request.prompt.clone();
    let resolved = backend
        .analyze(request)
        .await?
        .into_data()?
        .into_layer(&prompt, opacity)?;
    info!(layer = %resolved.layer.id, "query resolved");
    Ok(resolved)
}

/// Client for the HTTP service.
pub struct HttpBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base_url =
            Url::parse(base_url).map_err(|e| BackendError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins percent-encoded `segments` onto the base path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn layers_endpoint(&self, tail: &[&str]) -> Result<Url, BackendError> {
        let mut segments: Vec<&str> = LAYERS_PATH.to_vec();
        segments.extend_from_slice(tail);
        self.endpoint(&segments)
    }

    pub async fn save_layer(
        &self,
        user: &str,
        layer_id: &str,
        record: &LayerRecord,
    ) -> Result<(), BackendError> {
        let url = self.layers_endpoint(&[])?;
        let body = SaveLayerRequest {
            user_id: user.to_string(),
            layer_id: layer_id.to_string(),
            layer: record.clone(),
        };
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        check_status(resp.status())?;
        debug!(user, layer = layer_id, "layer saved remotely");
        Ok(())
    }

    pub async fn list_layers(&self, user: &str) -> Result<Vec<LayerRecord>, BackendError> {
        let url = self.layers_endpoint(&[user])?;
        let resp = self.client.get(url).send().await.map_err(transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        check_status(resp.status())?;
        let body: LayerListResponse = resp.json().await.map_err(decode)?;
        Ok(body.layers)
    }

    /// Returns `false` if the service did not know the layer.
    pub async fn delete_layer(&self, user: &str, layer_id: &str) -> Result<bool, BackendError> {
        let url = self.layers_endpoint(&[user, layer_id])?;
        let resp = self.client.delete(url).send().await.map_err(transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(resp.status())?;
        Ok(true)
    }

    pub async fn clear_layers(&self, user: &str) -> Result<usize, BackendError> {
        let url = self.layers_endpoint(&[user])?;
        let resp = self.client.delete(url).send().await.map_err(transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(0);
        }
        check_status(resp.status())?;
        let body: ClearResponse = resp.json().await.unwrap_or_default();
        Ok(body.cleared)
    }
}

impl QueryBackend for HttpBackend {
    fn analyze(
        &self,
        request: QueryRequest,
    ) -> BoxFuture<'_, Result<QueryResponse, BackendError>> {
        Box::pin(async move {
            let url = self.endpoint(&ANALYZE_PATH)?;
            debug!(%url, prompt = %request.prompt, "analyze");
            let resp = self
                .client
                .post(url)
                .json(&request)
                .send()
                .await
                .map_err(transport)?;

            let status = resp.status();
            if !status.is_success() {
                // Failing answers usually still carry a message.
                let body = resp.json::<QueryResponse>().await.ok();
                return match body.map(QueryResponse::into_data) {
                    Some(Err(rejected)) => Err(rejected),
                    _ => Err(BackendError::Status(status.as_u16())),
                };
            }
            resp.json().await.map_err(decode)
        })
    }
}

fn transport(err: reqwest::Error) -> BackendError {
    warn!("backend request failed: {err}");
    BackendError::Transport(err.to_string())
}

fn decode(err: reqwest::Error) -> BackendError {
    BackendError::Decode(err.to_string())
}

fn check_status(status: StatusCode) -> Result<(), BackendError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(BackendError::Status(status.as_u16()))
    }
}

/// Fixed answers keyed by prompt. Unknown prompts are rejected the way the
/// service rejects places it cannot find.
#[derive(Debug, Clone, Default)]
pub struct StaticBackend {
    answers: BTreeMap<String, QueryResponse>,
}

impl StaticBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, prompt: &str, response: QueryResponse) -> Self {
        self.answers.insert(prompt.trim().to_string(), response);
        self
    }
}

impl QueryBackend for StaticBackend {
    fn analyze(
        &self,
        request: QueryRequest,
    ) -> BoxFuture<'_, Result<QueryResponse, BackendError>> {
        let answer = self.answers.get(&request.prompt).cloned();
        Box::pin(async move {
            Ok(answer.unwrap_or(QueryResponse {
                success: false,
                message: Some(format!("No imagery found for \"{}\"", request.prompt)),
                data: None,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ANALYZE_PATH, HttpBackend, StaticBackend, resolve_prompt};
    use crate::BackendError;
    use crate::protocol::QueryResponse;
    use serde_json::json;

    fn ndvi_answer() -> QueryResponse {
        serde_json::from_value(json!({
            "success": true,
            "data": {
                "location": "Nairobi",
                "processing_type": "NDVI",
                "tile_url": "https://ee.test/{z}/{x}/{y}",
                "latitude": -1.29,
                "longitude": 36.82
            }
        }))
        .unwrap()
    }

    #[test]
    fn endpoints_are_joined_and_encoded() {
        let backend = HttpBackend::new("http://localhost:8000").unwrap();
        assert_eq!(
            backend.endpoint(&ANALYZE_PATH).unwrap().as_str(),
            "http://localhost:8000/api/analyze"
        );

        let nested = HttpBackend::new("https://eo.test/v1/").unwrap();
        assert_eq!(
            nested
                .endpoint(&["api", "layers", "ada lovelace", "Lagos_RGB"])
                .unwrap()
                .as_str(),
            "https://eo.test/v1/api/layers/ada%20lovelace/Lagos_RGB"
        );
    }

    #[test]
    fn unusable_base_urls_are_rejected() {
        assert!(matches!(
            HttpBackend::new("not a url"),
            Err(BackendError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpBackend::new("mailto:eo@test"),
            Err(BackendError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn resolve_prompt_builds_the_layer() {
        let backend = StaticBackend::new().with_answer("ndvi nairobi", ndvi_answer());
        let resolved = resolve_prompt(&backend, "  ndvi nairobi ", 0.8)
            .await
            .unwrap();
        assert_eq!(resolved.layer.location, "Nairobi");
        assert!(resolved.location.is_some());
    }

    #[tokio::test]
    async fn resolve_prompt_surfaces_rejections() {
        let backend = StaticBackend::new();
        assert_eq!(
            resolve_prompt(&backend, "", 0.8).await,
            Err(BackendError::EmptyPrompt)
        );
        assert!(matches!(
            resolve_prompt(&backend, "rgb atlantis", 0.8).await,
            Err(BackendError::Rejected(msg)) if msg.contains("atlantis")
        ));
    }
}
