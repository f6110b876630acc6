// Resource descriptors and loaders
//
// An entity declares the external artifacts it needs before it may draw
// (stylesheets, text, data, scripts, raw fetches). Descriptors are a closed
// enum - an unknown kind is unrepresentable, so "unrecognized kind" can only
// arise from a loader that legitimately refuses a kind it does not serve.
// A batch resolves in declaration order and fails as a whole on the first
// error.

use crate::error::RuntimeError;
use bytes::Bytes;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A declarative request for one external artifact
pub enum ResourceDescriptor {
    /// Stylesheet fetched from a URL
    StylesheetUrl { url: String, name: Option<String> },
    /// Stylesheet supplied inline as raw source
    StylesheetSource { source: String, name: Option<String> },
    /// Plain text fetched from a URL
    Text { url: String },
    /// Structured (tabular/JSON) data fetched from a URL
    Data { url: String },
    /// Arbitrary script fetched from a URL
    ScriptUrl { url: String },
    /// Arbitrary network fetch, delivered as raw bytes
    Fetch { url: String },
    /// An already-pending computation supplied directly
    Pending {
        name: String,
        future: BoxFuture<'static, Result<Artifact, RuntimeError>>,
    },
}

impl ResourceDescriptor {
    /// Stable kind tag, used in logs and refusal errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StylesheetUrl { .. } => "stylesheet-url",
            Self::StylesheetSource { .. } => "stylesheet-source",
            Self::Text { .. } => "text",
            Self::Data { .. } => "data",
            Self::ScriptUrl { .. } => "script-url",
            Self::Fetch { .. } => "fetch",
            Self::Pending { .. } => "pending",
        }
    }

    /// Human-readable name for logs and load-failure errors
    pub fn display_name(&self) -> String {
        match self {
            Self::StylesheetUrl { url, name } => name.clone().unwrap_or_else(|| url.clone()),
            Self::StylesheetSource { name, .. } => {
                name.clone().unwrap_or_else(|| "inline stylesheet".to_string())
            }
            Self::Text { url }
            | Self::Data { url }
            | Self::ScriptUrl { url }
            | Self::Fetch { url } => url.clone(),
            Self::Pending { name, .. } => name.clone(),
        }
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.display_name())
    }
}

/// A loaded artifact, stored on the entity once its batch resolves
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Stylesheet(String),
    Text(String),
    Data(Value),
    Script(String),
    Bytes(Bytes),
}

/// Resolves descriptors into artifacts
///
/// `load_batch` preserves declaration order in its output even though the
/// individual loads run concurrently and may complete in any order.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, descriptor: ResourceDescriptor)
        -> BoxFuture<'static, Result<Artifact, RuntimeError>>;

    fn load_batch(
        &self,
        descriptors: Vec<ResourceDescriptor>,
    ) -> BoxFuture<'static, Result<Vec<Artifact>, RuntimeError>> {
        let futures: Vec<_> = descriptors.into_iter().map(|d| self.load(d)).collect();
        Box::pin(async move { futures::future::try_join_all(futures).await })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP-backed loader
// ─────────────────────────────────────────────────────────────────────────────

/// Default loader: resolves every descriptor kind, by-URL kinds over HTTP
#[derive(Clone, Default)]
pub struct HttpLoader {
    client: reqwest::Client,
}

impl HttpLoader {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch_text(client: reqwest::Client, url: String) -> Result<String, RuntimeError> {
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| RuntimeError::load_failed(&url, e))?;
        response
            .error_for_status()
            .map_err(|e| RuntimeError::load_failed(&url, e))?
            .text()
            .await
            .map_err(|e| RuntimeError::load_failed(&url, e))
    }
}

impl ResourceLoader for HttpLoader {
    fn load(
        &self,
        descriptor: ResourceDescriptor,
    ) -> BoxFuture<'static, Result<Artifact, RuntimeError>> {
        let client = self.client.clone();
        match descriptor {
            ResourceDescriptor::StylesheetSource { source, .. } => {
                Box::pin(async move { Ok(Artifact::Stylesheet(source)) })
            }
            ResourceDescriptor::StylesheetUrl { url, .. } => Box::pin(async move {
                Self::fetch_text(client, url).await.map(Artifact::Stylesheet)
            }),
            ResourceDescriptor::Text { url } => {
                Box::pin(async move { Self::fetch_text(client, url).await.map(Artifact::Text) })
            }
            ResourceDescriptor::ScriptUrl { url } => {
                Box::pin(async move { Self::fetch_text(client, url).await.map(Artifact::Script) })
            }
            ResourceDescriptor::Data { url } => Box::pin(async move {
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| RuntimeError::load_failed(&url, e))?;
                response
                    .error_for_status()
                    .map_err(|e| RuntimeError::load_failed(&url, e))?
                    .json::<Value>()
                    .await
                    .map_err(|e| RuntimeError::load_failed(&url, e))
                    .map(Artifact::Data)
            }),
            ResourceDescriptor::Fetch { url } => Box::pin(async move {
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| RuntimeError::load_failed(&url, e))?;
                response
                    .bytes()
                    .await
                    .map_err(|e| RuntimeError::load_failed(&url, e))
                    .map(Artifact::Bytes)
            }),
            ResourceDescriptor::Pending { future, .. } => future,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory loader for tests and embedded hosts
// ─────────────────────────────────────────────────────────────────────────────

/// Loader serving canned artifacts keyed by the descriptor's display name
///
/// Gates let a test hold a load open and release it later, which is how the
/// readiness-gate scenarios drive "resources still in flight". A loader can
/// also be configured to refuse whole kinds, exercising the
/// unsupported-resource failure path.
#[derive(Default)]
pub struct MemoryLoader {
    artifacts: Mutex<HashMap<String, Artifact>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    refused_kinds: HashSet<&'static str>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned artifact under a descriptor display name
    pub fn with_artifact(self, key: impl Into<String>, artifact: Artifact) -> Self {
        self.artifacts.lock().unwrap().insert(key.into(), artifact);
        self
    }

    /// Refuse descriptors of the given kinds with an unsupported error
    pub fn refusing(mut self, kinds: &[&'static str]) -> Self {
        self.refused_kinds = kinds.iter().copied().collect();
        self
    }

    /// Hold loads for `key` open until [`MemoryLoader::release`] is called
    pub fn gate(&self, key: impl Into<String>) {
        self.gates
            .lock()
            .unwrap()
            .insert(key.into(), Arc::new(Notify::new()));
    }

    /// Release a gated load
    pub fn release(&self, key: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(key) {
            gate.notify_one();
        }
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(
        &self,
        descriptor: ResourceDescriptor,
    ) -> BoxFuture<'static, Result<Artifact, RuntimeError>> {
        if self.refused_kinds.contains(descriptor.kind()) {
            let kind = descriptor.kind().to_string();
            return Box::pin(async move { Err(RuntimeError::UnsupportedResource(kind)) });
        }

        // Inline and pending kinds carry their own payload
        match descriptor {
            ResourceDescriptor::StylesheetSource { source, .. } => {
                return Box::pin(async move { Ok(Artifact::Stylesheet(source)) });
            }
            ResourceDescriptor::Pending { future, .. } => return future,
            _ => {}
        }

        let key = descriptor.display_name();
        let gate = self.gates.lock().unwrap().get(&key).cloned();
        let canned = self.artifacts.lock().unwrap().get(&key).cloned();
        Box::pin(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            canned.ok_or_else(|| RuntimeError::load_failed(&key, "no canned artifact"))
        })
    }
}
