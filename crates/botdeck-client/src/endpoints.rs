//! Typed endpoint facade
//!
//! Thin wrappers over [`DashboardClient::execute`] for the endpoints the
//! dashboard pages actually render. The reply structs double as the
//! canonical wire shapes: the fallback table emits the same keys, so these
//! deserialize identically online and offline.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ClientError, ClientResult};
use crate::executor::{DashboardClient, RequestOptions};

/// Project/environment descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub name: String,
    pub base_path: String,
    pub connected: bool,
    pub models_available: u32,
}

/// Reply for the environment endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentReply {
    pub success: bool,
    #[serde(default)]
    pub simulation_mode: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub project: EnvironmentInfo,
}

/// One entry in the model listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub parameters: String,
    pub status: String,
}

/// Reply for the model-listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsReply {
    pub success: bool,
    #[serde(default)]
    pub simulation_mode: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub models: Vec<ModelDescriptor>,
}

/// One chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Reply for the chat-completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub success: bool,
    #[serde(default)]
    pub simulation_mode: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub model: String,
    pub message: ChatMessage,
}

/// Reply for the file-read endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReadReply {
    pub success: bool,
    #[serde(default)]
    pub simulation_mode: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub path: String,
    pub content: String,
}

/// Acknowledgement for file-write and settings persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistAck {
    pub success: bool,
    #[serde(default)]
    pub simulation_mode: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    pub persisted: bool,
}

impl DashboardClient {
    /// Environment and project diagnostics.
    pub async fn environment(&self) -> ClientResult<EnvironmentReply> {
        self.typed("/api/environment", RequestOptions::get()).await
    }

    /// Available AI models.
    pub async fn models(&self) -> ClientResult<ModelsReply> {
        self.typed("/api/models", RequestOptions::get()).await
    }

    /// One chat completion against the selected model.
    pub async fn chat(&self, prompt: &str, model_id: &str) -> ClientResult<ChatReply> {
        let body = json!({ "prompt": prompt, "model": model_id });
        self.typed("/api/chat", RequestOptions::post(body)).await
    }

    /// Read a workspace file.
    pub async fn read_file(&self, path: &str) -> ClientResult<FileReadReply> {
        let body = json!({ "path": path });
        self.typed("/api/files/read", RequestOptions::post(body))
            .await
    }

    /// Write a workspace file.
    pub async fn write_file(&self, path: &str, content: &str) -> ClientResult<PersistAck> {
        let body = json!({ "path": path, "content": content });
        self.typed("/api/files/write", RequestOptions::post(body))
            .await
    }

    /// Persist dashboard settings.
    pub async fn save_settings(&self, settings: Value) -> ClientResult<PersistAck> {
        self.typed("/api/settings", RequestOptions::post(settings))
            .await
    }

    async fn typed<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let reply = self.execute(path, options).await?;
        if !reply.is_success() {
            return Err(ClientError::Api {
                status: reply.status,
                message: summarize(&reply.body),
            });
        }
        Ok(serde_json::from_value(reply.body)?)
    }
}

fn summarize(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
