use crate::{ClientError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use vidavox_core::fetch::{self, FileScope, TreeFetcher};
use vidavox_core::models::{
    DeleteOutcome, Folder, FolderCreateRequest, FolderList, SearchRequest, SearchResponse,
    UploadResponse,
};
use vidavox_core::tree::{self, TreeNode};
use vidavox_core::{ClientConfig, ConfigError};

const API_KEY_HEADER: &str = "doc-api-key";
const USER_AGENT: &str = concat!("vidavox-rs/", env!("CARGO_PKG_VERSION"));

/// Vidavox RAG REST API Client
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    client: HttpClient,
}

impl Client {
    /// Create a client for `base_url` authenticating with `api_key`, using
    /// default settings otherwise
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url, api_key))
    }

    /// Create a client from an already assembled configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ClientError::Config(ConfigError::InvalidApiKey))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);

        let client = HttpClient::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()?;

        tracing::debug!(base_url = %config.normalized_base_url(), timeout_secs = config.timeout_secs, "Client created");

        Ok(Self {
            base_url: config.normalized_base_url().to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Send a request and turn transport failures and error statuses into
    /// `ClientError`s
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "Sending request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.as_u16() < 400 {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            if body.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                body
            }
        });
        tracing::warn!(%method, %url, status = status.as_u16(), %message, "Request failed");

        Err(ClientError::from_status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let endpoint = response.url().path().to_string();
        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|err| {
            tracing::warn!(%endpoint, error = %err, "Unexpected response body");
            ClientError::InvalidResponse(format!("{}: {}", endpoint, err))
        })
    }

    // Folder operations

    /// Create a folder, optionally below `parent_id`
    pub async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<Folder> {
        let req = FolderCreateRequest {
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
        };

        let folder: Folder = self
            .send_json(self.client.post(self.url("/folders/")).json(&req))
            .await?;
        tracing::info!(folder_id = %folder.id, name = %folder.name, "Folder created");
        Ok(folder)
    }

    /// Delete a folder by ID
    pub async fn delete_folder(&self, folder_id: &str) -> Result<()> {
        self.send(self.client.delete(self.url(&format!("/folders/{}", folder_id))))
            .await?;
        tracing::info!(%folder_id, "Folder deleted");
        Ok(())
    }

    /// List folders
    pub async fn list_folders(&self) -> Result<FolderList> {
        self.send_json(self.client.get(self.url("/folders/"))).await
    }

    /// Fetch the full folder/file tree
    pub async fn get_folder_tree(&self) -> Result<Vec<TreeNode>> {
        let payload: serde_json::Value = self
            .send_json(self.client.get(self.url("/folders/tree")))
            .await?;
        Ok(tree::parse_forest(payload)?)
    }

    // File operations

    /// Upload local files into a folder
    pub async fn upload_files<P: AsRef<Path>>(
        &self,
        folder_id: &str,
        file_paths: &[P],
    ) -> Result<UploadResponse> {
        let form = files_form(file_paths).await?;
        let url = self.url(&format!("/folders/{}/v1/upload", folder_id));

        let response: UploadResponse = self.send_json(self.client.post(url).multipart(form)).await?;
        tracing::info!(
            %folder_id,
            uploaded = response.total_uploaded,
            failed = response.total_failed,
            "Upload finished"
        );
        Ok(response)
    }

    /// Ask the service to ingest a directory by path
    pub async fn process_directory(
        &self,
        folder_id: &str,
        directory_path: impl AsRef<Path>,
    ) -> Result<UploadResponse> {
        let directory_path = absolute_path(directory_path.as_ref())?;
        let url = self.url(&format!("/folders/{}/v1/upload", folder_id));
        let body = serde_json::json!({ "directory_path": directory_path });

        self.send_json(self.client.post(url).json(&body)).await
    }

    /// Delete a file by ID
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.send(self.client.delete(self.url(&format!("/folders/file/{}", file_id))))
            .await?;
        tracing::debug!(%file_id, "File deleted");
        Ok(())
    }

    /// Delete several files one after another.
    ///
    /// With `stop_on_error` the first failure is returned as the error;
    /// otherwise every id is attempted and failures are reported per file.
    pub async fn delete_files<S: AsRef<str>>(
        &self,
        file_ids: &[S],
        stop_on_error: bool,
    ) -> Result<Vec<DeleteOutcome>> {
        let mut outcomes = Vec::with_capacity(file_ids.len());

        for file_id in file_ids {
            let file_id = file_id.as_ref();
            match self.delete_file(file_id).await {
                Ok(()) => outcomes.push(DeleteOutcome {
                    file_id: file_id.to_string(),
                    deleted: true,
                    error: None,
                }),
                Err(e) if stop_on_error => return Err(e),
                Err(e) => {
                    tracing::warn!(%file_id, error = %e, "Failed to delete file");
                    outcomes.push(DeleteOutcome {
                        file_id: file_id.to_string(),
                        deleted: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(outcomes)
    }

    // Search operations

    /// Search the documents of a folder
    pub async fn search(&self, folder_id: &str, request: &SearchRequest) -> Result<SearchResponse> {
        let url = self.url(&format!("/folders/{}/v1/search", folder_id));
        self.send_json(self.client.post(url).form(&request.to_form()))
            .await
    }

    /// Upload files and/or a server-side directory, then search, in one call
    pub async fn upload_and_search<P: AsRef<Path>>(
        &self,
        folder_id: &str,
        request: &SearchRequest,
        file_paths: &[P],
        directory_path: Option<&Path>,
    ) -> Result<SearchResponse> {
        let mut form = files_form(file_paths).await?;

        if let Some(dir) = directory_path {
            form = form.text("directory_path", absolute_path(dir)?);
        }
        for (key, value) in request.to_form() {
            form = form.text(key, value);
        }

        let url = self.url(&format!("/folders/{}/v1/upload-and-search", folder_id));
        self.send_json(self.client.post(url).multipart(form)).await
    }

    /// Health check
    pub async fn health(&self) -> Result<()> {
        self.send(self.client.get(self.url("/health"))).await?;
        Ok(())
    }

    // Name-based operations. Each fetches a fresh tree, resolves the name,
    // and only then issues the dependent request.

    /// ID of the first folder named `name` in tree order, if any
    pub async fn find_folder_id(&self, name: &str) -> Result<Option<String>> {
        fetch::resolve_folder_id(self, name).await
    }

    async fn require_folder_id(&self, name: &str) -> Result<String> {
        self.find_folder_id(name)
            .await?
            .ok_or_else(|| folder_not_found(name))
    }

    /// File IDs in the folder named `name`; nested folders are included when
    /// `recursive` is set
    #[tracing::instrument(skip(self))]
    pub async fn file_ids_in_folder_by_name(&self, name: &str, recursive: bool) -> Result<Vec<String>> {
        fetch::resolve_file_ids(self, name, FileScope::from_recursive(recursive))
            .await?
            .ok_or_else(|| folder_not_found(name))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_folder_by_name(&self, name: &str) -> Result<()> {
        let folder_id = self.require_folder_id(name).await?;
        self.delete_folder(&folder_id).await
    }

    #[tracing::instrument(skip(self, file_paths))]
    pub async fn upload_files_to_folder<P: AsRef<Path>>(
        &self,
        name: &str,
        file_paths: &[P],
    ) -> Result<UploadResponse> {
        let folder_id = self.require_folder_id(name).await?;
        self.upload_files(&folder_id, file_paths).await
    }

    #[tracing::instrument(skip(self, request), fields(query = %request.query))]
    pub async fn search_in_folder(&self, name: &str, request: &SearchRequest) -> Result<SearchResponse> {
        let folder_id = self.require_folder_id(name).await?;
        self.search(&folder_id, request).await
    }
}

#[async_trait]
impl TreeFetcher for Client {
    type Error = ClientError;

    async fn fetch_tree(&self) -> Result<Vec<TreeNode>> {
        self.get_folder_tree().await
    }
}

fn folder_not_found(name: &str) -> ClientError {
    ClientError::NotFound(format!("folder '{}' not found", name))
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else if err.is_connect() {
        ClientError::Connection(err.to_string())
    } else {
        ClientError::Request(err)
    }
}

/// Pull a human readable message out of an error body: `message`, then
/// `detail`, then `error`
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| match value.get(key)? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
}

fn absolute_path(path: &Path) -> Result<String> {
    std::path::absolute(path)
        .map(|p| p.display().to_string())
        .map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Multipart form with one `files` part per path. Every path is checked
/// before any file is read.
async fn files_form<P: AsRef<Path>>(file_paths: &[P]) -> Result<Form> {
    for path in file_paths {
        let path = path.as_ref();
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| ClientError::Io {
                path: path.display().to_string(),
                source,
            })?;
        if !exists {
            return Err(ClientError::Io {
                path: path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }
    }

    let mut form = Form::new();
    for path in file_paths {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        form = form.part("files", part);
    }

    Ok(form)
}
