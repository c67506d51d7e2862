use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Timestamps the service sends are not always well formed; an unreadable
/// optional timestamp is dropped instead of failing the whole payload.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(text)) => DateTime::parse_from_rfc3339(&text)
            .map(|ts| ts.with_timezone(&Utc))
            .or_else(|_| {
                // naive ISO timestamps are taken as UTC
                chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
                    .map(|naive| naive.and_utc())
            })
            .ok(),
        _ => None,
    })
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

fn default_status() -> String {
    "processed".to_string()
}

/// Folder as returned by the folder endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file_count: u64,
    #[serde(default)]
    pub total_size: u64,
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Folder(id='{}', name='{}', files={})",
            self.id, self.name, self.file_count
        )
    }
}

/// Body of `POST /folders/`
#[derive(Debug, Clone, Serialize)]
pub struct FolderCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Deserialize)]
struct FolderListWire {
    #[serde(default)]
    folders: Vec<Folder>,
    #[serde(default)]
    total: Option<u64>,
}

/// Flat listing of folders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "FolderListWire")]
pub struct FolderList {
    pub folders: Vec<Folder>,
    pub total: u64,
}

impl From<FolderListWire> for FolderList {
    fn from(wire: FolderListWire) -> Self {
        let total = wire.total.unwrap_or(wire.folders.len() as u64);
        Self {
            folders: wire.folders,
            total,
        }
    }
}

/// Document stored in a folder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct File {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl File {
    /// Size with a binary unit suffix, e.g. `1.5 KB`
    pub fn size_human(&self) -> String {
        const KB: f64 = 1024.0;
        let size = self.size as f64;
        if size < KB {
            format!("{} B", self.size)
        } else if size < KB * KB {
            format!("{:.1} KB", size / KB)
        } else if size < KB * KB * KB {
            format!("{:.1} MB", size / (KB * KB))
        } else {
            format!("{:.1} GB", size / (KB * KB * KB))
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File(id='{}', name='{}', size={})",
            self.id,
            self.name,
            self.size_human()
        )
    }
}

#[derive(Deserialize)]
struct FileListWire {
    #[serde(default)]
    files: Vec<File>,
    #[serde(default)]
    total: Option<u64>,
}

/// Flat listing of files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "FileListWire")]
pub struct FileList {
    pub files: Vec<File>,
    pub total: u64,
}

impl From<FileListWire> for FileList {
    fn from(wire: FileListWire) -> Self {
        let total = wire.total.unwrap_or(wire.files.len() as u64);
        Self {
            files: wire.files,
            total,
        }
    }
}

/// Outcome for one uploaded file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResult {
    #[serde(default)]
    pub file: Option<File>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub success: bool,
}

#[derive(Deserialize)]
struct UploadResponseWire {
    #[serde(default)]
    results: Option<Vec<UploadResult>>,
    #[serde(default)]
    files: Option<Vec<File>>,
    #[serde(default)]
    file: Option<File>,
    #[serde(default)]
    total_uploaded: Option<u64>,
    #[serde(default)]
    total_failed: Option<u64>,
    #[serde(default)]
    message: String,
}

/// Response of the upload endpoints.
///
/// The service answers with either a `results` list, a plain `files` list,
/// or a single `file`; all three normalize to `results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "UploadResponseWire")]
pub struct UploadResponse {
    pub results: Vec<UploadResult>,
    pub total_uploaded: u64,
    pub total_failed: u64,
    pub message: String,
}

impl From<UploadResponseWire> for UploadResponse {
    fn from(wire: UploadResponseWire) -> Self {
        let succeeded = |file: File| UploadResult {
            file: Some(file),
            error: None,
            success: true,
        };

        let results: Vec<UploadResult> = if let Some(results) = wire.results {
            results
        } else if let Some(files) = wire.files {
            files.into_iter().map(succeeded).collect()
        } else if let Some(file) = wire.file {
            vec![succeeded(file)]
        } else {
            Vec::new()
        };

        let ok = results.iter().filter(|r| r.success).count() as u64;
        let failed = results.len() as u64 - ok;

        Self {
            total_uploaded: wire.total_uploaded.unwrap_or(ok),
            total_failed: wire.total_failed.unwrap_or(failed),
            results,
            message: wire.message,
        }
    }
}

impl UploadResponse {
    pub fn successful_files(&self) -> Vec<&File> {
        self.results
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.file.as_ref())
            .collect()
    }

    pub fn failed_uploads(&self) -> Vec<&UploadResult> {
        self.results.iter().filter(|r| !r.success).collect()
    }
}

impl fmt::Display for UploadResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UploadResponse(uploaded={}, failed={})",
            self.total_uploaded, self.total_failed
        )
    }
}

/// Prompt style used by the service when answering a search
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptType {
    #[default]
    Agentic,
    Consistency,
}

impl PromptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptType::Agentic => "agentic",
            PromptType::Consistency => "consistency",
        }
    }
}

impl fmt::Display for PromptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "agentic" => Ok(PromptType::Agentic),
            "consistency" => Ok(PromptType::Consistency),
            other => Err(format!(
                "unknown prompt type '{}', expected 'agentic' or 'consistency'",
                other
            )),
        }
    }
}

fn default_max_results() -> usize {
    10
}

/// Search parameters, sent to the service as form fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub prompt_type: PromptType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_doc_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_doc_ids: Vec<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            prompt_type: PromptType::default(),
            prefixes: Vec::new(),
            include_doc_ids: Vec::new(),
            exclude_doc_ids: Vec::new(),
            max_results: default_max_results(),
            top_k: None,
            threshold: None,
        }
    }

    pub fn with_prompt_type(mut self, prompt_type: PromptType) -> Self {
        self.prompt_type = prompt_type;
        self
    }

    pub fn with_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.prefixes = prefixes;
        self
    }

    pub fn include_docs(mut self, ids: Vec<String>) -> Self {
        self.include_doc_ids = ids;
        self
    }

    pub fn exclude_docs(mut self, ids: Vec<String>) -> Self {
        self.exclude_doc_ids = ids;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Form fields in the order the service expects; list fields repeat
    /// their key once per value.
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("query".to_string(), self.query.clone()),
            ("prompt_type".to_string(), self.prompt_type.to_string()),
            ("max_results".to_string(), self.max_results.to_string()),
        ];

        if let Some(top_k) = self.top_k {
            form.push(("top_k".to_string(), top_k.to_string()));
        }
        if let Some(threshold) = self.threshold {
            form.push(("threshold".to_string(), threshold.to_string()));
        }

        let repeated = [
            ("prefixes", &self.prefixes),
            ("include_doc_ids", &self.include_doc_ids),
            ("exclude_doc_ids", &self.exclude_doc_ids),
        ];
        for (key, values) in repeated {
            form.extend(values.iter().map(|v| (key.to_string(), v.clone())));
        }

        form
    }
}

/// One ranked document in a search answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub content_preview: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl fmt::Display for SearchDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SearchDocument(name='{}', score={:.3})",
            self.name, self.relevance_score
        )
    }
}

fn default_prompt_label() -> String {
    PromptType::Agentic.to_string()
}

#[derive(Deserialize)]
struct SearchResponseWire {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    documents: Option<Vec<SearchDocument>>,
    #[serde(default)]
    sources: Option<Vec<SearchDocument>>,
    #[serde(default)]
    query: String,
    #[serde(default = "default_prompt_label")]
    prompt_type: String,
    #[serde(default)]
    total_documents: Option<u64>,
    #[serde(default)]
    processing_time: f64,
    #[serde(default)]
    model_used: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    created_at: Option<DateTime<Utc>>,
}

/// Answer of the search endpoints.
///
/// Accepts `response` or `answer` for the generated text, and `documents` or
/// `sources` for the ranked documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SearchResponseWire")]
pub struct SearchResponse {
    pub response: String,
    pub documents: Vec<SearchDocument>,
    pub query: String,
    pub prompt_type: String,
    pub total_documents: u64,
    pub processing_time: f64,
    pub model_used: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<SearchResponseWire> for SearchResponse {
    fn from(wire: SearchResponseWire) -> Self {
        let documents = wire.documents.or(wire.sources).unwrap_or_default();
        Self {
            response: wire.response.or(wire.answer).unwrap_or_default(),
            total_documents: wire.total_documents.unwrap_or(documents.len() as u64),
            documents,
            query: wire.query,
            prompt_type: wire.prompt_type,
            processing_time: wire.processing_time,
            model_used: wire.model_used,
            created_at: wire.created_at,
        }
    }
}

impl SearchResponse {
    /// Top `limit` documents by relevance score, highest first
    pub fn best_documents(&self, limit: usize) -> Vec<&SearchDocument> {
        let mut ranked: Vec<&SearchDocument> = self.documents.iter().collect();
        ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        ranked.truncate(limit);
        ranked
    }
}

impl fmt::Display for SearchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SearchResponse(query='{}', docs={}, time={:.2}s)",
            self.query,
            self.documents.len(),
            self.processing_time
        )
    }
}

/// Past search recorded by the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHistory {
    pub id: String,
    pub query: String,
    pub response: String,
    pub folder_id: String,
    #[serde(default = "default_prompt_label")]
    pub prompt_type: String,
    #[serde(default)]
    pub document_count: u64,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for SearchHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query: String = self.query.chars().take(50).collect();
        write!(
            f,
            "SearchHistory(query='{}...', docs={})",
            query, self.document_count
        )
    }
}

/// Result of deleting one file as part of a batch
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub file_id: String,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
