use crate::client::{ApiClient, Query};
use crate::error::{ClientError, ClientResult};
use hms_core::validation::{validate_file, FileCandidate};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Media types accepted for clinical documents by default.
pub const DOCUMENT_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const DOCUMENT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "pdf", "doc", "docx"];

/// A file held in memory, ready to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

fn media_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Reads `path`, guessing the media type from the extension.
    pub fn from_path(path: &Path) -> ClientResult<Self> {
        let bytes = std::fs::read(path).map_err(ClientError::StoreIo)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_owned();
        let media_type = media_type_for(&extension(&filename)).to_owned();
        Ok(Self::new(filename, media_type, bytes))
    }

    /// Size, media type and extension checks for clinical documents.
    pub fn check(&self, max_size: Option<u64>) -> ClientResult<()> {
        let candidate = FileCandidate {
            size_bytes: self.bytes.len() as u64,
            media_type: &self.media_type,
        };
        validate_file(Some(&candidate), max_size, DOCUMENT_MEDIA_TYPES)
            .map_err(|e| ClientError::InvalidUpload(e.to_string()))?;
        if !DOCUMENT_EXTENSIONS.contains(&extension(&self.filename).as_str()) {
            return Err(ClientError::InvalidUpload("File extension not allowed".into()));
        }
        Ok(())
    }

    fn into_part(self) -> ClientResult<Part> {
        Part::bytes(self.bytes)
            .file_name(self.filename)
            .mime_str(&self.media_type)
            .map_err(|e| ClientError::InvalidUpload(format!("bad media type '{}': {e}", self.media_type)))
    }
}

fn extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Optional metadata sent alongside a single upload.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub category: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FileService {
    api: ApiClient,
}

impl FileService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Sends one file as the `file` part, with any metadata as text parts. `tags` travel as
    /// a JSON array string.
    ///
    /// # Errors
    ///
    /// `ClientError::InvalidUpload` if the media type is malformed, otherwise the transport
    /// error. Size and type checks are not applied here; call [`FileUpload::check`] first.
    pub async fn upload(&self, file: FileUpload, options: UploadOptions) -> ClientResult<Value> {
        let mut form = Form::new().part("file", file.into_part()?);
        if let Some(category) = options.category {
            form = form.text("category", category);
        }
        if let Some(description) = options.description {
            form = form.text("description", description);
        }
        if !options.tags.is_empty() {
            let tags = serde_json::to_string(&options.tags).map_err(ClientError::Encode)?;
            form = form.text("tags", tags);
        }
        self.api.upload("/files/upload", form).await
    }

    pub async fn upload_multiple(&self, files: Vec<FileUpload>, category: Option<String>) -> ClientResult<Value> {
        let mut form = Form::new();
        for file in files {
            form = form.part("files", file.into_part()?);
        }
        if let Some(category) = category {
            form = form.text("category", category);
        }
        self.api.upload("/files/upload-multiple", form).await
    }

    pub async fn get(&self, file_id: &str) -> ClientResult<Value> {
        self.api.get(&format!("/files/{file_id}")).await
    }

    /// Saves under `filename`, or `file_{id}` when none is given.
    pub async fn download(&self, file_id: &str, filename: Option<&str>) -> ClientResult<PathBuf> {
        let filename = filename
            .map(str::to_owned)
            .unwrap_or_else(|| format!("file_{file_id}"));
        self.api
            .download(&format!("/files/{file_id}/download"), &[], &filename)
            .await
    }

    /// Absolute URL of a stored file, for handing to other tools.
    pub fn url(&self, file_id: &str) -> String {
        self.api.url(&format!("/files/{file_id}"))
    }

    pub async fn delete(&self, file_id: &str) -> ClientResult<Value> {
        self.api.delete(&format!("/files/{file_id}")).await
    }

    pub async fn by_category(&self, category: &str, params: Query<'_>) -> ClientResult<Value> {
        self.api
            .get_query(&format!("/files/category/{category}"), params)
            .await
    }

    pub async fn entity_files(&self, entity_type: &str, entity_id: &str) -> ClientResult<Value> {
        self.api
            .get(&format!("/files/entity/{entity_type}/{entity_id}"))
            .await
    }

    pub async fn attach(&self, file_id: &str, entity_type: &str, entity_id: &str) -> ClientResult<Value> {
        self.api
            .post(
                "/files/attach",
                &json!({ "fileId": file_id, "entityType": entity_type, "entityId": entity_id }),
            )
            .await
    }

    pub async fn upload_patient_document(
        &self,
        patient_id: &str,
        file: FileUpload,
        document_type: &str,
    ) -> ClientResult<Value> {
        let form = Form::new()
            .part("file", file.into_part()?)
            .text("patientId", patient_id.to_owned())
            .text("documentType", document_type.to_owned());
        self.api.upload("/files/patient-document", form).await
    }

    pub async fn upload_medical_record(
        &self,
        patient_id: &str,
        file: FileUpload,
        record_type: &str,
    ) -> ClientResult<Value> {
        let form = Form::new()
            .part("file", file.into_part()?)
            .text("patientId", patient_id.to_owned())
            .text("recordType", record_type.to_owned());
        self.api.upload("/files/medical-record", form).await
    }

    pub async fn upload_profile_photo(&self, user_id: u64, photo: FileUpload) -> ClientResult<Value> {
        let form = Form::new().part("photo", photo.into_part()?);
        self.api
            .upload(&format!("/files/profile-photo/{user_id}"), form)
            .await
    }

    pub async fn storage_info(&self) -> ClientResult<Value> {
        self.api.get("/files/storage-info").await
    }

    pub async fn search(&self, query: &str, params: Query<'_>) -> ClientResult<Value> {
        let mut pairs: Vec<(&str, String)> = vec![("q", query.to_owned())];
        pairs.extend(params.iter().cloned());
        self.api.get_query("/files/search", &pairs).await
    }
}
