use serde::Serialize;

/// One inbound upload, assembled from the multipart body and request
/// parameters. Transient; lives for the duration of a single request.
#[derive(Debug, Default)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub original_filename: Option<String>,
    pub content_type: Option<String>,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub key: Option<String>,
}

/// Outcome of a successful upload. Produced exactly once per call and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub key: String,
    pub url: String,
    pub bucket: String,
    pub region: Option<String>,
}

/// Wire shape returned by the upload endpoint.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub bucket: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl From<UploadResult> for UploadResponse {
    fn from(result: UploadResult) -> Self {
        Self {
            url: result.url,
            bucket: result.bucket,
            key: result.key,
            region: result.region,
        }
    }
}
