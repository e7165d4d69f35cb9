// API client module: contains a small blocking HTTP client that talks
// to the SmartClinic backend. The smoke run is a strictly linear
// sequence of three requests, so everything here is synchronous and
// relies on the client's default timeouts.

use reqwest::blocking::{multipart, Client};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Address of the local dev server, used when `SMARTCLINIC_URL` is
/// not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Errors surfaced by the API client. The caller needs to tell a
/// non-success HTTP status apart from everything else: a 409 on
/// register is tolerable, a refused connection never is.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered, but with a non-success status. The body
    /// text is carried along for diagnostics.
    #[error("server answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("request failed")]
    Http(#[from] reqwest::Error),
    /// The response did not match the expected envelope shape.
    #[error("unexpected response payload: {0}")]
    Decode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Account roles the smoke client registers. The backend also knows
/// ADMIN, but the smoke run never creates one.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Doctor,
    Patient,
}

/// Category the files endpoint expects in its `fileType` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    LabReport,
    Prescription,
    MedicalReport,
    Other,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::LabReport => "LAB_REPORT",
            FileType::Prescription => "PRESCRIPTION",
            FileType::MedicalReport => "MEDICAL_REPORT",
            FileType::Other => "OTHER",
        }
    }
}

/// Registration payload. `specialization` only means something for a
/// DOCTOR and `age` only for a PATIENT, but the backend accepts both
/// unconditionally, so nothing is validated here. Absent options go
/// out as JSON null, which the server tolerates.
#[derive(Serialize, Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub specialization: Option<String>,
    pub age: Option<u32>,
}

/// Login payload.
#[derive(Serialize, Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Everything the upload endpoint takes besides the bearer token.
/// `patient_id` / `doctor_id` link the file to clinic records; when
/// unset the form fields are omitted entirely rather than sent empty.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub patient_id: Option<u64>,
    pub doctor_id: Option<u64>,
    pub file_type: FileType,
    pub description: String,
}

/// Result of a successful login: the bearer token plus whatever else
/// the server put in the payload (name, role, ...). Process-scoped;
/// nothing is persisted to disk.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: Value,
}

/// Response envelope: every SmartClinic endpoint wraps its payload as
/// `{"data": ...}`. Sibling fields (`success`, `message`) are dropped
/// during deserialization.
#[derive(Deserialize, Debug)]
struct Envelope<T> {
    data: T,
}

/// Simple API client that holds a reqwest blocking client and the
/// base URL of the backend under test.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.into(),
        })
    }

    /// Create an ApiClient configured from the environment variable
    /// `SMARTCLINIC_URL`, or fall back to the local dev server.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url =
            std::env::var("SMARTCLINIC_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self::new(base_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a user by POSTing to /api/auth/register. Returns the
    /// unwrapped `data` payload. The server answers 4xx when the
    /// account already exists; that surfaces as `ApiError::Status`
    /// for the caller to decide on.
    pub fn register(&self, req: &RegisterRequest) -> Result<Value, ApiError> {
        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .json(req)
            .send()?;
        unwrap_envelope(res)
    }

    /// Log in via /api/auth/login and return the session. A 200
    /// without a usable token is still a failure: everything after
    /// login needs the bearer token.
    pub fn login(&self, creds: &Credentials) -> Result<Session, ApiError> {
        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(creds)
            .send()?;
        let data: Value = unwrap_envelope(res)?;
        let token = data
            .get("token")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        if token.is_empty() {
            return Err(ApiError::Decode("login payload carried no token".into()));
        }
        Ok(Session {
            token: token.to_string(),
            user: data,
        })
    }

    /// Upload a file via /api/files/upload as multipart/form-data:
    /// file part `file` streamed from disk, the remaining fields as
    /// form data, bearer token in the Authorization header. Returns
    /// the unwrapped `data` payload.
    pub fn upload(&self, token: &str, req: &UploadRequest) -> Result<Value, ApiError> {
        let mut form = multipart::Form::new().file("file", &req.path)?;
        if let Some(id) = req.patient_id {
            form = form.text("patientId", id.to_string());
        }
        if let Some(id) = req.doctor_id {
            form = form.text("doctorId", id.to_string());
        }
        form = form
            .text("fileType", req.file_type.as_str())
            .text("description", req.description.clone());

        let res = self
            .client
            .post(self.url("/api/files/upload"))
            .bearer_auth(token)
            .multipart(form)
            .send()?;
        unwrap_envelope(res)
    }
}

/// Check the status and peel the `{"data": ...}` wrapper off a
/// response body.
fn unwrap_envelope<T: serde::de::DeserializeOwned>(
    res: reqwest::blocking::Response,
) -> Result<T, ApiError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().unwrap_or_else(|_| "".into());
        return Err(ApiError::Status { status, body });
    }
    let envelope: Envelope<T> = res
        .json()
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(envelope.data)
}
