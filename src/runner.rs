// Smoke sequence: lay down a scratch file, register a doctor and a
// patient, log both in, upload the file under the doctor's session
// and hand back the upload payload. Strictly linear; the only
// tolerated failure is a non-success status from register, so the
// run can repeat against a server that already has the accounts.

use crate::api::{
    ApiClient, ApiError, Credentials, FileType, RegisterRequest, Role, UploadRequest,
};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed relative path of the scratch file the upload sends.
pub const SCRATCH_PATH: &str = "scratch/sample.txt";
const SCRATCH_CONTENT: &str = "sample content";

const DOCTOR_EMAIL: &str = "doc@example.com";
const PATIENT_EMAIL: &str = "pat@example.com";
const PASSWORD: &str = "Passw0rd!";

/// Run the full smoke sequence with the scratch file at its fixed
/// relative path. The file is left behind; the smoke run never
/// cleans up after itself.
pub fn run(api: &ApiClient) -> Result<Value> {
    run_with_scratch(api, Path::new(SCRATCH_PATH))
}

/// Same sequence with the scratch file at a caller-chosen path.
pub fn run_with_scratch(api: &ApiClient, scratch: &Path) -> Result<Value> {
    let scratch = write_scratch_file(scratch)?;

    register_tolerant(api, &doctor_registration())?;
    register_tolerant(api, &patient_registration())?;

    // Both logins must succeed; a failure here aborts the run.
    let doctor = with_spinner("Logging in as doctor...", || {
        api.login(&Credentials {
            email: DOCTOR_EMAIL.into(),
            password: PASSWORD.into(),
        })
    })
    .context("doctor login")?;
    println!("Logged in as {}", DOCTOR_EMAIL);

    let _patient = with_spinner("Logging in as patient...", || {
        api.login(&Credentials {
            email: PATIENT_EMAIL.into(),
            password: PASSWORD.into(),
        })
    })
    .context("patient login")?;
    println!("Logged in as {}", PATIENT_EMAIL);

    // No endpoint exposes doctor/patient ids, so the upload goes out
    // without linkage fields; this only proves the base flow.
    let upload = UploadRequest {
        path: scratch,
        patient_id: None,
        doctor_id: None,
        file_type: FileType::LabReport,
        description: "Doctor upload no linkage".into(),
    };
    with_spinner("Uploading...", || api.upload(&doctor.token, &upload)).context("file upload")
}

fn doctor_registration() -> RegisterRequest {
    RegisterRequest {
        email: DOCTOR_EMAIL.into(),
        password: PASSWORD.into(),
        name: "Dr. Who".into(),
        role: Role::Doctor,
        specialization: Some("General".into()),
        age: None,
    }
}

fn patient_registration() -> RegisterRequest {
    RegisterRequest {
        email: PATIENT_EMAIL.into(),
        password: PASSWORD.into(),
        name: "John Doe".into(),
        role: Role::Patient,
        specialization: None,
        age: Some(30),
    }
}

/// Register, treating a non-success status as "account already
/// exists, proceed": the setup has to be idempotent across runs.
/// Transport and decode errors still abort; a dead server must not
/// look like a passing smoke test.
fn register_tolerant(api: &ApiClient, req: &RegisterRequest) -> Result<()> {
    let msg = format!("Registering {}...", req.email);
    match with_spinner(&msg, || api.register(req)) {
        Ok(_) => println!("Registered {}", req.email),
        Err(ApiError::Status { status, .. }) => {
            println!("Skipping {}: server answered {}", req.email, status);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("registering {}", req.email));
        }
    }
    Ok(())
}

/// Write the fixed-content scratch file, creating its directory if
/// needed.
fn write_scratch_file(path: &Path) -> Result<PathBuf> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
    }
    std::fs::write(path, SCRATCH_CONTENT)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path.to_path_buf())
}

/// Show a spinner while a blocking API call is in flight.
fn with_spinner<T>(msg: &str, f: impl FnOnce() -> Result<T, ApiError>) -> Result<T, ApiError> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    let out = f();
    spinner.finish_and_clear();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_file_has_fixed_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/sample.txt");
        let written = write_scratch_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(written).unwrap(), "sample content");
    }

    #[test]
    fn doctor_registration_carries_specialization_only() {
        let req = doctor_registration();
        assert_eq!(req.role, Role::Doctor);
        assert_eq!(req.specialization.as_deref(), Some("General"));
        assert_eq!(req.age, None);
    }

    #[test]
    fn patient_registration_carries_age_only() {
        let req = patient_registration();
        assert_eq!(req.role, Role::Patient);
        assert_eq!(req.specialization, None);
        assert_eq!(req.age, Some(30));
    }
}
