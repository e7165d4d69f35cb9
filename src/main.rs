// Entrypoint for the smoke-test binary.
// - Keeps `main` small: create an API client and hand it to the runner.
// - Returns `anyhow::Result` so a login or upload failure exits the
//   process non-zero with the error chain printed.

use smartclinic_smoke::{api::ApiClient, runner};

fn main() -> anyhow::Result<()> {
    // Backend address comes from `SMARTCLINIC_URL` or defaults to the
    // local dev server. See `api::ApiClient::from_env`.
    let api = ApiClient::from_env()?;

    let result = runner::run(&api)?;
    println!("Upload response: {}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
