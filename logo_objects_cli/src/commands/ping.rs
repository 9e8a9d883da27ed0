use anyhow::{bail, Result};
use logo_objects_api::ApiClient;
use serde_json::json;

use crate::output::{print_json, OutputFormat};

/// Fails when the server is unreachable or the credentials are rejected.
pub async fn run(client: &ApiClient, format: &OutputFormat) -> Result<()> {
    let reachable = client.ping().await;
    let authorized = reachable && client.is_token_valid().await;

    match format {
        OutputFormat::Table => {
            println!("server:      {}", if reachable { "reachable" } else { "unreachable" });
            let credentials = match (reachable, authorized) {
                (false, _) => "not checked",
                (true, true) => "accepted",
                (true, false) => "rejected",
            };
            println!("credentials: {}", credentials);
        }
        OutputFormat::Json => print_json(&json!({
            "base_url": client.config().base_url().as_str(),
            "reachable": reachable,
            "authorized": authorized,
        })),
    }

    if !authorized {
        bail!("{} is not usable", client.config().base_url());
    }
    Ok(())
}
