//! Interactive mode for the server.
//!
//! Prompts the user for bind address, port, and clustering policy before
//! starting the server.

use dialoguer::{Confirm, Input, Select};
use fuel_map_spatial::ThresholdPolicy;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks the user for a bind address, port, and clustering policy, sets the
/// corresponding environment variables (`BIND_ADDR`, `PORT`,
/// `CLUSTER_POLICY`), and delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns [`super::ServerError`] if the underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), super::ServerError> {
    println!("Fuel Map Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default("8080".to_string())
        .interact_text()
        .unwrap_or_else(|_| "8080".to_string());

    let policies = [ThresholdPolicy::ContinuousDecay, ThresholdPolicy::LegacyLookup];
    let labels = [
        "Continuous decay (recommended)",
        "Legacy lookup table",
    ];
    let policy = Select::new()
        .with_prompt("Clustering policy")
        .items(&labels)
        .default(0)
        .interact()
        .map_or(ThresholdPolicy::default(), |idx| policies[idx]);

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
        std::env::set_var("CLUSTER_POLICY", policy.as_ref());
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
