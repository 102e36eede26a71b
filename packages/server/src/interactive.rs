//! Interactive mode for the server.
//!
//! Prompts the user for bind address, port, database path and AI provider
//! before starting the server.

use dialoguer::{Confirm, Input, Select};

/// Provider menu: label and the `AI_PROVIDER` value it selects. `None`
/// keeps auto-detection from the API key variables.
const AI_PROVIDERS: [(&str, Option<&str>); 5] = [
    ("Auto-detect from API keys", None),
    ("Google Gemini", Some("gemini")),
    ("Anthropic Claude", Some("anthropic")),
    ("OpenAI / compatible server", Some("openai")),
    ("Offline (every report gets fallback feedback)", Some("offline")),
];

/// Menu entry preselected for the current `AI_PROVIDER`.
fn default_provider_index(current: Option<&str>) -> usize {
    current
        .map(str::to_lowercase)
        .and_then(|current| {
            AI_PROVIDERS
                .iter()
                .position(|(_, value)| *value == Some(current.as_str()))
        })
        .unwrap_or(0)
}

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks the user for a bind address, port, database path and AI provider,
/// sets the corresponding environment variables (`BIND_ADDR`, `PORT`,
/// `VIGIA_DB_PATH`, `AI_PROVIDER`), and delegates to
/// [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Vigia Cidadã Server");
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

    let db_path: String = Input::new()
        .with_prompt("Database path")
        .default(vigia_storage::sqlite::db_path_from_env().display().to_string())
        .interact_text()
        .unwrap_or_else(|_| vigia_storage::sqlite::DEFAULT_DB_PATH.to_string());

    let current_provider = std::env::var("AI_PROVIDER").ok();
    let labels: Vec<&str> = AI_PROVIDERS.iter().map(|(label, _)| *label).collect();
    let provider_idx = Select::new()
        .with_prompt("AI provider for report analysis")
        .items(&labels)
        .default(default_provider_index(current_provider.as_deref()))
        .interact()
        .unwrap_or(0);
    let provider = AI_PROVIDERS.get(provider_idx).and_then(|(_, value)| *value);

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
        std::env::set_var("VIGIA_DB_PATH", &db_path);
        match provider {
            Some(provider) => std::env::set_var("AI_PROVIDER", provider),
            None => std::env::remove_var("AI_PROVIDER"),
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_provider_is_preselected() {
        assert_eq!(default_provider_index(None), 0);
        assert_eq!(default_provider_index(Some("anthropic")), 2);
        assert_eq!(default_provider_index(Some("OFFLINE")), 4);
        assert_eq!(default_provider_index(Some("bedrock")), 0);
    }
}
