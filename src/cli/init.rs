//! Init command implementation
//!
//! Writes a starter `pyq.toml` and `.env.example` for the chosen provider.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// pyq.toml already exists and `force` was not set
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Provider to configure (gemini or ollama)
    pub provider: String,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing pyq-analyser");

    if config.provider != "gemini" && config.provider != "ollama" {
        output.error(&format!(
            "Unknown provider '{}', expected gemini or ollama",
            config.provider
        ));
        return InitResult::Error(format!("unknown provider: {}", config.provider));
    }

    let config_path = config.path.join("pyq.toml");
    if config_path.exists() && !config.force {
        output.warning("pyq.toml already exists!");
        output.hint("Use --force to overwrite it");
        return InitResult::AlreadyExists;
    }

    if let Err(e) = fs::create_dir_all(&config.path) {
        output.error(&format!("Failed to create {}: {}", config.path.display(), e));
        return InitResult::Error(e.to_string());
    }

    if let Err(e) = write_file(&config_path, &generate_pyq_toml(&config), config.force) {
        output.error(&format!("Failed to create pyq.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "pyq.toml");

    let env_path = config.path.join(".env.example");
    if let Err(e) = write_file(&env_path, generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    output.complete("pyq-analyser initialized!");

    output.header("Next Steps");
    if config.provider == "gemini" {
        output.info("Set your Gemini API key:");
        output.command("cp .env.example .env  # then fill in GOOGLE_API_KEY");
    } else {
        output.info("Start Ollama and pull the models:");
        output.command("ollama pull nomic-embed-text");
        output.command("ollama pull llama3.2");
    }
    output.info("Start the server:");
    output.command("pyq-server");

    output.hint(&format!(
        "Server will be available at http://{}:{}",
        config.host, config.port
    ));

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_pyq_toml(config: &InitConfig) -> String {
    let (provider_section, embedding_model, dimensions, generation_model) =
        if config.provider == "ollama" {
            (
                "[providers.local]\ntype = \"ollama\"\nbase_url = \"http://localhost:11434\"\n",
                "nomic-embed-text",
                768,
                "llama3.2",
            )
        } else {
            (
                "# API key is read from the environment, never from this file\n\
                 [providers.gemini]\ntype = \"gemini\"\napi_key_env = \"GOOGLE_API_KEY\"\n",
                "models/text-embedding-004",
                768,
                "models/gemini-2.5-flash",
            )
        };
    let provider_name = if config.provider == "ollama" {
        "local"
    } else {
        "gemini"
    };

    format!(
        r#"# pyq-analyser configuration

[server]
host = "{host}"
port = {port}
log_level = "info"
log_format = "pretty"
max_upload_bytes = 26214400

{provider_section}
[embedding]
provider = "{provider_name}"
model = "{embedding_model}"
dimensions = {dimensions}
timeout_secs = 30

[generation]
provider = "{provider_name}"
model = "{generation_model}"
timeout_secs = 60

[rag]
chunk_size = 300
top_k = 4
max_top_k = 50

[extraction]
# Sidecar that turns pdf/docx/pptx into text. Without it only .txt uploads work.
# service_url = "http://localhost:8090"
timeout_secs = 120
"#,
        host = config.host,
        port = config.port,
    )
}

fn generate_env_example() -> &'static str {
    "# Gemini API key (required when a gemini provider is configured)\n\
     GOOGLE_API_KEY=\n\
     \n\
     # Log filter, overrides server.log_level\n\
     # RUST_LOG=pyq=debug,tower_http=debug\n"
}
