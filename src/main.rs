use anyhow::{Context, Result};
use pyq::{
    api,
    cli::{
        init::{self, InitConfig, InitResult},
        output::Output,
        Cli, Commands,
    },
    utils::toml_config::{LogFormat, PyqConfig},
    AppState, PyqConfigManager,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Some(Commands::Init {
            path,
            force,
            provider,
            host,
            port,
        }) => {
            let result = init::run(
                InitConfig {
                    path,
                    force,
                    provider,
                    host,
                    port,
                },
                &output,
            );
            match result {
                InitResult::Error(e) => anyhow::bail!(e),
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
            }
        }
        Some(Commands::Config { validate }) => show_config(&cli.config, validate, &output),
        Some(Commands::Ask { question, files, k }) => {
            let manager = load_config(&cli.config)?;
            init_tracing(&manager.config(), cli.verbose);
            ask_once(manager, &question, &files, k, &output).await
        }
        None => {
            let manager = load_config(&cli.config)?;
            init_tracing(&manager.config(), cli.verbose);
            output.banner();
            serve(manager).await
        }
    }
}

fn load_config(path: &Path) -> Result<Arc<PyqConfigManager>> {
    let manager = PyqConfigManager::new(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(Arc::new(manager))
}

fn init_tracing(config: &PyqConfig, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "pyq={0},pyq_server={0},pyq_vector={0},tower_http={0}",
                default_level
            ))
        });

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve(manager: Arc<PyqConfigManager>) -> Result<()> {
    let config = manager.config();
    let state = AppState::from_config(Arc::clone(&manager))?;
    let app = api::create_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(%addr, "pyq-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("pyq-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn show_config(path: &Path, validate: bool, output: &Output) -> Result<()> {
    output.header("Configuration");
    output.kv("file", &path.display().to_string());

    let config = match PyqConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            output.error(&e.to_string());
            if validate {
                anyhow::bail!("configuration is invalid");
            }
            return Ok(());
        }
    };

    output.kv(
        "server",
        &format!("{}:{}", config.server.host, config.server.port),
    );
    output.kv(
        "embedding",
        &format!(
            "{} via {} ({} dims)",
            config.embedding.model, config.embedding.provider, config.embedding.dimensions
        ),
    );
    output.kv(
        "generation",
        &format!(
            "{} via {}",
            config.generation.model, config.generation.provider
        ),
    );
    output.kv(
        "rag",
        &format!(
            "chunk_size={} top_k={} max_top_k={}",
            config.rag.chunk_size, config.rag.top_k, config.rag.max_top_k
        ),
    );
    output.kv(
        "extraction",
        config
            .extraction
            .service_url
            .as_deref()
            .unwrap_or("txt only (no service_url)"),
    );

    output.header("Providers");
    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();
    for name in names {
        output.list_item(name);
    }

    if validate {
        output.success("Configuration is valid");
    }
    Ok(())
}

async fn ask_once(
    manager: Arc<PyqConfigManager>,
    question: &str,
    files: &[PathBuf],
    k: Option<usize>,
    output: &Output,
) -> Result<()> {
    let state = AppState::from_config(manager)?;

    if !files.is_empty() {
        output.header("Indexing");
    }
    for path in files {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let report = state.ingestion.ingest(&bytes, &filename).await?;
        output.indexed(&filename, report.chunk_count);
    }

    let answer = state.query.ask(question, k).await?;

    output.header("Answer");
    output.answer(&answer.answer);
    if !answer.used_context() {
        output.hint("No indexed context was found; the answer is from general knowledge");
    }
    output.newline();
    Ok(())
}
