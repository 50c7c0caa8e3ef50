//! Runtime bootstrap: config → tools, generator, engine, orchestrator.

use std::fs::{create_dir_all, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use querent_config::{load_config, ConfigError, ObservabilityConfig, QuerentConfig};
use querent_core::executor::{
    ExecutionStrategy, GenerationStrategy, MultiStepStrategy, SingleToolStrategy,
    UnknownIntentStrategy,
};
use querent_core::normalizer::{NormalizeError, NormalizerOptions};
use querent_core::tool::GenerationAdapter;
use querent_core::{Engine, GenerationError, PromptNormalizer, QueryParser, ToolRegistry};
use querent_tools::register_builtin_tools;

use crate::generator::build_generator;
use crate::Orchestrator;

/// Runtime bootstrap errors.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("normalizer error: {0}")]
    Normalizer(#[from] NormalizeError),
    #[error("generator error: {0}")]
    Generation(#[from] GenerationError),
}

/// Running app bundle created from config.
pub struct RuntimeApp {
    pub orchestrator: Orchestrator,
    pub config: QuerentConfig,
}

static TRACING_INIT: OnceLock<()> = OnceLock::new();

impl RuntimeApp {
    /// Create a runnable app from a single `querent.yaml`.
    pub fn from_config_path(path: impl Into<PathBuf>) -> Result<Self, BootstrapError> {
        let path = path.into();
        let config = load_config(&path)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Self::from_config(config)
    }

    pub fn from_config(config: QuerentConfig) -> Result<Self, BootstrapError> {
        init_tracing_if_needed(&config.observability);
        let orchestrator = build_orchestrator(&config)?;
        tracing::info!(
            app = %config.app.name,
            tools = ?orchestrator.engine().tools().names(),
            generator = orchestrator.engine().generator().name(),
            "runtime ready"
        );
        Ok(Self {
            orchestrator,
            config,
        })
    }
}

pub fn normalizer_options(config: &QuerentConfig) -> NormalizerOptions {
    let normalizer = &config.normalizer;
    NormalizerOptions {
        spelling: normalizer.spelling,
        abbreviations: normalizer.abbreviations,
        math_symbols: normalizer.math_symbols,
        sentence_case: normalizer.sentence_case,
        extra_spelling: normalizer
            .extra_spelling
            .iter()
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect(),
        extra_abbreviations: normalizer
            .extra_abbreviations
            .iter()
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect(),
    }
}

/// Wire an orchestrator from config without touching global tracing state.
pub fn build_orchestrator(config: &QuerentConfig) -> Result<Orchestrator, BootstrapError> {
    let generator = build_generator(&config.generation)?;

    let kb_path = Path::new(&config.tools.knowledge_base.path);
    if !kb_path.exists() {
        tracing::warn!(
            path = %kb_path.display(),
            "knowledge base file not found, lookups will fail"
        );
    }

    let mut tools = ToolRegistry::new();
    register_builtin_tools(&mut tools, &config.tools);
    tools.register(Arc::new(GenerationAdapter::new(Arc::clone(&generator))));

    let strategies: Vec<Box<dyn ExecutionStrategy>> = vec![
        Box::new(SingleToolStrategy),
        Box::new(MultiStepStrategy::new(config.tools.weather.unit.clone())),
        Box::new(GenerationStrategy),
        Box::new(UnknownIntentStrategy),
    ];
    let engine = Engine::with_strategies(tools, generator, strategies);

    let normalizer = PromptNormalizer::new(normalizer_options(config))?;
    Ok(Orchestrator::new(
        normalizer,
        QueryParser::with_default_recognizers(),
        engine,
    ))
}

/// Log file override, takes precedence over `observability.log_file`.
pub const LOG_FILE_ENV: &str = "QUERENT_LOG_FILE";
/// File name used when the configured log path is a directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "querent.log";

#[derive(Debug, Clone, PartialEq, Eq)]
enum LogSink {
    Stderr,
    File(PathBuf),
}

impl LogSink {
    fn resolve(env_override: Option<String>, configured: Option<&str>) -> Self {
        let path = env_override
            .filter(|path| !path.trim().is_empty())
            .or_else(|| configured.map(str::to_string));
        match path.map(PathBuf::from) {
            Some(dir) if dir.is_dir() => Self::File(dir.join(DEFAULT_LOG_FILE_NAME)),
            Some(file) => Self::File(file),
            None => Self::Stderr,
        }
    }
}

fn append_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// `RUST_LOG` first, then the configured level; unknown levels mean `info`.
fn log_filter(observability: &ObservabilityConfig) -> EnvFilter {
    if !observability.traces_enabled {
        return EnvFilter::new("off");
    }
    let level = observability
        .log_level
        .trim()
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

fn init_tracing_if_needed(observability: &ObservabilityConfig) {
    TRACING_INIT.get_or_init(|| {
        let sink = LogSink::resolve(
            std::env::var(LOG_FILE_ENV).ok(),
            observability.log_file.as_deref(),
        );
        let builder = tracing_subscriber::fmt()
            .with_env_filter(log_filter(observability))
            .with_target(true);

        let (destination, installed) = match sink {
            LogSink::File(path) => match append_log_file(&path) {
                Ok(file) => (
                    path.display().to_string(),
                    builder
                        .with_ansi(false)
                        .with_writer(Mutex::new(file))
                        .try_init(),
                ),
                Err(err) => {
                    eprintln!("cannot log to '{}' ({}), using stderr", path.display(), err);
                    (
                        "stderr".to_string(),
                        builder.with_writer(std::io::stderr).try_init(),
                    )
                }
            },
            LogSink::Stderr => (
                "stderr".to_string(),
                builder.with_writer(std::io::stderr).try_init(),
            ),
        };

        if installed.is_ok() {
            tracing::info!(
                destination = %destination,
                log_level = %observability.log_level,
                traces_enabled = observability.traces_enabled,
                "logging ready"
            );
        }
    });
}
