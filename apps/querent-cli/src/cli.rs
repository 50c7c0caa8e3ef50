use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use querent_config::{load_config_or_default, PRESET_NAMES};
use querent_runtime::{Answer, RuntimeApp};

const DEFAULT_CONFIG: &str = "configs/querent.yaml";

#[derive(Debug, Parser)]
#[command(
    name = "querent",
    about = "Answer questions by compiling them into tool plans",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[command(flatten)]
    ask: AskArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer a question, a script of questions, or read questions from stdin
    Ask(AskArgs),
    /// Show how a question is normalized and parsed, without executing it
    Explain(ExplainArgs),
}

#[derive(Debug, Args, Clone)]
struct RuntimeArgs {
    /// Config file; the built-in defaults are used when it does not exist
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,
    /// Preset applied on top of the config
    #[arg(long, value_parser = PossibleValuesParser::new(PRESET_NAMES))]
    preset: Option<String>,
}

#[derive(Debug, Args, Clone)]
struct AskArgs {
    #[command(flatten)]
    runtime: RuntimeArgs,
    /// Read questions from file (one per line; '#' comments supported)
    #[arg(long)]
    script: Option<PathBuf>,
    /// Keep the configured log level instead of forcing warn (RUST_LOG still wins)
    #[arg(long)]
    verbose: bool,
    /// Print the full answer record as JSON
    #[arg(long)]
    json: bool,
    #[arg(value_name = "QUESTION")]
    question: Vec<String>,
}

#[derive(Debug, Args, Clone)]
struct ExplainArgs {
    #[command(flatten)]
    runtime: RuntimeArgs,
    /// Keep the configured log level instead of forcing warn (RUST_LOG still wins)
    #[arg(long)]
    verbose: bool,
    #[arg(value_name = "QUESTION", required = true)]
    question: Vec<String>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Ask(args)) => ask(args).await,
            Some(Command::Explain(args)) => explain(args),
            None => ask(self.ask).await,
        }
    }
}

fn load_app(args: &RuntimeArgs) -> anyhow::Result<RuntimeApp> {
    let mut config = load_config_or_default(&args.config)
        .with_context(|| format!("failed to load config '{}'", args.config.display()))?;
    if let Some(preset) = &args.preset {
        config.apply_preset(preset)?;
    }
    Ok(RuntimeApp::from_config(config)?)
}

async fn ask(args: AskArgs) -> anyhow::Result<()> {
    ensure_log_filter(args.verbose);
    let app = load_app(&args.runtime)?;

    if let Some(script) = &args.script {
        let content = tokio::fs::read_to_string(script)
            .await
            .with_context(|| format!("failed to read script '{}'", script.display()))?;
        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let answer = app.orchestrator.answer(line).await;
            print_answer(line, &answer, args.json, true)?;
        }
        return Ok(());
    }

    if !args.question.is_empty() {
        let question = args.question.join(" ");
        let answer = app.orchestrator.answer(&question).await;
        return print_answer(&question, &answer, args.json, false);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }
        let answer = app.orchestrator.answer(line).await;
        print_answer(line, &answer, args.json, false)?;
    }
    Ok(())
}

fn explain(args: ExplainArgs) -> anyhow::Result<()> {
    ensure_log_filter(args.verbose);
    let app = load_app(&args.runtime)?;
    let question = args.question.join(" ");
    let explanation = app.orchestrator.explain(&question)?;
    println!("{}", serde_json::to_string_pretty(&explanation)?);
    Ok(())
}

fn print_answer(question: &str, answer: &Answer, json: bool, echo: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(answer)?);
    } else if echo {
        println!("> {}\n{}", question, answer.text);
    } else {
        println!("{}", answer.text);
    }
    Ok(())
}

fn ensure_log_filter(verbose: bool) {
    if verbose {
        return;
    }
    if env::var("RUST_LOG").is_ok() {
        return;
    }
    env::set_var("RUST_LOG", "warn");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_preset_is_limited_to_known_names() {
        let cli = Cli::try_parse_from(["querent", "--preset", "enhanced", "hello"]).expect("parse");
        assert_eq!(cli.ask.runtime.preset.as_deref(), Some("enhanced"));
        assert!(Cli::try_parse_from(["querent", "--preset", "turbo", "hello"]).is_err());
    }

    #[test]
    fn test_verbose_help_mentions_log_level() {
        let command = Cli::command();
        let help = command
            .get_arguments()
            .find(|arg| arg.get_id() == "verbose")
            .and_then(|arg| arg.get_help())
            .map(|help| help.to_string())
            .expect("verbose help");
        assert!(help.contains("forcing warn"), "{}", help);
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let args = RuntimeArgs {
            config: dir.path().join("absent.yaml"),
            preset: Some("minimal".to_string()),
        };
        let app = load_app(&args).expect("app");
        assert!(!app.config.normalizer.spelling);
        assert_eq!(app.config.app.name, "querent");
    }
}
