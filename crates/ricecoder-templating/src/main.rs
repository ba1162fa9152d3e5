// rice-render: render a template directory entry against JSON data

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use ricecoder_templating::{Context, DirectoryProvider, EngineConfig, TemplateEngine};
use tracing::info;

/// Render a template from a directory
#[derive(Parser, Debug)]
#[command(name = "rice-render")]
#[command(about = "Render a template with variables, loops and includes")]
#[command(version)]
#[command(author = "RiceCoder Contributors")]
struct Cli {
    /// Template name, relative to the template root
    #[arg(value_name = "TEMPLATE")]
    template: String,

    /// Template root directory
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// JSON file whose top-level object becomes the context
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Engine configuration file (toml, yaml or json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only check that the template parses
    #[arg(long)]
    check: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = EngineConfig::load(cli.config.as_deref())
        .context("Failed to load engine configuration")?;
    let provider = DirectoryProvider::new(&cli.root)
        .with_context(|| format!("Template root {} is not accessible", cli.root.display()))?;
    let engine = TemplateEngine::with_config(provider, config)?;

    if cli.check {
        let nodes = engine
            .parse(&cli.template)
            .with_context(|| format!("Template {} is invalid", cli.template))?;
        info!(template = %cli.template, nodes = nodes.len(), "Template parsed");
        return Ok(());
    }

    let context = match &cli.data {
        Some(path) => load_context(path)?,
        None => Context::new(),
    };

    let output = engine
        .render(&cli.template, &context)
        .with_context(|| format!("Failed to render {}", cli.template))?;

    match &cli.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", output),
    }

    Ok(())
}

fn load_context(path: &Path) -> Result<Context> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let data: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    if !data.is_object() {
        bail!("{} must contain a JSON object", path.display());
    }
    Ok(Context::from_json(data))
}

fn init_logging(log_level: &str) {
    use tracing_subscriber::fmt;

    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::WARN,
    };

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_context_from_object() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, r#"{"title": "Guide"}"#).unwrap();

        let context = load_context(&path).unwrap();
        assert!(context.contains("title"));
    }

    #[test]
    fn test_load_context_rejects_non_object_json() {
        let temp_dir = TempDir::new().unwrap();
        let cases = [
            ("list.json", "[1, 2]"),
            ("scalar.json", "\"text\""),
            ("null.json", "null"),
        ];
        for (file, body) in cases {
            let path = temp_dir.path().join(file);
            fs::write(&path, body).unwrap();
            let err = load_context(&path).unwrap_err();
            assert!(err.to_string().contains("must contain a JSON object"));
        }
    }

    #[test]
    fn test_load_context_rejects_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        assert!(load_context(&path).is_err());
    }
}
