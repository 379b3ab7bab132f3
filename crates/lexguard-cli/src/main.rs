use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lexguard_core::{
    build_adapters, render_report, Analyzer, Category, InferenceSettings, OutputFormat,
    FINDING_RULES,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lexguard",
    author,
    version,
    about = "Legal Document Risk Analyzer CLI"
)]
struct Cli {
    /// Inference provider (`hf` for the remote adapters, `noop` for the
    /// deterministic offline ones); overrides LEXGUARD_PROVIDER
    #[arg(long = "provider", value_name = "NAME", global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a legal document from a file or stdin
    Analyze {
        /// Path to the document; reads stdin when omitted
        file: Option<PathBuf>,
        /// Emit the result as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// List the static key-finding rules
    Rules {
        /// Emit rules as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// List the clause categories and their base risk points
    Categories {
        /// Emit categories as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze { ref file, json } => analyze(&cli, file.as_deref(), json).await?,
        Commands::Rules { json } => list_rules(json)?,
        Commands::Categories { json } => list_categories(json)?,
    }
    Ok(())
}

async fn analyze(cli: &Cli, file: Option<&std::path::Path>, json: bool) -> Result<()> {
    let legal_text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read document at {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read document from stdin")?;
            buffer
        }
    };
    if legal_text.trim().is_empty() {
        bail!("empty legal text provided");
    }

    let settings = match cli.provider.as_deref() {
        Some(provider) if provider.eq_ignore_ascii_case("noop") => InferenceSettings::noop(),
        Some(provider) => {
            let mut settings = InferenceSettings::from_env()?;
            settings.provider = provider.to_string();
            settings
        }
        None => InferenceSettings::from_env()?,
    };
    debug!(provider = %settings.provider, "building inference adapters");
    let (classifier, summarizer, generator) = build_adapters(&settings)?;
    let analyzer = Analyzer::new(classifier, summarizer, generator);

    let result = analyzer.analyze(&legal_text).await?;
    let format = if json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    println!("{}", render_report(&result, format)?);
    Ok(())
}

fn list_rules(json: bool) -> Result<()> {
    if json {
        let rules: Vec<_> = FINDING_RULES
            .iter()
            .map(|rule| {
                serde_json::json!({
                    "title": rule.title,
                    "keywords": rule.keywords,
                    "risk_level": rule.risk_level,
                    "icon": rule.icon,
                    "section": rule.section,
                    "description": rule.description,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    println!("{} key-finding rule(s)", FINDING_RULES.len());
    for rule in FINDING_RULES {
        println!(
            "- {title:<26} [{level:11}] {section:<12} :: {keywords}",
            title = rule.title,
            level = rule.risk_level.as_str(),
            section = rule.section,
            keywords = rule.keywords.join(", ")
        );
    }
    Ok(())
}

fn list_categories(json: bool) -> Result<()> {
    if json {
        let categories: Vec<_> = Category::ALL
            .into_iter()
            .map(|category| {
                let (risk_level, base_points) = category.base_risk();
                serde_json::json!({
                    "category": category.label(),
                    "risk_level": risk_level,
                    "base_points": base_points,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    println!("{} clause categories", Category::ALL.len());
    for category in Category::ALL {
        let (risk_level, base_points) = category.base_risk();
        println!(
            "- {label:<28} [{level:11}] base {points:>4.0}",
            label = category.label(),
            level = risk_level.as_str(),
            points = base_points
        );
    }
    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tokio=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
