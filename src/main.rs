use anyhow::{Context, Result};
use clap::Parser;
use page_i18n::config::Config;
use page_i18n::document::HtmlDocument;
use page_i18n::{ApplyOutcome, Translator};
use std::path::PathBuf;
use tracing::{info, warn};

/// Translate the data-i18n tagged elements of an HTML page.
#[derive(Parser, Debug)]
#[command(name = "page-i18n", version, about)]
struct Cli {
    /// HTML file to translate
    input: PathBuf,

    /// Language to apply; defaults to the saved preference, then the system locale
    #[arg(short, long, env = "I18N_LANG")]
    lang: Option<String>,

    /// Write the translated page here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging (stdout carries the page)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("page_i18n=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let translator = Translator::from_config(&config)?;

    let lang = match &cli.lang {
        Some(code) => translator.registry().recognize(code).with_context(|| {
            format!(
                "Unknown language code: '{}'. Available: {}",
                code,
                available_languages(&translator)
            )
        })?,
        None => translator.resolve_initial_language(system_locale_hint().as_deref()),
    };

    let source = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let mut document = HtmlDocument::parse(source);

    info!(
        "Applying {} to {} ({} tagged elements)",
        lang,
        cli.input.display(),
        document.keys().len()
    );

    match translator.apply(&lang, &mut document).await {
        ApplyOutcome::Applied(report) => {
            info!(
                "✓ Applied {}: {} translated, {} from fallback, {} missing",
                lang,
                report.translated,
                report.fallback_keys.len(),
                report.missing_keys.len()
            );
        }
        ApplyOutcome::Superseded { language } => {
            warn!("Apply of {} was superseded", language);
        }
    }

    let rendered = document.render();
    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", rendered),
    }

    Ok(())
}

/// The host locale, from the OS or the POSIX environment.
fn system_locale_hint() -> Option<String> {
    sys_locale::get_locale().or_else(|| {
        ["LC_ALL", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
    })
}

fn available_languages(translator: &Translator) -> String {
    translator
        .registry()
        .list()
        .iter()
        .map(|lang| lang.code.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
