use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use serp_filter_rs::audit;
use serp_filter_rs::config::FilterConfig;
use serp_filter_rs::interceptor::{classify, Interceptor};
use serp_filter_rs::models::InterceptedResponse;
use serp_filter_rs::rules::RuleCatalog;
use serp_filter_rs::{ContentFilter, FilterMode};
use std::fs;
use std::path::PathBuf;

/// Replays a captured search response through the filters.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Captured response body
    #[arg(required = true)]
    input: PathBuf,

    /// Request URL the body was captured from; selects the filter
    #[arg(short, long)]
    url: Option<String>,

    /// Filter to apply when no URL is given
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Content-Encoding of the captured body (br, gzip, deflate)
    #[arg(short, long, default_value = "")]
    encoding: String,

    /// Filter word or pattern; repeatable. Defaults to FILTER_WORDS
    #[arg(short = 'w', long = "word")]
    words: Vec<String>,

    /// JSON rule catalog. Defaults to FILTER_RULES_PATH, then the built-in rules
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Output file path (optional)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum Mode {
    Page,
    Video,
    Vet,
    Suggest,
}

impl From<Mode> for FilterMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Page => FilterMode::SearchPage,
            Mode::Video => FilterMode::VideoPage,
            Mode::Vet => FilterMode::Vet,
            Mode::Suggest => FilterMode::Suggestions,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = FilterConfig::from_env();

    let mode = match (&args.url, args.mode) {
        (_, Some(mode)) => FilterMode::from(mode),
        (Some(url), None) => {
            classify(url).ok_or_else(|| anyhow!("URL is not a filtered search endpoint: {}", url))?
        }
        (None, None) => FilterMode::SearchPage,
    };

    let catalog = match args.rules.as_ref().or(config.rules_path.as_ref()) {
        Some(path) => RuleCatalog::from_path(path)?,
        None => RuleCatalog::embedded()?,
    };

    let words = if args.words.is_empty() {
        config.filter_words.clone()
    } else {
        args.words.clone()
    };

    let body = fs::read(&args.input).with_context(|| format!("reading {:?}", args.input))?;
    let response = InterceptedResponse::new(
        vec![("content-encoding".to_string(), args.encoding.clone())],
        body,
    );

    info!("Filtering {:?} as {:?} with {} words", args.input, mode, words.len());

    let interceptor = Interceptor::new(ContentFilter::new(catalog, audit::from_config(&config)));
    let output = match interceptor.process_as(mode, &response, &words) {
        Some(filtered) => filtered,
        None => {
            info!("Response left unchanged");
            response.body
        }
    };

    if let Some(path) = &args.output {
        fs::write(path, &output)?;
        println!("Output written to {:?}", path);
    } else {
        println!("{}", String::from_utf8_lossy(&output));
    }

    Ok(())
}
