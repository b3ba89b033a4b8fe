use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::MakeWriter;

use site_feeds::cache::ArticleCache;
use site_feeds::config::Config;
use site_feeds::db::SqliteStore;
use site_feeds::error::{AppError, Result};
use site_feeds::models::Article;
use site_feeds::render::FileContainer;
use site_feeds::seo::{extract_keywords, has_body_content, slugify, HeadDocument, MetaUpdater};
use site_feeds::{DisplayOutcome, FeedAggregator};

#[derive(Parser)]
#[command(name = "site-feeds", version, about = "RSS widget and SEO head tooling for static sites")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the feed widget once
    Render {
        /// Fragment file the articles are written to
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Render now and again every update interval until Ctrl-C
    Watch {
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Drop the cached articles
    ClearCache,
    /// Rewrite a page head to describe an article
    Meta {
        /// Head fragment; a full page is reduced to its head elements
        #[arg(long)]
        head: PathBuf,
        /// Article as JSON
        #[arg(long)]
        article: PathBuf,
        /// JSON list of articles for the structured data block
        #[arg(long)]
        list: Option<PathBuf>,
    },
    /// Print the most frequent keywords of a text
    Keywords {
        text: String,
        #[arg(short, long, default_value_t = 10)]
        count: usize,
    },
    /// Print the slug of a text
    Slug { text: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::read(cli.config.as_deref())?;

    init_logging(config.log.file.as_deref());
    let config = config.resolve()?;

    match cli.command {
        Command::Render { output } => {
            let aggregator = build_aggregator(&config, &output).await?;
            let outcome = aggregator.display_articles().await;
            report(outcome, &output)?;
        }
        Command::Watch { output } => {
            let aggregator = Arc::new(build_aggregator(&config, &output).await?);
            let handle = aggregator.start_auto_update();
            println!(
                "Watching {} feeds, refreshing every {:?} (Ctrl-C to stop)",
                config.aggregator.feeds.len(),
                config.aggregator.update_interval()
            );
            tokio::signal::ctrl_c().await?;
            handle.stop().await;
        }
        Command::ClearCache => {
            let store = SqliteStore::open(config.cache.resolve_path()?).await?;
            let cache = ArticleCache::new(
                Arc::new(store),
                config.aggregator.cache_key.clone(),
                config.aggregator.update_interval(),
            );
            cache.clear().await?;
            println!("Cleared article cache");
        }
        Command::Meta {
            head,
            article,
            list,
        } => {
            let source = std::fs::read_to_string(&head)?;
            if has_body_content(&source) {
                tracing::warn!(
                    "{} has body content; only its head elements are written",
                    head.display()
                );
            }
            let mut document = HeadDocument::parse(&source)?;
            let article: Article = serde_json::from_str(&std::fs::read_to_string(&article)?)?;

            let updater = MetaUpdater::new(config.seo.clone());
            updater.update_article_meta(&mut document, &article);

            if let Some(list) = list {
                let articles: Vec<Article> =
                    serde_json::from_str(&std::fs::read_to_string(&list)?)?;
                updater.add_structured_data(&mut document, &articles);
            }

            println!("{}", document.to_html());
        }
        Command::Keywords { text, count } => {
            println!("{}", extract_keywords(&text, count).join(", "));
        }
        Command::Slug { text } => {
            println!("{}", slugify(&text));
        }
    }

    Ok(())
}

async fn build_aggregator(config: &Config, output: &Path) -> Result<FeedAggregator> {
    let store = SqliteStore::open(config.cache.resolve_path()?).await?;
    let container = FileContainer::new(config.aggregator.container.clone(), output);
    FeedAggregator::new(
        config.aggregator.clone(),
        Arc::new(store),
        Arc::new(container),
    )
}

fn report(outcome: DisplayOutcome, output: &Path) -> Result<()> {
    match outcome {
        DisplayOutcome::Cached(n) => println!("Rendered {} cached articles to {:?}", n, output),
        DisplayOutcome::Fetched(n) => println!("Rendered {} articles to {:?}", n, output),
        DisplayOutcome::FeedsUnavailable => {
            println!("No feed could be fetched; wrote the error placeholder to {:?}", output)
        }
        DisplayOutcome::Busy => println!("Another render is in progress"),
        DisplayOutcome::MissingContainer => {
            return Err(AppError::MissingContainer(output.display().to_string()));
        }
    }
    Ok(())
}

/// Mirrors log output to stderr and, when configured, a log file.
struct DualWriter {
    file: Option<Arc<Mutex<std::fs::File>>>,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.write_all(buf);
            }
        }
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for DualWriter {
    type Writer = DualWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DualWriter {
            file: self.file.clone(),
        }
    }
}

fn init_logging(log_file: Option<&Path>) {
    let file = log_file.and_then(|path| {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
        {
            Ok(file) => Some(Arc::new(Mutex::new(file))),
            Err(err) => {
                eprintln!("Warning: unable to open {}: {err}", path.display());
                None
            }
        }
    });

    // RUST_LOG wins; otherwise info for this crate and quiet html5ever
    let mut env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("site_feeds=info"));
    if let Ok(directive) = "html5ever=error".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(DualWriter { file })
        .init();
}
