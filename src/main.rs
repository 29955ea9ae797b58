use clap::{Parser, Subcommand};
use newsstand::collection::load_collection;
use newsstand::config::{self, PressConfig};
use newsstand::output;
use newsstand::page::render_document;
use newsstand::render::BodyRenderer;
use newsstand::source::{DocumentSource, FsSource, HttpSource};
use newsstand::view::{Address, MemoryHost, ViewController, ViewMode};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "newsstand")]
#[command(about = "Newsletter listing and article viewer")]
#[command(long_about = "\
Newsletter listing and article viewer

Newsletters are plain .txt files with an optional header block, listed in a
JSON manifest. newsstand loads them, orders them newest first, and renders
the listing or a single article as HTML.

Content structure:

  site/
  ├── config.toml              # Optional; see 'newsstand gen-config'
  ├── newsletters/
  │   ├── index.json           # [\"a.txt\", \"b.txt\"]
  │   ├── a.txt
  │   └── b.txt
  └── thumbnails/
      └── placeholder.png

Header block (every key optional):

  ---
  Title: Headline here
  Subtitle: Short subtitle here
  Author: Jane Reporter
  Thumbnail: thumbnails/example.jpg
  Date: 2026-01-20
  ---
  Body text. Blank lines separate paragraphs.

Set NEWSSTAND_LOG (e.g. NEWSSTAND_LOG=debug) to override log filtering.")]
#[command(version)]
struct Cli {
    /// Content root (holds config.toml and the newsletters directory)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Fetch content over HTTP from this base URL instead of the content root
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the collection and print it in listing order
    List,
    /// Render the page for an address as a full HTML document
    Render {
        /// Address to render, e.g. "/" or "article.html?article=a.txt"
        #[arg(long, default_value = "/")]
        address: String,
        /// Override the configured view mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Select this listing entry after the page loads
        #[arg(long)]
        select: Option<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ModeArg {
    Page,
    Overlay,
}

impl From<ModeArg> for ViewMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Page => ViewMode::Page,
            ModeArg::Overlay => ViewMode::Overlay,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::GenConfig => print!("{}", config::stock_config_toml()),
        Command::List => {
            let (config, source) = open_site(&cli.root, cli.base_url.as_deref())?;
            let collection = load_collection(source.as_ref(), &config).await;
            output::print_collection(&collection, &config);
        }
        Command::Render {
            address,
            mode,
            select,
        } => {
            let (config, source) = open_site(&cli.root, cli.base_url.as_deref())?;
            let mode = mode.map(ViewMode::from).unwrap_or(config.view.mode);
            let html =
                render_address(&config, source.as_ref(), mode, &address, select.as_deref()).await;
            println!("{}", html);
        }
    }

    Ok(())
}

/// Load `config.toml` from `root` and pick the transport: HTTP when a base
/// URL is given, the content root on disk otherwise.
fn open_site(
    root: &Path,
    base_url: Option<&str>,
) -> Result<(PressConfig, Box<dyn DocumentSource>), Box<dyn std::error::Error>> {
    let config = config::load_config(root)?;
    let source: Box<dyn DocumentSource> = match base_url {
        Some(base) => Box::new(HttpSource::new(base)?),
        None => Box::new(FsSource::new(root)),
    };
    Ok((config, source))
}

/// Run one page session at `address`, optionally select an entry, and follow
/// a resulting page-mode navigation once.
async fn render_address(
    config: &PressConfig,
    source: &dyn DocumentSource,
    mode: ViewMode,
    address: &str,
    select: Option<&str>,
) -> String {
    let renderer = BodyRenderer::from_config(config);
    let mut host = MemoryHost::new(Address::parse(address));
    let mut controller = ViewController::new(config, source, &renderer, mode);
    controller.start(&mut host).await;
    if let Some(filename) = select {
        controller.select(&mut host, filename).await;
    }

    if let Some(next) = host.take_navigation() {
        tracing::debug!(address = %next, "following navigation");
        host = MemoryHost::new(next);
        controller = ViewController::new(config, source, &renderer, mode);
        controller.start(&mut host).await;
    }

    eprintln!("{}", output::format_view_state(controller.state()));
    render_document(config, mode, &host).into_string()
}

/// Uses `NEWSSTAND_LOG` if set, otherwise the verbosity flags.
fn init_logging(verbose: u8) {
    let filter = match std::env::var("NEWSSTAND_LOG") {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) => EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
