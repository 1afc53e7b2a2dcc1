use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use rssforge::config::Config;
use rssforge::feed::{check_well_formed, Escaper, FeedWriter};
use rssforge::input::load_channel;
use rssforge::util::write_atomic;

#[derive(Parser, Debug)]
#[command(name = "rssforge", about = "Generate an RSS 2.0 feed from a channel file")]
struct Args {
    /// Channel definition (.toml or .json)
    #[arg(long, short, value_name = "FILE")]
    input: PathBuf,

    /// Write the feed here instead of stdout (replaced atomically)
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Generator configuration
    #[arg(long, value_name = "FILE", default_value = "rssforge.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config: {}", args.config.display()))?;

    let channel = load_channel(&args.input)
        .with_context(|| format!("Failed to load channel: {}", args.input.display()))?;

    let scoped = config.scoped_escaper();
    let escaper = scoped.as_ref().unwrap_or_else(|| Escaper::global());
    let document = FeedWriter::with_escaper(escaper)
        .default_language(config.default_language.as_str())
        .render(&channel)
        .context("Failed to generate RSS feed")?;

    if config.check_output {
        let items = check_well_formed(&document).context("Generated feed is not well-formed")?;
        tracing::debug!(items, "Verified generated feed");
    }

    match &args.output {
        Some(path) => {
            write_atomic(path, document.as_bytes())?;
            tracing::info!(path = %path.display(), bytes = document.len(), "Wrote feed");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(document.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
                .context("Failed to write feed to stdout")?;
        }
    }

    Ok(())
}
