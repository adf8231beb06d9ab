use anyhow::Result;
use clap::Parser;
use httplint::{BlockingConnection, Config, Format, Linter, Renderer, Target};
use std::{io::Write, time::Duration};

/// Checks the response headers of one or more URLs.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Write an HTML fragment instead of plain text
    #[arg(long)]
    html: bool,

    /// Socket timeout in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// User-Agent sent with every request
    #[arg(long, default_value = "httplint")]
    user_agent: String,

    /// Log transport progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// URLs to check
    #[arg(required = true)]
    urls: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = Config {
        format: if cli.html { Format::Html } else { Format::Text },
        user_agent: cli.user_agent,
        timeout: Duration::from_secs(cli.timeout),
        ..Config::default()
    };

    let mut linter = Linter::new(&config)?;
    let mut renderer = Renderer::new(std::io::stdout().lock(), config.format);

    for url in &cli.urls {
        check(url, &config, &mut linter, &mut renderer)?;
    }

    Ok(())
}

fn check(
    url: &str,
    config: &Config,
    linter: &mut Linter,
    renderer: &mut Renderer<impl Write>,
) -> Result<()> {
    log::debug!("checking {url}");

    renderer.begin_url(url)?;
    linter.begin(url);

    let fetched = Target::parse(url)
        .and_then(|target| BlockingConnection::get(&target, config, |line| linter.line(line)));

    renderer.events(&linter.take_events())?;
    renderer.end_response()?;

    match fetched {
        Ok(()) => {
            linter.finish();
            renderer.begin_summary()?;
            renderer.events(&linter.take_events())?;
        }
        Err(err) => {
            log::debug!("fetching {url} failed: {err:?}");
            renderer.failure(&err)?;
        }
    }

    renderer.end_url()?;
    Ok(())
}
