mod app;
mod config;
mod error;
mod logging;
mod parser;
mod record;
mod sort;
mod source;
mod stats;
mod style;
mod ui;
mod view;

use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use app::App;
use config::{parse_delimiter, AppConfig};
use source::{DataSource, SourceFetcher};

/// Command line options; each one overrides the config file
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    source: Option<String>,
    config: Option<PathBuf>,
    delimiter: Option<String>,
    quoting: bool,
    log: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" | "-d" | "--delimiter" | "--log" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} requires an argument", args[i]))?;
                match args[i].as_str() {
                    "-c" | "--config" => cli.config = Some(PathBuf::from(value)),
                    "-d" | "--delimiter" => {
                        parse_delimiter(value)?;
                        cli.delimiter = Some(value.clone());
                    }
                    _ => cli.log = Some(PathBuf::from(value)),
                }
                i += 2;
            }
            "--quoting" => {
                cli.quoting = true;
                i += 1;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            arg => {
                cli.source = Some(arg.to_string());
                i += 1;
            }
        }
    }

    Ok(cli)
}

fn print_help() {
    eprintln!("rsiview - A terminal viewer for RSI screening results");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    rsiview [OPTIONS] [SOURCE]");
    eprintln!();
    eprintln!("SOURCE is a CSV path or an http(s) URL (default: {})", source::DEFAULT_SOURCE);
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config <FILE>      Config file (default: ./{} if present)", config::CONFIG_FILE);
    eprintln!("    -d, --delimiter <DELIM>  Field delimiter (comma, tab, semicolon, pipe, or char)");
    eprintln!("    --quoting                Honor double-quoted fields");
    eprintln!("    --log <FILE>             Log file (default: {})", logging::default_log_path().display());
    eprintln!("    -h, --help               Print this help message");
    eprintln!();
    eprintln!("KEYS:");
    eprintln!("    r refresh, h/l select column, s/Enter sort, 1-9 sort by column,");
    eprintln!("    j/k scroll, g/G top/bottom, q quit");
}

/// Restore the terminal before the default panic output
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);

        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(%location, %message, "panic occurred");

        default_hook(info);
    }));
}

fn invalid_input(msg: String) -> io::Error {
    eprintln!("Error: {}", msg);
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args).map_err(invalid_input)?;

    let mut config = AppConfig::load(cli.config.as_deref()).map_err(invalid_input)?;
    if let Some(source) = cli.source {
        config.source = source;
    }
    if let Some(delimiter) = cli.delimiter {
        config.delimiter = delimiter;
    }
    if cli.quoting {
        config.quoting = true;
    }

    let log_path = cli.log.unwrap_or_else(logging::default_log_path);
    logging::init(&log_path)?;
    info!(source = %config.source, "rsiview started");

    install_panic_hook();

    let fetcher = SourceFetcher::new(DataSource::parse(&config.source), config.http_timeout());
    let mut app = App::new(&config, Arc::new(fetcher));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    info!("rsiview exited");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_empty() {
        assert_eq!(parse_args(&[]), Ok(CliArgs::default()));
    }

    #[test]
    fn test_parse_args_all() {
        let cli = parse_args(&args(&[
            "-c", "my.toml", "--delimiter", "tab", "--quoting", "--log", "/tmp/x.log", "data.csv",
        ]))
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        assert_eq!(cli.delimiter.as_deref(), Some("tab"));
        assert!(cli.quoting);
        assert_eq!(cli.log, Some(PathBuf::from("/tmp/x.log")));
        assert_eq!(cli.source.as_deref(), Some("data.csv"));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&["--config"])).is_err());
        assert!(parse_args(&args(&["-d", "::"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
    }
}
