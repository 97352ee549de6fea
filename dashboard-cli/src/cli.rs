use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dashboard_core::{
    Config, ControlEvent, FilePreferences, HttpDashboardApi, RefreshController, ThemeStore, Trigger,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{info, warn};

use crate::{render::Renderer, sink::TerminalSink};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// Backend URL; overrides `base_url` from the config file.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load every panel once and print the dashboard.
    Show {
        /// City to show; defaults to the configured default city.
        #[arg(long)]
        city: Option<String>,
    },

    /// Keep the dashboard running, refreshing on a timer.
    ///
    /// Type a city name to switch, `theme` to toggle the theme,
    /// `refresh` to reload, `quit` to exit.
    Watch {
        #[arg(long)]
        city: Option<String>,
    },

    /// Show or toggle the light/dark theme.
    Theme {
        action: Option<ThemeAction>,
    },

    /// List the configured cities.
    Cities,

    /// Interactively set the backend URL and default city.
    Configure,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeAction {
    Toggle,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let renderer = Renderer::new(!self.plain);

        match self.command {
            Command::Show { city } => {
                let config = with_overrides(Config::load()?, self.base_url);
                show(&config, city.as_deref(), renderer).await
            }
            Command::Watch { city } => {
                let config = with_overrides(Config::load()?, self.base_url);
                watch(&config, city.as_deref(), renderer).await
            }
            Command::Theme { action } => theme(action),
            Command::Cities => {
                let config = Config::load()?;
                let default = config.selected_city(None).ok();
                for city in &config.cities {
                    let marker = if Some(city) == default.as_ref() { "*" } else { " " };
                    println!("{marker} {city}");
                }
                Ok(())
            }
            Command::Configure => configure(),
        }
    }
}

fn with_overrides(mut config: Config, base_url: Option<String>) -> Config {
    if let Some(url) = base_url {
        config.base_url = url;
    }
    config
}

fn theme_store() -> Result<Arc<ThemeStore>> {
    let prefs = FilePreferences::new(Config::preferences_file_path()?);
    Ok(Arc::new(ThemeStore::load(Arc::new(prefs))))
}

fn build_controller(
    config: &Config,
    city: &str,
    sink: Arc<TerminalSink>,
) -> Result<RefreshController> {
    let api = HttpDashboardApi::new(&config.base_url, config.request_timeout())?;
    info!(backend = %api.base_url(), %city, "starting dashboard");

    Ok(RefreshController::new(Arc::new(api), sink, theme_store()?, city)
        .with_interval(config.refresh_interval())
        .with_aggregator(config.aggregator()?))
}

async fn show(config: &Config, requested: Option<&str>, renderer: Renderer) -> Result<()> {
    let city = config.selected_city(requested)?;
    let sink = Arc::new(TerminalSink::new(renderer, false));
    let controller = build_controller(config, &city, sink.clone())?;

    controller.refresh(Trigger::Startup).settled().await;

    println!("Weather dashboard: {city} ({} theme)\n", controller.theme().current());
    print!("{}", sink.render_all());
    Ok(())
}

async fn watch(config: &Config, requested: Option<&str>, renderer: Renderer) -> Result<()> {
    let city = config.selected_city(requested)?;
    let sink = Arc::new(TerminalSink::new(renderer, true));
    let controller = build_controller(config, &city, sink)?;

    println!(
        "Watching {city}, refreshing every {}s. Type `help` for commands.",
        config.refresh_interval().as_secs()
    );

    let (tx, rx) = mpsc::channel(16);
    let input = tokio::spawn(read_commands(config.clone(), tx));

    controller.run(rx).await;
    input.abort();
    Ok(())
}

async fn read_commands(config: Config, tx: mpsc::Sender<ControlEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                let _ = tx.send(ControlEvent::Shutdown).await;
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read from stdin");
                let _ = tx.send(ControlEvent::Shutdown).await;
                return;
            }
        };

        if matches!(line.trim(), "help" | "?") {
            print_help(&config);
            continue;
        }

        match parse_command(&config, &line) {
            Ok(Some(event)) => {
                let stop = event == ControlEvent::Shutdown;
                if tx.send(event).await.is_err() || stop {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("{e:#}"),
        }
    }
}

/// Maps one line of `watch` input onto a controller event.
fn parse_command(config: &Config, line: &str) -> Result<Option<ControlEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));

    let event = match word.to_lowercase().as_str() {
        "q" | "quit" | "exit" => ControlEvent::Shutdown,
        "t" | "theme" => ControlEvent::ToggleTheme,
        "r" | "refresh" => ControlEvent::Refresh,
        "city" if !rest.is_empty() => ControlEvent::SelectCity(config.resolve_city(rest)?),
        _ => ControlEvent::SelectCity(config.resolve_city(line)?),
    };

    Ok(Some(event))
}

fn print_help(config: &Config) {
    println!("Commands:");
    println!("  <city> | city <city>   switch city ({})", config.cities.join(", "));
    println!("  theme | t              toggle light/dark theme");
    println!("  refresh | r            reload every panel now");
    println!("  quit | q               exit");
}

fn theme(action: Option<ThemeAction>) -> Result<()> {
    let store = theme_store()?;

    match action {
        Some(ThemeAction::Toggle) => println!("Theme set to {}", store.toggle()?),
        None => println!("{}", store.current()),
    }
    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let base_url = inquire::Text::new("Backend URL:")
        .with_default(&config.base_url)
        .prompt()
        .context("Failed to read backend URL")?;
    HttpDashboardApi::new(&base_url, config.request_timeout())?;
    config.base_url = base_url;

    let current = config.selected_city(None).ok();
    let start = current
        .as_ref()
        .and_then(|c| config.cities.iter().position(|x| x == c))
        .unwrap_or(0);

    let city = inquire::Select::new("Default city:", config.cities.clone())
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read default city")?;
    config.set_default_city(&city)?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_controller_commands() {
        let cfg = Config::default();
        assert_eq!(parse_command(&cfg, "quit").unwrap(), Some(ControlEvent::Shutdown));
        assert_eq!(parse_command(&cfg, " T ").unwrap(), Some(ControlEvent::ToggleTheme));
        assert_eq!(parse_command(&cfg, "refresh").unwrap(), Some(ControlEvent::Refresh));
        assert_eq!(parse_command(&cfg, "   ").unwrap(), None);
    }

    #[test]
    fn parses_city_selection() {
        let cfg = Config::default();
        assert_eq!(
            parse_command(&cfg, "city jaipur").unwrap(),
            Some(ControlEvent::SelectCity("Jaipur".into()))
        );
        assert_eq!(
            parse_command(&cfg, "Kolkata").unwrap(),
            Some(ControlEvent::SelectCity("Kolkata".into()))
        );
    }

    #[test]
    fn unknown_city_is_an_error() {
        let err = parse_command(&Config::default(), "Narnia").unwrap_err();
        assert!(err.to_string().contains("Unknown city"));
    }

    #[test]
    fn base_url_override() {
        let cfg = with_overrides(Config::default(), Some("http://example.test".into()));
        assert_eq!(cfg.base_url, "http://example.test");
        assert_eq!(with_overrides(Config::default(), None).base_url, Config::default().base_url);
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from(["weather-dashboard", "show", "--city", "Delhi", "--plain"]);
        assert!(cli.plain);
        assert!(matches!(cli.command, Command::Show { city: Some(ref c) } if c == "Delhi"));

        let cli = Cli::parse_from(["weather-dashboard", "theme", "toggle"]);
        assert!(matches!(cli.command, Command::Theme { action: Some(ThemeAction::Toggle) }));
    }
}
