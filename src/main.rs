mod app;
mod chart;
mod config;
mod feed;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use chart::ChartRenderer;
use config::AppConfig;
use feed::client::FeedClient;
use feed::schema::{DuplicatesResponse, FrequenciesResponse, KeyVal, PeopleResponse};
use feed::FeedKind;

/// Bar columns for `--chart` when stdout is not a terminal
const DEFAULT_CHART_COLUMNS: u16 = 40;

#[derive(Parser, Debug)]
#[command(name = "feedboard")]
#[command(version)]
#[command(about = "Terminal dashboard for the people, email frequency and duplicate feeds")]
struct Args {
    /// Base URL of the feed service (overrides the config file)
    #[arg(short, long, value_name = "URL")]
    base_url: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Fetch one feed and print its payload as JSON
    #[arg(short, long, value_enum, value_name = "FEED")]
    print: Option<FeedKind>,

    /// Fetch the frequencies and print them as a text bar chart
    #[arg(long)]
    chart: bool,

    /// Fetch the frequencies and write the bar chart as SVG
    #[arg(long, value_name = "PATH")]
    svg: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for one-shot output
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    // Handle CLI-only commands
    if let Some(kind) = args.print {
        return print_feed(&config, kind).await;
    }

    if args.chart {
        return print_chart(&config).await;
    }

    if let Some(path) = args.svg {
        return write_svg(&config, &path).await;
    }

    // Run TUI
    run_tui(&config).await
}

async fn print_feed(config: &AppConfig, kind: FeedKind) -> Result<()> {
    println!("{}", feed_json(config, kind).await?);
    Ok(())
}

/// Fetch one feed and render its payload as pretty JSON
async fn feed_json(config: &AppConfig, kind: FeedKind) -> Result<String> {
    let client = FeedClient::new(config.base_url.clone());
    let endpoint = config.endpoints.path(kind);

    let output = match kind {
        FeedKind::People => serde_json::to_string_pretty(&client.fetch::<PeopleResponse>(endpoint).await?)?,
        FeedKind::Frequencies => {
            serde_json::to_string_pretty(&client.fetch::<FrequenciesResponse>(endpoint).await?)?
        }
        FeedKind::Duplicates => {
            serde_json::to_string_pretty(&client.fetch::<DuplicatesResponse>(endpoint).await?)?
        }
    };
    Ok(output)
}

async fn fetch_frequencies(config: &AppConfig) -> Result<Vec<KeyVal>> {
    let client = FeedClient::new(config.base_url.clone());
    let entries = client
        .fetch::<FrequenciesResponse>(config.endpoints.path(FeedKind::Frequencies))
        .await?;
    Ok(entries)
}

async fn print_chart(config: &AppConfig) -> Result<()> {
    // Leave room for the labels and the pixel suffix
    let columns = crossterm::terminal::size()
        .map(|(width, _)| width / 2)
        .unwrap_or(DEFAULT_CHART_COLUMNS);

    for line in chart_lines(config, columns).await? {
        println!("{}", line);
    }
    Ok(())
}

async fn chart_lines(config: &AppConfig, columns: u16) -> Result<Vec<String>> {
    let entries = fetch_frequencies(config).await?;
    let bars = ChartRenderer::new(config.chart.bar_height).render(&entries);
    Ok(chart::render_text(&bars, columns))
}

async fn write_svg(config: &AppConfig, path: &Path) -> Result<()> {
    let entries = fetch_frequencies(config).await?;
    let bars = ChartRenderer::new(config.chart.bar_height).render(&entries);
    let svg = chart::svg::render_svg(&bars)?;

    std::fs::write(path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {} bars to {}", bars.len(), path.display());
    Ok(())
}

async fn run_tui(config: &AppConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config);
    app.start();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        // Apply finished fetches
        app.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> AppConfig {
        AppConfig {
            base_url: server.uri(),
            ..AppConfig::default()
        }
    }

    async fn serve(server: &MockServer, at: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_print_fails_on_server_error() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/people",
            ResponseTemplate::new(500).set_body_json(json!({"status": "Error", "error": "down"})),
        )
        .await;

        let err = print_feed(&config_for(&server), FeedKind::People).await.unwrap_err();
        assert!(err.to_string().contains("down"));
    }

    #[tokio::test]
    async fn test_empty_duplicates_print_as_empty_list() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/people/emails/duplicates",
            ResponseTemplate::new(200).set_body_json(json!({"possibleDuplicates": []})),
        )
        .await;

        let output = feed_json(&config_for(&server), FeedKind::Duplicates).await.unwrap();
        assert_eq!(output, "[]");
    }

    #[tokio::test]
    async fn test_printed_people_match_response() {
        let server = MockServer::start().await;
        let people = json!([{"id": "p-1", "display_name": "Ann", "title": null}]);
        serve(
            &server,
            "/people",
            ResponseTemplate::new(200).set_body_json(json!({"people": people.clone()})),
        )
        .await;

        let output = feed_json(&config_for(&server), FeedKind::People).await.unwrap();
        let printed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(printed, people);
    }

    #[tokio::test]
    async fn test_chart_lines_from_frequencies() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/people/emails/char-frequencies",
            ResponseTemplate::new(200)
                .set_body_json(json!({"frequencies": [{"key": "a", "value": 0}, {"key": "b", "value": 100}]})),
        )
        .await;

        let lines = chart_lines(&config_for(&server), 10).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("45px"));
        assert!(lines[1].starts_with("b = 100"));
    }

    #[tokio::test]
    async fn test_write_svg_one_rect_per_entry() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/people/emails/char-frequencies",
            ResponseTemplate::new(200).set_body_json(json!({"frequencies": [
                {"key": "a", "value": 3},
                {"key": "b", "value": 60},
                {"key": "c", "value": 120}
            ]})),
        )
        .await;

        let out = std::env::temp_dir().join(format!("feedboard-chart-{}.svg", std::process::id()));
        write_svg(&config_for(&server), &out).await.unwrap();

        let svg = std::fs::read_to_string(&out).unwrap();
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains("c = 120"));
        let _ = std::fs::remove_file(&out);
    }

    #[tokio::test]
    async fn test_write_svg_fails_without_server_data() {
        let server = MockServer::start().await;
        serve(&server, "/people/emails/char-frequencies", ResponseTemplate::new(404)).await;

        let out = std::env::temp_dir().join(format!("feedboard-missing-{}.svg", std::process::id()));
        assert!(write_svg(&config_for(&server), &out).await.is_err());
        assert!(!out.exists());
    }
}
