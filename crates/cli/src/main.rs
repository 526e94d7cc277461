use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finagent_core::api::{ApiClient, MarketApi, DEFAULT_HORIZON_DAYS, DEFAULT_WINDOW};
use finagent_core::chart::Chart;
use finagent_core::chat::ChatSession;
use finagent_core::dashboard::{load_dashboard, DashboardController, DashboardParams};
use finagent_core::settings::{Theme, ThemeStore};

mod output;

#[derive(Debug, Parser)]
#[command(name = "finagent", about = "Terminal client for the financial AI agent backend")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ping the backend health endpoint.
    Health,

    /// Load forecast and recommendation for one ticker.
    Forecast {
        #[arg(long)]
        ticker: String,

        /// Days to project.
        #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
        horizon: u32,

        /// EMA window.
        #[arg(long, default_value_t = DEFAULT_WINDOW)]
        window: u32,

        /// Also write the chart as a standalone SVG file.
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Interactive chatbot; one question per line.
    Chat,

    /// Live dashboard; type a ticker per line to switch.
    Watch {
        #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
        horizon: u32,

        #[arg(long, default_value_t = DEFAULT_WINDOW)]
        window: u32,
    },

    /// Show or change the saved colour theme.
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
}

#[derive(Debug, Subcommand)]
enum ThemeAction {
    Show,
    Toggle,
    Set { theme: Theme },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = finagent_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(args.command, &settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
    }
    result
}

async fn run(command: Command, settings: &finagent_core::config::Settings) -> anyhow::Result<()> {
    match command {
        Command::Health => {
            let health = backend(settings)?.fetch_health().await?;
            println!("{} {}", settings.api_base_url, health.status);
        }
        Command::Forecast {
            ticker,
            horizon,
            window,
            svg,
        } => {
            let params = DashboardParams::new(ticker.trim().to_uppercase())
                .with_horizon(horizon)
                .with_window(window);
            let api = backend(settings)?;
            let data = load_dashboard(api.as_ref(), &params)
                .await
                .map_err(anyhow::Error::msg)?;
            print!("{}", output::dashboard(&data));

            if let Some(path) = svg {
                match data.chart() {
                    Chart::Drawing(d) => {
                        std::fs::write(&path, d.to_svg())
                            .with_context(|| format!("failed to write {}", path.display()))?;
                        tracing::info!(path = %path.display(), "chart written");
                    }
                    Chart::NoData => tracing::warn!(ticker = %params.ticker, "no data; chart not written"),
                }
            }
        }
        Command::Chat => chat(backend(settings)?).await?,
        Command::Watch { horizon, window } => watch(backend(settings)?, horizon, window).await?,
        Command::Theme { action } => theme(action, settings)?,
    }

    Ok(())
}

fn backend(settings: &finagent_core::config::Settings) -> anyhow::Result<Arc<dyn MarketApi>> {
    Ok(Arc::new(ApiClient::from_settings(settings)?))
}

fn theme(action: ThemeAction, settings: &finagent_core::config::Settings) -> anyhow::Result<()> {
    let store = ThemeStore::init(settings.require_settings_path()?, settings.prefers_dark())?;
    let theme = match action {
        ThemeAction::Show => store.theme(),
        ThemeAction::Toggle => store.toggle()?,
        ThemeAction::Set { theme } => {
            store.set(theme)?;
            theme
        }
    };
    println!("{}", theme.as_str());
    Ok(())
}

async fn chat(api: Arc<dyn MarketApi>) -> anyhow::Result<()> {
    let mut session = ChatSession::new(api);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let added = session.send(&line).await;
        // Skip the echo of the user's own line.
        stdout
            .write_all(output::messages(&added[1..]).as_bytes())
            .await?;
    }

    Ok(())
}

async fn watch(api: Arc<dyn MarketApi>, horizon: u32, window: u32) -> anyhow::Result<()> {
    let controller = DashboardController::new(api);
    let mut rx = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("type a ticker and press enter; ctrl-d to quit");
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let ticker = line.trim().to_uppercase();
                if ticker.is_empty() {
                    continue;
                }
                controller.set_params(
                    DashboardParams::new(ticker)
                        .with_horizon(horizon)
                        .with_window(window),
                );
            }
            changed = rx.changed() => {
                changed.context("dashboard controller closed")?;
                let state = rx.borrow_and_update().clone();
                print!("{}", output::state(&state));
            }
        }
    }

    controller.cancel();
    Ok(())
}

fn init_sentry(settings: &finagent_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
