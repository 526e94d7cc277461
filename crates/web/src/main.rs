use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use finagent_core::api::{ApiClient, MarketApi, DEFAULT_HORIZON_DAYS, DEFAULT_WINDOW};
use finagent_core::chat::ChatSession;
use finagent_core::dashboard::{load_dashboard, DashboardParams};
use finagent_core::domain::chat::HealthStatus;
use finagent_core::settings::ThemeStore;

mod pages;
mod sessions;

use sessions::SessionStore;

const DEFAULT_TICKER: &str = "AAPL";
const MAX_HORIZON_DAYS: u32 = 90;
const MAX_WINDOW: u32 = 365;
const FALLBACK_REDIRECT: &str = "/dashboard";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = finagent_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let api: Arc<dyn MarketApi> = Arc::new(ApiClient::from_settings(&settings)?);
    let theme = Arc::new(ThemeStore::init(
        settings.require_settings_path()?,
        settings.prefers_dark(),
    )?);

    match api.fetch_health().await {
        Ok(health) => tracing::info!(base_url = %settings.api_base_url, status = %health.status, "backend reachable"),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::warn!(base_url = %settings.api_base_url, error = %e, "backend unreachable; pages will show errors until it is up");
        }
    }

    let state = AppState {
        api,
        theme,
        sessions: Arc::new(SessionStore::from_env()),
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "web listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/healthz", get(healthz))
        .route("/backend/health", get(backend_health))
        .route("/dashboard", get(dashboard))
        .route("/chat", get(chat_page).post(chat_send))
        .route("/theme", post(toggle_theme))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Clone)]
struct AppState {
    api: Arc<dyn MarketApi>,
    theme: Arc<ThemeStore>,
    sessions: Arc<SessionStore>,
}

async fn healthz() -> &'static str {
    "ok"
}

async fn backend_health(State(state): State<AppState>) -> Result<Json<HealthStatus>, StatusCode> {
    state.api.fetch_health().await.map(Json).map_err(|e| {
        tracing::warn!(error = %e, "backend health check failed");
        StatusCode::BAD_GATEWAY
    })
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    ticker: Option<String>,
    horizon: Option<u32>,
    window: Option<u32>,
}

impl DashboardQuery {
    fn params(&self) -> DashboardParams {
        let ticker = self
            .ticker
            .as_deref()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TICKER.to_string());
        DashboardParams::new(ticker)
            .with_horizon(
                self.horizon
                    .unwrap_or(DEFAULT_HORIZON_DAYS)
                    .clamp(1, MAX_HORIZON_DAYS),
            )
            .with_window(self.window.unwrap_or(DEFAULT_WINDOW).clamp(1, MAX_WINDOW))
    }
}

async fn dashboard(State(state): State<AppState>, Query(q): Query<DashboardQuery>) -> Html<String> {
    let params = q.params();
    let result = load_dashboard(state.api.as_ref(), &params).await;
    Html(pages::dashboard(state.theme.theme(), &params, &result))
}

#[derive(Debug, Deserialize)]
struct ChatQuery {
    session: Option<String>,
}

fn parse_session(raw: Option<&str>) -> Option<Uuid> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| Uuid::parse_str(s).ok())
}

async fn chat_page(State(state): State<AppState>, Query(q): Query<ChatQuery>) -> Html<String> {
    let theme = state.theme.theme();
    let id = parse_session(q.session.as_deref());
    let Some((id, session)) = id.and_then(|id| state.sessions.get(id).map(|s| (id, s))) else {
        return Html(pages::chat(theme, None, &[]));
    };
    let session = session.lock().await;
    Html(pages::chat(theme, Some(id), session.messages()))
}

#[derive(Debug, Deserialize)]
struct ChatForm {
    session: Option<String>,
    message: String,
}

async fn chat_send(State(state): State<AppState>, Form(form): Form<ChatForm>) -> Redirect {
    let requested = parse_session(form.session.as_deref());

    // Blank input never creates a session.
    if form.message.trim().is_empty() {
        return match requested.filter(|id| state.sessions.get(*id).is_some()) {
            Some(id) => Redirect::to(&format!("/chat?session={id}")),
            None => Redirect::to("/chat"),
        };
    }

    let api = Arc::clone(&state.api);
    let (id, session) = state
        .sessions
        .get_or_create(requested, move || ChatSession::new(api));
    let mut session = session.lock().await;
    let added = session.send(&form.message).await;
    tracing::info!(session = %id, appended = added.len(), "chat turn");
    Redirect::to(&format!("/chat?session={id}"))
}

#[derive(Debug, Deserialize)]
struct ThemeForm {
    redirect: Option<String>,
}

async fn toggle_theme(State(state): State<AppState>, Form(form): Form<ThemeForm>) -> Redirect {
    if let Err(e) = state.theme.toggle() {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %e, path = %state.theme.path().display(), "theme toggle failed");
    }
    Redirect::to(&local_redirect(form.redirect.as_deref()))
}

/// Same-site path and query from an untrusted redirect field.
///
/// Anything with a scheme, an authority, a backslash or bytes a URI cannot
/// carry falls back to the dashboard.
fn local_redirect(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return FALLBACK_REDIRECT.to_string();
    };
    if !raw.starts_with('/') || raw.starts_with("//") || raw.contains('\\') {
        return FALLBACK_REDIRECT.to_string();
    }

    match raw.parse::<Uri>() {
        Ok(uri) if uri.scheme().is_none() && uri.authority().is_none() => uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| FALLBACK_REDIRECT.to_string()),
        Ok(_) | Err(_) => {
            tracing::warn!(redirect = ?raw, "rejected redirect target");
            FALLBACK_REDIRECT.to_string()
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
