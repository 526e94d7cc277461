//! Server-rendered HTML for the dashboard and chatbot pages.

use finagent_core::chart::escape_html;
use finagent_core::chart::kpi::render_grid;
use finagent_core::dashboard::{DashboardData, DashboardParams};
use finagent_core::domain::chat::{ChatMessage, Role};
use finagent_core::settings::Theme;
use uuid::Uuid;

const STYLE: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; background: #f9fafb; color: #111827; }
header { display: flex; align-items: center; gap: 16px; padding: 16px; border-bottom: 1px solid #e5e7eb; background: #fff; }
header h1 { font-size: 20px; margin: 0; }
header nav a { margin-right: 12px; color: inherit; }
header form { margin-left: auto; }
main { max-width: 960px; margin: 0 auto; padding: 24px; display: flex; flex-direction: column; gap: 16px; }
.card { border: 1px solid #e5e7eb; border-radius: 6px; padding: 16px; background: #fff; }
.card-title { font-weight: 500; margin-bottom: 8px; }
.muted { font-size: 12px; color: #6b7280; }
.error { color: #b91c1c; }
.kpi-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(170px, 1fr)); gap: 16px; }
.kpi-value { font-size: 24px; font-weight: 600; }
.bubble { padding: 8px; border-radius: 6px; background: #f3f4f6; }
.bubble.user { background: #dbeafe; }
svg { width: 100%; height: auto; }
input, button { padding: 8px 12px; border: 1px solid #d1d5db; border-radius: 6px; background: inherit; color: inherit; }
html.dark body { background: #111827; color: #f3f4f6; }
html.dark header, html.dark .card { background: #1f2937; border-color: #374151; }
html.dark .bubble { background: #374151; }
html.dark .bubble.user { background: #1e3a8a; }
"#;

fn layout(theme: Theme, title: &str, here: &str, body: &str) -> String {
    let toggle_label = match theme {
        Theme::Dark => "Dark",
        Theme::Light => "Light",
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en" class="{class}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Financial AI Agent</title>
<style>{STYLE}</style>
</head>
<body>
<header>
<h1>Financial AI Agent</h1>
<nav><a href="/dashboard">Dashboard</a><a href="/chat">Chatbot</a></nav>
<form method="post" action="/theme">
<input type="hidden" name="redirect" value="{here}">
<button type="submit" aria-label="Toggle theme" title="Toggle theme">{toggle_label}</button>
</form>
</header>
<main>
<h2>{title}</h2>
{body}
</main>
</body>
</html>"#,
        class = theme.root_class(),
        title = escape_html(title),
        here = escape_html(here),
    )
}

pub fn dashboard(
    theme: Theme,
    params: &DashboardParams,
    result: &Result<DashboardData, String>,
) -> String {
    let ticker = escape_html(&params.ticker);
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("ticker", &params.ticker)
        .append_pair("horizon", &params.horizon_days.to_string())
        .append_pair("window", &params.window.to_string())
        .finish();
    let here = format!("/dashboard?{query}");

    let mut body = format!(
        r#"<form class="card" method="get" action="/dashboard">
<label>Ticker <input name="ticker" value="{ticker}" size="8"></label>
<label>Horizon (days) <input name="horizon" type="number" min="1" value="{horizon}"></label>
<label>EMA window <input name="window" type="number" min="1" value="{window}"></label>
<button type="submit">Load</button>
</form>
"#,
        horizon = params.horizon_days,
        window = params.window,
    );

    match result {
        Ok(data) => {
            body.push_str(&render_grid(&data.kpis()));
            body.push('\n');
            let rec = &data.recommendation;
            body.push_str(&format!(
                r#"<div class="card"><div class="card-title">Recommendation · {} ({}d window)</div><div class="kpi-value">{}</div><div class="muted">{}</div></div>
"#,
                escape_html(&rec.ticker),
                rec.window,
                escape_html(&rec.headline()),
                escape_html(&rec.rationale),
            ));
            body.push_str(&data.chart().to_html());
        }
        Err(message) => {
            body.push_str(&format!(
                r#"<div class="card error">{}</div>"#,
                escape_html(message)
            ));
        }
    }

    layout(theme, &format!("Dashboard · {}", params.ticker), &here, &body)
}

pub fn chat(theme: Theme, session: Option<Uuid>, messages: &[ChatMessage]) -> String {
    let here = match session {
        Some(id) => format!("/chat?session={id}"),
        None => "/chat".to_string(),
    };

    let mut window = String::from(r#"<div class="card">"#);
    if messages.is_empty() {
        window.push_str(r#"<div class="muted">Ask a question to get started.</div>"#);
    }
    for m in messages {
        let class = match m.role {
            Role::User => "bubble user",
            Role::Assistant => "bubble",
        };
        window.push_str(&format!(
            r#"<div class="{class}">{}</div>"#,
            escape_html(&m.text)
        ));
        if m.role == Role::Assistant && !m.sources.is_empty() {
            window.push_str(r#"<div class="muted">Sources:<ul>"#);
            for s in &m.sources {
                window.push_str(&format!(
                    r#"<li><a href="{}" target="_blank" rel="noreferrer">{}</a></li>"#,
                    escape_html(&s.url),
                    escape_html(&s.title),
                ));
            }
            window.push_str("</ul></div>");
        }
    }
    window.push_str("</div>");

    let body = format!(
        r#"{window}
<form method="post" action="/chat">
<input type="hidden" name="session" value="{session}">
<input name="message" autofocus style="width: 80%">
<button type="submit">Send</button>
</form>"#,
        session = session.map(|id| id.to_string()).unwrap_or_default(),
    );

    layout(theme, "Chatbot", &here, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finagent_core::domain::chat::Source;

    #[test]
    fn dark_theme_sets_root_class() {
        let html = chat(Theme::Dark, None, &[]);
        assert!(html.contains(r#"<html lang="en" class="dark">"#));
        assert!(html.contains("Ask a question"));
    }

    #[test]
    fn dashboard_error_is_shown_escaped() {
        let params = DashboardParams::new("AAPL");
        let html = dashboard(
            Theme::Light,
            &params,
            &Err("forecast request failed (HTTP 404): <none>".to_string()),
        );
        assert!(html.contains("&lt;none&gt;"));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn dashboard_redirect_field_is_percent_encoded() {
        let params = DashboardParams::new("A&B\nC");
        let html = dashboard(Theme::Light, &params, &Err("x".to_string()));
        assert!(html.contains(
            r#"name="redirect" value="/dashboard?ticker=A%26B%0AC&amp;horizon=7&amp;window=14""#
        ));
    }

    #[test]
    fn chat_lists_assistant_sources() {
        let messages = vec![
            ChatMessage::user("AAPL?"),
            ChatMessage::assistant("answer").with_sources(vec![Source {
                title: "Guidance".to_string(),
                url: "https://example.com/g".to_string(),
            }]),
        ];
        let id = Uuid::new_v4();
        let html = chat(Theme::Light, Some(id), &messages);
        assert!(html.contains(r#"href="https://example.com/g""#));
        assert!(html.contains(&format!(r#"name="session" value="{id}""#)));
    }
}
