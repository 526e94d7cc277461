use finagent_core::dashboard::{DashboardData, DashboardState};
use finagent_core::domain::chat::{ChatMessage, Role};
use std::fmt::Write;

pub fn dashboard(data: &DashboardData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", data.forecast.ticker);
    let kpis = data.kpis();
    let width = kpis.iter().map(|k| k.label.len()).max().unwrap_or(0);
    for k in &kpis {
        let _ = writeln!(out, "{:<width$}  {}", k.label, k.value);
    }
    let _ = writeln!(out, "{}", data.recommendation.rationale);
    match data.chart().drawing() {
        Some(d) => {
            let _ = writeln!(out, "{}", d.caption);
        }
        None => {
            let _ = writeln!(out, "{}", finagent_core::chart::NO_DATA);
        }
    }
    out
}

pub fn state(state: &DashboardState) -> String {
    match state {
        DashboardState::Idle => String::new(),
        DashboardState::Loading { params, .. } => format!("loading {}...\n", params.ticker),
        DashboardState::Success { data, .. } => dashboard(data),
        DashboardState::Error {
            params, message, ..
        } => format!("{}: {message}\n", params.ticker),
    }
}

pub fn messages(messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    for m in messages {
        let who = match m.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        let _ = writeln!(out, "{who}: {}", m.text);
        for s in &m.sources {
            let _ = writeln!(out, "  - {} <{}>", s.title, s.url);
        }
    }
    out
}
