//! Wire shapes returned by the backend that are looser than the domain types.

use crate::domain::chat::{ChatReply, HealthStatus, Source};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReplyWire {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<SourceWire>>,
}

/// Retrieval hits also carry `score` and `content`; only the link is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceWire {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthWire {
    #[serde(default)]
    pub status: Option<String>,
}

impl ChatReplyWire {
    pub fn into_reply(self) -> ChatReply {
        let sources = self
            .sources
            .unwrap_or_default()
            .into_iter()
            .map(|s| Source {
                title: s.title.unwrap_or_default(),
                url: s.url.unwrap_or_default(),
            })
            .collect();

        ChatReply {
            reply: self.reply.unwrap_or_default(),
            sources,
        }
    }
}

impl HealthWire {
    pub fn into_status(self) -> HealthStatus {
        let status = self
            .status
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "ok".to_string());
        HealthStatus { status }
    }
}
