//! Outbound notification sinks: Discord webhook embeds and the OpenClaw
//! gateway wake call. Delivery is best-effort: a missing configuration or a
//! failed POST returns `Ok(false)` and a log line, never an error the
//! triggering write would see. Embed and message construction are pure
//! functions so the payload shapes are testable without a network.

use crate::error::Result;
use crate::idea::Idea;
use crate::{io, paths};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DISCORD_URL_ENV: &str = "DISCORD_WEBHOOK_URL";
pub const GATEWAY_URL_ENV: &str = "OPENCLAW_GATEWAY_URL";
pub const GATEWAY_TOKEN_ENV: &str = "OPENCLAW_GATEWAY_TOKEN";
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:4444";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookConfig {
    pub webhook_url: String,
}

impl WebhookConfig {
    pub fn load(root: &Path) -> WebhookConfig {
        let path = paths::config_path(root);
        if !path.exists() {
            return WebhookConfig::default();
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "webhook config unreadable, using defaults");
                return WebhookConfig::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "webhook config unreadable, using defaults");
                WebhookConfig::default()
            }
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        io::atomic_write(&paths::config_path(root), content.as_bytes())
    }
}

/// Resolve the Discord webhook URL. The environment variable takes
/// precedence over the config file.
pub fn webhook_url(root: &Path) -> String {
    if let Ok(url) = std::env::var(DISCORD_URL_ENV) {
        if !url.is_empty() {
            return url;
        }
    }
    WebhookConfig::load(root).webhook_url
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum NotifyEvent {
    Create,
    Update,
    Delete,
    Status { from: String, to: String },
}

fn format_time() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Build the Discord embed for an event. Colors: create green, update blue,
/// delete red, status-change yellow.
pub fn discord_embed(event: &NotifyEvent, idea: &Idea) -> serde_json::Value {
    let (title, description, color) = match event {
        NotifyEvent::Create => (
            "📝 新點子建立",
            format!("**{}** {}", idea.id, idea.name),
            0x9ece6a,
        ),
        NotifyEvent::Update => (
            "✏️ 點子已更新",
            format!("**{}** {}", idea.id, idea.name),
            0x7aa2f7,
        ),
        NotifyEvent::Delete => (
            "🗑️ 點子已刪除",
            format!("**{}** {}", idea.id, idea.name),
            0xf7768e,
        ),
        NotifyEvent::Status { from, to } => (
            "🔄 狀態變更",
            format!("**{}** {}\n{} → {}", idea.id, idea.name, from, to),
            0xe0af68,
        ),
    };

    let mut fields = vec![serde_json::json!({
        "name": "優先級",
        "value": idea.priority.to_string(),
        "inline": true,
    })];
    if let Some(assignee) = &idea.assignee {
        fields.push(serde_json::json!({
            "name": "負責 Agent",
            "value": assignee,
            "inline": true,
        }));
    }
    if !matches!(event, NotifyEvent::Status { .. }) && !idea.status.is_empty() {
        fields.push(serde_json::json!({
            "name": "狀態",
            "value": idea.status,
            "inline": true,
        }));
    }
    if let Some(github) = &idea.github {
        fields.push(serde_json::json!({
            "name": "GitHub",
            "value": format!("[連結]({github})"),
            "inline": true,
        }));
    }

    serde_json::json!({
        "title": format!("【看板更新】{title}"),
        "description": description,
        "color": color,
        "fields": fields,
        "footer": { "text": format!("Idea Kanban • {}", format_time()) },
    })
}

/// Build the plain-text wake message for an event.
pub fn wake_message(event: &NotifyEvent, idea: &Idea) -> String {
    let time = format_time();
    match event {
        NotifyEvent::Create => format!(
            "【看板通知】新點子建立\n點子: {} - {}\n優先級: {}\n時間: {}",
            idea.id, idea.name, idea.priority, time
        ),
        NotifyEvent::Update => format!(
            "【看板通知】點子已更新\n點子: {} - {}\n時間: {}",
            idea.id, idea.name, time
        ),
        NotifyEvent::Delete => format!(
            "【看板通知】點子已刪除\n點子: {} - {}\n時間: {}",
            idea.id, idea.name, time
        ),
        NotifyEvent::Status { from, to } => format!(
            "【看板通知】狀態變更\n點子: {} - {}\n變更: {} → {}\n時間: {}",
            idea.id, idea.name, from, to, time
        ),
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

fn client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| crate::error::BoardError::Webhook(e.to_string()))
}

/// POST the embed to an explicit webhook URL. Returns whether delivery
/// succeeded; transport and HTTP failures are logged, not raised.
pub fn send_discord_to(url: &str, event: &NotifyEvent, idea: &Idea) -> Result<bool> {
    if url.is_empty() {
        tracing::debug!("discord webhook not configured, skipping");
        return Ok(false);
    }
    let body = serde_json::json!({ "embeds": [discord_embed(event, idea)] });
    match client()?.post(url).json(&body).send() {
        Ok(resp) if resp.status().is_success() => {
            tracing::debug!(idea = %idea.id, "discord notification sent");
            Ok(true)
        }
        Ok(resp) => {
            tracing::warn!(status = %resp.status(), "discord webhook rejected the payload");
            Ok(false)
        }
        Err(e) => {
            tracing::warn!(error = %e, "discord webhook unreachable");
            Ok(false)
        }
    }
}

/// POST the embed to the configured webhook URL (env wins over config file).
pub fn send_discord(root: &Path, event: &NotifyEvent, idea: &Idea) -> Result<bool> {
    send_discord_to(&webhook_url(root), event, idea)
}

/// POST a wake event to an explicit gateway. A missing token means the
/// gateway is not configured and the call is skipped.
pub fn send_wake_to(gateway_url: &str, token: Option<&str>, message: &str) -> Result<bool> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        tracing::debug!("gateway token not configured, skipping wake event");
        return Ok(false);
    };
    let body = serde_json::json!({ "text": message, "mode": "now" });
    let url = format!("{}/hooks/wake", gateway_url.trim_end_matches('/'));
    match client()?.post(&url).bearer_auth(token).json(&body).send() {
        Ok(resp) if resp.status().is_success() => {
            tracing::debug!("gateway wake event sent");
            Ok(true)
        }
        Ok(resp) => {
            tracing::warn!(status = %resp.status(), "gateway rejected wake event");
            Ok(false)
        }
        Err(e) => {
            tracing::warn!(error = %e, "gateway unreachable");
            Ok(false)
        }
    }
}

/// POST a wake event to the gateway named by the environment.
pub fn send_wake(message: &str) -> Result<bool> {
    let gateway =
        std::env::var(GATEWAY_URL_ENV).unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());
    let token = std::env::var(GATEWAY_TOKEN_ENV).ok();
    send_wake_to(&gateway, token.as_deref(), message)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idea::Priority;
    use tempfile::TempDir;

    fn idea() -> Idea {
        Idea {
            id: "IDEA-001".to_string(),
            name: "通知測試".to_string(),
            status: "🚧 開發中".to_string(),
            priority: Priority::High,
            assignee: Some("pm-bot".to_string()),
            sprint: None,
            progress: 40,
            github: Some("https://github.com/haolab/ideaboard/issues/1".to_string()),
            created: "2026-08-01".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cfg = WebhookConfig {
            webhook_url: "https://discord.com/api/webhooks/1/x".to_string(),
        };
        cfg.save(dir.path()).unwrap();
        assert_eq!(WebhookConfig::load(dir.path()).webhook_url, cfg.webhook_url);
    }

    #[test]
    fn missing_config_defaults_to_empty() {
        let dir = TempDir::new().unwrap();
        assert!(WebhookConfig::load(dir.path()).webhook_url.is_empty());
    }

    #[test]
    fn embed_colors_follow_event_type() {
        let idea = idea();
        assert_eq!(discord_embed(&NotifyEvent::Create, &idea)["color"], 0x9ece6a);
        assert_eq!(discord_embed(&NotifyEvent::Update, &idea)["color"], 0x7aa2f7);
        assert_eq!(discord_embed(&NotifyEvent::Delete, &idea)["color"], 0xf7768e);
        let status = NotifyEvent::Status {
            from: "pending".to_string(),
            to: "done".to_string(),
        };
        assert_eq!(discord_embed(&status, &idea)["color"], 0xe0af68);
    }

    #[test]
    fn embed_includes_conditional_fields() {
        let embed = discord_embed(&NotifyEvent::Create, &idea());
        let fields = embed["fields"].as_array().unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["優先級", "負責 Agent", "狀態", "GitHub"]);
    }

    #[test]
    fn status_event_omits_status_field_but_carries_transition() {
        let event = NotifyEvent::Status {
            from: "📝 待審核".to_string(),
            to: "done".to_string(),
        };
        let embed = discord_embed(&event, &idea());
        let fields = embed["fields"].as_array().unwrap();
        assert!(fields.iter().all(|f| f["name"] != "狀態"));
        assert!(embed["description"]
            .as_str()
            .unwrap()
            .contains("📝 待審核 → done"));
    }

    #[test]
    fn wake_message_shapes() {
        let idea = idea();
        let create = wake_message(&NotifyEvent::Create, &idea);
        assert!(create.starts_with("【看板通知】新點子建立"));
        assert!(create.contains("IDEA-001"));
        assert!(create.contains("優先級: High"));

        let status = wake_message(
            &NotifyEvent::Status {
                from: "a".to_string(),
                to: "b".to_string(),
            },
            &idea,
        );
        assert!(status.contains("變更: a → b"));
    }

    #[test]
    fn send_discord_skips_when_unconfigured() {
        assert!(!send_discord_to("", &NotifyEvent::Create, &idea()).unwrap());
    }

    #[test]
    fn send_discord_posts_embed_payload() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/webhook")
            .match_header("content-type", "application/json")
            .with_status(204)
            .create();

        let url = format!("{}/webhook", server.url());
        let sent = send_discord_to(&url, &NotifyEvent::Create, &idea()).unwrap();
        assert!(sent);
        mock.assert();
    }

    #[test]
    fn send_discord_survives_server_errors() {
        let mut server = mockito::Server::new();
        server.mock("POST", "/webhook").with_status(500).create();

        let url = format!("{}/webhook", server.url());
        let sent = send_discord_to(&url, &NotifyEvent::Update, &idea()).unwrap();
        assert!(!sent);
    }

    #[test]
    fn send_wake_requires_token() {
        assert!(!send_wake_to("http://localhost:4444", None, "msg").unwrap());
        assert!(!send_wake_to("http://localhost:4444", Some(""), "msg").unwrap());
    }

    #[test]
    fn send_wake_posts_bearer_token() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/hooks/wake")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .create();

        let sent = send_wake_to(&server.url(), Some("secret"), "【看板通知】test").unwrap();
        assert!(sent);
        mock.assert();
    }
}
