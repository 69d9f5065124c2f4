//! Append-only notification log: one JSON object per line in
//! `notifications.jsonl`. Mutation is limited to flipping `read`; deletion
//! only happens through age-based cleanup. Malformed lines are skipped on
//! read so one bad entry never hides the rest of the log.

use crate::error::{BoardError, Result};
use crate::idea::{Idea, Priority};
use crate::{io, locks, paths};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Delete,
    StatusChange,
    ManualNotify,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub action: Action,
    pub idea_id: String,
    pub idea_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

fn generate_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("notif-{}-{}", Utc::now().timestamp_millis(), suffix)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn read_all(root: &Path) -> Result<Vec<Notification>> {
    let path = paths::notifications_path(root);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)?;
    let mut notifications = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        match serde_json::from_str(line) {
            Ok(n) => notifications.push(n),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed notification line");
            }
        }
    }
    Ok(notifications)
}

fn rewrite_all(root: &Path, notifications: &[Notification]) -> Result<()> {
    let mut content = String::new();
    for n in notifications {
        content.push_str(&serde_json::to_string(n)?);
        content.push('\n');
    }
    io::atomic_write(&paths::notifications_path(root), content.as_bytes())
}

fn append(root: &Path, notification: Notification) -> Result<Notification> {
    let _guard = locks::notifications();
    let line = format!("{}\n", serde_json::to_string(&notification)?);
    io::append_text(&paths::notifications_path(root), &line)?;
    tracing::debug!(action = ?notification.action, idea = %notification.idea_id, "notification recorded");
    Ok(notification)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn list_all(root: &Path) -> Result<Vec<Notification>> {
    read_all(root)
}

pub fn list_unread(root: &Path) -> Result<Vec<Notification>> {
    Ok(read_all(root)?.into_iter().filter(|n| !n.read).collect())
}

pub fn get(root: &Path, id: &str) -> Result<Notification> {
    read_all(root)?
        .into_iter()
        .find(|n| n.id == id)
        .ok_or_else(|| BoardError::NotificationNotFound(id.to_string()))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// Flip `read` on the given ids. Returns how many entries actually changed;
/// already-read entries do not count.
pub fn mark_as_read(root: &Path, ids: &[String]) -> Result<usize> {
    let _guard = locks::notifications();
    let mut notifications = read_all(root)?;
    let mut updated = 0;
    for n in notifications.iter_mut() {
        if !n.read && ids.iter().any(|id| *id == n.id) {
            n.read = true;
            updated += 1;
        }
    }
    rewrite_all(root, &notifications)?;
    Ok(updated)
}

/// Flip `read` on every unread entry.
pub fn mark_all_read(root: &Path) -> Result<usize> {
    let _guard = locks::notifications();
    let mut notifications = read_all(root)?;
    let mut updated = 0;
    for n in notifications.iter_mut() {
        if !n.read {
            n.read = true;
            updated += 1;
        }
    }
    rewrite_all(root, &notifications)?;
    Ok(updated)
}

/// Mark a single entry as read. Idempotent on an already-read entry;
/// errors when the id does not exist.
pub fn mark_one_read(root: &Path, id: &str) -> Result<()> {
    let _guard = locks::notifications();
    let mut notifications = read_all(root)?;
    let n = notifications
        .iter_mut()
        .find(|n| n.id == id)
        .ok_or_else(|| BoardError::NotificationNotFound(id.to_string()))?;
    n.read = true;
    rewrite_all(root, &notifications)
}

/// Drop entries strictly older than `days`. Returns how many were removed.
pub fn clean_older_than(root: &Path, days: i64) -> Result<usize> {
    let _guard = locks::notifications();
    let cutoff = Utc::now() - Duration::days(days);
    let notifications = read_all(root)?;
    let kept: Vec<Notification> = notifications
        .iter()
        .filter(|n| n.timestamp > cutoff)
        .cloned()
        .collect();
    let removed = notifications.len() - kept.len();
    if removed > 0 {
        rewrite_all(root, &kept)?;
    }
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Event constructors
// ---------------------------------------------------------------------------

pub fn record_create(root: &Path, idea: &Idea) -> Result<Notification> {
    append(
        root,
        Notification {
            id: generate_id(),
            timestamp: Utc::now(),
            read: false,
            action: Action::Create,
            idea_id: idea.id.clone(),
            idea_name: idea.name.clone(),
            priority: Some(idea.priority),
            status: Some(idea.status.clone()),
            from: None,
            to: None,
        },
    )
}

pub fn record_update(root: &Path, idea: &Idea) -> Result<Notification> {
    append(
        root,
        Notification {
            id: generate_id(),
            timestamp: Utc::now(),
            read: false,
            action: Action::Update,
            idea_id: idea.id.clone(),
            idea_name: idea.name.clone(),
            priority: Some(idea.priority),
            status: Some(idea.status.clone()),
            from: None,
            to: None,
        },
    )
}

pub fn record_delete(root: &Path, idea: &Idea) -> Result<Notification> {
    append(
        root,
        Notification {
            id: generate_id(),
            timestamp: Utc::now(),
            read: false,
            action: Action::Delete,
            idea_id: idea.id.clone(),
            idea_name: idea.name.clone(),
            priority: None,
            status: None,
            from: None,
            to: None,
        },
    )
}

pub fn record_status_change(
    root: &Path,
    idea: &Idea,
    from: &str,
    to: &str,
) -> Result<Notification> {
    append(
        root,
        Notification {
            id: generate_id(),
            timestamp: Utc::now(),
            read: false,
            action: Action::StatusChange,
            idea_id: idea.id.clone(),
            idea_name: idea.name.clone(),
            priority: Some(idea.priority),
            status: None,
            from: Some(from.to_string()),
            to: Some(to.to_string()),
        },
    )
}

/// Manually-triggered PM notification; not tied to a single idea.
pub fn record_manual(root: &Path, message: &str) -> Result<Notification> {
    append(
        root,
        Notification {
            id: generate_id(),
            timestamp: Utc::now(),
            read: false,
            action: Action::ManualNotify,
            idea_id: "BOARD".to_string(),
            idea_name: message.to_string(),
            priority: None,
            status: None,
            from: None,
            to: None,
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn idea() -> Idea {
        Idea {
            id: "IDEA-001".to_string(),
            name: "測試點子".to_string(),
            status: "pending".to_string(),
            priority: Priority::High,
            assignee: None,
            sprint: None,
            progress: 0,
            github: None,
            created: "2026-08-01".to_string(),
            description: String::new(),
        }
    }

    /// Append an entry with a back-dated timestamp, bypassing the constructors.
    fn seed(root: &Path, id: &str, age: Duration, read: bool) {
        let n = Notification {
            id: id.to_string(),
            timestamp: Utc::now() - age,
            read,
            action: Action::Create,
            idea_id: "IDEA-001".to_string(),
            idea_name: "seeded".to_string(),
            priority: None,
            status: None,
            from: None,
            to: None,
        };
        append(root, n).unwrap();
    }

    #[test]
    fn record_and_list() {
        let dir = TempDir::new().unwrap();
        record_create(dir.path(), &idea()).unwrap();
        record_status_change(dir.path(), &idea(), "pending", "done").unwrap();

        let all = list_all(dir.path()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].action, Action::Create);
        assert_eq!(all[1].action, Action::StatusChange);
        assert_eq!(all[1].from.as_deref(), Some("pending"));
        assert_eq!(all[1].to.as_deref(), Some("done"));
        assert!(all.iter().all(|n| !n.read));
    }

    #[test]
    fn wire_format_matches_log_schema() {
        let dir = TempDir::new().unwrap();
        record_status_change(dir.path(), &idea(), "a", "b").unwrap();
        let raw = std::fs::read_to_string(paths::notifications_path(dir.path())).unwrap();
        assert!(raw.contains("\"action\":\"status_change\""));
        assert!(raw.contains("\"ideaId\":\"IDEA-001\""));
        assert!(raw.contains("\"ideaName\""));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        record_create(dir.path(), &idea()).unwrap();
        io::append_text(&paths::notifications_path(dir.path()), "not json\n").unwrap();
        record_delete(dir.path(), &idea()).unwrap();
        assert_eq!(list_all(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn mark_as_read_counts_only_flips() {
        let dir = TempDir::new().unwrap();
        seed(dir.path(), "id1", Duration::zero(), false);
        seed(dir.path(), "id2", Duration::zero(), false);

        let first = mark_as_read(dir.path(), &["id1".to_string()]).unwrap();
        assert_eq!(first, 1);
        // second call is a no-op
        let second = mark_as_read(dir.path(), &["id1".to_string()]).unwrap();
        assert_eq!(second, 0);

        let unread = list_unread(dir.path()).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].id, "id2");
    }

    #[test]
    fn mark_all_read_flips_everything_unread() {
        let dir = TempDir::new().unwrap();
        seed(dir.path(), "id1", Duration::zero(), false);
        seed(dir.path(), "id2", Duration::zero(), true);
        seed(dir.path(), "id3", Duration::zero(), false);
        assert_eq!(mark_all_read(dir.path()).unwrap(), 2);
        assert!(list_unread(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn mark_one_read_is_idempotent_but_errors_on_unknown() {
        let dir = TempDir::new().unwrap();
        seed(dir.path(), "id1", Duration::zero(), false);
        mark_one_read(dir.path(), "id1").unwrap();
        mark_one_read(dir.path(), "id1").unwrap();
        assert!(matches!(
            mark_one_read(dir.path(), "nope"),
            Err(BoardError::NotificationNotFound(_))
        ));
    }

    #[test]
    fn cleanup_keeps_entries_inside_the_window() {
        let dir = TempDir::new().unwrap();
        // day 6.9 stays, day 7.1 goes
        seed(dir.path(), "fresh", Duration::hours(165), false);
        seed(dir.path(), "stale", Duration::hours(171), false);

        let removed = clean_older_than(dir.path(), 7).unwrap();
        assert_eq!(removed, 1);

        let remaining = list_all(dir.path()).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "fresh");
    }

    #[test]
    fn cleanup_on_empty_log_removes_nothing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(clean_older_than(dir.path(), 7).unwrap(), 0);
    }
}
