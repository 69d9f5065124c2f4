//! Sprint records: one JSON array in `sprints.json`.
//!
//! Every operation loads the full collection, mutates in memory, and
//! rewrites the file atomically under the collection lock. `id` and
//! `created_at` are immutable after creation; `ideas` keeps insertion order
//! and suppresses duplicates. Sprint membership is mirrored loosely by each
//! idea's own `sprint` field; the two sides are not transactionally linked.

use crate::error::{BoardError, Result};
use crate::{io, locks, paths};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SprintStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    #[default]
    Planned,
    Active,
    Completed,
}

impl SprintStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SprintStatus::Planned => "planned",
            SprintStatus::Active => "active",
            SprintStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SprintStatus {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "planned" => Ok(SprintStatus::Planned),
            "active" => Ok(SprintStatus::Active),
            "completed" => Ok(SprintStatus::Completed),
            _ => Err(BoardError::Validation(format!(
                "Invalid status. Must be: planned, active, or completed (got '{s}')"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Sprint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub ideas: Vec<String>,
    #[serde(default)]
    pub status: SprintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update request body. Dates and status arrive as raw strings so
/// validation can report every violated rule in one message instead of
/// failing at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SprintDraft {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub goals: Option<Vec<String>>,
    pub ideas: Option<Vec<String>>,
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

struct ValidatedDraft {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    status: Option<SprintStatus>,
}

fn parse_date(value: &str, errors: &mut Vec<String>) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.push(format!("Invalid date: {value}"));
            None
        }
    }
}

/// Validate a draft. On create `name` is required; update validates only the
/// fields that are present. Returns all violations at once.
fn validate(draft: &SprintDraft, is_update: bool) -> Result<ValidatedDraft> {
    let mut errors = Vec::new();

    if !is_update && draft.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        errors.push("Name is required".to_string());
    }

    let start_date = draft
        .start_date
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| parse_date(s, &mut errors));
    let end_date = draft
        .end_date
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| parse_date(s, &mut errors));

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            errors.push("End date must be after start date".to_string());
        }
    }

    let status = match draft.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match raw.parse::<SprintStatus>() {
            Ok(s) => Some(s),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        },
        None => None,
    };

    if !errors.is_empty() {
        return Err(BoardError::validation(errors));
    }
    Ok(ValidatedDraft {
        start_date,
        end_date,
        status,
    })
}

fn dedupe(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

fn generate_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("sprint-{}-{}", Utc::now().timestamp_millis(), suffix)
}

// ---------------------------------------------------------------------------
// Collection I/O
// ---------------------------------------------------------------------------

fn load_all(root: &Path) -> Vec<Sprint> {
    let path = paths::sprints_path(root);
    if !path.exists() {
        return Vec::new();
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(sprints) => sprints,
            Err(e) => {
                tracing::warn!(error = %e, "sprint collection unreadable, treating as empty");
                Vec::new()
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "sprint collection unreadable, treating as empty");
            Vec::new()
        }
    }
}

fn save_all(root: &Path, sprints: &[Sprint]) -> Result<()> {
    let content = serde_json::to_string_pretty(sprints)?;
    io::atomic_write(&paths::sprints_path(root), content.as_bytes())
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

pub fn list(root: &Path) -> Result<Vec<Sprint>> {
    Ok(load_all(root))
}

pub fn get(root: &Path, id: &str) -> Result<Sprint> {
    load_all(root)
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| BoardError::SprintNotFound(id.to_string()))
}

pub fn create(root: &Path, draft: SprintDraft) -> Result<Sprint> {
    let validated = validate(&draft, false)?;
    let _guard = locks::sprints();

    let now = Utc::now();
    let sprint = Sprint {
        id: generate_id(),
        name: draft.name.unwrap_or_default(),
        start_date: validated.start_date,
        end_date: validated.end_date,
        goals: draft.goals.unwrap_or_default(),
        ideas: dedupe(draft.ideas.unwrap_or_default()),
        status: validated.status.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    let mut sprints = load_all(root);
    sprints.push(sprint.clone());
    save_all(root, &sprints)?;
    Ok(sprint)
}

pub fn update(root: &Path, id: &str, draft: SprintDraft) -> Result<Sprint> {
    let validated = validate(&draft, true)?;
    let _guard = locks::sprints();

    let mut sprints = load_all(root);
    let sprint = sprints
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| BoardError::SprintNotFound(id.to_string()))?;

    if let Some(name) = draft.name {
        sprint.name = name;
    }
    if validated.start_date.is_some() {
        sprint.start_date = validated.start_date;
    }
    if validated.end_date.is_some() {
        sprint.end_date = validated.end_date;
    }
    if let Some(goals) = draft.goals {
        sprint.goals = goals;
    }
    if let Some(ideas) = draft.ideas {
        sprint.ideas = dedupe(ideas);
    }
    if let Some(status) = validated.status {
        sprint.status = status;
    }
    sprint.updated_at = Utc::now();

    let updated = sprint.clone();
    save_all(root, &sprints)?;
    Ok(updated)
}

pub fn delete(root: &Path, id: &str) -> Result<()> {
    let _guard = locks::sprints();

    let mut sprints = load_all(root);
    let before = sprints.len();
    sprints.retain(|s| s.id != id);
    if sprints.len() == before {
        return Err(BoardError::SprintNotFound(id.to_string()));
    }
    save_all(root, &sprints)
}

/// Add an idea id to the sprint's membership. Idempotent: a duplicate add is
/// a no-op and does not bump `updated_at`.
pub fn add_idea(root: &Path, sprint_id: &str, idea_id: &str) -> Result<Sprint> {
    let _guard = locks::sprints();

    let mut sprints = load_all(root);
    let sprint = sprints
        .iter_mut()
        .find(|s| s.id == sprint_id)
        .ok_or_else(|| BoardError::SprintNotFound(sprint_id.to_string()))?;

    if !sprint.ideas.iter().any(|id| id == idea_id) {
        sprint.ideas.push(idea_id.to_string());
        sprint.updated_at = Utc::now();
        let updated = sprint.clone();
        save_all(root, &sprints)?;
        return Ok(updated);
    }
    Ok(sprint.clone())
}

/// Remove an idea id from the sprint's membership. No-op if absent.
pub fn remove_idea(root: &Path, sprint_id: &str, idea_id: &str) -> Result<Sprint> {
    let _guard = locks::sprints();

    let mut sprints = load_all(root);
    let sprint = sprints
        .iter_mut()
        .find(|s| s.id == sprint_id)
        .ok_or_else(|| BoardError::SprintNotFound(sprint_id.to_string()))?;

    let before = sprint.ideas.len();
    sprint.ideas.retain(|id| id != idea_id);
    if sprint.ideas.len() < before {
        sprint.updated_at = Utc::now();
        let updated = sprint.clone();
        save_all(root, &sprints)?;
        return Ok(updated);
    }
    Ok(sprint.clone())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn draft(name: &str) -> SprintDraft {
        SprintDraft {
            name: Some(name.to_string()),
            start_date: Some("2026-02-10".to_string()),
            end_date: Some("2026-02-24".to_string()),
            goals: Some(vec!["Goal 1".to_string()]),
            ..SprintDraft::default()
        }
    }

    #[test]
    fn create_persists_and_defaults_to_planned() {
        let dir = TempDir::new().unwrap();
        let sprint = create(dir.path(), draft("Sprint 1")).unwrap();
        assert_eq!(sprint.status, SprintStatus::Planned);
        assert!(sprint.id.starts_with("sprint-"));

        let listed = list(dir.path()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], sprint);
    }

    #[test]
    fn create_requires_name() {
        let dir = TempDir::new().unwrap();
        let err = create(dir.path(), SprintDraft::default()).unwrap_err();
        assert!(err.to_string().contains("Name is required"));
    }

    #[test]
    fn create_rejects_end_before_start() {
        let dir = TempDir::new().unwrap();
        let err = create(
            dir.path(),
            SprintDraft {
                name: Some("Invalid".to_string()),
                start_date: Some("2026-02-24".to_string()),
                end_date: Some("2026-02-10".to_string()),
                ..SprintDraft::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("End date must be after start date"));
    }

    #[test]
    fn create_combines_all_violations() {
        let dir = TempDir::new().unwrap();
        let err = create(
            dir.path(),
            SprintDraft {
                status: Some("archived".to_string()),
                ..SprintDraft::default()
            },
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Name is required"));
        assert!(msg.contains("planned, active, or completed"));
    }

    #[test]
    fn update_validates_only_present_fields() {
        let dir = TempDir::new().unwrap();
        let sprint = create(dir.path(), draft("Sprint 2")).unwrap();
        // no name in the patch: fine on update
        let updated = update(
            dir.path(),
            &sprint.id,
            SprintDraft {
                status: Some("active".to_string()),
                ..SprintDraft::default()
            },
        )
        .unwrap();
        assert_eq!(updated.status, SprintStatus::Active);
        assert_eq!(updated.name, "Sprint 2");
        assert_eq!(updated.created_at, sprint.created_at);
        assert!(updated.updated_at >= sprint.updated_at);
    }

    #[test]
    fn update_missing_sprint_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            update(dir.path(), "nope", SprintDraft::default()),
            Err(BoardError::SprintNotFound(_))
        ));
    }

    #[test]
    fn delete_removes_and_errors_when_absent() {
        let dir = TempDir::new().unwrap();
        let sprint = create(dir.path(), draft("Sprint 3")).unwrap();
        delete(dir.path(), &sprint.id).unwrap();
        assert!(matches!(
            get(dir.path(), &sprint.id),
            Err(BoardError::SprintNotFound(_))
        ));
        assert!(delete(dir.path(), &sprint.id).is_err());
    }

    #[test]
    fn add_idea_is_idempotent_and_keeps_timestamp_on_duplicate() {
        let dir = TempDir::new().unwrap();
        let sprint = create(dir.path(), draft("Sprint 4")).unwrap();

        let first = add_idea(dir.path(), &sprint.id, "IDEA-001").unwrap();
        assert_eq!(first.ideas, vec!["IDEA-001"]);

        let second = add_idea(dir.path(), &sprint.id, "IDEA-001").unwrap();
        assert_eq!(second.ideas, vec!["IDEA-001"]);
        assert_eq!(
            second.updated_at, first.updated_at,
            "duplicate add must not bump updated_at"
        );
    }

    #[test]
    fn remove_idea_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let sprint = create(dir.path(), draft("Sprint 5")).unwrap();
        add_idea(dir.path(), &sprint.id, "IDEA-002").unwrap();

        let removed = remove_idea(dir.path(), &sprint.id, "IDEA-002").unwrap();
        assert!(removed.ideas.is_empty());

        // removing again is a quiet no-op
        let again = remove_idea(dir.path(), &sprint.id, "IDEA-002").unwrap();
        assert!(again.ideas.is_empty());
        assert_eq!(again.updated_at, removed.updated_at);
    }

    #[test]
    fn draft_ideas_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        let sprint = create(
            dir.path(),
            SprintDraft {
                name: Some("Dup".to_string()),
                ideas: Some(vec![
                    "IDEA-001".to_string(),
                    "IDEA-002".to_string(),
                    "IDEA-001".to_string(),
                ]),
                ..SprintDraft::default()
            },
        )
        .unwrap();
        assert_eq!(sprint.ideas, vec!["IDEA-001", "IDEA-002"]);
    }

    #[test]
    fn corrupt_collection_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(paths::sprints_path(dir.path()), "{not json").unwrap();
        assert!(list(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let dir = TempDir::new().unwrap();
        create(dir.path(), draft("Wire")).unwrap();
        let raw = std::fs::read_to_string(paths::sprints_path(dir.path())).unwrap();
        assert!(raw.contains("\"startDate\""));
        assert!(raw.contains("\"createdAt\""));
        assert!(!raw.contains("start_date"));
    }
}
