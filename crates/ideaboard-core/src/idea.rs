//! Idea records: one markdown file per idea under `ideas/`.
//!
//! Files written by hand or by older tooling may carry YAML frontmatter,
//! bold-label metadata lines, or both. Frontmatter wins when present;
//! otherwise values are recovered from the labeled lines. Serialization
//! always produces the labeled-line form and round-trips through the parser
//! for every recognized field. Fields outside the recognized set are pruned
//! on rewrite; the schema is the fixed field set below.

use crate::error::{BoardError, Result};
use crate::{io, locks, paths};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_STATUS: &str = "📝 待審核";

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Lenient parse: unknown labels collapse to Medium, the historical default.
    pub fn parse_lenient(s: &str) -> Priority {
        match s.trim() {
            "Low" => Priority::Low,
            "High" => Priority::High,
            _ => Priority::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Idea
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub id: String,
    pub name: String,
    /// Raw stored status; may be a canonical id or a legacy label.
    /// Normalize through `status::normalize` before bucketing.
    pub status: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint: Option<String>,
    #[serde(default)]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub description: String,
}

/// Fields accepted on create (POST body). A missing id triggers auto-assignment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdeaDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
    pub sprint: Option<String>,
    pub progress: Option<u8>,
    pub github: Option<String>,
    pub created: Option<String>,
    pub description: Option<String>,
}

/// Fields accepted on update. Absent fields keep their current value;
/// an empty string clears an optional field. Unknown JSON keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdeaPatch {
    pub name: Option<String>,
    pub status: Option<String>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
    pub sprint: Option<String>,
    pub progress: Option<u8>,
    pub github: Option<String>,
    pub created: Option<String>,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Frontmatter block of a legacy idea file. Older files used `title` for the
/// name and the Chinese label for the creation date.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Frontmatter {
    id: Option<String>,
    name: Option<String>,
    title: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    assignee: Option<String>,
    sprint: Option<String>,
    progress: Option<u8>,
    github: Option<String>,
    created: Option<String>,
    #[serde(rename = "建立日期")]
    created_zh: Option<String>,
}

struct BodyPatterns {
    id: Regex,
    created: Regex,
    status: Regex,
    priority: Regex,
    assignee: Regex,
    progress: Regex,
    github: Regex,
    sprint: Regex,
    heading: Regex,
}

fn patterns() -> &'static BodyPatterns {
    static PATTERNS: OnceLock<BodyPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| BodyPatterns {
        id: Regex::new(r"\*\*ID\*\*[：:]\s*(.+)").expect("static regex"),
        created: Regex::new(r"\*\*建立日期\*\*[：:]\s*(.+)").expect("static regex"),
        status: Regex::new(r"\*\*狀態\*\*[：:]\s*(.+)").expect("static regex"),
        priority: Regex::new(r"\*\*優先級\*\*[：:]\s*(.+)").expect("static regex"),
        assignee: Regex::new(r"\*\*負責\s*Agent\*\*[：:]\s*(.+)").expect("static regex"),
        progress: Regex::new(r"\*\*進度\*\*[：:]\s*(\d+)").expect("static regex"),
        github: Regex::new(r"\*\*GitHub\*\*[：:]\s*(.+)").expect("static regex"),
        sprint: Regex::new(r"\*\*Sprint\*\*[：:]\s*(.+)").expect("static regex"),
        heading: Regex::new(r"(?m)^#\s+(.+)$").expect("static regex"),
    })
}

/// Split optional `---` delimited YAML frontmatter from the body.
fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content.strip_prefix("---\n") else {
        return (None, content);
    };
    match rest.find("\n---") {
        Some(end) => {
            let fm = &rest[..end];
            let body = rest[end + 4..].trim_start_matches('\n');
            (Some(fm), body)
        }
        None => (None, content),
    }
}

fn capture(re: &Regex, body: &str) -> Option<String> {
    re.captures(body)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Description: everything under `## 描述` until the next section heading.
fn extract_description(body: &str) -> String {
    let mut collected: Vec<&str> = Vec::new();
    let mut in_section = false;
    for line in body.lines() {
        if in_section {
            if line.starts_with("##") {
                break;
            }
            collected.push(line);
        } else if line.trim_end() == "## 描述" {
            in_section = true;
        }
    }
    collected.join("\n").trim().to_string()
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse one idea file. `file_stem` supplies the fallback id.
/// Frontmatter values win over labeled body lines; body lines win over
/// defaults. Never panics; malformed frontmatter is a parse error the
/// caller logs and skips.
pub fn parse(content: &str, file_stem: &str) -> Result<Idea> {
    let (fm_text, body) = split_frontmatter(content);
    let fm: Frontmatter = match fm_text {
        Some(text) => serde_yaml::from_str(text)?,
        None => Frontmatter::default(),
    };

    let p = patterns();

    let id = fm
        .id
        .or_else(|| capture(&p.id, body))
        .unwrap_or_else(|| file_stem.to_string());
    let name = fm
        .name
        .or(fm.title)
        .or_else(|| p.heading.captures(body).map(|c| c[1].trim().to_string()))
        .unwrap_or_default();
    let status = fm
        .status
        .or_else(|| capture(&p.status, body))
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());
    let priority = fm
        .priority
        .or_else(|| capture(&p.priority, body))
        .map(|s| Priority::parse_lenient(&s))
        .unwrap_or_default();
    let assignee = none_if_empty(fm.assignee.or_else(|| capture(&p.assignee, body)));
    let sprint = none_if_empty(fm.sprint.or_else(|| capture(&p.sprint, body)));
    let progress = fm
        .progress
        .or_else(|| capture(&p.progress, body).and_then(|s| s.parse().ok()))
        .unwrap_or(0)
        .min(100);
    let github = none_if_empty(fm.github.or_else(|| capture(&p.github, body)));
    let created = fm
        .created
        .or(fm.created_zh)
        .or_else(|| capture(&p.created, body))
        .unwrap_or_default();
    let description = extract_description(body);

    Ok(Idea {
        id,
        name,
        status,
        priority,
        assignee,
        sprint,
        progress,
        github,
        created,
        description,
    })
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

impl Idea {
    /// Render the canonical file form. Optional fields that are empty are
    /// omitted entirely and parse back as empty.
    pub fn to_markdown(&self) -> String {
        let name = if self.name.is_empty() {
            "Untitled"
        } else {
            &self.name
        };
        let mut out = format!("# {name}\n\n## 基本資訊\n");
        out.push_str(&format!("- **ID**: {}\n", self.id));
        out.push_str(&format!("- **建立日期**: {}\n", self.created));
        out.push_str(&format!("- **狀態**: {}\n", self.status));
        out.push_str(&format!("- **優先級**: {}\n", self.priority));
        if let Some(assignee) = &self.assignee {
            out.push_str(&format!("- **負責 Agent**: {assignee}\n"));
        }
        if self.progress > 0 {
            out.push_str(&format!("- **進度**: {}%\n", self.progress));
        }
        if let Some(github) = &self.github {
            out.push_str(&format!("- **GitHub**: {github}\n"));
        }
        if let Some(sprint) = &self.sprint {
            out.push_str(&format!("- **Sprint**: {sprint}\n"));
        }
        out.push_str("\n## 描述\n");
        out.push_str(&self.description);
        out.push('\n');
        out
    }
}

// ---------------------------------------------------------------------------
// Store operations
// ---------------------------------------------------------------------------

struct StoredIdea {
    path: PathBuf,
    stem: String,
    idea: Idea,
}

fn entries(root: &Path) -> Result<Vec<StoredIdea>> {
    let dir = paths::ideas_dir(root);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut stored = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed = std::fs::read_to_string(&path)
            .map_err(BoardError::from)
            .and_then(|content| parse(&content, &stem));
        match parsed {
            Ok(idea) => stored.push(StoredIdea { path, stem, idea }),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "skipping unreadable idea file");
            }
        }
    }
    stored.sort_by(|a, b| a.idea.id.cmp(&b.idea.id));
    Ok(stored)
}

fn find_entry(root: &Path, id: &str) -> Result<Option<StoredIdea>> {
    let mut stored = entries(root)?;
    if let Some(pos) = stored.iter().position(|s| s.idea.id == id) {
        return Ok(Some(stored.swap_remove(pos)));
    }
    if let Some(pos) = stored.iter().position(|s| s.stem == id) {
        return Ok(Some(stored.swap_remove(pos)));
    }
    Ok(None)
}

/// List every parseable idea, sorted by id. Unreadable files are skipped.
pub fn list_all(root: &Path) -> Result<Vec<Idea>> {
    Ok(entries(root)?.into_iter().map(|s| s.idea).collect())
}

/// Fetch by declared id, falling back to the file stem.
pub fn get(root: &Path, id: &str) -> Result<Idea> {
    find_entry(root, id)?
        .map(|s| s.idea)
        .ok_or_else(|| BoardError::IdeaNotFound(id.to_string()))
}

/// Next free auto id: IDEA-### with the max existing numeric suffix + 1.
/// Gaps are never reused.
fn next_id(stored: &[StoredIdea]) -> String {
    static IDEA_NUM: OnceLock<Regex> = OnceLock::new();
    let re = IDEA_NUM.get_or_init(|| Regex::new(r"IDEA-(\d+)").expect("static regex"));
    let max = stored
        .iter()
        .filter_map(|s| re.captures(&s.idea.id))
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("IDEA-{:03}", max + 1)
}

pub fn create(root: &Path, draft: IdeaDraft) -> Result<Idea> {
    let _store = locks::ideas_store();

    let id = match none_if_empty(draft.id) {
        Some(id) => id,
        None => next_id(&entries(root)?),
    };
    let created = match none_if_empty(draft.created) {
        Some(c) => c,
        None => Utc::now().format("%Y-%m-%d").to_string(),
    };
    let idea = Idea {
        id: id.clone(),
        name: draft.name.unwrap_or_default(),
        status: draft
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        priority: draft.priority.unwrap_or_default(),
        assignee: none_if_empty(draft.assignee),
        sprint: none_if_empty(draft.sprint),
        progress: draft.progress.unwrap_or(0).min(100),
        github: none_if_empty(draft.github),
        created,
        description: draft.description.unwrap_or_default(),
    };

    io::atomic_write(&paths::idea_file(root, &id), idea.to_markdown().as_bytes())?;
    Ok(idea)
}

/// Shallow-merge `patch` over the stored record and rewrite it in full.
pub fn update(root: &Path, id: &str, patch: IdeaPatch) -> Result<Idea> {
    let lock = locks::idea(id);
    let _guard = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

    let stored =
        find_entry(root, id)?.ok_or_else(|| BoardError::IdeaNotFound(id.to_string()))?;
    let mut idea = stored.idea;

    if let Some(name) = patch.name {
        idea.name = name;
    }
    if let Some(status) = patch.status {
        idea.status = status;
    }
    if let Some(priority) = patch.priority {
        idea.priority = priority;
    }
    if let Some(assignee) = patch.assignee {
        idea.assignee = none_if_empty(Some(assignee));
    }
    if let Some(sprint) = patch.sprint {
        idea.sprint = none_if_empty(Some(sprint));
    }
    if let Some(progress) = patch.progress {
        idea.progress = progress.min(100);
    }
    if let Some(github) = patch.github {
        idea.github = none_if_empty(Some(github));
    }
    if let Some(created) = patch.created {
        idea.created = created;
    }
    if let Some(description) = patch.description {
        idea.description = description;
    }

    io::atomic_write(&stored.path, idea.to_markdown().as_bytes())?;
    Ok(idea)
}

pub fn update_status(root: &Path, id: &str, status: impl Into<String>) -> Result<Idea> {
    update(
        root,
        id,
        IdeaPatch {
            status: Some(status.into()),
            ..IdeaPatch::default()
        },
    )
}

/// Remove the backing file. Returns whether a record existed.
pub fn delete(root: &Path, id: &str) -> Result<bool> {
    let lock = locks::idea(id);
    let _guard = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

    match find_entry(root, id)? {
        Some(stored) => {
            std::fs::remove_file(&stored.path)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
