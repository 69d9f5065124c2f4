//! Kanban column registry and status normalization.
//!
//! Statuses accumulated several textual representations across schema
//! versions: canonical ids, emoji-prefixed display titles, and free-text
//! labels. `normalize` reconciles all of them onto the fixed column set so
//! old idea files keep rendering without a migration step.

use crate::error::BoardError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ColumnId
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnId {
    Backlog,
    Pending,
    Approved,
    InProgress,
    Testing,
    Done,
}

impl ColumnId {
    pub fn all() -> &'static [ColumnId] {
        &[
            ColumnId::Backlog,
            ColumnId::Pending,
            ColumnId::Approved,
            ColumnId::InProgress,
            ColumnId::Testing,
            ColumnId::Done,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnId::Backlog => "backlog",
            ColumnId::Pending => "pending",
            ColumnId::Approved => "approved",
            ColumnId::InProgress => "in-progress",
            ColumnId::Testing => "testing",
            ColumnId::Done => "done",
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ColumnId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(ColumnId::Backlog),
            "pending" => Ok(ColumnId::Pending),
            "approved" => Ok(ColumnId::Approved),
            "in-progress" => Ok(ColumnId::InProgress),
            "testing" => Ok(ColumnId::Testing),
            "done" => Ok(ColumnId::Done),
            _ => Err(BoardError::UnknownStatusId(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Column registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: &'static str,
    pub color: &'static str,
    pub order: u8,
}

pub const COLUMNS: [Column; 6] = [
    Column {
        id: ColumnId::Backlog,
        title: "📋 Backlog",
        color: "#6b7280",
        order: 0,
    },
    Column {
        id: ColumnId::Pending,
        title: "📝 待審核",
        color: "#eab308",
        order: 1,
    },
    Column {
        id: ColumnId::Approved,
        title: "✅ 已批准",
        color: "#22c55e",
        order: 2,
    },
    Column {
        id: ColumnId::InProgress,
        title: "🚧 開發中",
        color: "#3b82f6",
        order: 3,
    },
    Column {
        id: ColumnId::Testing,
        title: "🧪 測試中",
        color: "#a855f7",
        order: 4,
    },
    Column {
        id: ColumnId::Done,
        title: "✅ 已完成",
        color: "#10b981",
        order: 5,
    },
];

/// Legacy display labels from older schema versions, mapped to canonical ids.
/// Order matters only for readability; lookups are exact-match.
const LEGACY_ALIASES: [(&str, ColumnId); 6] = [
    ("📝 待審核", ColumnId::Pending),
    ("✅ 已批准", ColumnId::Approved),
    ("🚧 開發中", ColumnId::InProgress),
    ("✅ 已完成", ColumnId::Done),
    ("📋 Backlog", ColumnId::Backlog),
    ("🧪 測試中", ColumnId::Testing),
];

pub fn column(id: ColumnId) -> &'static Column {
    COLUMNS
        .iter()
        .find(|c| c.id == id)
        .expect("every ColumnId has a registry entry")
}

pub fn column_by_title(title: &str) -> Option<&'static Column> {
    COLUMNS.iter().find(|c| c.title == title)
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Map an arbitrary stored status string onto a canonical column id.
///
/// Resolution order: canonical id, exact legacy alias, keyword fragment,
/// then the backlog fallback. Total and idempotent: canonical ids pass
/// through rule 1 unchanged.
pub fn normalize(raw: &str) -> ColumnId {
    if let Ok(id) = raw.parse::<ColumnId>() {
        return id;
    }
    if let Some((_, id)) = LEGACY_ALIASES.iter().find(|(alias, _)| *alias == raw) {
        return *id;
    }
    // Keyword fragments seen in hand-edited files. Checked in order:
    // approved-but-not-done must lose to done when both fragments appear.
    if raw.contains("待審核") {
        return ColumnId::Pending;
    }
    if raw.contains("已批准") && !raw.contains("完成") {
        return ColumnId::Approved;
    }
    if raw.contains("開發中") || raw.contains("進行中") {
        return ColumnId::InProgress;
    }
    if raw.contains("測試") {
        return ColumnId::Testing;
    }
    if raw.contains("完成") {
        return ColumnId::Done;
    }
    if raw.to_ascii_lowercase().contains("backlog") {
        return ColumnId::Backlog;
    }
    ColumnId::Backlog
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_ids_are_fixed_points() {
        for id in ColumnId::all() {
            assert_eq!(normalize(id.as_str()), *id);
        }
    }

    #[test]
    fn legacy_aliases_map_to_ids() {
        assert_eq!(normalize("📝 待審核"), ColumnId::Pending);
        assert_eq!(normalize("✅ 已批准"), ColumnId::Approved);
        assert_eq!(normalize("🚧 開發中"), ColumnId::InProgress);
        assert_eq!(normalize("✅ 已完成"), ColumnId::Done);
        assert_eq!(normalize("📋 Backlog"), ColumnId::Backlog);
        assert_eq!(normalize("🧪 測試中"), ColumnId::Testing);
    }

    #[test]
    fn keyword_fragments() {
        assert_eq!(normalize("等待審核中"), ColumnId::Pending);
        assert_eq!(normalize("已批准，尚未開始"), ColumnId::Approved);
        // approved-and-finished reads as done, not approved
        assert_eq!(normalize("已批准並完成"), ColumnId::Done);
        assert_eq!(normalize("進行中 (50%)"), ColumnId::InProgress);
        assert_eq!(normalize("測試階段"), ColumnId::Testing);
        assert_eq!(normalize("全部完成"), ColumnId::Done);
        assert_eq!(normalize("Backlog item"), ColumnId::Backlog);
    }

    #[test]
    fn unknown_strings_fall_back_to_backlog() {
        for s in ["", "???", "todo", "emergency", "🔥"] {
            assert_eq!(normalize(s), ColumnId::Backlog, "input: {s}");
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        for s in ["📝 待審核", "done", "進行中", "garbage", "已批准並完成"] {
            let once = normalize(s);
            assert_eq!(normalize(once.as_str()), once);
        }
    }

    #[test]
    fn registry_is_ordered_and_complete() {
        assert_eq!(COLUMNS.len(), ColumnId::all().len());
        for (i, col) in COLUMNS.iter().enumerate() {
            assert_eq!(col.order as usize, i);
        }
        assert_eq!(column(ColumnId::Pending).title, "📝 待審核");
        assert_eq!(column_by_title("🧪 測試中").map(|c| c.id), Some(ColumnId::Testing));
        assert!(column_by_title("nope").is_none());
    }
}
