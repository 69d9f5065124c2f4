//! Board projection: the filtered, bucketed, counted view of ideas per
//! column. Pure functions over an idea/sprint snapshot with no I/O, so the
//! rendering layer and the tests consume the same code path.

use crate::idea::{Idea, Priority};
use crate::sprint::Sprint;
use crate::status::{self, ColumnId, COLUMNS};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SprintFilter {
    /// All ideas regardless of sprint assignment.
    #[default]
    All,
    /// Only ideas with no sprint assigned.
    Backlog,
    /// Only ideas assigned to this sprint id.
    Id(String),
}

#[derive(Debug, Clone, Default)]
pub struct BoardFilters {
    pub search: String,
    pub priority: Option<Priority>,
    pub sprint: SprintFilter,
}

fn matches(idea: &Idea, filters: &BoardFilters) -> bool {
    let term = filters.search.to_lowercase();
    let match_search = term.is_empty()
        || idea.name.to_lowercase().contains(&term)
        || idea.id.to_lowercase().contains(&term)
        || idea.description.to_lowercase().contains(&term);

    let match_priority = filters.priority.map_or(true, |p| p == idea.priority);

    let match_sprint = match &filters.sprint {
        SprintFilter::All => true,
        SprintFilter::Backlog => idea.sprint.is_none(),
        SprintFilter::Id(id) => idea.sprint.as_deref() == Some(id.as_str()),
    };

    match_search && match_priority && match_sprint
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BoardColumn {
    pub id: ColumnId,
    pub title: &'static str,
    pub color: &'static str,
    pub cards: Vec<Idea>,
}

#[derive(Debug, Clone)]
pub struct BoardView {
    pub columns: Vec<BoardColumn>,
}

impl BoardView {
    pub fn count(&self, id: ColumnId) -> usize {
        self.columns
            .iter()
            .find(|c| c.id == id)
            .map_or(0, |c| c.cards.len())
    }
}

/// Bucket surviving ideas into columns in registry order. Every idea lands
/// in exactly one column via the status normalizer.
pub fn project(ideas: &[Idea], filters: &BoardFilters) -> BoardView {
    let mut columns: Vec<BoardColumn> = COLUMNS
        .iter()
        .map(|c| BoardColumn {
            id: c.id,
            title: c.title,
            color: c.color,
            cards: Vec::new(),
        })
        .collect();

    for idea in ideas.iter().filter(|i| matches(i, filters)) {
        let bucket = status::normalize(&idea.status);
        if let Some(col) = columns.iter_mut().find(|c| c.id == bucket) {
            col.cards.push(idea.clone());
        }
    }

    BoardView { columns }
}

/// Per-column cardinality after filtering and bucketing, computed without
/// materializing card lists.
pub fn column_counts(ideas: &[Idea], filters: &BoardFilters) -> HashMap<ColumnId, usize> {
    let mut counts: HashMap<ColumnId, usize> =
        ColumnId::all().iter().map(|id| (*id, 0)).collect();
    for idea in ideas.iter().filter(|i| matches(i, filters)) {
        *counts.entry(status::normalize(&idea.status)).or_insert(0) += 1;
    }
    counts
}

/// Sprint completion: done ideas over assigned ideas, rounded to the nearest
/// integer percent. Zero when nothing is assigned.
pub fn sprint_progress(sprint: &Sprint, ideas: &[Idea]) -> u8 {
    let assigned: Vec<&Idea> = ideas
        .iter()
        .filter(|i| sprint.ideas.iter().any(|id| *id == i.id))
        .collect();
    if assigned.is_empty() {
        return 0;
    }
    let done = assigned
        .iter()
        .filter(|i| status::normalize(&i.status) == ColumnId::Done)
        .count();
    ((done as f64 / assigned.len() as f64) * 100.0).round() as u8
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprint::SprintStatus;
    use chrono::Utc;

    fn idea(id: &str, name: &str, raw_status: &str) -> Idea {
        Idea {
            id: id.to_string(),
            name: name.to_string(),
            status: raw_status.to_string(),
            priority: Priority::Medium,
            assignee: None,
            sprint: None,
            progress: 0,
            github: None,
            created: "2026-08-01".to_string(),
            description: String::new(),
        }
    }

    fn sprint_with(ideas: &[&str]) -> Sprint {
        let now = Utc::now();
        Sprint {
            id: "sprint-1".to_string(),
            name: "S".to_string(),
            start_date: None,
            end_date: None,
            goals: Vec::new(),
            ideas: ideas.iter().map(|s| s.to_string()).collect(),
            status: SprintStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn legacy_and_canonical_statuses_share_a_bucket() {
        let ideas = vec![
            idea("IDEA-001", "a", "📝 待審核"),
            idea("IDEA-002", "b", "pending"),
            idea("IDEA-003", "c", "done"),
        ];
        let counts = column_counts(&ideas, &BoardFilters::default());
        assert_eq!(counts[&ColumnId::Pending], 2);
        assert_eq!(counts[&ColumnId::Done], 1);
        assert_eq!(counts[&ColumnId::Backlog], 0);
        assert_eq!(counts[&ColumnId::Approved], 0);
        assert_eq!(counts[&ColumnId::InProgress], 0);
        assert_eq!(counts[&ColumnId::Testing], 0);
    }

    #[test]
    fn projection_counts_match_card_lists() {
        let ideas = vec![
            idea("IDEA-001", "a", "進行中"),
            idea("IDEA-002", "b", "in-progress"),
            idea("IDEA-003", "c", "奇怪狀態"),
        ];
        let view = project(&ideas, &BoardFilters::default());
        let counts = column_counts(&ideas, &BoardFilters::default());
        for col in &view.columns {
            assert_eq!(col.cards.len(), counts[&col.id]);
        }
        assert_eq!(view.count(ColumnId::InProgress), 2);
        assert_eq!(view.count(ColumnId::Backlog), 1);
    }

    #[test]
    fn search_matches_name_id_and_description() {
        let mut with_desc = idea("IDEA-003", "無關", "pending");
        with_desc.description = "支援 Webhook 整合".to_string();
        let ideas = vec![
            idea("IDEA-001", "Webhook 支援", "pending"),
            idea("IDEA-002", "別的", "pending"),
            with_desc,
        ];

        let filters = BoardFilters {
            search: "webhook".to_string(),
            ..BoardFilters::default()
        };
        let counts = column_counts(&ideas, &filters);
        assert_eq!(counts[&ColumnId::Pending], 2);

        let by_id = BoardFilters {
            search: "idea-002".to_string(),
            ..BoardFilters::default()
        };
        assert_eq!(column_counts(&ideas, &by_id)[&ColumnId::Pending], 1);
    }

    #[test]
    fn priority_filter_is_exact_match() {
        let mut high = idea("IDEA-001", "a", "pending");
        high.priority = Priority::High;
        let ideas = vec![high, idea("IDEA-002", "b", "pending")];

        let filters = BoardFilters {
            priority: Some(Priority::High),
            ..BoardFilters::default()
        };
        assert_eq!(column_counts(&ideas, &filters)[&ColumnId::Pending], 1);
    }

    #[test]
    fn sprint_filter_modes() {
        let mut assigned = idea("IDEA-001", "a", "pending");
        assigned.sprint = Some("sprint-1".to_string());
        let mut other = idea("IDEA-002", "b", "pending");
        other.sprint = Some("sprint-2".to_string());
        let unassigned = idea("IDEA-003", "c", "pending");
        let ideas = vec![assigned, other, unassigned];

        let all = BoardFilters::default();
        assert_eq!(column_counts(&ideas, &all)[&ColumnId::Pending], 3);

        let backlog = BoardFilters {
            sprint: SprintFilter::Backlog,
            ..BoardFilters::default()
        };
        assert_eq!(column_counts(&ideas, &backlog)[&ColumnId::Pending], 1);

        let specific = BoardFilters {
            sprint: SprintFilter::Id("sprint-1".to_string()),
            ..BoardFilters::default()
        };
        assert_eq!(column_counts(&ideas, &specific)[&ColumnId::Pending], 1);
    }

    #[test]
    fn empty_filters_match_everything() {
        let ideas = vec![idea("IDEA-001", "a", "done")];
        let view = project(&ideas, &BoardFilters::default());
        assert_eq!(view.count(ColumnId::Done), 1);
    }

    #[test]
    fn sprint_progress_rounds_to_nearest_percent() {
        let ideas = vec![
            idea("IDEA-001", "a", "done"),
            idea("IDEA-002", "b", "✅ 已完成"),
            idea("IDEA-003", "c", "pending"),
        ];
        let sprint = sprint_with(&["IDEA-001", "IDEA-002", "IDEA-003"]);
        // 2/3 -> 66.67 -> 67
        assert_eq!(sprint_progress(&sprint, &ideas), 67);
    }

    #[test]
    fn sprint_progress_without_ideas_is_zero() {
        let ideas = vec![idea("IDEA-001", "a", "done")];
        let sprint = sprint_with(&[]);
        assert_eq!(sprint_progress(&sprint, &ideas), 0);
    }

    #[test]
    fn sprint_progress_ignores_unassigned_ideas() {
        let ideas = vec![
            idea("IDEA-001", "a", "done"),
            idea("IDEA-002", "b", "pending"),
        ];
        let sprint = sprint_with(&["IDEA-002"]);
        assert_eq!(sprint_progress(&sprint, &ideas), 0);
    }
}
