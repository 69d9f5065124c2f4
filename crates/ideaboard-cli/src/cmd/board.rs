use crate::output::{print_json, print_table};
use ideaboard_core::board::{self, BoardFilters, SprintFilter};
use ideaboard_core::idea;
use std::path::Path;

pub fn run(
    root: &Path,
    search: Option<&str>,
    priority: Option<&str>,
    sprint: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let priority = priority
        .map(crate::cmd::idea::parse_priority)
        .transpose()?;
    let filters = BoardFilters {
        search: search.unwrap_or_default().to_string(),
        priority,
        sprint: match sprint {
            None => SprintFilter::All,
            Some("backlog") => SprintFilter::Backlog,
            Some(id) => SprintFilter::Id(id.to_string()),
        },
    };

    let ideas = idea::list_all(root)?;
    let view = board::project(&ideas, &filters);

    if json {
        let columns: Vec<serde_json::Value> = view
            .columns
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "title": c.title,
                    "count": c.cards.len(),
                    "cards": c.cards.iter().map(|i| i.id.clone()).collect::<Vec<_>>(),
                })
            })
            .collect();
        return print_json(&columns);
    }

    let rows: Vec<Vec<String>> = view
        .columns
        .iter()
        .map(|c| {
            let cards: Vec<&str> = c.cards.iter().map(|i| i.id.as_str()).collect();
            vec![
                c.title.to_string(),
                c.cards.len().to_string(),
                cards.join(", "),
            ]
        })
        .collect();
    print_table(&["COLUMN", "COUNT", "IDEAS"], rows);
    Ok(())
}
