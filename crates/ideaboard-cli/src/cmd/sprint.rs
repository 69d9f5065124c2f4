use crate::output::{print_json, print_table};
use clap::Subcommand;
use ideaboard_core::sprint::{self, SprintDraft};
use ideaboard_core::{board, idea};
use std::path::Path;

#[derive(Subcommand)]
pub enum SprintSubcommand {
    /// List all sprints with completion progress
    List,
    /// Create a new sprint
    Create {
        name: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Sprint goal (repeatable)
        #[arg(long)]
        goal: Vec<String>,
    },
    /// Add an idea to a sprint's membership
    AddIdea { sprint_id: String, idea_id: String },
    /// Remove an idea from a sprint's membership
    RemoveIdea { sprint_id: String, idea_id: String },
    /// Delete a sprint
    Delete { id: String },
}

pub fn run(root: &Path, subcmd: SprintSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        SprintSubcommand::List => list(root, json),
        SprintSubcommand::Create {
            name,
            start,
            end,
            goal,
        } => create(root, name, start, end, goal, json),
        SprintSubcommand::AddIdea { sprint_id, idea_id } => {
            let updated = sprint::add_idea(root, &sprint_id, &idea_id)?;
            if json {
                print_json(&updated)?;
            } else {
                println!("{} now has {} idea(s)", updated.id, updated.ideas.len());
            }
            Ok(())
        }
        SprintSubcommand::RemoveIdea { sprint_id, idea_id } => {
            let updated = sprint::remove_idea(root, &sprint_id, &idea_id)?;
            if json {
                print_json(&updated)?;
            } else {
                println!("{} now has {} idea(s)", updated.id, updated.ideas.len());
            }
            Ok(())
        }
        SprintSubcommand::Delete { id } => {
            sprint::delete(root, &id)?;
            if json {
                print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
            } else {
                println!("Deleted {id}");
            }
            Ok(())
        }
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let sprints = sprint::list(root)?;
    let ideas = idea::list_all(root)?;

    if json {
        let rows: Vec<serde_json::Value> = sprints
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": s.id,
                    "name": s.name,
                    "status": s.status,
                    "startDate": s.start_date,
                    "endDate": s.end_date,
                    "ideas": s.ideas,
                    "progress": board::sprint_progress(s, &ideas),
                })
            })
            .collect();
        return print_json(&rows);
    }

    if sprints.is_empty() {
        println!("No sprints yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = sprints
        .iter()
        .map(|s| {
            vec![
                s.id.clone(),
                s.name.clone(),
                s.status.to_string(),
                s.start_date.map(|d| d.to_string()).unwrap_or_default(),
                s.end_date.map(|d| d.to_string()).unwrap_or_default(),
                s.ideas.len().to_string(),
                format!("{}%", board::sprint_progress(s, &ideas)),
            ]
        })
        .collect();
    print_table(
        &["ID", "NAME", "STATUS", "START", "END", "IDEAS", "PROGRESS"],
        rows,
    );
    Ok(())
}

fn create(
    root: &Path,
    name: String,
    start: Option<String>,
    end: Option<String>,
    goals: Vec<String>,
    json: bool,
) -> anyhow::Result<()> {
    let created = sprint::create(
        root,
        SprintDraft {
            name: Some(name),
            start_date: start,
            end_date: end,
            goals: Some(goals),
            ..SprintDraft::default()
        },
    )?;

    if json {
        print_json(&created)?;
    } else {
        println!("Created {}: {}", created.id, created.name);
    }
    Ok(())
}
