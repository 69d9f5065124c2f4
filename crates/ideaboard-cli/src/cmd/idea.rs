use crate::output::{print_json, print_table};
use clap::Subcommand;
use ideaboard_core::idea::{self, IdeaDraft, Priority};
use ideaboard_core::status;
use std::path::Path;

#[derive(Subcommand)]
pub enum IdeaSubcommand {
    /// List all ideas
    List,
    /// Create a new idea (assigns the next IDEA-### id)
    Create {
        name: String,
        /// Priority: Low, Medium, High
        #[arg(long)]
        priority: Option<String>,
        /// Free-text description
        #[arg(long)]
        description: Option<String>,
        /// Initial status (canonical id or legacy label)
        #[arg(long)]
        status: Option<String>,
        /// Assignee name or agent identifier
        #[arg(long)]
        assignee: Option<String>,
        /// Related GitHub URL
        #[arg(long)]
        github: Option<String>,
    },
    /// Move an idea to a new status
    Status { id: String, status: String },
    /// Delete an idea
    Delete { id: String },
}

pub fn run(root: &Path, subcmd: IdeaSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        IdeaSubcommand::List => list(root, json),
        IdeaSubcommand::Create {
            name,
            priority,
            description,
            status,
            assignee,
            github,
        } => create(root, name, priority, description, status, assignee, github, json),
        IdeaSubcommand::Status { id, status } => set_status(root, &id, &status, json),
        IdeaSubcommand::Delete { id } => delete(root, &id, json),
    }
}

pub fn parse_priority(s: &str) -> anyhow::Result<Priority> {
    match s {
        "Low" => Ok(Priority::Low),
        "Medium" => Ok(Priority::Medium),
        "High" => Ok(Priority::High),
        other => anyhow::bail!("unknown priority '{}' — valid values: Low, Medium, High", other),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let ideas = idea::list_all(root)?;

    if json {
        return print_json(&ideas);
    }

    if ideas.is_empty() {
        println!("No ideas yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = ideas
        .iter()
        .map(|i| {
            vec![
                i.id.clone(),
                i.name.clone(),
                status::normalize(&i.status).to_string(),
                i.priority.to_string(),
                i.assignee.clone().unwrap_or_default(),
                format!("{}%", i.progress),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "COLUMN", "PRIORITY", "ASSIGNEE", "PROGRESS"], rows);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn create(
    root: &Path,
    name: String,
    priority: Option<String>,
    description: Option<String>,
    status: Option<String>,
    assignee: Option<String>,
    github: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let priority = priority.as_deref().map(parse_priority).transpose()?;
    let created = idea::create(
        root,
        IdeaDraft {
            name: Some(name),
            priority,
            description,
            status,
            assignee,
            github,
            ..IdeaDraft::default()
        },
    )?;

    if json {
        print_json(&created)?;
    } else {
        println!("Created {}: {}", created.id, created.name);
    }
    Ok(())
}

fn set_status(root: &Path, id: &str, status: &str, json: bool) -> anyhow::Result<()> {
    let updated = idea::update_status(root, id, status)?;

    if json {
        print_json(&updated)?;
    } else {
        println!(
            "{} → {} ({})",
            updated.id,
            updated.status,
            status::normalize(&updated.status)
        );
    }
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let existed = idea::delete(root, id)?;
    if !existed {
        anyhow::bail!("idea '{}' not found", id);
    }

    if json {
        print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
    } else {
        println!("Deleted {id}");
    }
    Ok(())
}
