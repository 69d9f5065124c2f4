use crate::output::{print_json, print_table};
use clap::Subcommand;
use ideaboard_core::notification;
use std::path::Path;

#[derive(Subcommand)]
pub enum NotifySubcommand {
    /// List notification log entries
    List {
        /// Show only unread entries
        #[arg(long)]
        unread: bool,
    },
    /// Prune entries older than the given number of days
    Cleanup {
        #[arg(long, default_value = "7")]
        days: i64,
    },
}

pub fn run(root: &Path, subcmd: NotifySubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        NotifySubcommand::List { unread } => list(root, unread, json),
        NotifySubcommand::Cleanup { days } => cleanup(root, days, json),
    }
}

fn list(root: &Path, unread: bool, json: bool) -> anyhow::Result<()> {
    let notifications = if unread {
        notification::list_unread(root)?
    } else {
        notification::list_all(root)?
    };

    if json {
        return print_json(&notifications);
    }

    if notifications.is_empty() {
        println!("No notifications.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = notifications
        .iter()
        .map(|n| {
            vec![
                n.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                format!("{:?}", n.action),
                n.idea_id.clone(),
                n.idea_name.clone(),
                if n.read { "" } else { "●" }.to_string(),
            ]
        })
        .collect();
    print_table(&["TIME", "ACTION", "IDEA", "NAME", "UNREAD"], rows);
    Ok(())
}

fn cleanup(root: &Path, days: i64, json: bool) -> anyhow::Result<()> {
    if days < 0 {
        anyhow::bail!("days must be non-negative");
    }
    let removed = notification::clean_older_than(root, days)?;

    if json {
        print_json(&serde_json::json!({ "removed": removed }))?;
    } else {
        println!("Removed {removed} notification(s) older than {days} day(s)");
    }
    Ok(())
}
