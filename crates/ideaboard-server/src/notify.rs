//! Notification dispatcher: fan-out of domain events to the append-only
//! log, the Discord webhook, and the gateway wake call.
//!
//! Sink failures never reach the HTTP caller: the triggering write already
//! succeeded and is not rolled back. The log append and the wake call are
//! awaited so an immediate process exit can't drop them; Discord delivery is
//! detached since its latency is the largest and its loss the cheapest.

use crate::state::AppState;
use ideaboard_core::idea::Idea;
use ideaboard_core::notification;
use ideaboard_core::webhook::{self, NotifyEvent};

pub async fn dispatch(state: &AppState, event: NotifyEvent, idea: Idea) {
    let root = state.root.clone();

    {
        let root = root.clone();
        let idea = idea.clone();
        let event = event.clone();
        let logged = tokio::task::spawn_blocking(move || match &event {
            NotifyEvent::Create => notification::record_create(&root, &idea).map(|_| ()),
            NotifyEvent::Update => notification::record_update(&root, &idea).map(|_| ()),
            NotifyEvent::Delete => notification::record_delete(&root, &idea).map(|_| ()),
            NotifyEvent::Status { from, to } => {
                notification::record_status_change(&root, &idea, from, to).map(|_| ())
            }
        })
        .await;
        match logged {
            Ok(Err(e)) => tracing::warn!(error = %e, "notification log append failed"),
            Err(e) => tracing::warn!(error = %e, "notification log task failed"),
            Ok(Ok(())) => {}
        }
    }

    {
        let root = root.clone();
        let idea = idea.clone();
        let event = event.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = webhook::send_discord(&root, &event, &idea) {
                tracing::warn!(error = %e, "discord notification failed");
            }
        });
    }

    let woke = tokio::task::spawn_blocking(move || {
        let message = webhook::wake_message(&event, &idea);
        webhook::send_wake(&message)
    })
    .await;
    match woke {
        Ok(Err(e)) => tracing::warn!(error = %e, "gateway wake failed"),
        Err(e) => tracing::warn!(error = %e, "gateway wake task failed"),
        Ok(Ok(_)) => {}
    }
}
