pub mod events;
pub mod ideas;
pub mod notifications;
pub mod settings;
pub mod sprints;
