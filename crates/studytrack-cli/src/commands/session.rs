use clap::Subcommand;

use super::{print_events, print_json, with_tracker, CmdResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Log study done away from the timer
    Log {
        /// Minutes studied
        minutes: u32,
        /// Category tag
        #[arg(long, default_value = "Manual")]
        category: String,
    },
    /// List recorded sessions, newest first
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete the whole history
    Clear,
}

pub fn run(action: SessionAction) -> CmdResult {
    with_tracker(|tracker| match action {
        SessionAction::Log { minutes, category } => {
            if minutes == 0 {
                return Err("minutes must be positive".into());
            }
            tracker.log_manual_session(minutes, &category);
            print_events(tracker)
        }
        SessionAction::List { limit } => {
            let sessions: Vec<_> = tracker
                .history()
                .sessions()
                .iter()
                .rev()
                .take(limit.unwrap_or(usize::MAX))
                .collect();
            print_json(&sessions)
        }
        SessionAction::Clear => {
            tracker.history_mut().clear();
            println!("history cleared");
            Ok(())
        }
    })
}
