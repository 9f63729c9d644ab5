use clap::Subcommand;
use serde::Serialize;
use studytrack_core::{Phase, SessionCategory, TimerMode};

use super::{print_events, print_json, with_tracker, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or resume) the current phase
    Start {
        /// Switch category first (pomodoro, deep-work, short-focus, custom)
        #[arg(long)]
        category: Option<SessionCategory>,
    },
    /// Pause the running phase
    Pause,
    /// Resume a paused phase
    Resume,
    /// Stop and rewind the current phase
    Stop,
    /// Back to a fresh focus phase
    Reset,
    /// Abandon the current break
    SkipBreak,
    /// Finish the current phase now
    Finish,
    /// Extend the current phase
    Add {
        /// Minutes to add
        minutes: u32,
    },
    /// Select the session category (only while idle)
    Category { category: SessionCategory },
    /// Set the custom category's durations
    Custom {
        #[arg(long)]
        focus: u32,
        #[arg(long = "break")]
        break_minutes: u32,
    },
    /// Toggle automatic phase chaining
    AutoStart {
        #[arg(long = "break")]
        break_phase: Option<bool>,
        #[arg(long)]
        focus: Option<bool>,
    },
    /// Print current timer state as JSON
    Status,
}

#[derive(Serialize)]
struct Status {
    mode: TimerMode,
    phase: Phase,
    category: SessionCategory,
    remaining: String,
    remaining_secs: u64,
    total_secs: u64,
    progress: f64,
    cycles_completed: u32,
    break_minutes: u32,
    auto_start_break: bool,
    auto_start_focus: bool,
}

pub fn run(action: TimerAction) -> CmdResult {
    with_tracker(|tracker| {
        match action {
            TimerAction::Start { category } => {
                if let Some(category) = category {
                    if !tracker.set_category(category) {
                        return Err("category can only change while the timer is idle".into());
                    }
                }
                tracker.start();
            }
            TimerAction::Pause => tracker.pause(),
            TimerAction::Resume => tracker.resume(),
            TimerAction::Stop => tracker.stop(),
            TimerAction::Reset => tracker.reset(),
            TimerAction::SkipBreak => tracker.skip_break(),
            TimerAction::Finish => tracker.complete_phase(),
            TimerAction::Add { minutes } => tracker.add_time(minutes),
            TimerAction::Category { category } => {
                if !tracker.set_category(category) {
                    return Err("category can only change while the timer is idle".into());
                }
            }
            TimerAction::Custom {
                focus,
                break_minutes,
            } => tracker.timer_mut().set_custom_durations(focus, break_minutes),
            TimerAction::AutoStart { break_phase, focus } => {
                if let Some(enabled) = break_phase {
                    tracker.timer_mut().set_auto_start_break(enabled);
                }
                if let Some(enabled) = focus {
                    tracker.timer_mut().set_auto_start_focus(enabled);
                }
            }
            TimerAction::Status => {}
        }

        print_events(tracker)?;
        let timer = tracker.timer();
        let state = timer.state();
        print_json(&Status {
            mode: state.mode,
            phase: state.phase,
            category: state.category,
            remaining: timer.formatted_time(),
            remaining_secs: state.remaining_secs,
            total_secs: state.total_secs,
            progress: timer.progress(),
            cycles_completed: state.cycles_completed,
            break_minutes: timer.break_minutes(),
            auto_start_break: state.auto_start_break,
            auto_start_focus: state.auto_start_focus,
        })
    })
}
