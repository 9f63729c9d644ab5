mod category;
mod engine;

pub use category::{Phase, SessionCategory};
pub use engine::{format_mm_ss, CustomDurations, TimerEngine, TimerMode, TimerState};
