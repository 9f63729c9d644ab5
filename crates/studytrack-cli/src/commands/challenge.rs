use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use studytrack_core::challenges::Cadence;
use studytrack_core::Challenge;

use super::{print_json, with_tracker, CmdResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum CadenceArg {
    Daily,
    Weekly,
}

impl From<CadenceArg> for Cadence {
    fn from(arg: CadenceArg) -> Self {
        match arg {
            CadenceArg::Daily => Cadence::Daily,
            CadenceArg::Weekly => Cadence::Weekly,
        }
    }
}

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// List active challenges
    List {
        #[arg(long, value_enum)]
        cadence: Option<CadenceArg>,
    },
    /// Owned badges and themes
    Rewards,
}

#[derive(Serialize)]
struct Row<'a> {
    #[serde(flatten)]
    challenge: &'a Challenge,
    completed: bool,
    display_progress: u32,
}

#[derive(Serialize)]
struct Owned<'a> {
    badges: Vec<&'a str>,
    themes: Vec<&'a str>,
}

pub fn run(action: ChallengeAction) -> CmdResult {
    with_tracker(|tracker| match action {
        ChallengeAction::List { cadence } => {
            let cadence = cadence.map(Cadence::from);
            let rows: Vec<Row> = tracker
                .challenges()
                .challenges()
                .iter()
                .filter(|c| cadence.map_or(true, |wanted| c.cadence == wanted))
                .map(|c| Row {
                    challenge: c,
                    completed: c.is_completed(),
                    display_progress: c.display_progress(),
                })
                .collect();
            print_json(&rows)
        }
        ChallengeAction::Rewards => {
            let challenges = tracker.challenges();
            print_json(&Owned {
                badges: challenges.badges().iter().map(String::as_str).collect(),
                themes: challenges.themes().iter().map(String::as_str).collect(),
            })
        }
    })
}
