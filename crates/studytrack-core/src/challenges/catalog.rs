//! Built-in daily and weekly challenge sets.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{Cadence, Challenge, ChallengeCategory, ChallengeReward, Difficulty};
use crate::clock::Clock;

struct Template {
    title: &'static str,
    description: &'static str,
    category: ChallengeCategory,
    goal: u32,
    reward: ChallengeReward,
    difficulty: Difficulty,
}

fn daily_templates() -> [Template; 3] {
    [
        Template {
            title: "First Session of the Day",
            description: "Complete one study session today",
            category: ChallengeCategory::SessionsCompleted,
            goal: 1,
            reward: ChallengeReward::Xp(50),
            difficulty: Difficulty::Easy,
        },
        Template {
            title: "Marathoner",
            description: "Study for 120 minutes today",
            category: ChallengeCategory::StudyMinutes,
            goal: 120,
            reward: ChallengeReward::Xp(200),
            difficulty: Difficulty::Medium,
        },
        Template {
            title: "Productive",
            description: "Complete 5 tasks today",
            category: ChallengeCategory::TasksCompleted,
            goal: 5,
            reward: ChallengeReward::Xp(150),
            difficulty: Difficulty::Medium,
        },
    ]
}

fn weekly_templates() -> [Template; 3] {
    [
        Template {
            title: "Perfect Week",
            description: "Study on 7 different days",
            category: ChallengeCategory::DaysStudied,
            goal: 7,
            reward: ChallengeReward::StreakFreeze,
            difficulty: Difficulty::Hard,
        },
        Template {
            title: "Total Dedication",
            description: "Study for 900 minutes this week",
            category: ChallengeCategory::StudyMinutes,
            goal: 900,
            reward: ChallengeReward::Badge("Total Dedication".to_string()),
            difficulty: Difficulty::Hard,
        },
        Template {
            title: "Organizer",
            description: "Complete 20 tasks this week",
            category: ChallengeCategory::TasksCompleted,
            goal: 20,
            reward: ChallengeReward::Xp(500),
            difficulty: Difficulty::Medium,
        },
    ]
}

fn instantiate(templates: &[Template], cadence: Cadence, expires_at: DateTime<Utc>) -> Vec<Challenge> {
    templates
        .iter()
        .map(|t| Challenge {
            id: Uuid::new_v4(),
            title: t.title.to_string(),
            description: t.description.to_string(),
            category: t.category,
            cadence,
            goal: t.goal,
            progress: 0,
            reward: t.reward.clone(),
            difficulty: t.difficulty,
            expires_at,
            reward_claimed: false,
        })
        .collect()
}

/// Fresh daily challenges, expiring at the next local midnight.
pub fn daily_set(clock: &dyn Clock, now: DateTime<Utc>) -> Vec<Challenge> {
    instantiate(&daily_templates(), Cadence::Daily, clock.next_midnight(now))
}

/// Fresh weekly challenges, expiring seven days from `now`.
pub fn weekly_set(now: DateTime<Utc>) -> Vec<Challenge> {
    instantiate(&weekly_templates(), Cadence::Weekly, now + Duration::days(7))
}
