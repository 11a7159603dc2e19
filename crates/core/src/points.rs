//! Gamification: point awards, badges and leaderboard limits.

use serde::Serialize;

/// Points credited to the submitter when an issue is created.
pub const POINTS_PER_ISSUE: i64 = 10;

/// Default number of leaderboard entries.
pub const DEFAULT_LEADERBOARD_SIZE: i64 = 3;

/// Largest leaderboard page.
pub const MAX_LEADERBOARD_SIZE: i64 = 50;

/// Badge tier earned from accumulated points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    BronzeReporter,
    SilverWatchdog,
    GoldGuardian,
    CityHero,
}

impl Badge {
    /// Badge for a points total. Thresholds: 51 silver, 201 gold, 500 hero.
    pub fn for_points(points: i64) -> Self {
        match points {
            p if p >= 500 => Badge::CityHero,
            p if p >= 201 => Badge::GoldGuardian,
            p if p >= 51 => Badge::SilverWatchdog,
            _ => Badge::BronzeReporter,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Badge::BronzeReporter => "Bronze Reporter",
            Badge::SilverWatchdog => "Silver Watchdog",
            Badge::GoldGuardian => "Gold Guardian",
            Badge::CityHero => "City Hero",
        }
    }
}
