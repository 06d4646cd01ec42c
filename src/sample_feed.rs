//! Synthetic roster generator for running the desk without any provider
//! configured. Output is shaped like a real week of data: plausible names,
//! in-range baselines, advanced stats present for only part of the roster.

use std::ops::Range;

use chrono::Utc;
use rand::Rng;

use crate::positions::{
    CornerbackStats, DefensiveLineStats, GroupStats, LinebackerStats, OffensiveLineStats,
    PlayerRecord, PositionGroup, QuarterbackStats, RunningBackStats, SafetyStats,
    SpecialTeamsStats, TightEndStats, WideReceiverStats,
};
use crate::sources::Source;
use crate::team_names;

const FIRST_NAMES: [&str; 16] = [
    "Marcus", "DeVon", "Jalen", "Tyrod", "Austin", "Malik", "Chris", "Jordan", "Trent", "Isaiah",
    "Caleb", "Drew", "Zach", "Micah", "Derrick", "Trey",
];
const LAST_NAMES: [&str; 16] = [
    "Johnson", "Williams", "Smith", "Brown", "Davis", "Mitchell", "Parker", "Coleman", "Reed",
    "Turner", "Phillips", "Watson", "Sanders", "Hayes", "Griffin", "Brooks",
];

fn roster_size(group: PositionGroup) -> usize {
    match group {
        PositionGroup::Quarterback => 2,
        PositionGroup::RunningBack => 3,
        PositionGroup::WideReceiver => 4,
        PositionGroup::TightEnd => 2,
        PositionGroup::OffensiveLine => 5,
        PositionGroup::DefensiveLine => 4,
        PositionGroup::Linebacker => 4,
        PositionGroup::Cornerback => 3,
        PositionGroup::Safety => 3,
        PositionGroup::SpecialTeams => 2,
    }
}

/// Name slots are deterministic per (team, roster slot) so a regenerated week
/// upserts over the previous one instead of piling up new players.
fn slot_name(team_slot: usize, counter: usize) -> String {
    let idx = (team_slot * 7 + counter) % (FIRST_NAMES.len() * LAST_NAMES.len());
    format!(
        "{} {}",
        FIRST_NAMES[idx % FIRST_NAMES.len()],
        LAST_NAMES[idx / FIRST_NAMES.len()]
    )
}

pub fn sample_team_records(team: &str, week: u16, season: i32) -> Vec<PlayerRecord> {
    let mut rng = rand::thread_rng();
    let now = Utc::now().to_rfc3339();
    let team_slot = team_names::TEAMS
        .iter()
        .position(|(_, name)| *name == team)
        .unwrap_or(0);

    let mut records = Vec::new();
    let mut counter = 0usize;
    for group in PositionGroup::ALL {
        for _ in 0..roster_size(group) {
            let player_id = 10_000 + (team_slot as u32) * 100 + counter as u32;
            records.push(PlayerRecord {
                player_id,
                player_name: slot_name(team_slot, counter),
                team: team.to_string(),
                position: group.code().to_string(),
                week,
                season,
                source: Source::Sample,
                last_updated: now.clone(),
                stats: sample_stats(&mut rng, group),
            });
            counter += 1;
        }
    }
    records
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn maybe(rng: &mut impl Rng, chance: f64, range: Range<f64>) -> Option<f64> {
    if rng.gen_bool(chance) {
        Some(round2(rng.gen_range(range)))
    } else {
        None
    }
}

fn sample_stats(rng: &mut impl Rng, group: PositionGroup) -> GroupStats {
    match group {
        PositionGroup::Quarterback => {
            let completions = rng.gen_range(14..30);
            GroupStats::Quarterback(QuarterbackStats {
                passing_yards: rng.gen_range(150..380),
                passing_touchdowns: rng.gen_range(0..4),
                interceptions: rng.gen_range(0..3),
                completions,
                attempts: completions + rng.gen_range(4..15),
                passer_rating: round2(rng.gen_range(62.0..128.0)),
                qbr: maybe(rng, 0.7, 25.0..90.0),
                epa_per_play: maybe(rng, 0.5, -0.25..0.45),
                cpoe: maybe(rng, 0.5, -6.0..8.0),
                deep_ball_accuracy: maybe(rng, 0.4, 25.0..60.0),
                red_zone_efficiency: maybe(rng, 0.4, 35.0..75.0),
            })
        }
        PositionGroup::RunningBack => {
            let attempts = rng.gen_range(6..25);
            GroupStats::RunningBack(RunningBackStats {
                rushing_yards: attempts * rng.gen_range(3..6),
                rushing_attempts: attempts,
                rushing_touchdowns: rng.gen_range(0..3),
                receptions: rng.gen_range(0..6),
                receiving_yards: rng.gen_range(0..60),
                fumbles: rng.gen_range(0..2),
                yards_per_carry: maybe(rng, 0.8, 2.8..6.2),
                rushing_grade: maybe(rng, 0.5, 50.0..92.0),
                pass_blocking_grade: maybe(rng, 0.4, 40.0..85.0),
                breakaway_run_rate: maybe(rng, 0.3, 2.0..12.0),
            })
        }
        PositionGroup::WideReceiver => {
            let receptions = rng.gen_range(1..11);
            GroupStats::WideReceiver(WideReceiverStats {
                receptions,
                receiving_yards: receptions * rng.gen_range(8..16),
                receiving_touchdowns: rng.gen_range(0..3),
                targets: receptions + rng.gen_range(0..6),
                catch_rate: maybe(rng, 0.7, 50.0..90.0),
                target_share: maybe(rng, 0.5, 8.0..32.0),
                route_running_grade: maybe(rng, 0.4, 50.0..92.0),
                yards_after_catch: maybe(rng, 0.5, 1.5..8.5),
            })
        }
        PositionGroup::TightEnd => {
            let receptions = rng.gen_range(0..8);
            GroupStats::TightEnd(TightEndStats {
                receptions,
                receiving_yards: receptions * rng.gen_range(7..14),
                receiving_touchdowns: rng.gen_range(0..2),
                targets: receptions + rng.gen_range(0..4),
                catch_rate: maybe(rng, 0.6, 55.0..90.0),
                blocking_grade: maybe(rng, 0.5, 42.0..88.0),
                red_zone_efficiency: maybe(rng, 0.3, 30.0..70.0),
            })
        }
        PositionGroup::OffensiveLine => GroupStats::OffensiveLine(OffensiveLineStats {
            games_played: rng.gen_range(1..18),
            games_started: rng.gen_range(0..17),
            pass_block_win_rate: maybe(rng, 0.6, 82.0..98.0),
            run_block_win_rate: maybe(rng, 0.6, 65.0..85.0),
            pressure_rate_allowed: maybe(rng, 0.5, 2.0..9.0),
            penalty_count: if rng.gen_bool(0.5) {
                Some(rng.gen_range(0..8))
            } else {
                None
            },
        }),
        PositionGroup::DefensiveLine => GroupStats::DefensiveLine(DefensiveLineStats {
            tackles: rng.gen_range(1..9),
            assists: rng.gen_range(0..6),
            sacks: f64::from(rng.gen_range(0..5)) * 0.5,
            forced_fumbles: rng.gen_range(0..2),
            pass_rush_win_rate: maybe(rng, 0.5, 8.0..26.0),
            run_stop_rate: maybe(rng, 0.5, 20.0..45.0),
            pressure_count: if rng.gen_bool(0.6) {
                Some(rng.gen_range(0..9))
            } else {
                None
            },
        }),
        PositionGroup::Linebacker => GroupStats::Linebacker(LinebackerStats {
            tackles: rng.gen_range(2..13),
            assists: rng.gen_range(0..8),
            sacks: f64::from(rng.gen_range(0..3)) * 0.5,
            interceptions: rng.gen_range(0..2),
            coverage_grade: maybe(rng, 0.5, 40.0..88.0),
            run_stop_rate: maybe(rng, 0.5, 18.0..42.0),
            pressure_count: if rng.gen_bool(0.4) {
                Some(rng.gen_range(0..6))
            } else {
                None
            },
        }),
        PositionGroup::Cornerback => GroupStats::Cornerback(CornerbackStats {
            tackles: rng.gen_range(1..8),
            interceptions: rng.gen_range(0..2),
            passes_defended: rng.gen_range(0..4),
            completion_pct_allowed: maybe(rng, 0.6, 48.0..75.0),
            passer_rating_allowed: maybe(rng, 0.6, 55.0..120.0),
            coverage_grade: maybe(rng, 0.5, 45.0..90.0),
        }),
        PositionGroup::Safety => GroupStats::Safety(SafetyStats {
            tackles: rng.gen_range(2..10),
            assists: rng.gen_range(0..6),
            interceptions: rng.gen_range(0..2),
            passes_defended: rng.gen_range(0..3),
            coverage_grade: maybe(rng, 0.5, 45.0..90.0),
            missed_tackle_rate: maybe(rng, 0.5, 4.0..16.0),
            deep_coverage_grade: maybe(rng, 0.3, 40.0..88.0),
        }),
        PositionGroup::SpecialTeams => {
            let attempts = rng.gen_range(0..5);
            GroupStats::SpecialTeams(SpecialTeamsStats {
                field_goals_made: rng.gen_range(0..=attempts),
                field_goals_attempted: attempts,
                extra_points_made: rng.gen_range(0..6),
                punts: rng.gen_range(0..8),
                kick_return_average: maybe(rng, 0.4, 18.0..30.0),
                punt_return_average: maybe(rng, 0.4, 5.0..15.0),
                touchback_rate: maybe(rng, 0.5, 40.0..85.0),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::sample_team_records;
    use crate::positions::PositionGroup;
    use crate::sources::Source;

    #[test]
    fn roster_covers_every_group_with_sample_source() {
        let records = sample_team_records("Chicago Bears", 3, 2025);
        for group in PositionGroup::ALL {
            assert!(
                records.iter().any(|r| r.group() == group),
                "missing {}",
                group.code()
            );
        }
        assert!(records.iter().all(|r| r.source == Source::Sample));
        assert!(records.iter().all(|r| r.week == 3 && r.season == 2025));
    }

    #[test]
    fn ids_and_names_are_unique_within_a_team() {
        let records = sample_team_records("Seattle Seahawks", 1, 2025);
        let ids: HashSet<u32> = records.iter().map(|r| r.player_id).collect();
        let names: HashSet<&str> = records.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(ids.len(), records.len());
        assert_eq!(names.len(), records.len());
    }

    #[test]
    fn ids_do_not_collide_across_teams() {
        let bears: HashSet<u32> = sample_team_records("Chicago Bears", 1, 2025)
            .iter()
            .map(|r| r.player_id)
            .collect();
        let lions: HashSet<u32> = sample_team_records("Detroit Lions", 1, 2025)
            .iter()
            .map(|r| r.player_id)
            .collect();
        assert!(bears.is_disjoint(&lions));
    }
}
