use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sources::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PositionGroup {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    OffensiveLine,
    DefensiveLine,
    Linebacker,
    Cornerback,
    Safety,
    SpecialTeams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    BaseInt,
    BaseReal,
    AdvInt,
    AdvReal,
}

impl StatKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            StatKind::BaseInt => "INTEGER NOT NULL DEFAULT 0",
            StatKind::BaseReal => "REAL NOT NULL DEFAULT 0",
            StatKind::AdvInt => "INTEGER",
            StatKind::AdvReal => "REAL",
        }
    }

    pub fn is_advanced(self) -> bool {
        matches!(self, StatKind::AdvInt | StatKind::AdvReal)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatColumn {
    pub name: &'static str,
    pub kind: StatKind,
}

const fn col(name: &'static str, kind: StatKind) -> StatColumn {
    StatColumn { name, kind }
}

const QB_COLUMNS: &[StatColumn] = &[
    col("passing_yards", StatKind::BaseInt),
    col("passing_touchdowns", StatKind::BaseInt),
    col("interceptions", StatKind::BaseInt),
    col("completions", StatKind::BaseInt),
    col("attempts", StatKind::BaseInt),
    col("passer_rating", StatKind::BaseReal),
    col("qbr", StatKind::AdvReal),
    col("epa_per_play", StatKind::AdvReal),
    col("cpoe", StatKind::AdvReal),
    col("deep_ball_accuracy", StatKind::AdvReal),
    col("red_zone_efficiency", StatKind::AdvReal),
];

const RB_COLUMNS: &[StatColumn] = &[
    col("rushing_yards", StatKind::BaseInt),
    col("rushing_attempts", StatKind::BaseInt),
    col("rushing_touchdowns", StatKind::BaseInt),
    col("receptions", StatKind::BaseInt),
    col("receiving_yards", StatKind::BaseInt),
    col("fumbles", StatKind::BaseInt),
    col("yards_per_carry", StatKind::AdvReal),
    col("rushing_grade", StatKind::AdvReal),
    col("pass_blocking_grade", StatKind::AdvReal),
    col("breakaway_run_rate", StatKind::AdvReal),
];

const WR_COLUMNS: &[StatColumn] = &[
    col("receptions", StatKind::BaseInt),
    col("receiving_yards", StatKind::BaseInt),
    col("receiving_touchdowns", StatKind::BaseInt),
    col("targets", StatKind::BaseInt),
    col("catch_rate", StatKind::AdvReal),
    col("target_share", StatKind::AdvReal),
    col("route_running_grade", StatKind::AdvReal),
    col("yards_after_catch", StatKind::AdvReal),
];

const TE_COLUMNS: &[StatColumn] = &[
    col("receptions", StatKind::BaseInt),
    col("receiving_yards", StatKind::BaseInt),
    col("receiving_touchdowns", StatKind::BaseInt),
    col("targets", StatKind::BaseInt),
    col("catch_rate", StatKind::AdvReal),
    col("blocking_grade", StatKind::AdvReal),
    col("red_zone_efficiency", StatKind::AdvReal),
];

const OL_COLUMNS: &[StatColumn] = &[
    col("games_played", StatKind::BaseInt),
    col("games_started", StatKind::BaseInt),
    col("pass_block_win_rate", StatKind::AdvReal),
    col("run_block_win_rate", StatKind::AdvReal),
    col("pressure_rate_allowed", StatKind::AdvReal),
    col("penalty_count", StatKind::AdvInt),
];

const DL_COLUMNS: &[StatColumn] = &[
    col("tackles", StatKind::BaseInt),
    col("assists", StatKind::BaseInt),
    col("sacks", StatKind::BaseReal),
    col("forced_fumbles", StatKind::BaseInt),
    col("pass_rush_win_rate", StatKind::AdvReal),
    col("run_stop_rate", StatKind::AdvReal),
    col("pressure_count", StatKind::AdvInt),
];

const LB_COLUMNS: &[StatColumn] = &[
    col("tackles", StatKind::BaseInt),
    col("assists", StatKind::BaseInt),
    col("sacks", StatKind::BaseReal),
    col("interceptions", StatKind::BaseInt),
    col("coverage_grade", StatKind::AdvReal),
    col("run_stop_rate", StatKind::AdvReal),
    col("pressure_count", StatKind::AdvInt),
];

const CB_COLUMNS: &[StatColumn] = &[
    col("tackles", StatKind::BaseInt),
    col("interceptions", StatKind::BaseInt),
    col("passes_defended", StatKind::BaseInt),
    col("completion_pct_allowed", StatKind::AdvReal),
    col("passer_rating_allowed", StatKind::AdvReal),
    col("coverage_grade", StatKind::AdvReal),
];

const S_COLUMNS: &[StatColumn] = &[
    col("tackles", StatKind::BaseInt),
    col("assists", StatKind::BaseInt),
    col("interceptions", StatKind::BaseInt),
    col("passes_defended", StatKind::BaseInt),
    col("coverage_grade", StatKind::AdvReal),
    col("missed_tackle_rate", StatKind::AdvReal),
    col("deep_coverage_grade", StatKind::AdvReal),
];

const ST_COLUMNS: &[StatColumn] = &[
    col("field_goals_made", StatKind::BaseInt),
    col("field_goals_attempted", StatKind::BaseInt),
    col("extra_points_made", StatKind::BaseInt),
    col("punts", StatKind::BaseInt),
    col("kick_return_average", StatKind::AdvReal),
    col("punt_return_average", StatKind::AdvReal),
    col("touchback_rate", StatKind::AdvReal),
];

impl PositionGroup {
    pub const ALL: [PositionGroup; 10] = [
        PositionGroup::Quarterback,
        PositionGroup::RunningBack,
        PositionGroup::WideReceiver,
        PositionGroup::TightEnd,
        PositionGroup::OffensiveLine,
        PositionGroup::DefensiveLine,
        PositionGroup::Linebacker,
        PositionGroup::Cornerback,
        PositionGroup::Safety,
        PositionGroup::SpecialTeams,
    ];

    pub fn code(self) -> &'static str {
        match self {
            PositionGroup::Quarterback => "QB",
            PositionGroup::RunningBack => "RB",
            PositionGroup::WideReceiver => "WR",
            PositionGroup::TightEnd => "TE",
            PositionGroup::OffensiveLine => "OL",
            PositionGroup::DefensiveLine => "DL",
            PositionGroup::Linebacker => "LB",
            PositionGroup::Cornerback => "CB",
            PositionGroup::Safety => "S",
            PositionGroup::SpecialTeams => "ST",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PositionGroup::Quarterback => "Quarterback",
            PositionGroup::RunningBack => "Running Back",
            PositionGroup::WideReceiver => "Wide Receiver",
            PositionGroup::TightEnd => "Tight End",
            PositionGroup::OffensiveLine => "Offensive Line",
            PositionGroup::DefensiveLine => "Defensive Line",
            PositionGroup::Linebacker => "Linebacker",
            PositionGroup::Cornerback => "Cornerback",
            PositionGroup::Safety => "Safety",
            PositionGroup::SpecialTeams => "Special Teams",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            PositionGroup::Quarterback => "quarterback_stats",
            PositionGroup::RunningBack => "running_back_stats",
            PositionGroup::WideReceiver => "wide_receiver_stats",
            PositionGroup::TightEnd => "tight_end_stats",
            PositionGroup::OffensiveLine => "offensive_line_stats",
            PositionGroup::DefensiveLine => "defensive_line_stats",
            PositionGroup::Linebacker => "linebacker_stats",
            PositionGroup::Cornerback => "cornerback_stats",
            PositionGroup::Safety => "safety_stats",
            PositionGroup::SpecialTeams => "special_teams_stats",
        }
    }

    /// Accepts group codes plus the finer-grained depth-chart positions
    /// providers report.
    pub fn parse(code: &str) -> Option<PositionGroup> {
        let group = match code.trim().to_uppercase().as_str() {
            "QB" => PositionGroup::Quarterback,
            "RB" | "FB" | "HB" => PositionGroup::RunningBack,
            "WR" => PositionGroup::WideReceiver,
            "TE" => PositionGroup::TightEnd,
            "OL" | "OT" | "OG" | "C" | "G" | "T" | "LT" | "RT" | "LG" | "RG" => {
                PositionGroup::OffensiveLine
            }
            "DL" | "DE" | "DT" | "NT" | "EDGE" => PositionGroup::DefensiveLine,
            "LB" | "ILB" | "OLB" | "MLB" => PositionGroup::Linebacker,
            "CB" | "DB" => PositionGroup::Cornerback,
            "S" | "FS" | "SS" => PositionGroup::Safety,
            "ST" | "K" | "P" | "PK" | "KR" | "PR" | "LS" => PositionGroup::SpecialTeams,
            _ => return None,
        };
        Some(group)
    }

    pub fn stat_columns(self) -> &'static [StatColumn] {
        match self {
            PositionGroup::Quarterback => QB_COLUMNS,
            PositionGroup::RunningBack => RB_COLUMNS,
            PositionGroup::WideReceiver => WR_COLUMNS,
            PositionGroup::TightEnd => TE_COLUMNS,
            PositionGroup::OffensiveLine => OL_COLUMNS,
            PositionGroup::DefensiveLine => DL_COLUMNS,
            PositionGroup::Linebacker => LB_COLUMNS,
            PositionGroup::Cornerback => CB_COLUMNS,
            PositionGroup::Safety => S_COLUMNS,
            PositionGroup::SpecialTeams => ST_COLUMNS,
        }
    }

    /// ORDER BY fragment for the category's primary ranking, best first.
    pub fn rank_order(self) -> &'static str {
        match self {
            PositionGroup::Quarterback => "passer_rating DESC",
            PositionGroup::RunningBack => "rushing_yards DESC",
            PositionGroup::WideReceiver => "receiving_yards DESC",
            PositionGroup::TightEnd => "receiving_yards DESC",
            PositionGroup::OffensiveLine => "games_started DESC",
            PositionGroup::DefensiveLine => "tackles DESC",
            PositionGroup::Linebacker => "tackles DESC",
            PositionGroup::Cornerback => "interceptions DESC, tackles DESC",
            PositionGroup::Safety => "tackles DESC",
            PositionGroup::SpecialTeams => "field_goals_made DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuarterbackStats {
    pub passing_yards: i64,
    pub passing_touchdowns: i64,
    pub interceptions: i64,
    pub completions: i64,
    pub attempts: i64,
    pub passer_rating: f64,
    pub qbr: Option<f64>,
    pub epa_per_play: Option<f64>,
    pub cpoe: Option<f64>,
    pub deep_ball_accuracy: Option<f64>,
    pub red_zone_efficiency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunningBackStats {
    pub rushing_yards: i64,
    pub rushing_attempts: i64,
    pub rushing_touchdowns: i64,
    pub receptions: i64,
    pub receiving_yards: i64,
    pub fumbles: i64,
    pub yards_per_carry: Option<f64>,
    pub rushing_grade: Option<f64>,
    pub pass_blocking_grade: Option<f64>,
    pub breakaway_run_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WideReceiverStats {
    pub receptions: i64,
    pub receiving_yards: i64,
    pub receiving_touchdowns: i64,
    pub targets: i64,
    pub catch_rate: Option<f64>,
    pub target_share: Option<f64>,
    pub route_running_grade: Option<f64>,
    pub yards_after_catch: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TightEndStats {
    pub receptions: i64,
    pub receiving_yards: i64,
    pub receiving_touchdowns: i64,
    pub targets: i64,
    pub catch_rate: Option<f64>,
    pub blocking_grade: Option<f64>,
    pub red_zone_efficiency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OffensiveLineStats {
    pub games_played: i64,
    pub games_started: i64,
    pub pass_block_win_rate: Option<f64>,
    pub run_block_win_rate: Option<f64>,
    pub pressure_rate_allowed: Option<f64>,
    pub penalty_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DefensiveLineStats {
    pub tackles: i64,
    pub assists: i64,
    pub sacks: f64,
    pub forced_fumbles: i64,
    pub pass_rush_win_rate: Option<f64>,
    pub run_stop_rate: Option<f64>,
    pub pressure_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LinebackerStats {
    pub tackles: i64,
    pub assists: i64,
    pub sacks: f64,
    pub interceptions: i64,
    pub coverage_grade: Option<f64>,
    pub run_stop_rate: Option<f64>,
    pub pressure_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CornerbackStats {
    pub tackles: i64,
    pub interceptions: i64,
    pub passes_defended: i64,
    pub completion_pct_allowed: Option<f64>,
    pub passer_rating_allowed: Option<f64>,
    pub coverage_grade: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SafetyStats {
    pub tackles: i64,
    pub assists: i64,
    pub interceptions: i64,
    pub passes_defended: i64,
    pub coverage_grade: Option<f64>,
    pub missed_tackle_rate: Option<f64>,
    pub deep_coverage_grade: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpecialTeamsStats {
    pub field_goals_made: i64,
    pub field_goals_attempted: i64,
    pub extra_points_made: i64,
    pub punts: i64,
    pub kick_return_average: Option<f64>,
    pub punt_return_average: Option<f64>,
    pub touchback_rate: Option<f64>,
}

/// Typed stat payload. Baseline fields are plain numbers and default to zero;
/// advanced fields are Options where None means "not measured", never zero.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupStats {
    Quarterback(QuarterbackStats),
    RunningBack(RunningBackStats),
    WideReceiver(WideReceiverStats),
    TightEnd(TightEndStats),
    OffensiveLine(OffensiveLineStats),
    DefensiveLine(DefensiveLineStats),
    Linebacker(LinebackerStats),
    Cornerback(CornerbackStats),
    Safety(SafetyStats),
    SpecialTeams(SpecialTeamsStats),
}

impl GroupStats {
    pub fn group(&self) -> PositionGroup {
        match self {
            GroupStats::Quarterback(_) => PositionGroup::Quarterback,
            GroupStats::RunningBack(_) => PositionGroup::RunningBack,
            GroupStats::WideReceiver(_) => PositionGroup::WideReceiver,
            GroupStats::TightEnd(_) => PositionGroup::TightEnd,
            GroupStats::OffensiveLine(_) => PositionGroup::OffensiveLine,
            GroupStats::DefensiveLine(_) => PositionGroup::DefensiveLine,
            GroupStats::Linebacker(_) => PositionGroup::Linebacker,
            GroupStats::Cornerback(_) => PositionGroup::Cornerback,
            GroupStats::Safety(_) => PositionGroup::Safety,
            GroupStats::SpecialTeams(_) => PositionGroup::SpecialTeams,
        }
    }

    pub fn empty(group: PositionGroup) -> GroupStats {
        match group {
            PositionGroup::Quarterback => GroupStats::Quarterback(Default::default()),
            PositionGroup::RunningBack => GroupStats::RunningBack(Default::default()),
            PositionGroup::WideReceiver => GroupStats::WideReceiver(Default::default()),
            PositionGroup::TightEnd => GroupStats::TightEnd(Default::default()),
            PositionGroup::OffensiveLine => GroupStats::OffensiveLine(Default::default()),
            PositionGroup::DefensiveLine => GroupStats::DefensiveLine(Default::default()),
            PositionGroup::Linebacker => GroupStats::Linebacker(Default::default()),
            PositionGroup::Cornerback => GroupStats::Cornerback(Default::default()),
            PositionGroup::Safety => GroupStats::Safety(Default::default()),
            PositionGroup::SpecialTeams => GroupStats::SpecialTeams(Default::default()),
        }
    }

    /// Object keyed exactly by the group's stat columns; None renders as null.
    pub fn to_json(&self) -> Result<Value> {
        let value = match self {
            GroupStats::Quarterback(s) => serde_json::to_value(s),
            GroupStats::RunningBack(s) => serde_json::to_value(s),
            GroupStats::WideReceiver(s) => serde_json::to_value(s),
            GroupStats::TightEnd(s) => serde_json::to_value(s),
            GroupStats::OffensiveLine(s) => serde_json::to_value(s),
            GroupStats::DefensiveLine(s) => serde_json::to_value(s),
            GroupStats::Linebacker(s) => serde_json::to_value(s),
            GroupStats::Cornerback(s) => serde_json::to_value(s),
            GroupStats::Safety(s) => serde_json::to_value(s),
            GroupStats::SpecialTeams(s) => serde_json::to_value(s),
        };
        value.with_context(|| format!("encode {} stats", self.group().code()))
    }

    /// Decodes a stat object for the given group. Missing baseline fields fall
    /// back to zero, missing or null advanced fields to None; unknown keys are
    /// ignored. This is also the provider payload decoder.
    pub fn from_json(group: PositionGroup, value: &Value) -> Result<GroupStats> {
        let raw = value.clone();
        let decoded = match group {
            PositionGroup::Quarterback => {
                serde_json::from_value(raw).map(GroupStats::Quarterback)
            }
            PositionGroup::RunningBack => serde_json::from_value(raw).map(GroupStats::RunningBack),
            PositionGroup::WideReceiver => {
                serde_json::from_value(raw).map(GroupStats::WideReceiver)
            }
            PositionGroup::TightEnd => serde_json::from_value(raw).map(GroupStats::TightEnd),
            PositionGroup::OffensiveLine => {
                serde_json::from_value(raw).map(GroupStats::OffensiveLine)
            }
            PositionGroup::DefensiveLine => {
                serde_json::from_value(raw).map(GroupStats::DefensiveLine)
            }
            PositionGroup::Linebacker => serde_json::from_value(raw).map(GroupStats::Linebacker),
            PositionGroup::Cornerback => serde_json::from_value(raw).map(GroupStats::Cornerback),
            PositionGroup::Safety => serde_json::from_value(raw).map(GroupStats::Safety),
            PositionGroup::SpecialTeams => {
                serde_json::from_value(raw).map(GroupStats::SpecialTeams)
            }
        };
        decoded.with_context(|| format!("decode {} stats", group.code()))
    }
}

#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub player_id: u32,
    pub player_name: String,
    pub team: String,
    /// Raw position as reported, which may be finer than the group ("FS").
    pub position: String,
    pub week: u16,
    pub season: i32,
    pub source: Source,
    pub last_updated: String,
    pub stats: GroupStats,
}

impl PlayerRecord {
    pub fn group(&self) -> PositionGroup {
        self.stats.group()
    }
}

#[cfg(test)]
mod tests {
    use super::{GroupStats, PositionGroup, QuarterbackStats};
    use serde_json::json;

    #[test]
    fn every_group_has_matching_columns_and_fields() {
        for group in PositionGroup::ALL {
            let json = GroupStats::empty(group).to_json().expect("encode");
            let obj = json.as_object().expect("object");
            let columns = group.stat_columns();
            assert_eq!(obj.len(), columns.len(), "group {}", group.code());
            for column in columns {
                assert!(
                    obj.contains_key(column.name),
                    "group {} missing column {}",
                    group.code(),
                    column.name
                );
            }
        }
    }

    #[test]
    fn rank_order_names_real_columns() {
        for group in PositionGroup::ALL {
            let names: Vec<&str> = group.stat_columns().iter().map(|c| c.name).collect();
            for field in group.rank_order().split(',') {
                let field = field.trim().trim_end_matches(" DESC");
                assert!(names.contains(&field), "group {} ranks by {}", group.code(), field);
            }
        }
    }

    #[test]
    fn advanced_columns_are_nullable_baseline_are_not() {
        for group in PositionGroup::ALL {
            for column in group.stat_columns() {
                let sql = column.kind.sql_type();
                if column.kind.is_advanced() {
                    assert!(!sql.contains("NOT NULL"), "{} must stay nullable", column.name);
                } else {
                    assert!(sql.contains("NOT NULL DEFAULT 0"), "{} must default", column.name);
                }
            }
        }
    }

    #[test]
    fn parse_accepts_depth_chart_aliases() {
        assert_eq!(PositionGroup::parse("qb"), Some(PositionGroup::Quarterback));
        assert_eq!(PositionGroup::parse("DE"), Some(PositionGroup::DefensiveLine));
        assert_eq!(PositionGroup::parse("FS"), Some(PositionGroup::Safety));
        assert_eq!(PositionGroup::parse("LT"), Some(PositionGroup::OffensiveLine));
        assert_eq!(PositionGroup::parse("K"), Some(PositionGroup::SpecialTeams));
        assert_eq!(PositionGroup::parse("QB/WR"), None);
    }

    #[test]
    fn decode_defaults_baseline_zero_advanced_none() {
        let stats = GroupStats::from_json(
            PositionGroup::Quarterback,
            &json!({"passing_yards": 312, "passer_rating": 104.5, "qbr": null}),
        )
        .expect("decode");
        let GroupStats::Quarterback(qb) = stats else {
            panic!("wrong variant");
        };
        assert_eq!(qb.passing_yards, 312);
        assert_eq!(qb.attempts, 0);
        assert_eq!(qb.passer_rating, 104.5);
        assert_eq!(qb.qbr, None);
        assert_eq!(qb.epa_per_play, None);
    }

    #[test]
    fn encode_keeps_null_advanced_distinct_from_zero() {
        let stats = GroupStats::Quarterback(QuarterbackStats {
            passing_yards: 250,
            qbr: Some(0.0),
            ..Default::default()
        });
        let json = stats.to_json().expect("encode");
        assert_eq!(json["qbr"], json!(0.0));
        assert!(json["epa_per_play"].is_null());
    }
}
