use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;

use crate::extract::{self, ExtractedPrediction};
use crate::prediction_store::{self, Prediction, TIE};

fn underscored(team: &str) -> String {
    team.replace(' ', "_").replace('.', "")
}

pub fn build_game_id(team1: &str, team2: &str, week: u16) -> String {
    format!(
        "{}_vs_{}_Week_{:02}_{}",
        underscored(team1),
        underscored(team2),
        week,
        Utc::now().format("%Y%m%d_%H%M%S"),
    )
}

/// Full pipeline for one report: extract, project numerics, persist. The
/// stored confidence is the projected [0, 1] value; the raw string stays
/// inside the serialized payload.
pub fn record_analysis(
    conn: &Connection,
    team1: &str,
    team2: &str,
    home_team: &str,
    week: u16,
    season: i32,
    report_text: &str,
) -> Result<Prediction> {
    let extracted = extract::extract_prediction(team1, team2, home_team, season, report_text);
    let (score_home, score_away) = extract::score_numbers(&extracted.predicted_score);
    let confidence = extract::confidence_value(&extracted.confidence);

    let prediction = Prediction {
        game_id: build_game_id(team1, team2, week),
        team1: extracted.team1.clone(),
        team2: extracted.team2.clone(),
        home_team: extracted.home_team.clone(),
        predicted_winner: extracted.predicted_winner.clone(),
        predicted_score_home: score_home,
        predicted_score_away: score_away,
        confidence,
        analysis_json: serde_json::to_string(&extracted)
            .context("serialize analysis payload")?,
        week,
        season,
        created_at: Utc::now().to_rfc3339(),
    };
    prediction_store::save_prediction(conn, &prediction)?;
    Ok(prediction)
}

/// Winner from entered scores. The home team is one of the pair; level scores
/// grade as a tie.
pub fn resolve_actual_winner(
    team1: &str,
    team2: &str,
    home_team: &str,
    home_score: i32,
    away_score: i32,
) -> String {
    if home_score > away_score {
        home_team.to_string()
    } else if away_score > home_score {
        if home_team == team1 {
            team2.to_string()
        } else {
            team1.to_string()
        }
    } else {
        TIE.to_string()
    }
}

pub fn render_report(prediction: &ExtractedPrediction, week: u16, season: i32) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Matchup Analysis: {} vs {}\n",
        prediction.team1, prediction.team2
    ));
    out.push_str(&format!("Week {week}, {season} season\n"));
    out.push_str(&format!("Home team: {}\n\n", prediction.home_team));
    out.push_str(&format!("Predicted winner: {}\n", prediction.predicted_winner));
    out.push_str(&format!("Predicted score:  {}\n", prediction.predicted_score));
    out.push_str(&format!("Confidence:       {}\n\n", prediction.confidence));
    out.push_str("Key factors:\n");
    for (idx, factor) in prediction.key_factors.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", idx + 1, factor));
    }
    out.push_str(&format!("\nAnalysis date: {}\n", prediction.analysis_date));
    out
}

pub fn save_report_file(
    dir: &Path,
    prediction: &ExtractedPrediction,
    week: u16,
    season: i32,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create report dir {}", dir.display()))?;
    let path = dir.join(format!(
        "Matchup_Analysis_{}_vs_{}_Week_{:02}.txt",
        underscored(&prediction.team1),
        underscored(&prediction.team2),
        week,
    ));
    fs::write(&path, render_report(prediction, week, season))
        .with_context(|| format!("write report {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::{build_game_id, resolve_actual_winner};
    use crate::prediction_store::TIE;

    #[test]
    fn game_id_underscores_names_and_pads_week() {
        let id = build_game_id("St. Louis Stars", "Green Bay Packers", 5);
        assert!(id.starts_with("St_Louis_Stars_vs_Green_Bay_Packers_Week_05_"));
        let stamp = id.rsplit("_Week_05_").next().expect("timestamp");
        assert_eq!(stamp.len(), "20250923_141500".len());
    }

    #[test]
    fn home_win_goes_to_home_team() {
        let winner = resolve_actual_winner(
            "Philadelphia Eagles",
            "New York Giants",
            "New York Giants",
            27,
            21,
        );
        assert_eq!(winner, "New York Giants");
    }

    #[test]
    fn away_win_goes_to_the_other_team() {
        let winner = resolve_actual_winner(
            "Philadelphia Eagles",
            "New York Giants",
            "Philadelphia Eagles",
            17,
            24,
        );
        assert_eq!(winner, "New York Giants");
    }

    #[test]
    fn level_scores_grade_as_tie() {
        let winner = resolve_actual_winner(
            "Philadelphia Eagles",
            "New York Giants",
            "Philadelphia Eagles",
            20,
            20,
        );
        assert_eq!(winner, TIE);
    }
}
