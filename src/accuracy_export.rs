use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::prediction_store;

pub struct ExportReport {
    pub predictions: usize,
    pub graded: usize,
}

pub fn export_accuracy(path: &Path, conn: &Connection) -> Result<ExportReport> {
    let summary = prediction_store::accuracy_summary(conn)?;
    let graded = prediction_store::recent_games(conn, summary.graded.max(0) as usize)?;
    let predictions = prediction_store::recent_predictions(conn, None)?;

    let summary_rows = vec![
        vec!["Metric".to_string(), "Value".to_string()],
        vec!["Predictions".to_string(), summary.predictions.to_string()],
        vec!["Graded games".to_string(), summary.graded.to_string()],
        vec!["Correct picks".to_string(), summary.correct.to_string()],
        vec!["Accuracy rate".to_string(), format!("{:.3}", summary.accuracy_rate)],
        vec![
            "Avg calibration".to_string(),
            format!("{:.3}", summary.avg_calibration),
        ],
        vec!["Avg margin".to_string(), format!("{:.1}", summary.avg_margin)],
    ];

    let mut graded_rows = vec![vec![
        "Game ID".to_string(),
        "Team 1".to_string(),
        "Team 2".to_string(),
        "Picked".to_string(),
        "Confidence".to_string(),
        "Actual Winner".to_string(),
        "Home Score".to_string(),
        "Away Score".to_string(),
        "Correct".to_string(),
        "Margin".to_string(),
        "Predicted At".to_string(),
    ]];
    for game in &graded {
        graded_rows.push(vec![
            game.game_id.clone(),
            game.team1.clone(),
            game.team2.clone(),
            game.predicted_winner.clone(),
            format!("{:.2}", game.confidence),
            game.actual_winner.clone(),
            game.home_score.to_string(),
            game.away_score.to_string(),
            if game.was_correct { "yes" } else { "no" }.to_string(),
            game.score_difference.to_string(),
            game.created_at.clone(),
        ]);
    }

    let mut prediction_rows = vec![vec![
        "Game ID".to_string(),
        "Team 1".to_string(),
        "Team 2".to_string(),
        "Home".to_string(),
        "Picked".to_string(),
        "Score".to_string(),
        "Confidence".to_string(),
        "Week".to_string(),
        "Season".to_string(),
        "Created".to_string(),
    ]];
    for p in &predictions {
        prediction_rows.push(vec![
            p.game_id.clone(),
            p.team1.clone(),
            p.team2.clone(),
            p.home_team.clone(),
            p.predicted_winner.clone(),
            format!("{} - {}", p.predicted_score_home, p.predicted_score_away),
            format!("{:.2}", p.confidence),
            p.week.to_string(),
            p.season.to_string(),
            p.created_at.clone(),
        ]);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Graded Games")?;
        write_rows(sheet, &graded_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Predictions")?;
        write_rows(sheet, &prediction_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        predictions: predictions.len(),
        graded: graded.len(),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
