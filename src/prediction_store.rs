use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};

/// Sentinel winner for level scores. Graders compare exact strings, so a tie
/// marks every pick wrong without special casing.
pub const TIE: &str = "Tie";

#[derive(Debug, Clone)]
pub struct Prediction {
    pub game_id: String,
    pub team1: String,
    pub team2: String,
    pub home_team: String,
    pub predicted_winner: String,
    pub predicted_score_home: i32,
    pub predicted_score_away: i32,
    pub confidence: f64,
    /// Opaque serialized payload from the extraction pipeline.
    pub analysis_json: String,
    pub week: u16,
    pub season: i32,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct GameResult {
    pub game_id: String,
    pub team1: String,
    pub team2: String,
    pub home_team: String,
    pub actual_winner: String,
    pub home_score: i32,
    pub away_score: i32,
    pub game_date: Option<String>,
    pub weather: Option<String>,
    pub week: u16,
    pub season: i32,
    pub recorded_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyRow {
    pub game_id: String,
    pub was_correct: bool,
    pub score_difference: i32,
    pub calibration: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccuracySummary {
    pub predictions: i64,
    pub graded: i64,
    pub correct: i64,
    pub accuracy_rate: f64,
    pub avg_calibration: f64,
    pub avg_margin: f64,
}

#[derive(Debug, Clone)]
pub struct GradedGame {
    pub game_id: String,
    pub team1: String,
    pub team2: String,
    pub predicted_winner: String,
    pub confidence: f64,
    pub actual_winner: String,
    pub home_score: i32,
    pub away_score: i32,
    pub was_correct: bool,
    pub score_difference: i32,
    pub created_at: String,
}

/// Prediction columns addressable by lookup. An enum instead of a raw column
/// string keeps arbitrary SQL identifiers unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamField {
    Team1,
    Team2,
    HomeTeam,
}

impl TeamField {
    pub fn column(self) -> &'static str {
        match self {
            TeamField::Team1 => "team1",
            TeamField::Team2 => "team2",
            TeamField::HomeTeam => "home_team",
        }
    }
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create ledger dir {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("open ledger {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS predictions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            game_id TEXT NOT NULL UNIQUE,
            team1 TEXT NOT NULL,
            team2 TEXT NOT NULL,
            home_team TEXT NOT NULL,
            predicted_winner TEXT NOT NULL,
            predicted_score_home INTEGER NOT NULL,
            predicted_score_away INTEGER NOT NULL,
            confidence REAL NOT NULL,
            analysis_json TEXT NOT NULL,
            week INTEGER NOT NULL,
            season INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS game_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            game_id TEXT NOT NULL UNIQUE,
            team1 TEXT NOT NULL,
            team2 TEXT NOT NULL,
            home_team TEXT NOT NULL,
            actual_winner TEXT NOT NULL,
            home_score INTEGER NOT NULL,
            away_score INTEGER NOT NULL,
            game_date TEXT,
            weather TEXT,
            week INTEGER NOT NULL,
            season INTEGER NOT NULL,
            recorded_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS prediction_accuracy (
            game_id TEXT PRIMARY KEY,
            prediction_id INTEGER NOT NULL,
            result_id INTEGER NOT NULL,
            was_correct INTEGER NOT NULL,
            score_difference INTEGER NOT NULL,
            calibration REAL NOT NULL,
            computed_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_predictions_created ON predictions (created_at);
        "#,
    )
    .context("init ledger schema")
}

fn bool_to_i64(value: bool) -> i64 {
    if value { 1 } else { 0 }
}

/// Upserts by game_id; the winner must be one of the two named teams and the
/// confidence already projected into [0, 1].
pub fn save_prediction(conn: &Connection, prediction: &Prediction) -> Result<()> {
    if prediction.predicted_winner != prediction.team1
        && prediction.predicted_winner != prediction.team2
    {
        return Err(anyhow!(
            "predicted winner {:?} is neither {:?} nor {:?}",
            prediction.predicted_winner,
            prediction.team1,
            prediction.team2
        ));
    }
    if !(0.0..=1.0).contains(&prediction.confidence) {
        return Err(anyhow!(
            "confidence {} for {} outside [0, 1]",
            prediction.confidence,
            prediction.game_id
        ));
    }

    conn.execute(
        r#"
        INSERT INTO predictions (
            game_id, team1, team2, home_team, predicted_winner,
            predicted_score_home, predicted_score_away, confidence,
            analysis_json, week, season, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(game_id) DO UPDATE SET
            team1 = excluded.team1,
            team2 = excluded.team2,
            home_team = excluded.home_team,
            predicted_winner = excluded.predicted_winner,
            predicted_score_home = excluded.predicted_score_home,
            predicted_score_away = excluded.predicted_score_away,
            confidence = excluded.confidence,
            analysis_json = excluded.analysis_json,
            week = excluded.week,
            season = excluded.season,
            created_at = excluded.created_at
        "#,
        params![
            prediction.game_id,
            prediction.team1,
            prediction.team2,
            prediction.home_team,
            prediction.predicted_winner,
            prediction.predicted_score_home,
            prediction.predicted_score_away,
            prediction.confidence,
            prediction.analysis_json,
            i64::from(prediction.week),
            i64::from(prediction.season),
            prediction.created_at,
        ],
    )
    .with_context(|| format!("upsert prediction {}", prediction.game_id))?;
    Ok(())
}

/// A result can land before any prediction exists; grading just stays
/// unavailable until both sides are present.
pub fn save_result(conn: &Connection, result: &GameResult) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO game_results (
            game_id, team1, team2, home_team, actual_winner, home_score,
            away_score, game_date, weather, week, season, recorded_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(game_id) DO UPDATE SET
            team1 = excluded.team1,
            team2 = excluded.team2,
            home_team = excluded.home_team,
            actual_winner = excluded.actual_winner,
            home_score = excluded.home_score,
            away_score = excluded.away_score,
            game_date = excluded.game_date,
            weather = excluded.weather,
            week = excluded.week,
            season = excluded.season,
            recorded_at = excluded.recorded_at
        "#,
        params![
            result.game_id,
            result.team1,
            result.team2,
            result.home_team,
            result.actual_winner,
            result.home_score,
            result.away_score,
            result.game_date,
            result.weather,
            i64::from(result.week),
            i64::from(result.season),
            result.recorded_at,
        ],
    )
    .with_context(|| format!("upsert result {}", result.game_id))?;
    Ok(())
}

fn read_prediction(row: &Row<'_>) -> rusqlite::Result<Prediction> {
    Ok(Prediction {
        game_id: row.get(0)?,
        team1: row.get(1)?,
        team2: row.get(2)?,
        home_team: row.get(3)?,
        predicted_winner: row.get(4)?,
        predicted_score_home: row.get(5)?,
        predicted_score_away: row.get(6)?,
        confidence: row.get(7)?,
        analysis_json: row.get(8)?,
        week: row.get::<_, i64>(9)? as u16,
        season: row.get::<_, i64>(10)? as i32,
        created_at: row.get(11)?,
    })
}

const PREDICTION_COLUMNS: &str = "game_id, team1, team2, home_team, predicted_winner, \
     predicted_score_home, predicted_score_away, confidence, analysis_json, week, season, created_at";

pub fn get_prediction(conn: &Connection, game_id: &str) -> Result<Option<Prediction>> {
    let sql = format!("SELECT {PREDICTION_COLUMNS} FROM predictions WHERE game_id = ?1");
    match conn.query_row(&sql, params![game_id], read_prediction) {
        Ok(prediction) => Ok(Some(prediction)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("load prediction {game_id}")),
    }
}

pub fn get_result(conn: &Connection, game_id: &str) -> Result<Option<GameResult>> {
    let sql = "SELECT game_id, team1, team2, home_team, actual_winner, home_score, away_score, \
               game_date, weather, week, season, recorded_at \
               FROM game_results WHERE game_id = ?1";
    let read = |row: &Row<'_>| -> rusqlite::Result<GameResult> {
        Ok(GameResult {
            game_id: row.get(0)?,
            team1: row.get(1)?,
            team2: row.get(2)?,
            home_team: row.get(3)?,
            actual_winner: row.get(4)?,
            home_score: row.get(5)?,
            away_score: row.get(6)?,
            game_date: row.get(7)?,
            weather: row.get(8)?,
            week: row.get::<_, i64>(9)? as u16,
            season: row.get::<_, i64>(10)? as i32,
            recorded_at: row.get(11)?,
        })
    };
    match conn.query_row(sql, params![game_id], read) {
        Ok(result) => Ok(Some(result)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("load result {game_id}")),
    }
}

/// Newest first. None lists everything.
pub fn recent_predictions(conn: &Connection, limit: Option<usize>) -> Result<Vec<Prediction>> {
    let sql = format!(
        "SELECT {PREDICTION_COLUMNS} FROM predictions ORDER BY created_at DESC LIMIT ?1"
    );
    let cap = limit.map(|l| l as i64).unwrap_or(-1);
    let mut stmt = conn.prepare(&sql).context("prepare prediction list")?;
    let rows = stmt
        .query_map(params![cap], read_prediction)
        .context("list predictions")?;
    let mut out = Vec::new();
    for prediction in rows {
        out.push(prediction.context("read prediction row")?);
    }
    Ok(out)
}

/// Joins prediction and result for one game and upserts the graded row.
/// Either side missing leaves the ledger untouched and returns None.
/// Recomputing after a correction replaces the previous grade.
pub fn compute_accuracy(conn: &Connection, game_id: &str) -> Result<Option<AccuracyRow>> {
    let joined = conn.query_row(
        "SELECT p.id, r.id, p.predicted_winner, p.confidence, r.actual_winner, r.home_score, r.away_score \
         FROM predictions p JOIN game_results r ON p.game_id = r.game_id \
         WHERE p.game_id = ?1",
        params![game_id],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i32>(5)?,
                row.get::<_, i32>(6)?,
            ))
        },
    );
    let (prediction_id, result_id, predicted, confidence, actual, home, away) = match joined {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("join grade inputs {game_id}")),
    };

    let was_correct = predicted == actual;
    let score_difference = (home - away).abs();
    let calibration = if was_correct { confidence } else { 1.0 - confidence };

    conn.execute(
        r#"
        INSERT INTO prediction_accuracy (
            game_id, prediction_id, result_id, was_correct,
            score_difference, calibration, computed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(game_id) DO UPDATE SET
            prediction_id = excluded.prediction_id,
            result_id = excluded.result_id,
            was_correct = excluded.was_correct,
            score_difference = excluded.score_difference,
            calibration = excluded.calibration,
            computed_at = excluded.computed_at
        "#,
        params![
            game_id,
            prediction_id,
            result_id,
            bool_to_i64(was_correct),
            score_difference,
            calibration,
            Utc::now().to_rfc3339(),
        ],
    )
    .with_context(|| format!("upsert accuracy {game_id}"))?;

    Ok(Some(AccuracyRow {
        game_id: game_id.to_string(),
        was_correct,
        score_difference,
        calibration,
    }))
}

/// Aggregates over whatever has been graded; an empty ledger reads as all
/// zeros rather than an error.
pub fn accuracy_summary(conn: &Connection) -> Result<AccuracySummary> {
    let predictions: i64 = conn
        .query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))
        .context("count predictions")?;
    let (graded, correct, avg_calibration, avg_margin): (i64, i64, Option<f64>, Option<f64>) =
        conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(was_correct), 0), AVG(calibration), AVG(score_difference) \
             FROM prediction_accuracy",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .context("summarize accuracy")?;

    let accuracy_rate = if graded > 0 {
        correct as f64 / graded as f64
    } else {
        0.0
    };
    Ok(AccuracySummary {
        predictions,
        graded,
        correct,
        accuracy_rate,
        avg_calibration: avg_calibration.unwrap_or(0.0),
        avg_margin: avg_margin.unwrap_or(0.0),
    })
}

pub fn recent_games(conn: &Connection, limit: usize) -> Result<Vec<GradedGame>> {
    let mut stmt = conn
        .prepare(
            "SELECT p.game_id, p.team1, p.team2, p.predicted_winner, p.confidence, \
                    r.actual_winner, r.home_score, r.away_score, \
                    a.was_correct, a.score_difference, p.created_at \
             FROM predictions p \
             JOIN game_results r ON p.game_id = r.game_id \
             JOIN prediction_accuracy a ON p.game_id = a.game_id \
             ORDER BY p.created_at DESC LIMIT ?1",
        )
        .context("prepare graded list")?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(GradedGame {
                game_id: row.get(0)?,
                team1: row.get(1)?,
                team2: row.get(2)?,
                predicted_winner: row.get(3)?,
                confidence: row.get(4)?,
                actual_winner: row.get(5)?,
                home_score: row.get(6)?,
                away_score: row.get(7)?,
                was_correct: row.get::<_, i64>(8)? != 0,
                score_difference: row.get(9)?,
                created_at: row.get(10)?,
            })
        })
        .context("list graded games")?;
    let mut out = Vec::new();
    for game in rows {
        out.push(game.context("read graded row")?);
    }
    Ok(out)
}

pub fn team_from_prediction(
    conn: &Connection,
    game_id: &str,
    field: TeamField,
) -> Result<Option<String>> {
    let sql = format!("SELECT {} FROM predictions WHERE game_id = ?1", field.column());
    match conn.query_row(&sql, params![game_id], |row| row.get::<_, String>(0)) {
        Ok(team) => Ok(Some(team)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("lookup {} of {game_id}", field.column())),
    }
}
