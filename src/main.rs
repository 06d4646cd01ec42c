use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;

use gridiron_picks::accuracy_export;
use gridiron_picks::analysis;
use gridiron_picks::config::{self, AppConfig};
use gridiron_picks::extract::ExtractedPrediction;
use gridiron_picks::prediction_store::{self, GameResult, TeamField};
use gridiron_picks::season;
use gridiron_picks::stats_store;
use gridiron_picks::summary;
use gridiron_picks::team_names;
use gridiron_picks::team_snapshot;

fn main() {
    config::load_env_files();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first().map(String::as_str) else {
        print_usage();
        process::exit(2);
    };
    let rest = &args[1..];

    let outcome = match command {
        "analyze" => cmd_analyze(rest),
        "result" => cmd_result(rest),
        "accuracy" => cmd_accuracy(rest),
        "predictions" => cmd_predictions(rest),
        "stats" => cmd_stats(rest),
        "teams" => cmd_teams(),
        "export" => cmd_export(rest),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("unknown command {other:?}");
            print_usage();
            process::exit(2);
        }
    };

    if let Err(err) = outcome {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("gridiron_picks COMMAND");
    println!();
    println!("  analyze TEAM1 TEAM2 --home TEAM [--report FILE|-] [--week N] [--season N]");
    println!("      read a matchup report (file or stdin) and store the pick");
    println!("  result GAME_ID HOME_SCORE AWAY_SCORE [--date D] [--weather W]");
    println!("      record the final score and grade the stored pick");
    println!("  accuracy [N]        summary plus the last N graded games (default 10)");
    println!("  predictions [N]     newest stored picks (default 10)");
    println!("  stats TEAM [--week N] [--season N]");
    println!("      top stored stat line per position group");
    println!("  teams               registry, starred when records exist");
    println!("  export PATH.xlsx    write the accuracy workbook");
    println!();
    println!("Teams accept registry codes (PHI) or full names (Philadelphia Eagles).");
}

fn cmd_analyze(args: &[String]) -> Result<()> {
    let cfg = AppConfig::from_env();
    let positional = positionals(args);
    let [team1_raw, team2_raw] = positional.as_slice() else {
        return Err(anyhow!(
            "usage: analyze TEAM1 TEAM2 --home TEAM [--report FILE|-] [--week N] [--season N]"
        ));
    };
    let team1 = resolve_team(team1_raw)?;
    let team2 = resolve_team(team2_raw)?;
    if team1 == team2 {
        return Err(anyhow!("need two different teams"));
    }
    let home_raw = flag_value(args, "--home").ok_or_else(|| anyhow!("--home TEAM is required"))?;
    let home = resolve_team(&home_raw)?;
    if home != team1 && home != team2 {
        return Err(anyhow!("home team must be {team1} or {team2}"));
    }
    let week = parse_week_flag(args)?.unwrap_or_else(season::current_week);
    let season_year = parse_season_flag(args)?.unwrap_or_else(season::current_season);
    let report_text = read_report(flag_value(args, "--report").as_deref())?;

    let conn = prediction_store::open_db(&cfg.ledger_db_path)?;
    let prediction =
        analysis::record_analysis(&conn, team1, team2, home, week, season_year, &report_text)?;
    let extracted: ExtractedPrediction = serde_json::from_str(&prediction.analysis_json)
        .context("decode stored analysis payload")?;

    println!("{}", analysis::render_report(&extracted, week, season_year));
    println!("Saved prediction {}", prediction.game_id);
    let path = analysis::save_report_file(&cfg.report_dir, &extracted, week, season_year)?;
    println!("Report file: {}", path.display());
    Ok(())
}

fn cmd_result(args: &[String]) -> Result<()> {
    let cfg = AppConfig::from_env();
    let positional = positionals(args);
    let [game_id, home_raw, away_raw] = positional.as_slice() else {
        return Err(anyhow!(
            "usage: result GAME_ID HOME_SCORE AWAY_SCORE [--date D] [--weather W]"
        ));
    };
    let home_score = parse_score(home_raw)?;
    let away_score = parse_score(away_raw)?;

    let conn = prediction_store::open_db(&cfg.ledger_db_path)?;
    let missing = || anyhow!("no prediction stored for {game_id}");
    let team1 = prediction_store::team_from_prediction(&conn, game_id, TeamField::Team1)?
        .ok_or_else(missing)?;
    let team2 = prediction_store::team_from_prediction(&conn, game_id, TeamField::Team2)?
        .ok_or_else(missing)?;
    let home_team = prediction_store::team_from_prediction(&conn, game_id, TeamField::HomeTeam)?
        .ok_or_else(missing)?;

    let actual_winner =
        analysis::resolve_actual_winner(&team1, &team2, &home_team, home_score, away_score);
    prediction_store::save_result(
        &conn,
        &GameResult {
            game_id: game_id.clone(),
            team1,
            team2,
            home_team,
            actual_winner: actual_winner.clone(),
            home_score,
            away_score,
            game_date: flag_value(args, "--date"),
            weather: flag_value(args, "--weather"),
            week: season::current_week(),
            season: season::current_season(),
            recorded_at: Utc::now().to_rfc3339(),
        },
    )?;

    println!("Result saved: {actual_winner} ({home_score}-{away_score})");
    match prediction_store::compute_accuracy(&conn, game_id)? {
        Some(row) => {
            println!("Pick was {}", if row.was_correct { "correct" } else { "wrong" });
            println!("Margin: {}", row.score_difference);
            println!("Calibration: {:.2}", row.calibration);
        }
        None => println!("No prediction to grade."),
    }
    Ok(())
}

fn cmd_accuracy(args: &[String]) -> Result<()> {
    let cfg = AppConfig::from_env();
    let conn = prediction_store::open_db(&cfg.ledger_db_path)?;
    let summary = prediction_store::accuracy_summary(&conn)?;

    println!("Predictions: {}", summary.predictions);
    println!("Graded: {}", summary.graded);
    println!("Correct: {}", summary.correct);
    println!("Accuracy: {:.1}%", summary.accuracy_rate * 100.0);
    println!("Avg calibration: {:.3}", summary.avg_calibration);
    println!("Avg margin: {:.1}", summary.avg_margin);

    let limit = positionals(args)
        .first()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(10);
    let recent = prediction_store::recent_games(&conn, limit)?;
    if recent.is_empty() {
        return Ok(());
    }
    println!();
    println!("Recent graded games:");
    for game in recent {
        println!(
            "  [{}] {} vs {}: picked {}, actual {} ({}-{})",
            if game.was_correct { "hit " } else { "miss" },
            game.team1,
            game.team2,
            game.predicted_winner,
            game.actual_winner,
            game.home_score,
            game.away_score,
        );
    }
    Ok(())
}

fn cmd_predictions(args: &[String]) -> Result<()> {
    let cfg = AppConfig::from_env();
    let conn = prediction_store::open_db(&cfg.ledger_db_path)?;
    let limit = positionals(args)
        .first()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(10);
    let predictions = prediction_store::recent_predictions(&conn, Some(limit))?;
    if predictions.is_empty() {
        println!("no stored predictions");
        return Ok(());
    }
    for p in predictions {
        println!(
            "{}  week {:>2}  {} vs {}: {} ({:.0}%)",
            p.game_id,
            p.week,
            p.team1,
            p.team2,
            p.predicted_winner,
            p.confidence * 100.0,
        );
    }
    Ok(())
}

fn cmd_stats(args: &[String]) -> Result<()> {
    let cfg = AppConfig::from_env();
    let positional = positionals(args);
    let [team_raw] = positional.as_slice() else {
        return Err(anyhow!("usage: stats TEAM [--week N] [--season N]"));
    };
    let team = resolve_team(team_raw)?;
    let week = parse_week_flag(args)?;
    let season_year = parse_season_flag(args)?.unwrap_or_else(season::current_season);

    let conn = stats_store::open_db(&cfg.stats_db_path)?;
    let snapshot = team_snapshot::snapshot(&conn, team, week, season_year)?;
    print!("{}", summary::render_team_stats(&snapshot)?);
    Ok(())
}

fn cmd_teams() -> Result<()> {
    let cfg = AppConfig::from_env();
    let conn = stats_store::open_db(&cfg.stats_db_path)?;
    let with_records: HashSet<String> = stats_store::all_teams(&conn)?.into_iter().collect();
    for (code, name) in team_names::TEAMS {
        let mark = if with_records.contains(name) { "*" } else { " " };
        println!("{mark} {code:<4} {name}");
    }
    if !with_records.is_empty() {
        println!();
        println!("* has stored records");
    }
    Ok(())
}

fn cmd_export(args: &[String]) -> Result<()> {
    let cfg = AppConfig::from_env();
    let positional = positionals(args);
    let [path_raw] = positional.as_slice() else {
        return Err(anyhow!("usage: export PATH.xlsx"));
    };
    let path = PathBuf::from(path_raw);
    let conn = prediction_store::open_db(&cfg.ledger_db_path)?;
    let report = accuracy_export::export_accuracy(&path, &conn)?;
    println!(
        "Exported {} predictions, {} graded games to {}",
        report.predictions,
        report.graded,
        path.display()
    );
    Ok(())
}

fn resolve_team(raw: &str) -> Result<&'static str> {
    team_names::resolve(raw)
        .ok_or_else(|| anyhow!("unknown team {raw:?} (use a code like PHI or a full name)"))
}

fn parse_score(raw: &str) -> Result<i32> {
    let score = raw
        .trim()
        .parse::<i32>()
        .map_err(|_| anyhow!("score {raw:?} is not a number"))?;
    if score < 0 {
        return Err(anyhow!("score {score} is negative"));
    }
    Ok(score)
}

fn parse_week_flag(args: &[String]) -> Result<Option<u16>> {
    match flag_value(args, "--week") {
        Some(raw) => {
            let week = raw
                .parse::<u16>()
                .map_err(|_| anyhow!("--week wants a number, got {raw:?}"))?;
            Ok(Some(week.clamp(season::FIRST_WEEK, season::LAST_WEEK)))
        }
        None => Ok(None),
    }
}

fn parse_season_flag(args: &[String]) -> Result<Option<i32>> {
    match flag_value(args, "--season") {
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| anyhow!("--season wants a year, got {raw:?}")),
        None => Ok(None),
    }
}

fn read_report(path: Option<&str>) -> Result<String> {
    match path {
        None | Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("read report from stdin")?;
            if text.trim().is_empty() {
                return Err(anyhow!("empty report text on stdin"));
            }
            Ok(text)
        }
        Some(file) => {
            let text = fs::read_to_string(file).with_context(|| format!("read report {file}"))?;
            if text.trim().is_empty() {
                return Err(anyhow!("report {file} is empty"));
            }
            Ok(text)
        }
    }
}

/// Arguments before/between flags. Every `--flag` here takes a value, so the
/// token after a bare `--flag` belongs to it.
fn positionals(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < args.len() {
        let arg = &args[idx];
        if arg.starts_with("--") {
            idx += if arg.contains('=') { 1 } else { 2 };
            continue;
        }
        out.push(arg.clone());
        idx += 1;
    }
    out
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&format!("{flag}=")) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
