use std::path::PathBuf;

use anyhow::{anyhow, Result};

use gridiron_picks::config::{self, AppConfig};
use gridiron_picks::sample_feed;
use gridiron_picks::season;
use gridiron_picks::stats_api::{self, ApiConfig, FetchOutcome};
use gridiron_picks::stats_store;
use gridiron_picks::team_names;

#[derive(Default)]
struct IngestSummary {
    teams: usize,
    written: usize,
    skipped: usize,
    cleared: usize,
    failures: Vec<String>,
}

fn main() -> Result<()> {
    config::load_env_files();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if flag_present(&args, "--help") || flag_present(&args, "-h") {
        print_usage();
        return Ok(());
    }

    let cfg = AppConfig::from_env();
    let week = parse_week(&args)?;
    let season_year = parse_season(&args)?;
    let force_sample = flag_present(&args, "--sample");
    let clear_first = flag_present(&args, "--clear-first");
    let db_path = flag_value(&args, "--db")
        .map(PathBuf::from)
        .unwrap_or(cfg.stats_db_path);
    let targets = resolve_targets(flag_value(&args, "--team").as_deref())?;

    let api_cfg = ApiConfig::from_env();
    let use_api = api_cfg.enabled() && !force_sample;

    let conn = stats_store::open_db(&db_path)?;
    let mut summary = IngestSummary::default();
    if clear_first {
        summary.cleared = stats_store::clear_week(&conn, week, season_year)?;
    }

    for (code, name) in targets {
        let outcome = if use_api {
            match stats_api::fetch_team_stats(&api_cfg, code, week, season_year) {
                Ok(outcome) => outcome,
                Err(err) => {
                    summary.failures.push(format!("{code}: {err:#}"));
                    continue;
                }
            }
        } else {
            FetchOutcome {
                records: sample_feed::sample_team_records(name, week, season_year),
                skipped: 0,
            }
        };

        summary.skipped += outcome.skipped;
        for record in &outcome.records {
            match stats_store::write_record(&conn, record) {
                Ok(()) => summary.written += 1,
                Err(err) => summary
                    .failures
                    .push(format!("{}: {err:#}", record.player_name)),
            }
        }
        summary.teams += 1;
    }

    println!("Ingest complete for week {week}, season {season_year}");
    println!("  mode:    {}", if use_api { "api" } else { "sample" });
    println!("  teams:   {}", summary.teams);
    println!("  written: {}", summary.written);
    println!("  skipped: {}", summary.skipped);
    if clear_first {
        println!("  cleared: {}", summary.cleared);
    }
    if !summary.failures.is_empty() {
        println!("  failures ({}):", summary.failures.len());
        for line in &summary.failures {
            println!("    {line}");
        }
    }

    println!();
    println!("Stored rows per table:");
    for (group, count) in stats_store::table_counts(&conn)? {
        println!("  {:<16} {count}", group.label());
    }
    Ok(())
}

fn print_usage() {
    println!("update_stats [--week N] [--season N] [--team CODE] [--sample] [--clear-first] [--db PATH]");
    println!();
    println!("Pulls player stat lines for every registry team (or one --team) and");
    println!("upserts them into the stats database. With STATS_API_KEY unset, or with");
    println!("--sample, generated sample rosters stand in for the provider.");
    println!();
    println!("  --week N        target week 1-18 (default: current week)");
    println!("  --season N      season year (default: current season)");
    println!("  --team CODE     one team, by code or full name");
    println!("  --sample        skip the provider even when a key is configured");
    println!("  --clear-first   delete stored rows for the week before writing");
    println!("  --db PATH       stats database path (default: STATS_DB_PATH)");
}

fn resolve_targets(team_flag: Option<&str>) -> Result<Vec<(&'static str, &'static str)>> {
    match team_flag {
        Some(raw) => {
            let trimmed = raw.trim();
            let entry = team_names::TEAMS
                .iter()
                .find(|(code, name)| {
                    code.eq_ignore_ascii_case(trimmed) || name.eq_ignore_ascii_case(trimmed)
                })
                .copied()
                .ok_or_else(|| anyhow!("unknown team {trimmed:?}"))?;
            Ok(vec![entry])
        }
        None => Ok(team_names::TEAMS.to_vec()),
    }
}

fn parse_week(args: &[String]) -> Result<u16> {
    match flag_value(args, "--week") {
        Some(raw) => {
            let week = raw
                .parse::<u16>()
                .map_err(|_| anyhow!("--week wants a number, got {raw:?}"))?;
            Ok(week.clamp(season::FIRST_WEEK, season::LAST_WEEK))
        }
        None => Ok(season::current_week()),
    }
}

fn parse_season(args: &[String]) -> Result<i32> {
    match flag_value(args, "--season") {
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| anyhow!("--season wants a year, got {raw:?}")),
        None => Ok(season::current_season()),
    }
}

fn flag_present(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
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
