use rusqlite::Connection;

use gridiron_picks::positions::{
    CornerbackStats, DefensiveLineStats, GroupStats, PlayerRecord, PositionGroup,
    QuarterbackStats, RunningBackStats,
};
use gridiron_picks::sources::Source;
use gridiron_picks::stats_store;
use gridiron_picks::summary;
use gridiron_picks::team_snapshot;

const EAGLES: &str = "Philadelphia Eagles";
const GIANTS: &str = "New York Giants";

fn store() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory db");
    stats_store::init_schema(&conn).expect("schema init");
    conn
}

fn record(
    player_id: u32,
    name: &str,
    team: &str,
    position: &str,
    week: u16,
    source: Source,
    stats: GroupStats,
) -> PlayerRecord {
    PlayerRecord {
        player_id,
        player_name: name.to_string(),
        team: team.to_string(),
        position: position.to_string(),
        week,
        season: 2025,
        source,
        last_updated: "2025-09-23T00:00:00Z".to_string(),
        stats,
    }
}

fn quarterback(player_id: u32, name: &str, team: &str, week: u16, rating: f64) -> PlayerRecord {
    record(
        player_id,
        name,
        team,
        "QB",
        week,
        Source::Api,
        GroupStats::Quarterback(QuarterbackStats {
            passing_yards: 280,
            passing_touchdowns: 2,
            interceptions: 1,
            completions: 24,
            attempts: 33,
            passer_rating: rating,
            qbr: Some(61.0),
            ..Default::default()
        }),
    )
}

fn running_back(player_id: u32, name: &str, team: &str, week: u16) -> PlayerRecord {
    record(
        player_id,
        name,
        team,
        "RB",
        week,
        Source::Api,
        GroupStats::RunningBack(RunningBackStats {
            rushing_yards: 84,
            rushing_attempts: 17,
            ..Default::default()
        }),
    )
}

fn cornerback(player_id: u32, name: &str, interceptions: i64, tackles: i64) -> PlayerRecord {
    record(
        player_id,
        name,
        GIANTS,
        "CB",
        3,
        Source::Api,
        GroupStats::Cornerback(CornerbackStats {
            tackles,
            interceptions,
            passes_defended: 4,
            ..Default::default()
        }),
    )
}

#[test]
fn write_then_query_round_trips_nulls() {
    let conn = store();
    let original = quarterback(11, "Jalen Hurts", EAGLES, 3, 103.8);
    stats_store::write_record(&conn, &original).expect("write");

    let rows = stats_store::query_records(
        &conn,
        PositionGroup::Quarterback,
        Some(EAGLES),
        None,
        Some(3),
        2025,
    )
    .expect("query");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.player_id, 11);
    assert_eq!(row.player_name, "Jalen Hurts");
    assert_eq!(row.position, "QB");
    assert_eq!(row.source, Source::Api);
    assert_eq!(row.stats, original.stats);

    let GroupStats::Quarterback(stats) = &row.stats else {
        panic!("wrong stat group");
    };
    assert_eq!(stats.qbr, Some(61.0));
    assert_eq!(stats.epa_per_play, None);
}

#[test]
fn invalid_identity_is_rejected() {
    let conn = store();

    let mut no_id = quarterback(11, "Jalen Hurts", EAGLES, 3, 100.0);
    no_id.player_id = 0;
    assert!(stats_store::write_record(&conn, &no_id).is_err());

    let no_name = quarterback(11, "   ", EAGLES, 3, 100.0);
    assert!(stats_store::write_record(&conn, &no_name).is_err());

    let no_team = quarterback(11, "Jalen Hurts", "", 3, 100.0);
    assert!(stats_store::write_record(&conn, &no_team).is_err());

    let counts = stats_store::table_counts(&conn).expect("counts");
    assert!(counts.iter().all(|(_, count)| *count == 0));
}

#[test]
fn rewrite_replaces_the_whole_row() {
    let conn = store();
    stats_store::write_record(&conn, &quarterback(11, "Jalen Hurts", EAGLES, 3, 103.8))
        .expect("first write");

    let mut revised = quarterback(11, "Jalen Hurts", EAGLES, 3, 88.2);
    revised.source = Source::Starters;
    if let GroupStats::Quarterback(stats) = &mut revised.stats {
        stats.qbr = None;
        stats.interceptions = 2;
    }
    stats_store::write_record(&conn, &revised).expect("second write");

    let rows = stats_store::query_records(
        &conn,
        PositionGroup::Quarterback,
        Some(EAGLES),
        Some(11),
        Some(3),
        2025,
    )
    .expect("query");
    assert_eq!(rows.len(), 1);
    let GroupStats::Quarterback(stats) = &rows[0].stats else {
        panic!("wrong stat group");
    };
    assert!((stats.passer_rating - 88.2).abs() < 1e-9);
    assert_eq!(stats.interceptions, 2);
    assert_eq!(stats.qbr, None, "stale advanced value survived the rewrite");
    assert_eq!(rows[0].source, Source::Starters);
}

#[test]
fn weeks_of_a_season_coexist() {
    let conn = store();
    stats_store::write_record(&conn, &quarterback(11, "Jalen Hurts", EAGLES, 3, 103.8))
        .expect("week 3");
    stats_store::write_record(&conn, &quarterback(11, "Jalen Hurts", EAGLES, 4, 95.6))
        .expect("week 4");

    let all_weeks = stats_store::query_records(
        &conn,
        PositionGroup::Quarterback,
        Some(EAGLES),
        Some(11),
        None,
        2025,
    )
    .expect("query");
    assert_eq!(all_weeks.len(), 2);

    let week_4 = stats_store::query_records(
        &conn,
        PositionGroup::Quarterback,
        Some(EAGLES),
        Some(11),
        Some(4),
        2025,
    )
    .expect("query");
    assert_eq!(week_4.len(), 1);
    let GroupStats::Quarterback(stats) = &week_4[0].stats else {
        panic!("wrong stat group");
    };
    assert!((stats.passer_rating - 95.6).abs() < 1e-9);
}

#[test]
fn quarterbacks_rank_by_passer_rating() {
    let conn = store();
    stats_store::write_record(&conn, &quarterback(1, "Game Manager", EAGLES, 3, 88.0))
        .expect("write");
    stats_store::write_record(&conn, &quarterback(2, "Franchise Arm", EAGLES, 3, 112.4))
        .expect("write");
    stats_store::write_record(&conn, &quarterback(3, "Solid Veteran", EAGLES, 3, 95.1))
        .expect("write");

    let rows = stats_store::query_records(
        &conn,
        PositionGroup::Quarterback,
        Some(EAGLES),
        None,
        Some(3),
        2025,
    )
    .expect("query");
    let names: Vec<&str> = rows.iter().map(|r| r.player_name.as_str()).collect();
    assert_eq!(names, ["Franchise Arm", "Solid Veteran", "Game Manager"]);
}

#[test]
fn cornerbacks_rank_by_interceptions_then_tackles() {
    let conn = store();
    stats_store::write_record(&conn, &cornerback(21, "Ballhawk", 5, 10)).expect("write");
    stats_store::write_record(&conn, &cornerback(22, "Sure Tackler", 3, 55)).expect("write");
    stats_store::write_record(&conn, &cornerback(23, "Cover Corner", 3, 40)).expect("write");

    let rows = stats_store::query_records(
        &conn,
        PositionGroup::Cornerback,
        Some(GIANTS),
        None,
        Some(3),
        2025,
    )
    .expect("query");
    let names: Vec<&str> = rows.iter().map(|r| r.player_name.as_str()).collect();
    assert_eq!(names, ["Ballhawk", "Sure Tackler", "Cover Corner"]);
}

#[test]
fn unknown_team_filter_is_empty() {
    let conn = store();
    stats_store::write_record(&conn, &quarterback(11, "Jalen Hurts", EAGLES, 3, 103.8))
        .expect("write");
    let rows = stats_store::query_records(
        &conn,
        PositionGroup::Quarterback,
        Some("Canton Bulldogs"),
        None,
        None,
        2025,
    )
    .expect("query");
    assert!(rows.is_empty());
}

#[test]
fn clear_week_counts_rows_across_tables() {
    let conn = store();
    stats_store::write_record(&conn, &quarterback(11, "Jalen Hurts", EAGLES, 3, 103.8))
        .expect("write");
    stats_store::write_record(&conn, &running_back(26, "Saquon Barkley", EAGLES, 3))
        .expect("write");
    stats_store::write_record(&conn, &quarterback(11, "Jalen Hurts", EAGLES, 4, 95.6))
        .expect("write");

    let removed = stats_store::clear_week(&conn, 3, 2025).expect("clear");
    assert_eq!(removed, 2);

    let counts = stats_store::table_counts(&conn).expect("counts");
    let qb_count = counts
        .iter()
        .find(|(group, _)| *group == PositionGroup::Quarterback)
        .map(|(_, count)| *count);
    assert_eq!(qb_count, Some(1));
    let rb_count = counts
        .iter()
        .find(|(group, _)| *group == PositionGroup::RunningBack)
        .map(|(_, count)| *count);
    assert_eq!(rb_count, Some(0));
}

#[test]
fn all_teams_unions_every_table() {
    let conn = store();
    stats_store::write_record(&conn, &quarterback(11, "Jalen Hurts", EAGLES, 3, 103.8))
        .expect("write");
    stats_store::write_record(&conn, &running_back(26, "Saquon Barkley", EAGLES, 3))
        .expect("write");
    stats_store::write_record(&conn, &cornerback(21, "Deonte Banks", 2, 18)).expect("write");

    let teams = stats_store::all_teams(&conn).expect("teams");
    assert_eq!(teams, vec![GIANTS.to_string(), EAGLES.to_string()]);
}

#[test]
fn team_records_order_by_source_trust() {
    let conn = store();
    let mut starter = quarterback(1, "Named Starter", EAGLES, 3, 90.0);
    starter.source = Source::Starters;
    let mut sampled = quarterback(2, "Filler Row", EAGLES, 3, 120.0);
    sampled.source = Source::Sample;
    let api = quarterback(3, "Feed Player", EAGLES, 3, 100.0);
    stats_store::write_record(&conn, &sampled).expect("write");
    stats_store::write_record(&conn, &starter).expect("write");
    stats_store::write_record(&conn, &api).expect("write");

    let rows = stats_store::team_records(&conn, PositionGroup::Quarterback, EAGLES, Some(3), 2025)
        .expect("team records");
    let names: Vec<&str> = rows.iter().map(|r| r.player_name.as_str()).collect();
    assert_eq!(names, ["Named Starter", "Feed Player", "Filler Row"]);
}

#[test]
fn snapshot_deduplicates_players_by_name() {
    let conn = store();
    let dl_stats = || {
        GroupStats::DefensiveLine(DefensiveLineStats {
            tackles: 30,
            sacks: 4.5,
            ..Default::default()
        })
    };
    let trusted = record(71, "Jalen Carter", EAGLES, "DT", 3, Source::Starters, dl_stats());
    let duplicate = record(72, " jalen carter ", EAGLES, "DT", 3, Source::Sample, dl_stats());
    stats_store::write_record(&conn, &trusted).expect("write");
    stats_store::write_record(&conn, &duplicate).expect("write");

    let snap = team_snapshot::snapshot(&conn, EAGLES, Some(3), 2025).expect("snapshot");
    assert_eq!(snap.groups.len(), PositionGroup::ALL.len());
    let line = &snap.groups[&PositionGroup::DefensiveLine];
    assert_eq!(line.len(), 1);
    assert_eq!(line[0].player_id, 71);
    assert_eq!(line[0].source, Source::Starters);
    assert!(snap.groups[&PositionGroup::Quarterback].is_empty());
}

#[test]
fn snapshot_renders_stored_stats() {
    let conn = store();
    stats_store::write_record(&conn, &quarterback(11, "Jalen Hurts", EAGLES, 3, 103.8))
        .expect("write");

    let snap = team_snapshot::snapshot(&conn, EAGLES, Some(3), 2025).expect("snapshot");
    let text = summary::render_team_stats(&snap).expect("render");
    assert!(text.starts_with("Philadelphia Eagles (season 2025, week 3)"));
    assert!(text.contains("[Quarterback] Jalen Hurts"));
    assert!(text.contains("passer_rating = 103.8"));
    assert!(text.contains("epa_per_play = n/a"));
}
