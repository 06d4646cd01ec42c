use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use rusqlite::Connection;

use crate::positions::{PlayerRecord, PositionGroup};
use crate::stats_store;

#[derive(Debug, Clone)]
pub struct TeamSnapshot {
    pub team: String,
    pub week: Option<u16>,
    pub season: i32,
    pub groups: BTreeMap<PositionGroup, Vec<PlayerRecord>>,
}

/// One team across every position group. Groups with no data are present as
/// empty lists, so callers can tell "no category" from "no players".
pub fn snapshot(
    conn: &Connection,
    team: &str,
    week: Option<u16>,
    season: i32,
) -> Result<TeamSnapshot> {
    let mut groups = BTreeMap::new();
    for group in PositionGroup::ALL {
        let records = stats_store::team_records(conn, group, team, week, season)?;
        groups.insert(group, collapse_duplicates(records));
    }
    Ok(TeamSnapshot {
        team: team.to_string(),
        week,
        season,
        groups,
    })
}

/// Providers disagree on player ids, so the same player is the same trimmed,
/// lowercased name. Input arrives sorted by (source priority, name); keeping
/// the first occurrence keeps the most trusted record.
fn collapse_duplicates(records: Vec<PlayerRecord>) -> Vec<PlayerRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(record.player_name.trim().to_lowercase()) {
            out.push(record);
        }
    }
    out
}
