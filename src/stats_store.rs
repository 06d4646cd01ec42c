use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::{Map, Value};

use crate::positions::{GroupStats, PlayerRecord, PositionGroup, StatColumn, StatKind};
use crate::sources::Source;

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create stats db dir {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("open stats db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    let mut script = String::from("PRAGMA journal_mode = WAL;\n");
    for group in PositionGroup::ALL {
        script.push_str(&create_table_sql(group));
    }
    conn.execute_batch(&script).context("init stats schema")
}

fn create_table_sql(group: PositionGroup) -> String {
    let mut stat_cols = String::new();
    for column in group.stat_columns() {
        stat_cols.push_str(&format!("    {} {},\n", column.name, column.kind.sql_type()));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n\
         \x20   id INTEGER PRIMARY KEY AUTOINCREMENT,\n\
         \x20   player_id INTEGER NOT NULL,\n\
         \x20   player_name TEXT NOT NULL,\n\
         \x20   team TEXT NOT NULL,\n\
         \x20   position TEXT NOT NULL,\n\
         \x20   week INTEGER NOT NULL,\n\
         \x20   season INTEGER NOT NULL,\n\
         {stat_cols}\
         \x20   source TEXT NOT NULL DEFAULT 'api',\n\
         \x20   last_updated TEXT NOT NULL,\n\
         \x20   UNIQUE (player_id, week, season)\n\
         );\n\
         CREATE INDEX IF NOT EXISTS idx_{table}_team_season ON {table} (team, season);\n",
        table = group.table(),
    )
}

fn stat_column_list(group: PositionGroup) -> String {
    group
        .stat_columns()
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn upsert_sql(group: PositionGroup) -> String {
    let mut columns: Vec<&str> = vec!["player_id", "player_name", "team", "position", "week", "season"];
    columns.extend(group.stat_columns().iter().map(|c| c.name));
    columns.push("source");
    columns.push("last_updated");

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    // Conflict key columns stay; everything else is replaced wholesale.
    let updates: Vec<String> = columns
        .iter()
        .filter(|c| !["player_id", "week", "season"].contains(c))
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();

    format!(
        "INSERT INTO {table} ({cols}) VALUES ({vals})\n\
         ON CONFLICT(player_id, week, season) DO UPDATE SET {updates}",
        table = group.table(),
        cols = columns.join(", "),
        vals = placeholders.join(", "),
        updates = updates.join(", "),
    )
}

fn json_to_sql(column: &StatColumn, value: &Value) -> SqlValue {
    if value.is_null() {
        return SqlValue::Null;
    }
    match column.kind {
        StatKind::BaseInt | StatKind::AdvInt => SqlValue::Integer(value.as_i64().unwrap_or(0)),
        StatKind::BaseReal | StatKind::AdvReal => SqlValue::Real(value.as_f64().unwrap_or(0.0)),
    }
}

fn stat_params(stats: &GroupStats) -> Result<Vec<SqlValue>> {
    let json = stats.to_json()?;
    let obj = json.as_object().context("stats payload is not an object")?;
    let mut out = Vec::with_capacity(obj.len());
    for column in stats.group().stat_columns() {
        let value = obj.get(column.name).cloned().unwrap_or(Value::Null);
        out.push(json_to_sql(column, &value));
    }
    Ok(out)
}

/// Upserts one record into its group's table. Same (player_id, week, season)
/// replaces the previous row entirely, advanced NULLs included.
pub fn write_record(conn: &Connection, record: &PlayerRecord) -> Result<()> {
    if record.player_id == 0 {
        return Err(anyhow!("record for {:?} has no player id", record.player_name));
    }
    if record.player_name.trim().is_empty() {
        return Err(anyhow!("record {} has no player name", record.player_id));
    }
    if record.team.trim().is_empty() {
        return Err(anyhow!("record for {} has no team", record.player_name));
    }

    let group = record.group();
    let mut values: Vec<SqlValue> = vec![
        SqlValue::Integer(i64::from(record.player_id)),
        SqlValue::Text(record.player_name.clone()),
        SqlValue::Text(record.team.clone()),
        SqlValue::Text(record.position.clone()),
        SqlValue::Integer(i64::from(record.week)),
        SqlValue::Integer(i64::from(record.season)),
    ];
    values.extend(stat_params(&record.stats)?);
    values.push(SqlValue::Text(record.source.as_str().to_string()));
    values.push(SqlValue::Text(record.last_updated.clone()));

    conn.execute(&upsert_sql(group), params_from_iter(values))
        .with_context(|| format!("upsert {} record", group.table()))?;
    Ok(())
}

struct RawRow {
    player_id: i64,
    player_name: String,
    team: String,
    position: String,
    week: i64,
    season: i64,
    stats: Map<String, Value>,
    source: String,
    last_updated: String,
}

fn read_row(group: PositionGroup, row: &Row<'_>) -> rusqlite::Result<RawRow> {
    let columns = group.stat_columns();
    let mut stats = Map::new();
    for (offset, column) in columns.iter().enumerate() {
        let idx = 6 + offset;
        let value = match column.kind {
            StatKind::BaseInt | StatKind::AdvInt => row
                .get::<_, Option<i64>>(idx)?
                .map(Value::from)
                .unwrap_or(Value::Null),
            StatKind::BaseReal | StatKind::AdvReal => row
                .get::<_, Option<f64>>(idx)?
                .map(Value::from)
                .unwrap_or(Value::Null),
        };
        stats.insert(column.name.to_string(), value);
    }
    Ok(RawRow {
        player_id: row.get(0)?,
        player_name: row.get(1)?,
        team: row.get(2)?,
        position: row.get(3)?,
        week: row.get(4)?,
        season: row.get(5)?,
        stats,
        source: row.get(6 + columns.len())?,
        last_updated: row.get(7 + columns.len())?,
    })
}

fn finish_row(group: PositionGroup, raw: RawRow) -> Result<PlayerRecord> {
    let stats = GroupStats::from_json(group, &Value::Object(raw.stats))?;
    Ok(PlayerRecord {
        player_id: raw.player_id as u32,
        player_name: raw.player_name,
        team: raw.team,
        position: raw.position,
        week: raw.week as u16,
        season: raw.season as i32,
        source: Source::parse(&raw.source),
        last_updated: raw.last_updated,
        stats,
    })
}

/// Filtered select over one group's table, best-ranked first. Filters that
/// match nothing yield an empty vec.
pub fn query_records(
    conn: &Connection,
    group: PositionGroup,
    team: Option<&str>,
    player_id: Option<u32>,
    week: Option<u16>,
    season: i32,
) -> Result<Vec<PlayerRecord>> {
    let mut sql = format!(
        "SELECT player_id, player_name, team, position, week, season, {stats}, source, last_updated \
         FROM {table} WHERE season = ?1",
        stats = stat_column_list(group),
        table = group.table(),
    );
    let mut values: Vec<SqlValue> = vec![SqlValue::Integer(i64::from(season))];
    if let Some(team) = team {
        values.push(SqlValue::Text(team.to_string()));
        sql.push_str(&format!(" AND team = ?{}", values.len()));
    }
    if let Some(player_id) = player_id {
        values.push(SqlValue::Integer(i64::from(player_id)));
        sql.push_str(&format!(" AND player_id = ?{}", values.len()));
    }
    if let Some(week) = week {
        values.push(SqlValue::Integer(i64::from(week)));
        sql.push_str(&format!(" AND week = ?{}", values.len()));
    }
    sql.push_str(&format!(" ORDER BY {}, player_name", group.rank_order()));

    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("prepare {} query", group.table()))?;
    let rows = stmt
        .query_map(params_from_iter(values), |row| read_row(group, row))
        .with_context(|| format!("query {}", group.table()))?;

    let mut out = Vec::new();
    for raw in rows {
        let raw = raw.with_context(|| format!("read {} row", group.table()))?;
        out.push(finish_row(group, raw)?);
    }
    Ok(out)
}

/// Aggregation feeder: one team's records for a group, most trusted source
/// first, then name order.
pub fn team_records(
    conn: &Connection,
    group: PositionGroup,
    team: &str,
    week: Option<u16>,
    season: i32,
) -> Result<Vec<PlayerRecord>> {
    let mut records = query_records(conn, group, Some(team), None, week, season)?;
    records.sort_by_key(|r| (r.source.priority(), r.player_name.to_lowercase()));
    Ok(records)
}

pub fn all_teams(conn: &Connection) -> Result<Vec<String>> {
    let selects: Vec<String> = PositionGroup::ALL
        .iter()
        .map(|g| format!("SELECT team FROM {}", g.table()))
        .collect();
    let sql = format!("{} ORDER BY team", selects.join(" UNION "));
    let mut stmt = conn.prepare(&sql).context("prepare team list")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("list teams")?;
    let mut out = Vec::new();
    for team in rows {
        out.push(team.context("read team name")?);
    }
    Ok(out)
}

/// Deletes the week's rows from every group table; returns rows removed.
pub fn clear_week(conn: &Connection, week: u16, season: i32) -> Result<usize> {
    let mut total = 0usize;
    for group in PositionGroup::ALL {
        let sql = format!("DELETE FROM {} WHERE week = ?1 AND season = ?2", group.table());
        total += conn
            .execute(&sql, params![i64::from(week), i64::from(season)])
            .with_context(|| format!("clear {} week {week}", group.table()))?;
    }
    Ok(total)
}

pub fn table_counts(conn: &Connection) -> Result<Vec<(PositionGroup, i64)>> {
    let mut out = Vec::with_capacity(PositionGroup::ALL.len());
    for group in PositionGroup::ALL {
        let sql = format!("SELECT COUNT(*) FROM {}", group.table());
        let count: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .with_context(|| format!("count {}", group.table()))?;
        out.push((group, count));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{create_table_sql, init_schema, upsert_sql};
    use crate::positions::PositionGroup;
    use rusqlite::Connection;

    #[test]
    fn schema_lists_every_stat_column() {
        for group in PositionGroup::ALL {
            let sql = create_table_sql(group);
            assert!(sql.contains("UNIQUE (player_id, week, season)"));
            for column in group.stat_columns() {
                assert!(sql.contains(column.name), "{} missing {}", group.table(), column.name);
            }
        }
    }

    #[test]
    fn upsert_replaces_everything_but_the_key() {
        let sql = upsert_sql(PositionGroup::Cornerback);
        assert!(sql.contains("ON CONFLICT(player_id, week, season)"));
        assert!(sql.contains("source = excluded.source"));
        assert!(!sql.contains("week = excluded.week"));
    }

    #[test]
    fn schema_init_is_idempotent() {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("first init");
        init_schema(&conn).expect("second init");
    }
}
