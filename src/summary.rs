use anyhow::Result;
use serde_json::{Map, Value};

use crate::positions::PositionGroup;
use crate::team_snapshot::TeamSnapshot;

#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub group: PositionGroup,
    pub player_name: String,
    /// Measured stat columns only, advanced nulls kept as nulls.
    pub stats: Map<String, Value>,
}

/// Display view of a snapshot: top player per populated group, stat columns
/// only. Identity and bookkeeping fields (ids, names, team, position, week,
/// season, source, timestamps) never appear. Empty groups are omitted.
pub fn format_team_stats(snapshot: &TeamSnapshot) -> Result<Vec<GroupSummary>> {
    let mut out = Vec::new();
    for group in PositionGroup::ALL {
        let Some(records) = snapshot.groups.get(&group) else {
            continue;
        };
        let Some(top) = records.first() else {
            continue;
        };
        let json = top.stats.to_json()?;
        let stats = json.as_object().cloned().unwrap_or_default();
        out.push(GroupSummary {
            group,
            player_name: top.player_name.clone(),
            stats,
        });
    }
    Ok(out)
}

pub fn render_team_stats(snapshot: &TeamSnapshot) -> Result<String> {
    let summaries = format_team_stats(snapshot)?;
    let mut out = match snapshot.week {
        Some(week) => format!("{} (season {}, week {})\n", snapshot.team, snapshot.season, week),
        None => format!("{} (season {})\n", snapshot.team, snapshot.season),
    };
    if summaries.is_empty() {
        out.push_str("no stored records\n");
        return Ok(out);
    }
    for summary in &summaries {
        out.push_str(&format!("\n[{}] {}\n", summary.group.label(), summary.player_name));
        for (name, value) in &summary.stats {
            let shown = match value {
                Value::Null => "n/a".to_string(),
                other => other.to_string(),
            };
            out.push_str(&format!("  {name} = {shown}\n"));
        }
    }
    Ok(out)
}
