use std::collections::HashMap;

use once_cell::sync::Lazy;

// League registry, code -> full name, alphabetical by code.
pub const TEAMS: [(&str, &str); 32] = [
    ("ARI", "Arizona Cardinals"),
    ("ATL", "Atlanta Falcons"),
    ("BAL", "Baltimore Ravens"),
    ("BUF", "Buffalo Bills"),
    ("CAR", "Carolina Panthers"),
    ("CHI", "Chicago Bears"),
    ("CIN", "Cincinnati Bengals"),
    ("CLE", "Cleveland Browns"),
    ("DAL", "Dallas Cowboys"),
    ("DEN", "Denver Broncos"),
    ("DET", "Detroit Lions"),
    ("GB", "Green Bay Packers"),
    ("HOU", "Houston Texans"),
    ("IND", "Indianapolis Colts"),
    ("JAX", "Jacksonville Jaguars"),
    ("KC", "Kansas City Chiefs"),
    ("LAC", "Los Angeles Chargers"),
    ("LAR", "Los Angeles Rams"),
    ("LV", "Las Vegas Raiders"),
    ("MIA", "Miami Dolphins"),
    ("MIN", "Minnesota Vikings"),
    ("NE", "New England Patriots"),
    ("NO", "New Orleans Saints"),
    ("NYG", "New York Giants"),
    ("NYJ", "New York Jets"),
    ("PHI", "Philadelphia Eagles"),
    ("PIT", "Pittsburgh Steelers"),
    ("SEA", "Seattle Seahawks"),
    ("SF", "San Francisco 49ers"),
    ("TB", "Tampa Bay Buccaneers"),
    ("TEN", "Tennessee Titans"),
    ("WAS", "Washington Commanders"),
];

static BY_CODE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| TEAMS.iter().copied().collect());

static BY_NAME: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    TEAMS
        .iter()
        .map(|(code, name)| (name.to_lowercase(), *code))
        .collect()
});

pub fn name_for(code: &str) -> Option<&'static str> {
    BY_CODE.get(code.trim().to_uppercase().as_str()).copied()
}

pub fn code_for(name: &str) -> Option<&'static str> {
    BY_NAME.get(name.trim().to_lowercase().as_str()).copied()
}

pub fn is_team_code(code: &str) -> bool {
    name_for(code).is_some()
}

pub fn is_team_name(name: &str) -> bool {
    code_for(name).is_some()
}

/// Resolves either form to the full registry name.
pub fn resolve(team: &str) -> Option<&'static str> {
    name_for(team).or_else(|| code_for(team).and_then(name_for))
}

pub fn all_codes() -> Vec<&'static str> {
    TEAMS.iter().map(|(code, _)| *code).collect()
}

pub fn all_names() -> Vec<&'static str> {
    TEAMS.iter().map(|(_, name)| *name).collect()
}

#[cfg(test)]
mod tests {
    use super::{all_codes, all_names, code_for, is_team_code, is_team_name, name_for, resolve, TEAMS};

    #[test]
    fn registry_round_trips() {
        assert_eq!(TEAMS.len(), 32);
        for (code, name) in TEAMS {
            assert_eq!(name_for(code), Some(name));
            assert_eq!(code_for(name), Some(code));
        }
    }

    #[test]
    fn code_lookup_ignores_case() {
        assert_eq!(name_for("phi"), Some("Philadelphia Eagles"));
        assert_eq!(name_for(" nyg "), Some("New York Giants"));
        assert_eq!(name_for("XYZ"), None);
    }

    #[test]
    fn resolve_accepts_both_forms() {
        assert_eq!(resolve("KC"), Some("Kansas City Chiefs"));
        assert_eq!(resolve("kansas city chiefs"), Some("Kansas City Chiefs"));
        assert_eq!(resolve("Kansas"), None);
    }

    #[test]
    fn name_validation() {
        assert!(is_team_name("Dallas Cowboys"));
        assert!(!is_team_name("Dallas"));
        assert!(is_team_code("dal"));
        assert!(!is_team_code("Dallas Cowboys"));
        assert_eq!(all_codes().len(), 32);
        assert_eq!(all_names().len(), 32);
    }
}
