use chrono::{Datelike, NaiveDate, Utc};

pub const DEFAULT_SEASON: i32 = 2025;

/// Weeks run 1..=18. The regular season anchors on September 1: anything
/// before the opener maps to week 1, anything after the finale to week 18.
pub const FIRST_WEEK: u16 = 1;
pub const LAST_WEEK: u16 = 18;

pub fn season_for(date: NaiveDate) -> i32 {
    if date.month() >= 9 {
        date.year()
    } else {
        date.year() - 1
    }
}

pub fn week_for(date: NaiveDate) -> u16 {
    let Some(start) = NaiveDate::from_ymd_opt(season_for(date), 9, 1) else {
        return FIRST_WEEK;
    };
    let week = (date - start).num_days() / 7 + 1;
    week.clamp(i64::from(FIRST_WEEK), i64::from(LAST_WEEK)) as u16
}

pub fn current_season() -> i32 {
    season_for(Utc::now().date_naive())
}

pub fn current_week() -> u16 {
    week_for(Utc::now().date_naive())
}
