use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::models::league_settings::LeagueSettings;

/// Debounce window for the daily updater: a league is not picked up
/// again within 10 minutes of its previous daily run.
const DAILY_DEBOUNCE_MINUTES: i64 = 10;

/// Whether a league is due for a regular fixtures refresh.
///
/// True when the league is active and any of:
/// - `update_frequency` is the always-due sentinel (1 day or less),
/// - it was never updated, or the cadence has elapsed,
/// - a stored fixture has reached kick-off (`next_match <= now`), which
///   pulls the league in ahead of its normal cadence.
pub fn is_due_for_update(settings: &LeagueSettings, now: DateTime<Utc>) -> bool {
    if !settings.is_active {
        return false;
    }

    if settings.update_frequency <= 1 {
        return true;
    }

    let cadence_due = match settings.last_update {
        Some(last) => last.to_chrono() + Duration::days(settings.update_frequency) <= now,
        None => true,
    };

    let next_match_due = settings
        .next_match
        .map(|nm| nm.to_chrono() <= now)
        .unwrap_or(false);

    cadence_due || next_match_due
}

/// Whether a league qualifies for the daily (match-day) refresh: it is
/// flagged for daily updates, its next match falls within today, and the
/// previous daily run is outside the debounce window.
pub fn is_daily_due(settings: &LeagueSettings, now: DateTime<Utc>) -> bool {
    if !settings.is_active || !settings.daily_update {
        return false;
    }

    let today = start_of_day(now);
    let tomorrow = today + Duration::days(1);

    let Some(next_match) = settings.next_match else {
        return false;
    };
    let next_match = next_match.to_chrono();
    if next_match < today || next_match >= tomorrow {
        return false;
    }

    match settings.last_daily_update {
        None => true,
        Some(last) => last.to_chrono() <= now - Duration::minutes(DAILY_DEBOUNCE_MINUTES),
    }
}

pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use mongodb::bson::DateTime as BsonDateTime;

    fn settings(frequency: i64) -> LeagueSettings {
        LeagueSettings {
            id: None,
            league_id: 39,
            season: 2024,
            is_active: true,
            update_frequency: frequency,
            daily_update: false,
            last_update: None,
            last_daily_update: None,
            next_match: None,
            position: Some(1),
            available_seasons: vec![],
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn bson(s: &str) -> BsonDateTime {
        BsonDateTime::from_chrono(at(s))
    }

    #[test]
    fn always_due_sentinel_ignores_next_match_and_last_update() {
        let now = at("2024-08-17 12:00:00");
        let mut s = settings(1);
        s.last_update = Some(bson("2024-08-16 12:00:00"));
        s.next_match = None;
        assert!(is_due_for_update(&s, now));
    }

    #[test]
    fn inactive_league_is_never_due() {
        let mut s = settings(1);
        s.is_active = false;
        assert!(!is_due_for_update(&s, at("2024-08-17 12:00:00")));
    }

    #[test]
    fn cadence_not_elapsed_and_no_next_match_is_not_due() {
        let now = at("2024-08-17 12:00:00");
        let mut s = settings(7);
        s.last_update = Some(bson("2024-08-15 12:00:00"));
        assert!(!is_due_for_update(&s, now));
    }

    #[test]
    fn elapsed_cadence_is_due() {
        let now = at("2024-08-17 12:00:00");
        let mut s = settings(7);
        s.last_update = Some(bson("2024-08-01 12:00:00"));
        assert!(is_due_for_update(&s, now));
    }

    #[test]
    fn never_updated_league_is_due() {
        let s = settings(30);
        assert!(is_due_for_update(&s, at("2024-08-17 12:00:00")));
    }

    #[test]
    fn imminent_match_overrides_cadence() {
        let now = at("2024-08-17 15:05:00");
        let mut s = settings(7);
        s.last_update = Some(bson("2024-08-16 12:00:00"));
        s.next_match = Some(bson("2024-08-17 15:00:00"));
        assert!(is_due_for_update(&s, now));
    }

    #[test]
    fn future_match_does_not_trigger_fast_path() {
        let now = at("2024-08-17 12:00:00");
        let mut s = settings(7);
        s.last_update = Some(bson("2024-08-16 12:00:00"));
        s.next_match = Some(bson("2024-08-17 15:00:00"));
        assert!(!is_due_for_update(&s, now));
    }

    fn daily_settings() -> LeagueSettings {
        let mut s = settings(7);
        s.daily_update = true;
        s.next_match = Some(bson("2024-08-17 15:00:00"));
        s
    }

    #[test]
    fn daily_due_when_match_today_and_never_ran() {
        let s = daily_settings();
        assert!(is_daily_due(&s, at("2024-08-17 10:00:00")));
    }

    #[test]
    fn daily_debounced_within_ten_minutes() {
        let mut s = daily_settings();
        s.last_daily_update = Some(bson("2024-08-17 09:55:00"));
        assert!(!is_daily_due(&s, at("2024-08-17 10:00:00")));

        s.last_daily_update = Some(bson("2024-08-17 09:45:00"));
        assert!(is_daily_due(&s, at("2024-08-17 10:00:00")));
    }

    #[test]
    fn daily_skips_when_next_match_is_tomorrow() {
        let mut s = daily_settings();
        s.next_match = Some(bson("2024-08-18 15:00:00"));
        assert!(!is_daily_due(&s, at("2024-08-17 10:00:00")));
    }

    #[test]
    fn daily_requires_flag() {
        let mut s = daily_settings();
        s.daily_update = false;
        assert!(!is_daily_due(&s, at("2024-08-17 10:00:00")));
    }
}
