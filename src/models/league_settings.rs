use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Per-league synchronization bookkeeping. Exactly one document per
/// `league_id`; `position` values form a contiguous 1-based permutation
/// across all documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueSettings {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub league_id: i64,

    /// Currently tracked season.
    pub season: i32,

    pub is_active: bool,

    /// Update cadence in days. A value of 1 or less is the always-due
    /// sentinel: the league is refreshed on every scheduler tick.
    pub update_frequency: i64,

    #[serde(default)]
    pub daily_update: bool,

    #[serde(default)]
    pub last_update: Option<BsonDateTime>,

    #[serde(default)]
    pub last_daily_update: Option<BsonDateTime>,

    /// Kick-off of the soonest future stored fixture, null when none.
    /// Drives the fast-path of the due predicate.
    #[serde(default)]
    pub next_match: Option<BsonDateTime>,

    #[serde(default)]
    pub position: Option<i32>,

    #[serde(default)]
    pub available_seasons: Vec<AvailableSeason>,
}

/// Per-season completeness counters. Counts are null when zero/absent,
/// matching the stored representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSeason {
    pub season: i32,

    #[serde(default)]
    pub real_matches: Option<i64>,

    #[serde(default)]
    pub teams: Option<i64>,

    #[serde(default)]
    pub players: Option<i64>,

    #[serde(default)]
    pub lineups: Option<i64>,

    #[serde(default)]
    pub events: Option<i64>,

    #[serde(default)]
    pub statistics: Option<i64>,
}

impl AvailableSeason {
    pub fn new(season: i32) -> Self {
        AvailableSeason {
            season,
            real_matches: None,
            teams: None,
            players: None,
            lineups: None,
            events: None,
            statistics: None,
        }
    }

    fn slot(&mut self, field: SeasonField) -> &mut Option<i64> {
        match field {
            SeasonField::RealMatches => &mut self.real_matches,
            SeasonField::Teams => &mut self.teams,
            SeasonField::Players => &mut self.players,
            SeasonField::Lineups => &mut self.lineups,
            SeasonField::Events => &mut self.events,
            SeasonField::Statistics => &mut self.statistics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonField {
    RealMatches,
    Teams,
    Players,
    Lineups,
    Events,
    Statistics,
}

impl SeasonField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonField::RealMatches => "real_matches",
            SeasonField::Teams => "teams",
            SeasonField::Players => "players",
            SeasonField::Lineups => "lineups",
            SeasonField::Events => "events",
            SeasonField::Statistics => "statistics",
        }
    }
}

/// Whether a counter write may originate a season entry. Primary syncs
/// (matches, teams, players) create the entry; secondary syncs (lineups,
/// events, statistics) only annotate seasons that are already tracked,
/// so partial sub-resource runs cannot accumulate phantom entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonEntryPolicy {
    CreateIfMissing,
    SkipIfMissing,
}

/// Sets `field` to `count` (null when zero) on the entry for `season`.
/// Returns false when the entry is absent and the policy forbids
/// creating it; the caller should then skip the settings write.
pub fn apply_season_count(
    seasons: &mut Vec<AvailableSeason>,
    season: i32,
    field: SeasonField,
    count: i64,
    policy: SeasonEntryPolicy,
) -> bool {
    let value = if count > 0 { Some(count) } else { None };

    if let Some(entry) = seasons.iter_mut().find(|s| s.season == season) {
        *entry.slot(field) = value;
        return true;
    }

    match policy {
        SeasonEntryPolicy::CreateIfMissing => {
            let mut entry = AvailableSeason::new(season);
            *entry.slot(field) = value;
            seasons.push(entry);
            true
        }
        SeasonEntryPolicy::SkipIfMissing => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_field_creates_missing_season_entry() {
        let mut seasons = vec![];
        let applied = apply_season_count(
            &mut seasons,
            2023,
            SeasonField::RealMatches,
            380,
            SeasonEntryPolicy::CreateIfMissing,
        );
        assert!(applied);
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].season, 2023);
        assert_eq!(seasons[0].real_matches, Some(380));
        assert_eq!(seasons[0].teams, None);
    }

    #[test]
    fn secondary_field_skips_untracked_season() {
        let mut seasons = vec![AvailableSeason::new(2022)];
        let applied = apply_season_count(
            &mut seasons,
            2023,
            SeasonField::Lineups,
            40,
            SeasonEntryPolicy::SkipIfMissing,
        );
        assert!(!applied);
        assert_eq!(seasons.len(), 1, "no phantom entry may appear");
        assert_eq!(seasons[0].season, 2022);
    }

    #[test]
    fn secondary_field_annotates_tracked_season() {
        let mut seasons = vec![AvailableSeason {
            real_matches: Some(380),
            ..AvailableSeason::new(2023)
        }];
        let applied = apply_season_count(
            &mut seasons,
            2023,
            SeasonField::Events,
            350,
            SeasonEntryPolicy::SkipIfMissing,
        );
        assert!(applied);
        assert_eq!(seasons[0].events, Some(350));
        assert_eq!(seasons[0].real_matches, Some(380));
    }

    #[test]
    fn zero_count_is_stored_as_null() {
        let mut seasons = vec![AvailableSeason {
            statistics: Some(12),
            ..AvailableSeason::new(2021)
        }];
        apply_season_count(
            &mut seasons,
            2021,
            SeasonField::Statistics,
            0,
            SeasonEntryPolicy::SkipIfMissing,
        );
        assert_eq!(seasons[0].statistics, None);
    }

    #[test]
    fn existing_entry_is_updated_in_place() {
        let mut seasons = vec![AvailableSeason::new(2022), AvailableSeason::new(2023)];
        apply_season_count(
            &mut seasons,
            2022,
            SeasonField::Teams,
            20,
            SeasonEntryPolicy::CreateIfMissing,
        );
        assert_eq!(seasons.len(), 2);
        assert_eq!(seasons[0].teams, Some(20));
        assert_eq!(seasons[1].teams, None);
    }
}
