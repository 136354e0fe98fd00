use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

use crate::config::is_finished_status;

/// Stored representation of one fixture plus its detail. The document is
/// the API payload kept verbatim (unknown fields ride in the flattened
/// tails) with optional sub-resource arrays attached after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealMatch {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub fixture: Fixture,
    pub league: FixtureLeague,

    #[serde(default)]
    pub teams: Document,

    pub goals: Goals,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Document>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineups: Option<Vec<Document>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Document>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Vec<Document>>,

    #[serde(flatten)]
    pub extra: Document,
}

impl RealMatch {
    /// Finished fixtures are write-once for the fixture-sync path.
    pub fn is_finished(&self) -> bool {
        is_finished_status(&self.fixture.status.short)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: i64,

    /// ISO-8601 kick-off date as delivered by the API.
    pub date: String,

    /// Kick-off as epoch seconds.
    pub timestamp: i64,

    pub status: FixtureStatus,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureStatus {
    pub short: String,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureLeague {
    pub id: i64,
    pub season: i32,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Goals {
    pub home: Option<i32>,
    pub away: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture_json(id: i64, status: &str, home: i32, away: i32) -> serde_json::Value {
        json!({
            "fixture": {
                "id": id,
                "referee": "M. Oliver",
                "date": "2024-08-17T14:00:00+00:00",
                "timestamp": 1723903200,
                "status": { "long": "Match Finished", "short": status, "elapsed": 90 }
            },
            "league": { "id": 39, "season": 2024, "name": "Premier League", "round": "Regular Season - 1" },
            "teams": {
                "home": { "id": 42, "name": "Arsenal" },
                "away": { "id": 48, "name": "West Ham" }
            },
            "goals": { "home": home, "away": away },
            "score": { "fulltime": { "home": home, "away": away } },
            "venue": { "id": 494, "name": "Emirates Stadium" }
        })
    }

    #[test]
    fn deserializes_api_payload_and_keeps_unknown_fields() {
        let m: RealMatch = serde_json::from_value(fixture_json(1001, "FT", 2, 1)).unwrap();
        assert_eq!(m.fixture.id, 1001);
        assert_eq!(m.league.id, 39);
        assert_eq!(m.league.season, 2024);
        assert_eq!(m.goals.home, Some(2));
        assert!(m.is_finished());
        // Verbatim storage: fields outside the typed schema survive,
        // at the top level too
        assert!(m.fixture.extra.contains_key("referee"));
        assert!(m.league.extra.contains_key("round"));
        assert!(m.extra.contains_key("venue"));
    }

    #[test]
    fn unknown_top_level_fields_survive_a_round_trip() {
        let m: RealMatch = serde_json::from_value(fixture_json(1004, "FT", 1, 1)).unwrap();
        let back = serde_json::to_value(&m).unwrap();
        assert_eq!(back["venue"]["id"], 494);
    }

    #[test]
    fn not_started_fixture_is_not_finished() {
        let mut v = fixture_json(1002, "NS", 0, 0);
        v["goals"] = json!({ "home": null, "away": null });
        let m: RealMatch = serde_json::from_value(v).unwrap();
        assert!(!m.is_finished());
        assert_eq!(m.goals.home, None);
    }

    #[test]
    fn record_without_league_is_rejected() {
        let mut v = fixture_json(1003, "FT", 1, 0);
        v.as_object_mut().unwrap().remove("league");
        assert!(serde_json::from_value::<RealMatch>(v).is_err());
    }
}
