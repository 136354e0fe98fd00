use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// Team document with an accreting `seasons` list recording which
/// league-seasons it appeared in. Entries are the API `parameters`
/// object verbatim (string-valued league/season), never truncated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub team: TeamInfo,

    #[serde(default)]
    pub seasons: Vec<Document>,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: i64,

    #[serde(flatten)]
    pub extra: Document,
}

impl Team {
    /// Appends the league-season entry unless an identical one is
    /// already present. Returns true when the list changed.
    pub fn add_season(&mut self, season_entry: &Document) -> bool {
        if self.seasons.contains(season_entry) {
            return false;
        }
        self.seasons.push(season_entry.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn team() -> Team {
        Team {
            id: None,
            team: TeamInfo {
                id: 42,
                extra: doc! { "name": "Arsenal" },
            },
            seasons: vec![],
            extra: doc! {},
        }
    }

    #[test]
    fn add_season_appends_once() {
        let mut t = team();
        let entry = doc! { "league": "39", "season": "2023" };
        assert!(t.add_season(&entry));
        assert!(!t.add_season(&entry));
        assert_eq!(t.seasons.len(), 1);
    }

    #[test]
    fn add_season_keeps_earlier_entries() {
        let mut t = team();
        t.add_season(&doc! { "league": "39", "season": "2022" });
        t.add_season(&doc! { "league": "39", "season": "2023" });
        assert_eq!(t.seasons.len(), 2);
    }
}
