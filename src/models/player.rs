use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

/// Player document with an accreting `teams` list of the clubs the
/// player appeared for, each with the seasons seen so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub player: PlayerInfo,

    #[serde(default)]
    pub teams: Vec<PlayerTeamEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<BsonDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: i64,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTeamEntry {
    pub team: Document,

    #[serde(default)]
    pub seasons: Vec<i32>,
}

impl Player {
    /// Records that the player appeared for `team` in `season`,
    /// appending the team entry or the season as needed.
    pub fn add_team_season(&mut self, team: &Document, season: i32) {
        let team_id = team.get("id").cloned();

        for entry in &mut self.teams {
            if entry.team.get("id").cloned() == team_id {
                if !entry.seasons.contains(&season) {
                    entry.seasons.push(season);
                }
                return;
            }
        }

        self.teams.push(PlayerTeamEntry {
            team: team.clone(),
            seasons: vec![season],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn player() -> Player {
        Player {
            id: None,
            player: PlayerInfo {
                id: 874,
                extra: doc! { "name": "B. Saka" },
            },
            teams: vec![],
            last_update: None,
        }
    }

    #[test]
    fn new_team_entry_is_appended() {
        let mut p = player();
        p.add_team_season(&doc! { "id": 42, "name": "Arsenal" }, 2023);
        assert_eq!(p.teams.len(), 1);
        assert_eq!(p.teams[0].seasons, vec![2023]);
    }

    #[test]
    fn known_team_accretes_seasons_without_duplicates() {
        let mut p = player();
        let arsenal = doc! { "id": 42, "name": "Arsenal" };
        p.add_team_season(&arsenal, 2022);
        p.add_team_season(&arsenal, 2023);
        p.add_team_season(&arsenal, 2023);
        assert_eq!(p.teams.len(), 1);
        assert_eq!(p.teams[0].seasons, vec![2022, 2023]);
    }

    #[test]
    fn different_teams_get_separate_entries() {
        let mut p = player();
        p.add_team_season(&doc! { "id": 42, "name": "Arsenal" }, 2022);
        p.add_team_season(&doc! { "id": 49, "name": "Chelsea" }, 2023);
        assert_eq!(p.teams.len(), 2);
    }
}
