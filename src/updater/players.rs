use chrono::Utc;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use mongodb::Collection;
use serde::Serialize;

use crate::database::repository::SettingsRepo;
use crate::errors::{AppError, Result};
use crate::models::league_settings::{SeasonEntryPolicy, SeasonField};
use crate::models::player::{Player, PlayerInfo, PlayerTeamEntry};
use crate::state::AppState;

/// From one API player record, the team of the first statistics entry
/// belonging to the given league. Only that team is recorded per run.
fn first_team_for_league(record: &serde_json::Value, league_id: i64) -> Option<serde_json::Value> {
    record
        .get("statistics")?
        .as_array()?
        .iter()
        .find(|stat| {
            !stat.get("team").map(|t| t.is_null()).unwrap_or(true)
                && stat
                    .get("league")
                    .and_then(|l| l.get("id"))
                    .and_then(|id| id.as_i64())
                    == Some(league_id)
        })
        .and_then(|stat| stat.get("team").cloned())
}

#[derive(Debug, Serialize)]
pub struct PageUpdateSummary {
    pub players_added: usize,
    pub current_page: i64,
    pub total_pages: i64,
}

pub struct PlayersUpdater {
    api: std::sync::Arc<crate::services::football_api::FootballApiClient>,
    players: Collection<Player>,
    players_raw: Collection<Document>,
    app_settings: Collection<Document>,
    settings: SettingsRepo,
}

impl PlayersUpdater {
    pub fn new(state: &AppState) -> Self {
        PlayersUpdater {
            api: state.api.clone(),
            players: state.db.collection("players"),
            players_raw: state.db.collection("players"),
            app_settings: state.db.collection("settings"),
            settings: SettingsRepo::new(&state.db),
        }
    }

    /// Paginated player sync for one league season. Each page is one
    /// external call; the loop terminates when the API reports the last
    /// page. Returns how many players were added or updated.
    pub async fn update_players_by_league_and_season(
        &self,
        league_id: i64,
        season: i32,
    ) -> Result<i64> {
        tracing::info!("Updating players for league {}, season {}", league_id, season);

        let mut page_number = 1i64;
        let mut total_players = 0i64;

        loop {
            let page = self.api.get_players(league_id, season, page_number).await?;
            if page.response.is_empty() {
                break;
            }

            for record in &page.response {
                if self.record_player(record, league_id, season).await? {
                    total_players += 1;
                }
            }

            tracing::info!(
                "Page {} processed for league {}, season {}; {} players so far",
                page_number,
                league_id,
                season,
                total_players
            );

            match page.next_page(page_number) {
                Some(next) => page_number = next,
                None => break,
            }
        }

        self.settings
            .apply_season_count(
                league_id,
                season,
                SeasonField::Players,
                total_players,
                SeasonEntryPolicy::CreateIfMissing,
            )
            .await?;

        tracing::info!(
            "Updated {} players for league {}, season {}",
            total_players,
            league_id,
            season
        );
        Ok(total_players)
    }

    /// Find-or-append the league's team+season onto the stored player;
    /// false when the record carries no statistics entry for the league.
    async fn record_player(
        &self,
        record: &serde_json::Value,
        league_id: i64,
        season: i32,
    ) -> Result<bool> {
        let Some(team_json) = first_team_for_league(record, league_id) else {
            return Ok(false);
        };

        let info: PlayerInfo = serde_json::from_value(
            record
                .get("player")
                .cloned()
                .ok_or_else(|| AppError::invalid_data("player record without 'player' key"))?,
        )
        .map_err(|e| AppError::invalid_data(format!("rejected player record: {}", e)))?;

        let team: Document = serde_json::from_value(team_json)
            .map_err(|e| AppError::invalid_data(format!("rejected team on player record: {}", e)))?;

        match self.players.find_one(doc! { "player.id": info.id }).await? {
            Some(mut existing) => {
                existing.add_team_season(&team, season);
                let teams = mongodb::bson::to_bson(&existing.teams)?;
                self.players
                    .update_one(
                        doc! { "player.id": info.id },
                        doc! { "$set": { "teams": teams } },
                    )
                    .await?;
            }
            None => {
                let new_player = Player {
                    id: None,
                    player: info,
                    teams: vec![PlayerTeamEntry {
                        team,
                        seasons: vec![season],
                    }],
                    last_update: None,
                };
                self.players.insert_one(&new_player).await?;
            }
        }

        Ok(true)
    }

    /// Global player-profile crawl, one page at a time; replace-or-insert
    /// each profile verbatim by `player.id` and advance the shared
    /// pagination cursor document.
    pub async fn update_players_by_page(&self, page_number: i64) -> Result<PageUpdateSummary> {
        tracing::info!("Updating players for page {}", page_number);
        let page = self.api.get_player_profiles(page_number).await?;
        let players_added = page.response.len();

        for record in &page.response {
            let document: Document = serde_json::from_value(record.clone())
                .map_err(|e| AppError::invalid_data(format!("rejected player profile: {}", e)))?;
            let Some(player_id) = document
                .get_document("player")
                .ok()
                .and_then(|p| p.get("id"))
                .and_then(|id| id.as_i64().or_else(|| id.as_i32().map(i64::from)))
            else {
                return Err(AppError::invalid_data("player profile without player.id"));
            };

            self.players_raw
                .replace_one(doc! { "player.id": player_id }, document)
                .upsert(true)
                .await?;
        }

        let (current_page, total_pages) = match &page.paging {
            Some(p) => (p.current, p.total),
            None => (page_number, 1),
        };
        self.record_pages_searched(current_page, total_pages).await?;

        Ok(PageUpdateSummary {
            players_added,
            current_page,
            total_pages,
        })
    }

    /// Upserts the PLAYERS_API_INFO document tracking which profile pages
    /// were already crawled.
    async fn record_pages_searched(&self, current_page: i64, total_pages: i64) -> Result<()> {
        let filter = doc! { "type": "PLAYERS_API_INFO" };

        let mut pages_searched: Vec<i64> = match self.app_settings.find_one(filter.clone()).await? {
            Some(existing) => existing
                .get_array("pages_searched")
                .map(|pages| pages.iter().filter_map(|p| p.as_i64()).collect())
                .unwrap_or_default(),
            None => vec![],
        };

        if !pages_searched.contains(&current_page) {
            pages_searched.push(current_page);
            pages_searched.sort_unstable();
        }

        self.app_settings
            .update_one(
                filter,
                doc! { "$set": {
                    "type": "PLAYERS_API_INFO",
                    "pages_searched": pages_searched,
                    "total_pages": total_pages,
                    "last_update": BsonDateTime::from_chrono(Utc::now()),
                } },
            )
            .upsert(true)
            .await?;

        tracing::info!("Updated PLAYERS_API_INFO: page {} of {}", current_page, total_pages);
        Ok(())
    }

    /// Replaces the player's whole `teams` array from the API. Returns
    /// false (typed not-found) when the player is unknown.
    pub async fn update_player_teams(&self, player_id: i64) -> Result<bool> {
        tracing::info!("Updating teams for player {}", player_id);
        let page = self.api.get_player_teams(player_id).await?;

        let teams = mongodb::bson::to_bson(&page.response)?;
        let result = self
            .players_raw
            .update_one(
                doc! { "player.id": player_id },
                doc! { "$set": {
                    "teams": teams,
                    "last_update": BsonDateTime::from_chrono(Utc::now()),
                } },
            )
            .await?;

        if result.matched_count == 0 {
            tracing::warn!("No player found with id {} to update teams", player_id);
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn player_record() -> serde_json::Value {
        json!({
            "player": { "id": 874, "name": "B. Saka" },
            "statistics": [
                { "team": { "id": 42, "name": "Arsenal" }, "league": { "id": 39, "season": 2023 } },
                { "team": { "id": 42, "name": "Arsenal" }, "league": { "id": 2, "season": 2023 } }
            ]
        })
    }

    #[test]
    fn picks_first_statistics_entry_for_the_league() {
        let team = first_team_for_league(&player_record(), 39).unwrap();
        assert_eq!(team["id"], 42);
    }

    #[test]
    fn other_league_entry_is_found_independently() {
        let team = first_team_for_league(&player_record(), 2).unwrap();
        assert_eq!(team["id"], 42);
    }

    #[test]
    fn no_entry_for_unrelated_league() {
        assert!(first_team_for_league(&player_record(), 140).is_none());
    }

    #[test]
    fn null_team_entries_are_ignored() {
        let record = json!({
            "player": { "id": 1 },
            "statistics": [
                { "team": null, "league": { "id": 39 } },
                { "team": { "id": 50 }, "league": { "id": 39 } }
            ]
        });
        let team = first_team_for_league(&record, 39).unwrap();
        assert_eq!(team["id"], 50);
    }

    #[test]
    fn record_without_statistics_yields_none() {
        let record = json!({ "player": { "id": 1 } });
        assert!(first_team_for_league(&record, 39).is_none());
    }
}
