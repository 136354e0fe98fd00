use mongodb::bson::Document;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::league::League;

/// Thin client for the API-SPORTS football API. All endpoints answer
/// `{response: [...], paging: {current, total}, parameters: {...}}`.
#[derive(Clone)]
pub struct FootballApiClient {
    http: Client,
    base_url: String,
    api_key: String,
    host: String,
}

#[derive(Debug, Deserialize)]
pub struct Paging {
    pub current: i64,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiPage<T> {
    #[serde(default)]
    pub response: Vec<T>,

    #[serde(default)]
    pub paging: Option<Paging>,

    /// Echo of the query parameters, string-valued. Team sync stores
    /// this object verbatim as the season entry.
    #[serde(default)]
    pub parameters: Document,
}

impl<T> ApiPage<T> {
    /// Pagination cursor: the page to request after `requested_page`,
    /// or None when the API reports the last page (or no paging at all).
    pub fn next_page(&self, requested_page: i64) -> Option<i64> {
        let (current, total) = match &self.paging {
            Some(p) => (p.current, p.total),
            None => (requested_page, 1),
        };
        if current >= total {
            None
        } else {
            Some(current + 1)
        }
    }
}

impl FootballApiClient {
    pub fn new(config: &AppConfig) -> Self {
        FootballApiClient {
            http: Client::new(),
            base_url: format!("https://{}", config.football_api_host),
            api_key: config.football_api_key.clone(),
            host: config.football_api_host.clone(),
        }
    }

    async fn get_page<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<ApiPage<T>> {
        let url = format!("{}{}", self.base_url, path_and_query);
        tracing::info!("GET {}", path_and_query);

        let response = self
            .http
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::external_api(format!(
                "{} returned {}",
                path_and_query,
                response.status()
            )));
        }

        let page = response.json::<ApiPage<T>>().await?;
        Ok(page)
    }

    pub async fn get_leagues(&self) -> Result<ApiPage<League>> {
        self.get_page("/leagues").await
    }

    /// All fixtures of one league season.
    pub async fn get_fixtures(
        &self,
        league_id: i64,
        season: i32,
    ) -> Result<ApiPage<serde_json::Value>> {
        self.get_page(&format!("/fixtures?league={}&season={}", league_id, season))
            .await
    }

    /// Fixtures of one league season restricted to a date window
    /// (inclusive, `YYYY-MM-DD`).
    pub async fn get_fixtures_window(
        &self,
        league_id: i64,
        season: i32,
        from: &str,
        to: &str,
    ) -> Result<ApiPage<serde_json::Value>> {
        self.get_page(&format!(
            "/fixtures?season={}&league={}&from={}&to={}",
            season, league_id, from, to
        ))
        .await
    }

    pub async fn get_teams(&self, league_id: i64, season: i32) -> Result<ApiPage<serde_json::Value>> {
        self.get_page(&format!("/teams?league={}&season={}", league_id, season))
            .await
    }

    pub async fn get_players(
        &self,
        league_id: i64,
        season: i32,
        page: i64,
    ) -> Result<ApiPage<serde_json::Value>> {
        self.get_page(&format!(
            "/players?league={}&season={}&page={}",
            league_id, season, page
        ))
        .await
    }

    pub async fn get_player_profiles(&self, page: i64) -> Result<ApiPage<serde_json::Value>> {
        self.get_page(&format!("/players/profiles?page={}", page))
            .await
    }

    pub async fn get_player_teams(&self, player_id: i64) -> Result<ApiPage<Document>> {
        self.get_page(&format!("/players/teams?player={}", player_id))
            .await
    }

    /// Fixture detail endpoints: `lineups`, `events`, `statistics`.
    pub async fn get_fixture_detail(
        &self,
        resource: &str,
        fixture_id: i64,
    ) -> Result<ApiPage<Document>> {
        self.get_page(&format!("/fixtures/{}?fixture={}", resource, fixture_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(current: i64, total: i64) -> ApiPage<serde_json::Value> {
        ApiPage {
            response: vec![],
            paging: Some(Paging { current, total }),
            parameters: Document::new(),
        }
    }

    #[test]
    fn pagination_stops_on_last_page() {
        assert_eq!(page(3, 3).next_page(3), None);
        assert_eq!(page(4, 3).next_page(4), None);
    }

    #[test]
    fn pagination_advances_mid_run() {
        assert_eq!(page(1, 3).next_page(1), Some(2));
        assert_eq!(page(2, 3).next_page(2), Some(3));
    }

    #[test]
    fn missing_paging_means_single_page() {
        let p: ApiPage<serde_json::Value> = ApiPage {
            response: vec![],
            paging: None,
            parameters: Document::new(),
        };
        assert_eq!(p.next_page(1), None);
    }
}
