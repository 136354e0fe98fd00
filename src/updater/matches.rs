use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use mongodb::Collection;
use serde::Serialize;

use crate::config::FINISHED_STATUSES;
use crate::database::repository::SettingsRepo;
use crate::errors::{AppError, Result};
use crate::models::league::League;
use crate::models::league_settings::{AvailableSeason, SeasonEntryPolicy, SeasonField};
use crate::models::real_match::RealMatch;
use crate::models::team::Team;
use crate::state::AppState;
use crate::updater::schedule::start_of_day;

/// What fixture reconciliation decided to do with one fetched record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureAction {
    /// First sighting: insert verbatim.
    Insert,
    /// Known and not finished: replace wholesale and propagate the new
    /// goals/status into the dependent watch-records.
    Replace,
    /// Known and finished: the stored result is frozen.
    Skip,
}

pub fn classify_fixture(existing: Option<&RealMatch>) -> FixtureAction {
    match existing {
        None => FixtureAction::Insert,
        Some(stored) if stored.is_finished() => FixtureAction::Skip,
        Some(_) => FixtureAction::Replace,
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ReconcileSummary {
    pub inserted: u64,
    pub replaced: u64,
    pub skipped_finished: u64,
}

/// Core reconciliation engine: keeps `real_matches`, `matches` and the
/// per-league bookkeeping consistent with the external source.
pub struct MatchUpdater {
    api: std::sync::Arc<crate::services::football_api::FootballApiClient>,
    real_matches: Collection<RealMatch>,
    watch_records: Collection<Document>,
    leagues: Collection<League>,
    teams: Collection<Team>,
    settings: SettingsRepo,
}

impl MatchUpdater {
    pub fn new(state: &AppState) -> Self {
        MatchUpdater {
            api: state.api.clone(),
            real_matches: state.db.collection("real_matches"),
            watch_records: state.db.collection("matches"),
            leagues: state.db.collection("leagues"),
            teams: state.db.collection("teams"),
            settings: SettingsRepo::new(&state.db),
        }
    }

    pub fn settings(&self) -> &SettingsRepo {
        &self.settings
    }

    /// Fetches the league catalogue and replaces each stored league
    /// wholesale by its natural key. Returns how many were written.
    pub async fn refresh_leagues(&self) -> Result<u64> {
        let page = self.api.get_leagues().await?;
        let mut written = 0;

        for league in page.response {
            self.leagues
                .replace_one(doc! { "league.id": league.league.id }, &league)
                .upsert(true)
                .await?;
            written += 1;
        }

        tracing::info!("Refreshed {} leagues", written);
        Ok(written)
    }

    /// Merges fetched fixtures into `real_matches`. Finished stored
    /// fixtures are never overwritten; replaced fixtures push their new
    /// goals/status into every watch-record sharing the fixture id.
    ///
    /// Records that do not carry the required shape (`fixture`, `league`,
    /// `goals`) abort the batch with a validation error; fixtures written
    /// before the bad record stay persisted.
    pub async fn reconcile_fixtures(
        &self,
        fetched: Vec<serde_json::Value>,
    ) -> Result<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();

        for record in fetched {
            let incoming: RealMatch = serde_json::from_value(record)
                .map_err(|e| AppError::invalid_data(format!("rejected fixture record: {}", e)))?;

            let existing = self
                .real_matches
                .find_one(doc! { "fixture.id": incoming.fixture.id })
                .await?;

            match classify_fixture(existing.as_ref()) {
                FixtureAction::Insert => {
                    self.real_matches.insert_one(&incoming).await?;
                    summary.inserted += 1;
                }
                FixtureAction::Replace => {
                    self.real_matches
                        .replace_one(doc! { "fixture.id": incoming.fixture.id }, &incoming)
                        .await?;
                    self.sync_watch_records(&incoming).await?;
                    summary.replaced += 1;
                }
                FixtureAction::Skip => {
                    summary.skipped_finished += 1;
                }
            }
        }

        tracing::info!(
            "Reconciled fixtures: {} inserted, {} replaced, {} finished untouched",
            summary.inserted,
            summary.replaced,
            summary.skipped_finished
        );
        Ok(summary)
    }

    /// Pushes the fixture's goals and status into every watch-record
    /// referencing it, so no record diverges from a live RealMatch.
    async fn sync_watch_records(&self, m: &RealMatch) -> Result<()> {
        self.watch_records
            .update_many(
                doc! { "fixture.id": m.fixture.id },
                doc! { "$set": {
                    "goals.home": bson_int(m.goals.home),
                    "goals.away": bson_int(m.goals.away),
                    "status": &m.fixture.status.short,
                } },
            )
            .await?;
        Ok(())
    }

    /// Stamps `last_update` and recomputes `next_match`; runs after every
    /// reconciliation batch.
    pub async fn update_league_last_update(&self, league_id: i64) -> Result<()> {
        self.settings.set_last_update_now(league_id).await?;
        self.recompute_next_match(league_id).await
    }

    /// Finds the soonest future stored fixture of the league and stores
    /// its kick-off on `next_match` (null when none).
    pub async fn recompute_next_match(&self, league_id: i64) -> Result<()> {
        let now_ts = Utc::now().timestamp();
        let next = self
            .real_matches
            .find_one(doc! {
                "league.id": league_id,
                "fixture.timestamp": { "$gte": now_ts },
            })
            .sort(doc! { "fixture.date": 1 })
            .await?;

        let next_match = match next {
            Some(m) => {
                let kick_off = DateTime::parse_from_rfc3339(&m.fixture.date).map_err(|e| {
                    AppError::invalid_data(format!(
                        "fixture {} has unparseable date '{}': {}",
                        m.fixture.id, m.fixture.date, e
                    ))
                })?;
                Some(BsonDateTime::from_chrono(kick_off.with_timezone(&Utc)))
            }
            None => None,
        };

        self.settings.set_next_match(league_id, next_match).await
    }

    /// Admin-triggered full fixtures sync for one league season: fetch,
    /// reconcile, stamp bookkeeping, record the fetched count.
    pub async fn update_league_matches(
        &self,
        league_id: i64,
        season: i32,
    ) -> Result<ReconcileSummary> {
        let page = self.api.get_fixtures(league_id, season).await?;
        let fetched = page.response.len() as i64;

        let summary = self.reconcile_fixtures(page.response).await?;
        self.update_league_last_update(league_id).await?;
        self.settings
            .apply_season_count(
                league_id,
                season,
                SeasonField::RealMatches,
                fetched,
                SeasonEntryPolicy::CreateIfMissing,
            )
            .await?;

        Ok(summary)
    }

    /// Teams sync for one league season: find-or-append the league-season
    /// entry per team, then record the fetched count.
    pub async fn update_teams_by_league_and_season(
        &self,
        league_id: i64,
        season: i32,
    ) -> Result<i64> {
        let page = self.api.get_teams(league_id, season).await?;
        let season_entry = page.parameters.clone();
        let count = page.response.len() as i64;

        for record in page.response {
            let mut incoming: Team = serde_json::from_value(record)
                .map_err(|e| AppError::invalid_data(format!("rejected team record: {}", e)))?;

            match self
                .teams
                .find_one(doc! { "team.id": incoming.team.id })
                .await?
            {
                Some(mut existing) => {
                    if existing.add_season(&season_entry) {
                        let seasons = mongodb::bson::to_bson(&existing.seasons)?;
                        self.teams
                            .update_one(
                                doc! { "team.id": existing.team.id },
                                doc! { "$set": { "seasons": seasons } },
                            )
                            .await?;
                        tracing::info!("Updated team {} with season {:?}", existing.team.id, season_entry);
                    }
                }
                None => {
                    incoming.add_season(&season_entry);
                    self.teams.insert_one(&incoming).await?;
                    tracing::info!("Inserted team {} with season {:?}", incoming.team.id, season_entry);
                }
            }
        }

        self.settings
            .apply_season_count(
                league_id,
                season,
                SeasonField::Teams,
                count,
                SeasonEntryPolicy::CreateIfMissing,
            )
            .await?;

        Ok(count)
    }

    /// Sets the tracked season for a league; false when nothing changed.
    pub async fn update_league_season(&self, league_id: i64, season: i32) -> Result<bool> {
        self.settings.set_season(league_id, season).await
    }

    /// Authoritative resync of every league's `available_seasons`: for
    /// each season the League document lists, count the actual stored
    /// matches and teams and rewrite the whole array from live counts.
    pub async fn check_available_seasons(&self) -> Result<()> {
        let all_settings = self.settings.all_by_position().await?;

        for settings in all_settings {
            let league_id = settings.league_id;
            tracing::info!("Auditing available seasons for league {}", league_id);

            let Some(league) = self.leagues.find_one(doc! { "league.id": league_id }).await? else {
                tracing::warn!("League {} not found in leagues collection", league_id);
                continue;
            };

            let mut audited = Vec::new();
            for season in &league.seasons {
                let year = season.year;

                let match_count = self
                    .real_matches
                    .count_documents(doc! {
                        "league.id": league_id,
                        "league.season": year,
                    })
                    .await? as i64;

                let team_count = self
                    .teams
                    .count_documents(team_season_filter(league_id, year))
                    .await? as i64;

                audited.push(audited_season_entry(year, match_count, team_count));
            }

            self.settings
                .write_available_seasons(league_id, &audited)
                .await?;
            tracing::info!(
                "Rewrote available_seasons for league {} ({} seasons)",
                league_id,
                audited.len()
            );
        }

        Ok(())
    }

    /// Whether the league has non-finished fixtures that kicked off today
    /// and are already underway; gates the daily fetch.
    pub async fn has_pending_matches_today(
        &self,
        league_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let today_ts = start_of_day(now).timestamp();
        let finished: Vec<Bson> = FINISHED_STATUSES
            .iter()
            .map(|s| Bson::String(s.to_string()))
            .collect();

        let count = self
            .real_matches
            .count_documents(doc! {
                "league.id": league_id,
                "fixture.timestamp": { "$gte": today_ts, "$lte": now.timestamp() },
                "fixture.status.short": { "$nin": finished },
            })
            .await?;

        if count > 0 {
            tracing::info!("Found {} live fixtures to update in league {}", count, league_id);
        }
        Ok(count > 0)
    }

    /// Date-window fixtures sync used by the daily job.
    pub async fn update_league_matches_window(
        &self,
        league_id: i64,
        season: i32,
        from: &str,
        to: &str,
    ) -> Result<ReconcileSummary> {
        let page = self
            .api
            .get_fixtures_window(league_id, season, from, to)
            .await?;
        self.reconcile_fixtures(page.response).await
    }
}

fn bson_int(value: Option<i32>) -> Bson {
    match value {
        Some(v) => Bson::Int32(v),
        None => Bson::Null,
    }
}

/// Stored team season entries keep the API's string-valued parameters,
/// so the audit has to match with strings.
fn team_season_filter(league_id: i64, year: i32) -> Document {
    doc! {
        "seasons": { "$elemMatch": {
            "league": league_id.to_string(),
            "season": year.to_string(),
        } },
    }
}

/// One `available_seasons` entry rebuilt from live counts; zero counts
/// are stored as null, every other counter stays null.
fn audited_season_entry(year: i32, match_count: i64, team_count: i64) -> AvailableSeason {
    AvailableSeason {
        real_matches: (match_count > 0).then_some(match_count),
        teams: (team_count > 0).then_some(team_count),
        ..AvailableSeason::new(year)
    }
}
