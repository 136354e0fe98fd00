use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime};
use mongodb::{Collection, Database};

use crate::errors::Result;
use crate::models::league_settings::{
    apply_season_count, AvailableSeason, LeagueSettings, SeasonEntryPolicy, SeasonField,
};

/// Aggregate over the `league_settings` collection. Every updater
/// subcomponent mutates per-league bookkeeping through this repository
/// rather than touching the collection directly.
#[derive(Clone)]
pub struct SettingsRepo {
    collection: Collection<LeagueSettings>,
}

impl SettingsRepo {
    pub fn new(db: &Database) -> Self {
        SettingsRepo {
            collection: db.collection("league_settings"),
        }
    }

    pub async fn find(&self, league_id: i64) -> Result<Option<LeagueSettings>> {
        let settings = self
            .collection
            .find_one(doc! { "league_id": league_id })
            .await?;
        Ok(settings)
    }

    /// All settings documents ordered by position.
    pub async fn all_by_position(&self) -> Result<Vec<LeagueSettings>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "position": 1 })
            .await?;
        let settings: Vec<LeagueSettings> = cursor.try_collect().await?;
        Ok(settings)
    }

    pub async fn active(&self) -> Result<Vec<LeagueSettings>> {
        let cursor = self.collection.find(doc! { "is_active": true }).await?;
        let settings: Vec<LeagueSettings> = cursor.try_collect().await?;
        Ok(settings)
    }

    /// Sets the tracked season; returns false when no document changed.
    pub async fn set_season(&self, league_id: i64, season: i32) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "league_id": league_id },
                doc! { "$set": { "season": season } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    pub async fn set_position(&self, league_id: i64, position: i32) -> Result<()> {
        self.collection
            .update_one(
                doc! { "league_id": league_id },
                doc! { "$set": { "position": position } },
            )
            .await?;
        Ok(())
    }

    pub async fn set_last_update_now(&self, league_id: i64) -> Result<()> {
        self.collection
            .update_one(
                doc! { "league_id": league_id },
                doc! { "$set": { "last_update": BsonDateTime::from_chrono(Utc::now()) } },
            )
            .await?;
        Ok(())
    }

    pub async fn set_last_daily_update_now(&self, league_id: i64) -> Result<()> {
        self.collection
            .update_one(
                doc! { "league_id": league_id },
                doc! { "$set": { "last_daily_update": BsonDateTime::from_chrono(Utc::now()) } },
            )
            .await?;
        Ok(())
    }

    pub async fn set_next_match(
        &self,
        league_id: i64,
        next_match: Option<BsonDateTime>,
    ) -> Result<()> {
        let value = match next_match {
            Some(dt) => Bson::DateTime(dt),
            None => Bson::Null,
        };
        self.collection
            .update_one(
                doc! { "league_id": league_id },
                doc! { "$set": { "next_match": value } },
            )
            .await?;
        Ok(())
    }

    pub async fn write_available_seasons(
        &self,
        league_id: i64,
        seasons: &[AvailableSeason],
    ) -> Result<()> {
        let seasons_bson = mongodb::bson::to_bson(seasons)?;
        self.collection
            .update_one(
                doc! { "league_id": league_id },
                doc! { "$set": { "available_seasons": seasons_bson } },
            )
            .await?;
        Ok(())
    }

    /// Upserts one `available_seasons` counter for the league. Returns
    /// false when nothing was written: either the league has no settings
    /// document, or the season is untracked and the policy forbids
    /// creating the entry.
    pub async fn apply_season_count(
        &self,
        league_id: i64,
        season: i32,
        field: SeasonField,
        count: i64,
        policy: SeasonEntryPolicy,
    ) -> Result<bool> {
        let Some(settings) = self.find(league_id).await? else {
            tracing::warn!(
                "No league_settings for league {}, skipping {} count",
                league_id,
                field.as_str()
            );
            return Ok(false);
        };

        let mut seasons = settings.available_seasons;
        if !apply_season_count(&mut seasons, season, field, count, policy) {
            tracing::info!(
                "Season {} not tracked for league {}, skipping {} count",
                season,
                league_id,
                field.as_str()
            );
            return Ok(false);
        }

        self.write_available_seasons(league_id, &seasons).await?;
        tracing::info!(
            "Updated {} count for league {}, season {}: {}",
            field.as_str(),
            league_id,
            season,
            count
        );
        Ok(true)
    }
}
