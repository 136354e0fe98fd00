use futures_util::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::Collection;

use crate::config::FINISHED_STATUSES;
use crate::database::repository::SettingsRepo;
use crate::errors::Result;
use crate::models::league_settings::{SeasonEntryPolicy, SeasonField};
use crate::state::AppState;

/// The three per-fixture detail arrays attached to finished matches.
/// Field name and endpoint path coincide on the external API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subresource {
    Lineups,
    Events,
    Statistics,
}

impl Subresource {
    pub fn field(&self) -> &'static str {
        match self {
            Subresource::Lineups => "lineups",
            Subresource::Events => "events",
            Subresource::Statistics => "statistics",
        }
    }

    pub fn season_field(&self) -> SeasonField {
        match self {
            Subresource::Lineups => SeasonField::Lineups,
            Subresource::Events => SeasonField::Events,
            Subresource::Statistics => SeasonField::Statistics,
        }
    }
}

/// Filter matching the finished fixtures of one league season.
fn finished_fixtures_filter(league_id: i64, season: i32) -> Document {
    let finished: Vec<Bson> = FINISHED_STATUSES
        .iter()
        .map(|s| Bson::String(s.to_string()))
        .collect();
    doc! {
        "league.id": league_id,
        "league.season": season,
        "fixture.status.short": { "$in": finished },
    }
}

/// Additional clause selecting matches whose sub-resource is absent,
/// null or empty.
fn missing_clause(field: &str) -> Bson {
    Bson::Array(vec![
        Bson::Document(doc! { field: { "$exists": false } }),
        Bson::Document(doc! { field: Bson::Null }),
        Bson::Document(doc! { field: { "$size": 0 } }),
    ])
}

/// One generic updater instantiated for lineups, events and statistics.
/// Attaches the fetched array onto existing real_matches ($set only,
/// never inserts) and maintains the per-season completeness counter.
pub struct SubresourceUpdater {
    kind: Subresource,
    api: std::sync::Arc<crate::services::football_api::FootballApiClient>,
    real_matches: Collection<Document>,
    settings: SettingsRepo,
}

impl SubresourceUpdater {
    pub fn new(state: &AppState, kind: Subresource) -> Self {
        SubresourceUpdater {
            kind,
            api: state.api.clone(),
            real_matches: state.db.collection("real_matches"),
            settings: SettingsRepo::new(&state.db),
        }
    }

    /// Fetches the sub-resource for one fixture and attaches it to the
    /// matching real_match. Returns false (typed not-found) when no
    /// real_match exists for the fixture id.
    pub async fn update_one(&self, fixture_id: i64) -> Result<bool> {
        let page = self.api.get_fixture_detail(self.kind.field(), fixture_id).await?;

        let mut set = Document::new();
        set.insert(self.kind.field(), mongodb::bson::to_bson(&page.response)?);

        let result = self
            .real_matches
            .update_one(doc! { "fixture.id": fixture_id }, doc! { "$set": set })
            .await?;

        if result.matched_count == 0 {
            tracing::warn!(
                "No real_match found for fixture {} to update {}",
                fixture_id,
                self.kind.field()
            );
            return Ok(false);
        }

        tracing::info!("Updated {} for fixture {}", self.kind.field(), fixture_id);
        Ok(true)
    }

    /// Authoritative refresh: re-fetches and overwrites the sub-resource
    /// on every finished match of the league season, then recounts
    /// completeness from the database.
    pub async fn update_full(&self, league_id: i64, season: i32) -> Result<i64> {
        tracing::info!(
            "Updating {} (full) for league {}, season {}",
            self.kind.field(),
            league_id,
            season
        );
        let filter = finished_fixtures_filter(league_id, season);
        self.refresh_matching(filter, league_id, season).await
    }

    /// Incremental top-up: only fixtures whose sub-resource is absent,
    /// null or empty are fetched. The completeness count still reflects
    /// the whole finished set afterwards, not just the touched fixtures.
    pub async fn update_missing(&self, league_id: i64, season: i32) -> Result<i64> {
        tracing::info!(
            "Updating {} (missing only) for league {}, season {}",
            self.kind.field(),
            league_id,
            season
        );
        let mut filter = finished_fixtures_filter(league_id, season);
        filter.insert("$or", missing_clause(self.kind.field()));
        self.refresh_matching(filter, league_id, season).await
    }

    async fn refresh_matching(
        &self,
        filter: Document,
        league_id: i64,
        season: i32,
    ) -> Result<i64> {
        let cursor = self.real_matches.find(filter).await?;
        let matches: Vec<Document> = cursor.try_collect().await?;

        let mut updated = 0u64;
        for m in &matches {
            let Some(fixture_id) = doc_fixture_id(m) else {
                tracing::warn!("Skipping real_match without numeric fixture.id");
                continue;
            };

            let page = self.api.get_fixture_detail(self.kind.field(), fixture_id).await?;
            if page.response.is_empty() {
                // The API has no data for this fixture; excluded from
                // completeness, not an error.
                continue;
            }

            let mut set = Document::new();
            set.insert(self.kind.field(), mongodb::bson::to_bson(&page.response)?);
            self.real_matches
                .update_one(doc! { "fixture.id": fixture_id }, doc! { "$set": set })
                .await?;
            updated += 1;
            tracing::info!("Updated {} for fixture {}", self.kind.field(), fixture_id);
        }

        tracing::info!(
            "Updated {} of {} fixtures with {} for league {}, season {}",
            updated,
            matches.len(),
            self.kind.field(),
            league_id,
            season
        );

        // Ground-truth recount over the full finished set
        let total = self.count_with_data(league_id, season).await?;
        self.settings
            .apply_season_count(
                league_id,
                season,
                self.kind.season_field(),
                total,
                SeasonEntryPolicy::SkipIfMissing,
            )
            .await?;

        Ok(total)
    }

    /// How many finished matches of the league season carry a non-empty
    /// sub-resource array.
    pub async fn count_with_data(&self, league_id: i64, season: i32) -> Result<i64> {
        let mut filter = finished_fixtures_filter(league_id, season);
        filter.insert(
            self.kind.field(),
            doc! { "$nin": [Bson::Null, Bson::Array(vec![])] },
        );
        let count = self.real_matches.count_documents(filter).await?;
        Ok(count as i64)
    }
}

fn doc_fixture_id(m: &Document) -> Option<i64> {
    match m.get_document("fixture").ok()?.get("id")? {
        Bson::Int32(v) => Some(*v as i64),
        Bson::Int64(v) => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_match_stored_arrays() {
        assert_eq!(Subresource::Lineups.field(), "lineups");
        assert_eq!(Subresource::Events.field(), "events");
        assert_eq!(Subresource::Statistics.field(), "statistics");
    }

    #[test]
    fn season_field_mapping_is_secondary_only() {
        assert_eq!(Subresource::Lineups.season_field().as_str(), "lineups");
        assert_eq!(Subresource::Events.season_field().as_str(), "events");
        assert_eq!(Subresource::Statistics.season_field().as_str(), "statistics");
    }

    #[test]
    fn finished_filter_targets_league_season_and_statuses() {
        let f = finished_fixtures_filter(39, 2024);
        assert_eq!(f.get_i64("league.id").unwrap(), 39);
        assert_eq!(f.get_i32("league.season").unwrap(), 2024);
        let status = f.get_document("fixture.status.short").unwrap();
        let statuses = status.get_array("$in").unwrap();
        assert_eq!(statuses.len(), FINISHED_STATUSES.len());
    }

    #[test]
    fn missing_clause_covers_absent_null_and_empty() {
        let Bson::Array(clauses) = missing_clause("events") else {
            panic!("expected array");
        };
        assert_eq!(clauses.len(), 3);
    }

    #[test]
    fn fixture_id_reads_both_integer_widths() {
        let narrow = doc! { "fixture": { "id": 1001i32 } };
        let wide = doc! { "fixture": { "id": 1001i64 } };
        assert_eq!(doc_fixture_id(&narrow), Some(1001));
        assert_eq!(doc_fixture_id(&wide), Some(1001));
        assert_eq!(doc_fixture_id(&doc! {}), None);
    }
}
