use chrono::{Duration, Utc};
use serde::Serialize;

use crate::errors::Result;
use crate::state::AppState;
use crate::updater::matches::MatchUpdater;
use crate::updater::schedule::{is_daily_due, is_due_for_update};

#[derive(Debug, Default, Serialize)]
pub struct JobSummary {
    pub leagues_due: usize,
    pub leagues_updated: usize,
}

/// One tick of the regular fixtures refresh: every due league gets a full
/// league+season fetch, reconciliation, and bookkeeping stamp. "Due" is
/// re-derived from persisted state on every invocation.
pub async fn perform_full_update(state: &AppState) -> Result<JobSummary> {
    let now = Utc::now();
    tracing::info!("-------------- Starting full update on {} --------------", now);

    let updater = MatchUpdater::new(state);
    let due: Vec<_> = updater
        .settings()
        .active()
        .await?
        .into_iter()
        .filter(|s| is_due_for_update(s, now))
        .collect();
    tracing::info!("Leagues to update: {}", due.len());

    let mut summary = JobSummary {
        leagues_due: due.len(),
        ..JobSummary::default()
    };

    for settings in due {
        tracing::info!(
            "Updating matches of league {} in season {}",
            settings.league_id,
            settings.season
        );
        let page = state
            .api
            .get_fixtures(settings.league_id, settings.season)
            .await?;
        updater.reconcile_fixtures(page.response).await?;
        updater.update_league_last_update(settings.league_id).await?;
        summary.leagues_updated += 1;
    }

    Ok(summary)
}

/// One tick of the match-day refresh: leagues whose next match falls
/// today are fetched over a narrow date window, but only when stored
/// fixtures are actually underway.
pub async fn perform_daily_update(state: &AppState) -> Result<JobSummary> {
    let now = Utc::now();
    tracing::info!("-------------- Starting daily update on {} --------------", now);

    let updater = MatchUpdater::new(state);
    let due: Vec<_> = updater
        .settings()
        .active()
        .await?
        .into_iter()
        .filter(|s| is_daily_due(s, now))
        .collect();
    tracing::info!("Leagues to update: {}", due.len());

    let mut summary = JobSummary {
        leagues_due: due.len(),
        ..JobSummary::default()
    };

    let from = (now - Duration::days(1)).format("%Y-%m-%d").to_string();
    let to = now.format("%Y-%m-%d").to_string();

    for settings in due {
        if !updater
            .has_pending_matches_today(settings.league_id, now)
            .await?
        {
            tracing::info!("No live fixtures in league {}, skipping", settings.league_id);
            continue;
        }

        updater
            .update_league_matches_window(settings.league_id, settings.season, &from, &to)
            .await?;
        updater
            .settings()
            .set_last_daily_update_now(settings.league_id)
            .await?;
        summary.leagues_updated += 1;
    }

    Ok(summary)
}
