use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::state::AppState;
use crate::updater::jobs;
use crate::updater::matches::MatchUpdater;
use crate::updater::players::PlayersUpdater;
use crate::updater::positions::{MoveDirection, PositionManager};
use crate::updater::subresource::{Subresource, SubresourceUpdater};

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub league_id: i64,
    pub season: i32,
}

#[derive(Debug, Deserialize)]
pub struct FixtureRequest {
    pub fixture_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: i64,
}

#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    pub player_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct MovePositionRequest {
    pub league_id: i64,
    pub direction: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePositionRequest {
    pub league_id: i64,
    pub new_position: i32,
}

#[derive(Debug, Deserialize)]
pub struct MultiSeasonUpdateRequest {
    pub league_id: i64,
    pub season_from: i32,
    pub season_to: i32,
    #[serde(default)]
    pub update_matches: bool,
    #[serde(default)]
    pub update_teams: bool,
    #[serde(default)]
    pub update_players: bool,
    #[serde(default)]
    pub update_statistics: bool,
    #[serde(default)]
    pub update_statistics_missing: bool,
    #[serde(default)]
    pub update_lineups: bool,
    #[serde(default)]
    pub update_lineups_missing: bool,
    #[serde(default)]
    pub update_events: bool,
    #[serde(default)]
    pub update_events_missing: bool,
}

pub async fn update_matches(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    let updater = MatchUpdater::new(&state);
    let summary = updater.update_league_matches(req.league_id, req.season).await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Updated matches for league {} in season {}", req.league_id, req.season),
        "summary": summary,
    })))
}

pub async fn update_leagues(State(state): State<AppState>) -> Result<Json<Value>> {
    let updater = MatchUpdater::new(&state);
    let written = updater.refresh_leagues().await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Leagues updated",
        "leagues_count": written,
    })))
}

pub async fn update_teams(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    let updater = MatchUpdater::new(&state);
    let count = updater
        .update_teams_by_league_and_season(req.league_id, req.season)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Updated teams for league {} in season {}", req.league_id, req.season),
        "teams_count": count,
    })))
}

pub async fn update_league_current_season(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    let updater = MatchUpdater::new(&state);
    if updater.update_league_season(req.league_id, req.season).await? {
        Ok(Json(json!({
            "status": "success",
            "message": format!("Season updated for league {} to {}", req.league_id, req.season),
        })))
    } else {
        Ok(Json(json!({
            "status": "not_modified",
            "message": format!("No document updated for league {}", req.league_id),
        })))
    }
}

pub async fn check_available_seasons(State(state): State<AppState>) -> Result<Json<Value>> {
    let updater = MatchUpdater::new(&state);
    updater.check_available_seasons().await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Available seasons checked and updated for all leagues",
    })))
}

async fn update_match_detail(
    state: AppState,
    kind: Subresource,
    fixture_id: i64,
) -> Result<Json<Value>> {
    let updater = SubresourceUpdater::new(&state, kind);
    if updater.update_one(fixture_id).await? {
        Ok(Json(json!({
            "status": "success",
            "message": format!("Updated {} for fixture {}", kind.field(), fixture_id),
        })))
    } else {
        Ok(Json(json!({
            "status": "not_found",
            "message": format!("No real_match found for fixture {}", fixture_id),
        })))
    }
}

pub async fn update_match_lineups(
    State(state): State<AppState>,
    Json(req): Json<FixtureRequest>,
) -> Result<Json<Value>> {
    update_match_detail(state, Subresource::Lineups, req.fixture_id).await
}

pub async fn update_match_events(
    State(state): State<AppState>,
    Json(req): Json<FixtureRequest>,
) -> Result<Json<Value>> {
    update_match_detail(state, Subresource::Events, req.fixture_id).await
}

pub async fn update_match_statistics(
    State(state): State<AppState>,
    Json(req): Json<FixtureRequest>,
) -> Result<Json<Value>> {
    update_match_detail(state, Subresource::Statistics, req.fixture_id).await
}

async fn update_league_detail(
    state: AppState,
    kind: Subresource,
    req: UpdateRequest,
    missing_only: bool,
) -> Result<Json<Value>> {
    let updater = SubresourceUpdater::new(&state, kind);
    let count = if missing_only {
        updater.update_missing(req.league_id, req.season).await?
    } else {
        updater.update_full(req.league_id, req.season).await?
    };
    let what = if missing_only {
        format!("missing {}", kind.field())
    } else {
        kind.field().to_string()
    };
    Ok(Json(json!({
        "status": "success",
        "message": format!("Updated {} {} for league {}, season {}", count, what, req.league_id, req.season),
        (format!("{}_count", kind.field())): count,
    })))
}

pub async fn update_league_lineups(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    update_league_detail(state, Subresource::Lineups, req, false).await
}

pub async fn update_league_lineups_missing(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    update_league_detail(state, Subresource::Lineups, req, true).await
}

pub async fn update_league_events(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    update_league_detail(state, Subresource::Events, req, false).await
}

pub async fn update_league_events_missing(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    update_league_detail(state, Subresource::Events, req, true).await
}

pub async fn update_league_statistics(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    update_league_detail(state, Subresource::Statistics, req, false).await
}

pub async fn update_league_statistics_missing(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    update_league_detail(state, Subresource::Statistics, req, true).await
}

pub async fn update_league_players(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    let updater = PlayersUpdater::new(&state);
    let count = updater
        .update_players_by_league_and_season(req.league_id, req.season)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Updated {} players for league {}, season {}", count, req.league_id, req.season),
        "players_count": count,
    })))
}

pub async fn update_players(
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> Result<Json<Value>> {
    let updater = PlayersUpdater::new(&state);
    let summary = updater.update_players_by_page(req.page).await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Updated players for page {}", req.page),
        "players_added": summary.players_added,
        "current_page": summary.current_page,
        "total_pages": summary.total_pages,
    })))
}

pub async fn update_player_teams(
    State(state): State<AppState>,
    Json(req): Json<PlayerRequest>,
) -> Result<Json<Value>> {
    let updater = PlayersUpdater::new(&state);
    if updater.update_player_teams(req.player_id).await? {
        Ok(Json(json!({
            "status": "success",
            "message": format!("Updated teams for player {}", req.player_id),
        })))
    } else {
        Ok(Json(json!({
            "status": "error",
            "message": format!("Player {} not found", req.player_id),
        })))
    }
}

pub async fn move_league_position(
    State(state): State<AppState>,
    Json(req): Json<MovePositionRequest>,
) -> Result<Json<Value>> {
    let direction = MoveDirection::parse(&req.direction)
        .ok_or_else(|| AppError::invalid_data("direction must be 'up' or 'down'"))?;

    let manager = PositionManager::new(&state);
    if manager.move_league(req.league_id, direction).await? {
        Ok(Json(json!({
            "status": "success",
            "message": format!("Moved league {} {}", req.league_id, req.direction),
        })))
    } else {
        Ok(Json(json!({
            "status": "error",
            "message": format!("Cannot move league {} {}", req.league_id, req.direction),
        })))
    }
}

pub async fn change_league_position(
    State(state): State<AppState>,
    Json(req): Json<ChangePositionRequest>,
) -> Result<Json<Value>> {
    let manager = PositionManager::new(&state);
    if manager.set_position(req.league_id, req.new_position).await? {
        Ok(Json(json!({
            "status": "success",
            "message": format!("Changed league {} to position {}", req.league_id, req.new_position),
        })))
    } else {
        Ok(Json(json!({
            "status": "error",
            "message": format!("Cannot change league {} to position {}", req.league_id, req.new_position),
        })))
    }
}

pub async fn run_full_update(State(state): State<AppState>) -> Result<Json<Value>> {
    let summary = jobs::perform_full_update(&state).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Full update completed",
        "summary": summary,
    })))
}

pub async fn run_daily_update(State(state): State<AppState>) -> Result<Json<Value>> {
    let summary = jobs::perform_daily_update(&state).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Daily update completed",
        "summary": summary,
    })))
}

/// Fans the selected operations out across a season range, one season at
/// a time, with independent toggles per sub-resource.
pub async fn multi_season_update(
    State(state): State<AppState>,
    Json(req): Json<MultiSeasonUpdateRequest>,
) -> Result<Json<Value>> {
    tracing::info!(
        "Starting multi-season update for league {} from season {} to {}",
        req.league_id,
        req.season_from,
        req.season_to
    );

    if req.season_from > req.season_to {
        return Err(AppError::invalid_data("season_from must not exceed season_to"));
    }

    let mut seasons_processed = Vec::new();

    for season in req.season_from..=req.season_to {
        let mut updates = serde_json::Map::new();

        if req.update_matches {
            MatchUpdater::new(&state)
                .update_league_matches(req.league_id, season)
                .await?;
            updates.insert("matches".into(), json!("completed"));
        }

        if req.update_teams {
            MatchUpdater::new(&state)
                .update_teams_by_league_and_season(req.league_id, season)
                .await?;
            updates.insert("teams".into(), json!("completed"));
        }

        if req.update_players {
            PlayersUpdater::new(&state)
                .update_players_by_league_and_season(req.league_id, season)
                .await?;
            updates.insert("players".into(), json!("completed"));
        }

        let detail_runs = [
            (Subresource::Statistics, false, req.update_statistics, "statistics"),
            (Subresource::Statistics, true, req.update_statistics_missing, "statistics_missing"),
            (Subresource::Lineups, false, req.update_lineups, "lineups"),
            (Subresource::Lineups, true, req.update_lineups_missing, "lineups_missing"),
            (Subresource::Events, false, req.update_events, "events"),
            (Subresource::Events, true, req.update_events_missing, "events_missing"),
        ];

        for (kind, missing_only, enabled, label) in detail_runs {
            if !enabled {
                continue;
            }
            let updater = SubresourceUpdater::new(&state, kind);
            if missing_only {
                updater.update_missing(req.league_id, season).await?;
            } else {
                updater.update_full(req.league_id, season).await?;
            }
            updates.insert(label.into(), json!("completed"));
        }

        seasons_processed.push(json!({ "season": season, "updates": updates }));
        tracing::info!("Season {} processing completed for league {}", season, req.league_id);
    }

    Ok(Json(json!({
        "status": "success",
        "message": format!(
            "Multi-season update completed for league {} from season {} to {}",
            req.league_id, req.season_from, req.season_to
        ),
        "results": {
            "league_id": req.league_id,
            "season_from": req.season_from,
            "season_to": req.season_to,
            "seasons_processed": seasons_processed,
        },
    })))
}
