use axum::{middleware::from_fn_with_state, routing::post, Router};

use crate::handlers::updater;
use crate::middleware::admin::validate_admin;
use crate::state::AppState;

/// Admin trigger surface. Every route is guarded by the access_token
/// validation middleware.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/update_matches/", post(updater::update_matches))
        .route("/update_leagues/", post(updater::update_leagues))
        .route("/update_teams/", post(updater::update_teams))
        .route(
            "/update_league_current_season/",
            post(updater::update_league_current_season),
        )
        .route("/update_match_lineups/", post(updater::update_match_lineups))
        .route("/update_match_events/", post(updater::update_match_events))
        .route(
            "/update_match_statistics/",
            post(updater::update_match_statistics),
        )
        .route("/update_league_players/", post(updater::update_league_players))
        .route("/update_players/", post(updater::update_players))
        .route("/update_player_teams/", post(updater::update_player_teams))
        .route("/update_league_lineups/", post(updater::update_league_lineups))
        .route(
            "/update_league_lineups_missing/",
            post(updater::update_league_lineups_missing),
        )
        .route("/update_league_events/", post(updater::update_league_events))
        .route(
            "/update_league_events_missing/",
            post(updater::update_league_events_missing),
        )
        .route(
            "/update_league_statistics/",
            post(updater::update_league_statistics),
        )
        .route(
            "/update_league_statistics_missing/",
            post(updater::update_league_statistics_missing),
        )
        .route(
            "/check_available_seasons/",
            post(updater::check_available_seasons),
        )
        .route("/move_league_position/", post(updater::move_league_position))
        .route(
            "/change_league_position/",
            post(updater::change_league_position),
        )
        .route("/multi_season_update/", post(updater::multi_season_update))
        .route("/run_full_update/", post(updater::run_full_update))
        .route("/run_daily_update/", post(updater::run_daily_update))
        .layer(from_fn_with_state(state, validate_admin))
}
