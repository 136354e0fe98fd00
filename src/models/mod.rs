pub mod league;
pub mod league_settings;
pub mod player;
pub mod real_match;
pub mod team;
