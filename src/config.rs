// config.rs
use std::env;

/// Fixture statuses after which a match result is considered final.
/// A real_match in one of these states is never overwritten by a
/// fixture-list refetch.
pub const FINISHED_STATUSES: [&str; 5] = ["FT", "AET", "PEN", "PST", "CANC"];

pub fn is_finished_status(status: &str) -> bool {
    FINISHED_STATUSES.contains(&status)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub football_api_key: String,
    pub football_api_host: String,
    pub database_url: String,
    pub database_name: String,
    pub validate_uri_admin: Option<String>,
    pub app_env: String,
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        AppConfig {
            football_api_key: env::var("FOOTBALL_API_KEY")
                .expect("FOOTBALL_API_KEY must be set"),
            football_api_host: env::var("FOOTBALL_API_HOST")
                .unwrap_or_else(|_| "v3.football.api-sports.io".to_string()),
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            database_name: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "futbol".to_string()),
            validate_uri_admin: env::var("VALIDATE_URI_ADMIN").ok(),
            // Admin validation must stay on unless development is asked
            // for explicitly.
            app_env: env::var("APP_ENV")
                .unwrap_or_else(|_| "production".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8020".to_string())
                .parse()
                .expect("PORT must be a number"),
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
        }
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_statuses_include_postponed_and_cancelled() {
        for s in ["FT", "AET", "PEN", "PST", "CANC"] {
            assert!(is_finished_status(s), "{} must be finished", s);
        }
    }

    #[test]
    fn live_statuses_are_not_finished() {
        for s in ["NS", "1H", "HT", "2H", "ET", "LIVE"] {
            assert!(!is_finished_status(s), "{} must not be finished", s);
        }
    }

    fn config_with_env(app_env: &str) -> AppConfig {
        AppConfig {
            football_api_key: "key".into(),
            football_api_host: "v3.football.api-sports.io".into(),
            database_url: "mongodb://localhost:27017".into(),
            database_name: "futbol".into(),
            validate_uri_admin: None,
            app_env: app_env.into(),
            port: 8020,
            host: "0.0.0.0".into(),
        }
    }

    #[test]
    fn only_explicit_development_disables_admin_validation() {
        assert!(config_with_env("development").is_development());
        assert!(!config_with_env("production").is_development());
        assert!(!config_with_env("").is_development());
        assert!(!config_with_env("Development").is_development());
    }
}
