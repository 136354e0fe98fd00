use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// One league document as returned by the external API, stored verbatim.
/// Replaced wholesale on every leagues refresh, keyed by `league.id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub league: LeagueInfo,

    #[serde(default)]
    pub seasons: Vec<LeagueSeason>,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub id: i64,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueSeason {
    pub year: i32,

    #[serde(flatten)]
    pub extra: Document,
}
