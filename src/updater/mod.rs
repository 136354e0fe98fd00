pub mod jobs;
pub mod matches;
pub mod players;
pub mod positions;
pub mod schedule;
pub mod subresource;
