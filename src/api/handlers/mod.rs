pub mod adjustments;
pub mod auth;
pub mod events;
pub mod leaderboard;
pub mod notifications;
pub mod review;
pub mod root;
pub mod submissions;
pub mod users;
