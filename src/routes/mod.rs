pub mod donations;
pub mod foodbanks;
pub mod leaderboard;
pub mod profile;
pub mod recipes;
pub mod reports;
