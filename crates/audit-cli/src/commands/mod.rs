pub mod audit;
pub mod dispatch;
pub mod finalize;
pub mod open;
pub mod score;
pub mod shared;
pub mod show;
pub mod types;
pub mod violation;
