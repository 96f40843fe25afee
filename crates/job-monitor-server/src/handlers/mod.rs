pub mod connectivity;
pub mod dashboard;
pub mod health;
