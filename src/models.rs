pub mod auth;
pub mod checklist;
pub mod dashboard;
pub mod downtime;
pub mod fleet;
pub mod inspection;
pub mod pms;
