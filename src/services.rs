pub mod auth;
pub mod checklist_service;
pub mod dashboard_service;
pub mod document_service;
pub mod downtime_service;
pub mod fleet_service;
pub mod inspection_service;
pub mod pms_service;
pub mod safety_service;
