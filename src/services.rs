pub mod auth;
pub mod customer_service;
pub mod dashboard_service;
pub mod export_service;
pub mod file_service;
pub mod note_service;
pub mod report_service;
pub mod tenancy_service;
