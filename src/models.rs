pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod report;
pub mod tenancy;
