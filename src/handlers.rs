pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod export;
pub mod notes;
pub mod pages;
pub mod reports;
pub mod tenancy;
