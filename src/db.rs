pub mod user_repo;
pub use user_repo::UserRepository;
pub mod session_repo;
pub use session_repo::SessionRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod note_repo;
pub use note_repo::NoteRepository;
pub mod file_repo;
pub use file_repo::FileRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
