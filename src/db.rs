pub mod user_repo;
pub use user_repo::UserRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod session_repo;
pub use session_repo::SessionRepository;
