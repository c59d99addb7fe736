pub mod branch_repository;
pub mod commit_repository;
pub mod fetch_repository;
pub mod maven_task;

pub use branch_repository::{BranchRepositoryConfig, BranchRepositoryUseCase};
pub use commit_repository::{CommitRepositoryConfig, CommitRepositoryUseCase};
pub use fetch_repository::{FetchRepositoryConfig, FetchRepositoryUseCase};
pub use maven_task::{MavenAction, MavenTaskConfig, MavenTaskUseCase};
