//! Application layer
//!
//! タスク単位のユースケース。コンテキストを組み立て、結果を`TaskReport`にまとめる。
pub mod task_context;
pub mod task_report;
pub mod use_cases;

pub use task_context::{RepositoryTarget, TaskContext};
pub use task_report::TaskReport;
