//! PostgreSQL 持久化实现

mod task_repository;
mod user_repository;

pub use task_repository::PostgresTaskRepository;
pub use user_repository::PostgresUserRepository;
