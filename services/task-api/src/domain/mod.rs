//! 领域层

pub mod repository;
pub mod task;
pub mod user;

pub use repository::*;
pub use task::*;
pub use user::*;
