//! Data access.
//!
//! Task and task-list repositories are constructed for one owner and add
//! `user_id = ?` to every statement, so handlers never repeat ownership
//! checks. Missing and foreign rows both surface as `AppError::NotFound`;
//! pointing a task at someone else's list surfaces as `AppError::Forbidden`.

pub mod sessions;
pub mod task_lists;
pub mod tasks;
pub mod users;

pub use sessions::SessionRepository;
pub use task_lists::TaskListRepository;
pub use tasks::TaskRepository;
pub use users::{NewUser, UserRepository};
