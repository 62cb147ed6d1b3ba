pub mod fields;
pub mod response;
pub mod task;
pub mod task_list;
pub mod user;

pub use response::ApiResponse;
pub use task::{NewTask, Task, TaskPatch, TaskPriority, TaskStats};
pub use task_list::{
    MoveTasksRequest, NewTaskList, TaskList, TaskListPatch, TaskListSummary, TaskListWithTasks,
};
pub use user::{Profile, SessionUser, User};
