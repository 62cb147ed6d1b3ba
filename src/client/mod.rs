//! Client side of the task views: a reactive store with derived views,
//! optimistic toggle/delete, toasts, and an HTTP client for the API.
//!
//! Everything here is single-threaded; state lives in `RefCell`s and
//! subscribers are called synchronously from the action that changed it.

pub mod api;
pub mod controller;
pub mod filters;
pub mod notify;
pub mod optimistic;
pub mod store;

pub use api::{ApiClient, ClientError, TaskApi};
pub use controller::TaskController;
pub use filters::{count_tasks, filter_tasks, TaskCounts, TaskFilter};
pub use notify::{Notifications, Toast, ToastKind};
pub use optimistic::{MutationOutcome, PendingMutation};
pub use store::{Atom, SubscriptionId, TaskStore};
