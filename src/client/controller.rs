use std::cell::Cell;
use std::rc::Rc;

use log::{debug, warn};

use super::api::{ClientError, TaskApi};
use super::optimistic::{MutationOutcome, PendingMutation};
use super::store::TaskStore;
use crate::models::{NewTask, Task, TaskList, TaskPatch};

/// Runs the user's task actions against the API and keeps the store in
/// step, surfacing failures as error toasts.
pub struct TaskController<A> {
    api: A,
    store: Rc<TaskStore>,
    loads_in_flight: Cell<usize>,
}

impl<A: TaskApi> TaskController<A> {
    pub fn new(api: A, store: Rc<TaskStore>) -> Self {
        Self {
            api,
            store,
            loads_in_flight: Cell::new(0),
        }
    }

    pub fn store(&self) -> &Rc<TaskStore> {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Replaces the store's tasks with the server's. Overlapping calls are
    /// not cancelled; whichever resolves last wins, and `is_loading` stays
    /// set until all of them have finished.
    pub async fn load_tasks(&self) -> Result<(), ClientError> {
        self.loads_in_flight.set(self.loads_in_flight.get() + 1);
        self.store.set_loading(true);
        let result = self.api.fetch_tasks().await;
        let remaining = self.loads_in_flight.get() - 1;
        self.loads_in_flight.set(remaining);
        if remaining == 0 {
            self.store.set_loading(false);
        }

        match result {
            Ok(tasks) => {
                debug!("Loaded {} tasks", tasks.len());
                self.store.set_tasks(tasks);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load tasks: {}", e);
                self.store.notifications().error("Could not load tasks");
                Err(e)
            }
        }
    }

    pub async fn create_task(&self, task: NewTask) -> Result<Task, ClientError> {
        match self.api.create_task(&task).await {
            Ok(created) => {
                self.store.add_task(created.clone());
                self.store.notifications().success("Task created");
                Ok(created)
            }
            Err(e) => {
                warn!("Failed to create task: {}", e);
                self.store.notifications().error(error_message(&e, "Could not create task"));
                Err(e)
            }
        }
    }

    /// Edits a task without an optimistic step. On failure the whole list is
    /// reloaded, since the local copy may no longer match the server.
    pub async fn save_task(&self, id: i64, patch: TaskPatch) -> Result<Task, ClientError> {
        match self.api.update_task(id, &patch).await {
            Ok(task) => {
                if !self.store.replace_task(task.clone()) {
                    self.store.add_task(task.clone());
                }
                self.store.notifications().success("Task updated");
                Ok(task)
            }
            Err(e) => {
                warn!("Failed to update task {}: {}", id, e);
                self.store.notifications().error(error_message(&e, "Could not update task"));
                // The reload reports its own failure.
                let _ = self.load_tasks().await;
                Err(e)
            }
        }
    }

    /// Flips `completed` immediately, then asks the server. `None` when the
    /// task is not in the store.
    pub async fn toggle_task(&self, id: i64) -> Option<MutationOutcome> {
        let pending = PendingMutation::toggle(&self.store, id)?;
        let patch = pending.patch()?;

        Some(match self.api.update_task(id, &patch).await {
            Ok(task) => pending.confirm(&self.store, Some(task)),
            Err(e) => {
                warn!("Failed to toggle task {}: {}", id, e);
                self.store.notifications().error("Could not update task");
                pending.roll_back(&self.store)
            }
        })
    }

    /// Removes the task immediately, then asks the server. `None` when the
    /// task is not in the store.
    pub async fn delete_task(&self, id: i64) -> Option<MutationOutcome> {
        let pending = PendingMutation::remove(&self.store, id)?;

        Some(match self.api.delete_task(id).await {
            Ok(()) => {
                self.store.notifications().success("Task deleted");
                pending.confirm(&self.store, None)
            }
            Err(e) => {
                warn!("Failed to delete task {}: {}", id, e);
                self.store.notifications().error(error_message(&e, "Could not delete task"));
                pending.roll_back(&self.store)
            }
        })
    }

    pub async fn load_task_lists(&self) -> Result<Vec<TaskList>, ClientError> {
        self.api.fetch_task_lists().await.map_err(|e| {
            warn!("Failed to load task lists: {}", e);
            self.store.notifications().error("Could not load task lists");
            e
        })
    }
}

/// The server's own message for 4xx answers, `fallback` otherwise.
fn error_message(error: &ClientError, fallback: &str) -> String {
    match error {
        ClientError::Status { status, message } if (400..500).contains(status) => message.clone(),
        _ => fallback.to_string(),
    }
}
