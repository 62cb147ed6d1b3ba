use super::store::TaskStore;
use crate::models::{Task, TaskPatch};

/// How an optimistic mutation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The server accepted it; local state is authoritative again.
    Confirmed,
    /// The server refused it (or was unreachable); local state was restored.
    RolledBack,
}

/// A mutation already applied to the store and awaiting the server.
///
/// Consumed by either [`confirm`](Self::confirm) or
/// [`roll_back`](Self::roll_back), so it cannot be settled twice.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingMutation {
    Toggle { task_id: i64, previous: bool },
    Remove { index: usize, task: Task },
}

impl PendingMutation {
    /// Flips `completed` locally. `None` when the task is not loaded.
    pub fn toggle(store: &TaskStore, task_id: i64) -> Option<Self> {
        let previous = store.find_task(task_id)?.completed;
        store.update_task(task_id, &TaskPatch::completed(!previous));
        Some(PendingMutation::Toggle { task_id, previous })
    }

    /// Removes the task locally, remembering where it was.
    pub fn remove(store: &TaskStore, task_id: i64) -> Option<Self> {
        let (index, task) = store.remove_task(task_id)?;
        Some(PendingMutation::Remove { index, task })
    }

    pub fn task_id(&self) -> i64 {
        match self {
            PendingMutation::Toggle { task_id, .. } => *task_id,
            PendingMutation::Remove { task, .. } => task.id,
        }
    }

    /// The body to send for a toggle.
    pub fn patch(&self) -> Option<TaskPatch> {
        match self {
            PendingMutation::Toggle { previous, .. } => Some(TaskPatch::completed(!previous)),
            PendingMutation::Remove { .. } => None,
        }
    }

    /// Settles a successful request. A toggle takes the server's row when
    /// one is given.
    pub fn confirm(self, store: &TaskStore, server_row: Option<Task>) -> MutationOutcome {
        if let (PendingMutation::Toggle { .. }, Some(row)) = (&self, server_row) {
            store.replace_task(row);
        }
        MutationOutcome::Confirmed
    }

    /// Undoes the local change.
    pub fn roll_back(self, store: &TaskStore) -> MutationOutcome {
        match self {
            PendingMutation::Toggle { task_id, previous } => {
                store.update_task(task_id, &TaskPatch::completed(previous));
            }
            PendingMutation::Remove { index, task } => store.insert_task(index, task),
        }
        MutationOutcome::RolledBack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::filters::tests::{task, today};

    fn store() -> TaskStore {
        let store = TaskStore::with_clock(today);
        store.set_tasks(vec![task(1, "One"), task(2, "Two"), task(3, "Three")]);
        store
    }

    #[test]
    fn test_toggle_confirm_takes_server_row() {
        let store = store();
        let pending = PendingMutation::toggle(&store, 2).unwrap();
        assert!(store.find_task(2).unwrap().completed);
        assert_eq!(pending.patch(), Some(TaskPatch::completed(true)));

        let server_row = Task {
            completed: true,
            list_name: Some("Home".into()),
            ..task(2, "Two")
        };
        assert_eq!(
            pending.confirm(&store, Some(server_row)),
            MutationOutcome::Confirmed
        );
        assert_eq!(store.find_task(2).unwrap().list_name.as_deref(), Some("Home"));
    }

    #[test]
    fn test_toggle_roll_back() {
        let store = store();
        let pending = PendingMutation::toggle(&store, 1).unwrap();
        assert_eq!(store.task_counts().get().completed, 1);

        assert_eq!(pending.roll_back(&store), MutationOutcome::RolledBack);
        assert!(!store.find_task(1).unwrap().completed);
        assert_eq!(store.task_counts().get().completed, 0);
    }

    #[test]
    fn test_remove_roll_back_restores_position() {
        let store = store();
        let pending = PendingMutation::remove(&store, 2).unwrap();
        assert_eq!(pending.task_id(), 2);
        assert!(store.find_task(2).is_none());

        pending.roll_back(&store);
        let ids: Vec<i64> = store.all_tasks().get().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_task() {
        let store = store();
        assert!(PendingMutation::toggle(&store, 42).is_none());
        assert!(PendingMutation::remove(&store, 42).is_none());
    }
}
