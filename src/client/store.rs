use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use chrono::{Local, NaiveDate};

use super::filters::{count_tasks, filter_tasks, TaskCounts, TaskFilter};
use super::notify::Notifications;
use crate::models::{Task, TaskPatch, TaskPriority};

/// Handle returned by [`Atom::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Rc<dyn Fn(&T)>;

/// A value cell that notifies its subscribers synchronously on every write.
///
/// Subscribers run in subscription order, after the new value is stored,
/// and receive a snapshot so they may read or write any atom (this one
/// included) without a borrow conflict.
pub struct Atom<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber<T>)>>,
    next_id: Cell<u64>,
}

impl<T: Clone> Atom<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Reads the value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.notify();
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
        self.notify();
    }

    pub fn subscribe(&self, subscriber: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(subscriber)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    fn notify(&self) {
        let snapshot = self.get();
        let subscribers: Vec<Subscriber<T>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, s)| Rc::clone(s))
            .collect();
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }
}

impl<T: Clone + Default> Default for Atom<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

struct State {
    all_tasks: Atom<Vec<Task>>,
    current_filter: Atom<TaskFilter>,
    search_term: Atom<String>,
    priority_filter: Atom<Option<TaskPriority>>,
    current_list_id: Atom<Option<i64>>,
    is_loading: Atom<bool>,
    filtered_tasks: Atom<Vec<Task>>,
    task_counts: Atom<TaskCounts>,
    clock: Box<dyn Fn() -> NaiveDate>,
}

impl State {
    fn recompute_filtered(&self) {
        let today = (self.clock)();
        let filtered = self.all_tasks.with(|tasks| {
            filter_tasks(
                tasks,
                self.current_filter.get(),
                &self.search_term.get(),
                self.priority_filter.get(),
                today,
            )
        });
        self.filtered_tasks.set(filtered);
    }

    fn recompute_counts(&self) {
        let today = (self.clock)();
        let counts = self.all_tasks.with(|tasks| count_tasks(tasks, today));
        self.task_counts.set(counts);
    }
}

/// Client-side state for the task views.
///
/// `filtered_tasks` and `task_counts` are derived: they are pushed from the
/// source atoms whenever one of those is written, before any outside
/// subscriber of the source atom runs.
pub struct TaskStore {
    state: Rc<State>,
    notifications: Notifications,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::with_clock(|| Local::now().date_naive())
    }

    /// A store whose notion of "today" comes from `clock`.
    pub fn with_clock(clock: impl Fn() -> NaiveDate + 'static) -> Self {
        let state = Rc::new(State {
            all_tasks: Atom::default(),
            current_filter: Atom::default(),
            search_term: Atom::default(),
            priority_filter: Atom::default(),
            current_list_id: Atom::default(),
            is_loading: Atom::default(),
            filtered_tasks: Atom::default(),
            task_counts: Atom::default(),
            clock: Box::new(clock),
        });

        let weak = Rc::downgrade(&state);
        state.all_tasks.subscribe(recompute_on(&weak, |s: &State| {
            s.recompute_filtered();
            s.recompute_counts();
        }));
        state
            .current_filter
            .subscribe(recompute_on(&weak, State::recompute_filtered));
        state
            .search_term
            .subscribe(recompute_on(&weak, State::recompute_filtered));
        state
            .priority_filter
            .subscribe(recompute_on(&weak, State::recompute_filtered));

        Self {
            state,
            notifications: Notifications::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        (self.state.clock)()
    }

    pub fn all_tasks(&self) -> &Atom<Vec<Task>> {
        &self.state.all_tasks
    }

    pub fn current_filter(&self) -> &Atom<TaskFilter> {
        &self.state.current_filter
    }

    pub fn search_term(&self) -> &Atom<String> {
        &self.state.search_term
    }

    pub fn priority_filter(&self) -> &Atom<Option<TaskPriority>> {
        &self.state.priority_filter
    }

    pub fn current_list_id(&self) -> &Atom<Option<i64>> {
        &self.state.current_list_id
    }

    pub fn is_loading(&self) -> &Atom<bool> {
        &self.state.is_loading
    }

    pub fn filtered_tasks(&self) -> &Atom<Vec<Task>> {
        &self.state.filtered_tasks
    }

    pub fn task_counts(&self) -> &Atom<TaskCounts> {
        &self.state.task_counts
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn find_task(&self, id: i64) -> Option<Task> {
        self.state
            .all_tasks
            .with(|tasks| tasks.iter().find(|t| t.id == id).cloned())
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        self.state.all_tasks.set(tasks);
    }

    /// Appends `task` to the end of the list.
    pub fn add_task(&self, task: Task) {
        self.state.all_tasks.update(|tasks| tasks.push(task));
    }

    /// Merges `patch` into the task with `id`. Returns `false` (and does not
    /// notify) when no such task is loaded.
    pub fn update_task(&self, id: i64, patch: &TaskPatch) -> bool {
        if self.find_task(id).is_none() {
            return false;
        }
        self.state.all_tasks.update(|tasks| {
            if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
                patch.apply_to(task);
            }
        });
        true
    }

    /// Swaps in the server's copy of a task, keeping its position.
    pub fn replace_task(&self, task: Task) -> bool {
        if self.find_task(task.id).is_none() {
            return false;
        }
        self.state.all_tasks.update(|tasks| {
            if let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) {
                *slot = task;
            }
        });
        true
    }

    /// Removes the task with `id`, returning it with the index it held.
    pub fn remove_task(&self, id: i64) -> Option<(usize, Task)> {
        let index = self
            .state
            .all_tasks
            .with(|tasks| tasks.iter().position(|t| t.id == id))?;

        let mut removed = None;
        self.state
            .all_tasks
            .update(|tasks| removed = Some(tasks.remove(index)));
        removed.map(|task| (index, task))
    }

    /// Inserts `task` at `index`, or at the end when the list got shorter.
    pub fn insert_task(&self, index: usize, task: Task) {
        self.state.all_tasks.update(|tasks| {
            let index = index.min(tasks.len());
            tasks.insert(index, task);
        });
    }

    pub fn set_filter(&self, filter: TaskFilter) {
        self.state.current_filter.set(filter);
    }

    pub fn set_search(&self, term: impl Into<String>) {
        self.state.search_term.set(term.into());
    }

    pub fn set_priority_filter(&self, priority: Option<TaskPriority>) {
        self.state.priority_filter.set(priority);
    }

    pub fn set_current_list_id(&self, list_id: Option<i64>) {
        self.state.current_list_id.set(list_id);
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.is_loading.set(loading);
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

fn recompute_on<T>(
    state: &Weak<State>,
    recompute: impl Fn(&State) + 'static,
) -> impl Fn(&T) + 'static {
    let state = Weak::clone(state);
    move |_: &T| {
        if let Some(state) = state.upgrade() {
            recompute(&state);
        }
    }
}
