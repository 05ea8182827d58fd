use chrono::Utc;

use super::id::IdGenerator;
use super::task::{Task, TaskFilter, TaskStats};
use crate::store::TaskStore;

/// The in-memory task collection, written through to `S` after every mutation.
///
/// Derived views (`filter`, `stats`) are computed on demand and never cached,
/// so callers re-read them after each mutating call.
#[derive(Debug)]
pub struct TaskList<S: TaskStore> {
    tasks: Vec<Task>,
    store: S,
    ids: IdGenerator,
}

impl<S: TaskStore> TaskList<S> {
    /// Load the collection from `store`, falling back to empty on any read failure.
    pub fn load(store: S) -> Self {
        Self::with_ids(store, IdGenerator::new())
    }

    pub fn with_ids(store: S, mut ids: IdGenerator) -> Self {
        let tasks = store.load();
        for task in &tasks {
            ids.observe(task.id);
        }
        Self { tasks, store, ids }
    }

    /// Append a new open task. Blank input is ignored and nothing is saved.
    pub fn add(&mut self, text: &str) -> Option<Task> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let task = Task::new(self.ids.next_id(), text, Utc::now());
        log::debug!("Adding task {}", task.id);
        self.tasks.push(task.clone());
        self.persist();
        Some(task)
    }

    pub fn toggle(&mut self, id: u64) {
        for task in self.tasks.iter_mut().filter(|t| t.id == id) {
            task.toggle();
        }
        self.persist();
    }

    pub fn delete(&mut self, id: u64) {
        self.tasks.retain(|t| t.id != id);
        self.persist();
    }

    pub fn clear_completed(&mut self) {
        self.tasks.retain(|t| !t.completed);
        self.persist();
    }

    pub fn filter(&self, filter: TaskFilter) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&self) {
        self.store.save(&self.tasks);
    }
}
