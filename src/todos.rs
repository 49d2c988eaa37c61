//! Todo list state: a tagged action set and a pure reducer, with a small
//! container that hands out ids and timestamps.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: u64,
    pub text: String,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoAction {
    Add(TodoItem),
    Toggle(u64),
    Delete(u64),
    Edit { id: u64, text: String },
}

/// Unknown ids leave the list untouched.
pub fn reduce(mut todos: Vec<TodoItem>, action: TodoAction) -> Vec<TodoItem> {
    match action {
        TodoAction::Add(item) => todos.push(item),
        TodoAction::Toggle(id) => {
            if let Some(todo) = todos.iter_mut().find(|t| t.id == id) {
                todo.completed = !todo.completed;
            }
        }
        TodoAction::Delete(id) => todos.retain(|t| t.id != id),
        TodoAction::Edit { id, text } => {
            if let Some(todo) = todos.iter_mut().find(|t| t.id == id) {
                todo.text = text;
            }
        }
    }
    todos
}

#[derive(Debug, Clone, Default)]
pub struct TodoList {
    todos: Vec<TodoItem>,
}

impl TodoList {
    pub fn new(todos: Vec<TodoItem>) -> Self {
        Self { todos }
    }

    /// The two starter items of the exercise.
    pub fn seeded() -> Self {
        let now = OffsetDateTime::now_utc();
        Self::new(vec![
            TodoItem {
                id: 1,
                text: "Learn React with TypeScript".into(),
                completed: false,
                created_at: now,
            },
            TodoItem {
                id: 2,
                text: "Implement the Context API".into(),
                completed: true,
                created_at: now,
            },
        ])
    }

    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    pub fn dispatch(&mut self, action: TodoAction) {
        self.todos = reduce(std::mem::take(&mut self.todos), action);
    }

    /// Appends a new open item and returns its id.
    pub fn add(&mut self, text: impl Into<String>) -> u64 {
        let id = self.todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        self.dispatch(TodoAction::Add(TodoItem {
            id,
            text: text.into(),
            completed: false,
            created_at: OffsetDateTime::now_utc(),
        }));
        id
    }

    pub fn toggle(&mut self, id: u64) {
        self.dispatch(TodoAction::Toggle(id));
    }

    pub fn delete(&mut self, id: u64) {
        self.dispatch(TodoAction::Delete(id));
    }

    pub fn edit(&mut self, id: u64, text: impl Into<String>) {
        self.dispatch(TodoAction::Edit {
            id,
            text: text.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reducer_handles_every_action() {
        let mut list = TodoList::seeded();
        let id = list.add("Write tests");
        assert_eq!(id, 3);
        assert_eq!(list.todos().len(), 3);

        list.toggle(1);
        assert!(list.todos()[0].completed);
        list.toggle(1);
        assert!(!list.todos()[0].completed);

        list.edit(id, "Write more tests");
        assert_eq!(list.todos()[2].text, "Write more tests");

        list.delete(2);
        let ids: Vec<u64> = list.todos().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let before = TodoList::seeded();
        let mut after = before.clone();
        after.toggle(99);
        after.edit(99, "nope");
        after.delete(99);
        assert_eq!(before.todos(), after.todos());
    }

    #[test]
    fn reduce_is_pure_over_its_input() {
        let todos = TodoList::seeded().todos().to_vec();
        let next = reduce(todos.clone(), TodoAction::Delete(1));
        assert_eq!(todos.len(), 2);
        assert_eq!(next.len(), 1);
    }
}
