//! TodoList views for each UI edition

use std::fmt::Write;
use std::sync::Arc;

use super::{escape_html, UiComponent, UiEdition, UiRegistry};
use crate::models::Todo;

pub const TODO_LIST_DIR: &str = "todo";
pub const TODO_LIST_FILE: &str = "TodoList";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListProps {
    pub todos: Vec<Todo>,
}

fn render_list(props: &TodoListProps, badge: &str, edit_button: &str) -> String {
    let mut html = String::new();
    html.push_str(r#"<div class="p-4"><h1 class="text-2xl font-bold mb-4">Todo List</h1>"#);
    html.push_str(badge);
    html.push_str(r#"<ul class="space-y-2">"#);
    for todo in &props.todos {
        let checked = if todo.is_completed { " checked" } else { "" };
        let strike = if todo.is_completed { "line-through" } else { "" };
        let _ = write!(
            html,
            r#"<li data-id="{id}"><input type="checkbox"{checked}/><span class="{strike}">{title}</span><button class="destructive">Delete</button>{edit_button}</li>"#,
            id = todo.id,
            title = escape_html(&todo.title),
        );
    }
    html.push_str("</ul></div>");
    html
}

/// Community view: editing is shown but disabled.
#[derive(Debug, Default)]
pub struct TodoListCe;

impl UiComponent<TodoListProps> for TodoListCe {
    fn render(&self, props: &TodoListProps) -> String {
        render_list(
            props,
            r#"<span class="badge bg-green-500">Community Edition</span>"#,
            r#"<button disabled title="Editing is only available in the Enterprise Edition">Edit</button>"#,
        )
    }
}

/// Enterprise view: titles are editable.
#[derive(Debug, Default)]
pub struct TodoListEe;

impl UiComponent<TodoListProps> for TodoListEe {
    fn render(&self, props: &TodoListProps) -> String {
        render_list(
            props,
            r#"<span class="badge bg-blue-500">Enterprise Edition</span>"#,
            r#"<button class="outline">Edit</button>"#,
        )
    }
}

/// UI components shipped in this build.
pub fn builtin_ui_registry() -> UiRegistry<TodoListProps> {
    let mut registry = UiRegistry::new();
    registry
        .register(TODO_LIST_DIR, TODO_LIST_FILE, UiEdition::Ce, || async {
            Ok(Arc::new(TodoListCe) as Arc<dyn UiComponent<TodoListProps>>)
        })
        .register(TODO_LIST_DIR, TODO_LIST_FILE, UiEdition::Ee, || async {
            Ok(Arc::new(TodoListEe) as Arc<dyn UiComponent<TodoListProps>>)
        });
    registry
}
