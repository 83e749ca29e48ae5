//! A persistent todo list.
use std::{path::PathBuf, rc::Rc};

use anyhow::Context;
use ltk::FileStorage;
use ltk_widgets::prelude::*;

ltk::model! {
    pub struct TodoModel {
        note: String = "",
        completed: bool = false,
        suggestion: String = "",
    }
}

pub struct Options {
    pub store: Option<PathBuf>,
    pub add: Vec<String>,
    pub done: Vec<usize>,
    pub remove: Vec<usize>,
}

fn open_store(path: Option<PathBuf>) -> anyhow::Result<Rc<dyn Storage>> {
    Ok(match path {
        Some(path) => {
            let store = FileStorage::open(&path)
                .with_context(|| format!("could not open {}", path.display()))?;
            Rc::new(store)
        }
        None => {
            log::info!("no --store given, todos only live for this run");
            Rc::new(MemoryStorage::new())
        }
    })
}

fn item(todo: &PersistentModel) -> anyhow::Result<HBox> {
    Ok(HBox::new()
        .attr("id", todo.storage_key())
        .add(Checkbox::new(todo.attribute("completed")?))
        .add(Input::new(todo.attribute("note")?).width(300))
        .add(Text::new(todo.attribute("suggestion")?).css("color", "gray")))
}

/// Suggests something to go with a new note.
fn suggest(model: &Model, name: &str, value: &Value) -> anyhow::Result<()> {
    if name != "note" {
        return Ok(());
    }
    let note = value.to_string().to_lowercase();
    let suggestion = if note.contains("grocer") {
        "Don't forget milk"
    } else if note.contains("call") {
        "Check the number first"
    } else {
        ""
    };
    model.set("suggestion", suggestion)?;
    Ok(())
}

pub fn run(options: Options) -> anyhow::Result<()> {
    let store = open_store(options.store)?;
    let builder = TodoModel::builder().on_changed(suggest);
    let mut todos = builder.load_all(store.clone())?;
    log::debug!("loaded {} todos", todos.len());

    for index in options.done {
        let todo = todos
            .get(index)
            .with_context(|| format!("there is no todo {index}"))?;
        todo.set("completed", true)?;
    }

    let mut remove = options.remove;
    remove.sort_unstable();
    remove.dedup();
    for index in remove.into_iter().rev() {
        anyhow::ensure!(index < todos.len(), "there is no todo {index}");
        todos.remove(index).remove()?;
    }

    for note in options.add {
        let todo = builder.clone().persistent(store.clone(), None)?;
        todo.set("note", note)?;
        todos.push(todo);
    }

    let list = todos
        .iter()
        .try_fold(VBox::new().attr("id", "todos"), |list, todo| {
            Ok::<_, anyhow::Error>(list.add(item(todo)?))
        })?;
    crate::show("todos", &list.html_string());
    for (index, todo) in todos.iter().enumerate() {
        println!("{index}: {}", todo.model());
    }
    Ok(())
}
