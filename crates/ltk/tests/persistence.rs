//! Persistent models over the memory and file stores.
use std::rc::Rc;

use ltk::{FileStorage, Kind, prelude::*};

ltk::model! {
    struct TodoModel {
        note: String = "",
        completed: bool = false,
        suggestion: String = "",
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn todo_defaults_and_writes() {
    init_logging();
    let store = Rc::new(MemoryStorage::new());
    let todo = TodoModel::builder().persistent(store, None).unwrap();
    assert_eq!(todo.attribute("note").unwrap().kind(), Kind::Str);
    assert_eq!(todo.value("note").unwrap(), "");
    assert_eq!(todo.value("completed").unwrap(), false);
    assert_eq!(todo.value("suggestion").unwrap(), "");

    todo.set("note", "Buy groceries").unwrap();
    todo.set("completed", true).unwrap();
    todo.set("suggestion", "Don't forget milk").unwrap();
    assert_eq!(todo.value("note").unwrap(), "Buy groceries");
    assert!(todo.get::<bool>("completed").unwrap());
    assert_eq!(todo.value("suggestion").unwrap(), "Don't forget milk");
}

#[test]
fn every_change_is_stored_under_the_class_key() {
    init_logging();
    let store = MemoryStorage::new();
    let todo = TodoModel::builder()
        .persistent(Rc::new(store.clone()), Some("t1"))
        .unwrap();
    todo.set("note", "milk").unwrap();
    assert_eq!(
        store.get_item("TodoModel-t1").unwrap().as_deref(),
        Some(r#"{"note":"milk","completed":false,"suggestion":""}"#)
    );
    todo.set("completed", true).unwrap();
    assert_eq!(
        store.get_item("TodoModel-t1").unwrap().as_deref(),
        Some(r#"{"note":"milk","completed":true,"suggestion":""}"#)
    );
}

#[test]
fn generated_keys_never_collide() {
    init_logging();
    let store = Rc::new(MemoryStorage::new());
    let first = TodoModel::builder().persistent(store.clone(), None).unwrap();
    let second = TodoModel::builder().persistent(store.clone(), None).unwrap();
    assert_ne!(first.key(), second.key());

    first.set("note", "first").unwrap();
    second.set("note", "second").unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn records_survive_a_restart() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.json");
    {
        let store: Rc<dyn Storage> = Rc::new(FileStorage::open(&path).unwrap());
        for note in ["eggs", "bread", "coffee"] {
            let todo = TodoModel::builder()
                .set("note", note)
                .persistent(store.clone(), None)
                .unwrap();
            assert_eq!(todo.value("note").unwrap(), note);
        }
    }

    let store: Rc<dyn Storage> = Rc::new(FileStorage::open(&path).unwrap());
    let todos = TodoModel::builder().load_all(store.clone()).unwrap();
    let notes = todos
        .iter()
        .map(|todo| todo.value("note").unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(notes, vec!["eggs", "bread", "coffee"]);

    // typed access over a loaded record
    let first = TodoModel::from_model(todos[0].model().clone());
    first.set_completed(true);
    let reopened = TodoModel::builder()
        .persistent(store, Some(todos[0].key()))
        .unwrap();
    assert!(reopened.get::<bool>("completed").unwrap());
}

#[test]
fn removed_records_are_not_loaded() {
    init_logging();
    let store = Rc::new(MemoryStorage::new());
    let todo = TodoModel::builder()
        .set("note", "gone soon")
        .persistent(store.clone(), Some("doomed"))
        .unwrap();
    todo.save().unwrap();
    assert_eq!(TodoModel::builder().load_all(store.clone()).unwrap().len(), 1);
    todo.remove().unwrap();
    assert!(TodoModel::builder().load_all(store).unwrap().is_empty());
}

#[test]
fn corrupt_records_fall_back_to_defaults() {
    init_logging();
    let store = Rc::new(MemoryStorage::new());
    store.set_item("TodoModel-x", "[1, 2, 3]").unwrap();
    let todo = TodoModel::builder()
        .persistent(store.clone(), Some("x"))
        .unwrap();
    assert_eq!(todo.value("note").unwrap(), "");

    // the next change replaces the corrupt record
    todo.set("note", "fixed").unwrap();
    assert!(store.get_item("TodoModel-x").unwrap().unwrap().contains("fixed"));
}
