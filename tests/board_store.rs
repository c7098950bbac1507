use founders_route::model::{slugify, Board, BoardError, Column, Tag, TagColor, Task, TaskPatch};

fn ids(board: &Board, column: &str) -> Vec<String> {
    board.tasks_in(column).iter().map(|t| t.id.clone()).collect()
}

fn two_columns() -> Board {
    let mut board = Board::with_columns(vec![
        Column::new("todo", "To do", None, None),
        Column::new("done", "Done", None, None),
    ]);
    board.tasks.insert(
        "todo".into(),
        vec![Task::with_id("a", "A"), Task::with_id("b", "B"), Task::with_id("c", "C")],
    );
    board
}

#[test]
fn seed_is_deterministic_and_consistent() {
    let seed = Board::seed();
    assert_eq!(seed, Board::seed());
    assert_eq!(seed.columns.len(), 4);
    let keys: Vec<&String> = seed.tasks.keys().collect();
    let mut columns: Vec<&String> = seed.columns.iter().map(|c| &c.id).collect();
    columns.sort();
    assert_eq!(keys, columns);
    assert!(seed.task_count() > 0);
}

#[test]
fn column_ids_are_slugs_with_suffixes() {
    let mut board = Board::default();
    assert_eq!(board.add_column("Ready to Ship!", None, None).unwrap(), "ready-to-ship");
    assert_eq!(board.add_column("ready to ship", None, None).unwrap(), "ready-to-ship-2");
    assert_eq!(board.add_column("Ready  to ship", None, None).unwrap(), "ready-to-ship-3");
    assert_eq!(board.add_column("!!!", None, None).unwrap(), "column");
    assert!(board.tasks_in("ready-to-ship-3").is_empty());
    assert!(board.tasks.contains_key("column"));
    assert_eq!(board.add_column("   ", None, None), Err(BoardError::EmptyTitle));
    assert_eq!(slugify("Q3 / Q4 Plans"), "q3-q4-plans");
}

#[test]
fn removing_a_column_cascades_its_tasks() {
    let mut board = two_columns();
    let (column, tasks) = board.remove_column("todo").unwrap();
    assert_eq!(column.id, "todo");
    assert_eq!(tasks.len(), 3);
    assert_eq!(board.task_count(), 0);
    assert!(!board.tasks.contains_key("todo"));
    assert_eq!(
        board.remove_column("todo"),
        Err(BoardError::ColumnNotFound("todo".into()))
    );
}

#[test]
fn column_patches() {
    let mut board = two_columns();
    board.rename_column("todo", "Backlog").unwrap();
    board.recolor_column("todo", Some("#ff8800".into())).unwrap();
    board.set_column_icon("todo", Some("inbox".into())).unwrap();
    let column = board.column("todo").unwrap();
    assert_eq!(column.title, "Backlog");
    assert_eq!(column.color.as_deref(), Some("#ff8800"));
    assert_eq!(column.icon.as_deref(), Some("inbox"));
    assert!(board.rename_column("ghost", "x").is_err());
}

#[test]
fn move_column_keeps_task_lists() {
    let mut board = two_columns();
    let before = board.tasks.clone();
    assert!(board.move_column(0, 1));
    assert_eq!(board.columns[0].id, "done");
    assert_eq!(board.tasks, before);
    assert!(!board.move_column(0, 0));
}

#[test]
fn new_tasks_go_on_top() {
    let mut board = two_columns();
    board.add_task("todo", Task::with_id("z", "Z")).unwrap();
    assert_eq!(ids(&board, "todo"), vec!["z", "a", "b", "c"]);
    assert_eq!(
        board.add_task("todo", Task::with_id("a", "dup")),
        Err(BoardError::DuplicateTask("a".into()))
    );
    assert!(board.add_task("nowhere", Task::new("x")).is_err());
}

#[test]
fn patching_merges_only_given_fields() {
    let mut board = two_columns();
    board
        .patch_task(
            "b",
            TaskPatch {
                due_date: Some(Some("Mon".into())),
                tags: Some(vec![Tag::parse("ops:red").unwrap()]),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    let task = board.task("b").unwrap();
    assert_eq!(task.title, "B");
    assert_eq!(task.due_date.as_deref(), Some("Mon"));
    assert_eq!(task.tags[0].color, Some(TagColor::Red));

    board
        .patch_task(
            "b",
            TaskPatch {
                due_date: Some(None),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(board.task("b").unwrap().due_date, None);
    assert_eq!(
        board.patch_task("ghost", TaskPatch::default()),
        Err(BoardError::TaskNotFound("ghost".into()))
    );
}

#[test]
fn completing_and_locating() {
    let mut board = two_columns();
    let location = board.locate_task("c").unwrap();
    assert_eq!((location.column.as_str(), location.index), ("todo", 2));
    let done = board.complete_task("b").unwrap();
    assert_eq!(done.id, "b");
    assert_eq!(ids(&board, "todo"), vec!["a", "c"]);
    assert!(board.locate_task("b").is_none());
    let before = board.clone();
    assert!(board.complete_task("b").is_err());
    assert_eq!(board, before);
}

#[test]
fn reorder_and_transfer() {
    let mut board = two_columns();
    assert!(board.reorder_tasks("todo", 2, 0).unwrap());
    assert_eq!(ids(&board, "todo"), vec!["c", "a", "b"]);
    board.transfer_task("a", "todo", "done", 99).unwrap();
    assert_eq!(ids(&board, "todo"), vec!["c", "b"]);
    assert_eq!(ids(&board, "done"), vec!["a"]);
    assert!(matches!(
        board.transfer_task("a", "todo", "done", 0),
        Err(BoardError::TaskNotInColumn { .. })
    ));
    assert_eq!(board.task_ids().len(), 3);
}

#[test]
fn normalize_repairs_hand_edited_boards() {
    let mut board = two_columns();
    board.tasks.remove("done");
    board.tasks.insert("orphan".into(), vec![Task::with_id("o", "O")]);
    board
        .columns
        .push(Column::new("later", "Later", None, None));
    board
        .tasks
        .insert("later".into(), vec![Task::with_id("a", "dup of a")]);

    assert!(board.normalize());
    assert!(board.tasks.contains_key("done"));
    assert!(!board.tasks.contains_key("orphan"));
    assert!(board.tasks_in("later").is_empty());
    assert_eq!(board.task("a").unwrap().title, "A");
    assert!(!board.normalize());
}

#[test]
fn tag_parsing() {
    assert_eq!(
        Tag::parse("growth").unwrap(),
        Tag {
            label: "growth".into(),
            color: None
        }
    );
    assert_eq!(Tag::parse(" legal : Violet ").unwrap().color, Some(TagColor::Violet));
    assert_eq!(
        Tag::parse("x:plaid"),
        Err(BoardError::UnknownTagColor("plaid".into()))
    );
    assert_eq!(Tag::parse(":red"), Err(BoardError::EmptyTitle));
}
