use founders_route::drag::{drag_end, drag_over, DragController, DragId, DragOutcome, DragSnapshot};
use founders_route::model::{Board, Column, Task};

fn board(layout: &[(&str, &[&str])]) -> Board {
    let mut board = Board::with_columns(
        layout.iter()
            .map(|(id, _)| Column::new(id, id, None, None))
            .collect(),
    );
    for (column, tasks) in layout {
        board.tasks.insert(
            column.to_string(),
            tasks.iter().map(|t| Task::with_id(*t, *t)).collect(),
        );
    }
    board
}

fn ids(board: &Board, column: &str) -> Vec<String> {
    board.tasks_in(column).iter().map(|t| t.id.clone()).collect()
}

fn order(board: &Board) -> Vec<String> {
    board.columns.iter().map(|c| c.id.clone()).collect()
}

fn task(id: &str) -> DragId {
    DragId::Task(id.into())
}

fn column(id: &str) -> DragId {
    DragId::Column(id.into())
}

#[test]
fn task_dropped_on_empty_column_moves_there() {
    let mut b = board(&[("a", &["T1", "T2"]), ("b", &[])]);
    let mut drag = DragController::new();
    drag.start(&b, task("T1")).unwrap();
    assert_eq!(drag.over(&mut b, Some(&column("b"))), DragOutcome::Changed);
    assert_eq!(drag.end(&mut b, Some(&column("b"))), DragOutcome::Changed);
    assert_eq!(ids(&b, "a"), vec!["T2"]);
    assert_eq!(ids(&b, "b"), vec!["T1"]);
    assert!(!drag.is_dragging());
}

#[test]
fn task_reordered_to_top_of_its_column() {
    let b = board(&[("a", &["T1", "T2", "T3"])]);
    assert_eq!(drag_over(&b, &task("T3"), &task("T1")), None);
    let next = drag_end(&b, &task("T3"), &task("T1")).unwrap();
    assert_eq!(ids(&next, "a"), vec!["T3", "T1", "T2"]);
}

#[test]
fn column_dragged_to_front() {
    let b = board(&[("x", &["x1"]), ("y", &["y1", "y2"]), ("z", &["z1"])]);
    let next = drag_end(&b, &column("z"), &column("x")).unwrap();
    assert_eq!(order(&next), vec!["z", "x", "y"]);
    assert_eq!(next.tasks, b.tasks);
}

#[test]
fn column_drag_ignores_hover() {
    let b = board(&[("x", &[]), ("y", &[])]);
    assert_eq!(drag_over(&b, &column("y"), &column("x")), None);
}

#[test]
fn hover_then_drop_elsewhere_in_new_column() {
    // A hover moves T1 into b; the drop then reorders inside b.
    let mut b = board(&[("a", &["T1"]), ("b", &["X", "Y"])]);
    let mut drag = DragController::new();
    drag.start(&b, task("T1")).unwrap();
    drag.over(&mut b, Some(&task("Y")));
    assert_eq!(ids(&b, "b"), vec!["X", "Y", "T1"]);
    assert_eq!(drag.end(&mut b, Some(&task("X"))), DragOutcome::Changed);
    assert_eq!(ids(&b, "b"), vec!["T1", "X", "Y"]);
    assert!(ids(&b, "a").is_empty());
}

#[test]
fn keyboard_drop_without_hover_transfers() {
    let mut b = board(&[("a", &["T1", "T2"]), ("b", &["X"])]);
    let mut drag = DragController::new();
    drag.start(&b, task("T2")).unwrap();
    assert_eq!(drag.end(&mut b, Some(&task("X"))), DragOutcome::Changed);
    assert_eq!(ids(&b, "a"), vec!["T1"]);
    assert_eq!(ids(&b, "b"), vec!["T2", "X"]);
}

#[test]
fn drop_outside_restores_drag_start_board() {
    let original = board(&[("a", &["T1", "T2"]), ("b", &["X"])]);
    let mut b = original.clone();
    let mut drag = DragController::new();
    drag.start(&b, task("T1")).unwrap();
    drag.over(&mut b, Some(&column("b")));
    assert_ne!(b, original);
    assert_eq!(drag.end(&mut b, None), DragOutcome::Aborted);
    assert_eq!(b, original);
}

#[test]
fn drop_on_vanished_target_restores_drag_start_board() {
    let original = board(&[("a", &["T1", "T2"]), ("b", &[])]);
    let mut b = original.clone();
    let mut drag = DragController::new();
    drag.start(&b, task("T1")).unwrap();
    drag.over(&mut b, Some(&column("b")));
    assert_eq!(ids(&b, "b"), vec!["T1"]);

    assert_eq!(drag.end(&mut b, Some(&task("ghost"))), DragOutcome::Aborted);
    assert_eq!(b, original);
    assert!(!drag.is_dragging());

    drag.start(&b, column("a")).unwrap();
    assert_eq!(drag.end(&mut b, Some(&column("gone"))), DragOutcome::Aborted);
    assert_eq!(order(&b), vec!["a", "b"]);
}

#[test]
fn cancel_restores_and_goes_idle() {
    let original = board(&[("a", &["T1"]), ("b", &[])]);
    let mut b = original.clone();
    let mut drag = DragController::new();
    drag.start(&b, task("T1")).unwrap();
    drag.over(&mut b, Some(&column("b")));
    assert_eq!(drag.cancel(&mut b), DragOutcome::Aborted);
    assert_eq!(b, original);
    assert!(drag.overlay().is_none());
    assert_eq!(drag.cancel(&mut b), DragOutcome::Unchanged);
}

#[test]
fn dropping_on_own_slot_or_column_changes_nothing() {
    let original = board(&[("a", &["T1", "T2"]), ("b", &[])]);
    let mut b = original.clone();
    let mut drag = DragController::new();
    drag.start(&b, task("T2")).unwrap();
    assert_eq!(drag.end(&mut b, Some(&task("T2"))), DragOutcome::Unchanged);
    drag.start(&b, task("T2")).unwrap();
    assert_eq!(drag.end(&mut b, Some(&column("a"))), DragOutcome::Unchanged);
    drag.start(&b, column("b")).unwrap();
    assert_eq!(drag.end(&mut b, Some(&column("b"))), DragOutcome::Unchanged);
    assert_eq!(b, original);
}

#[test]
fn overlay_is_never_a_live_entry() {
    let mut b = board(&[("a", &["T1"]), ("b", &[])]);
    let mut drag = DragController::new();
    drag.start(&b, task("T1")).unwrap();
    drag.over(&mut b, Some(&column("b")));
    match drag.overlay() {
        Some(DragSnapshot::Task { task, origin }) => {
            assert_eq!(task.id, "T1");
            assert_eq!(origin, "a");
        }
        other => panic!("unexpected overlay {:?}", other),
    }
    assert_eq!(b.task_count(), 1);
}
