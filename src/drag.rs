use crate::model::{Board, Column, ColumnId, Task, TaskId};
use log::debug;

/// Anything that can be dragged or hovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DragId {
    Column(ColumnId),
    Task(TaskId),
}

impl DragId {
    pub fn id(&self) -> &str {
        match self {
            DragId::Column(id) | DragId::Task(id) => id,
        }
    }
}

/// Presentational copy of the dragged item, taken at drag start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSnapshot {
    Column(Column),
    Task { task: Task, origin: ColumnId },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DragError {
    #[error("nothing to drag with id {0}")]
    UnknownItem(String),
    #[error("a drag is already in progress")]
    AlreadyDragging,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Start(DragId),
    Over(Option<DragId>),
    End(Option<DragId>),
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Started,
    /// Board differs from what it was before the event (or, for a drop, before the drag).
    Changed,
    Unchanged,
    /// Gesture dropped outside any target or canceled; drag-start board restored.
    Aborted,
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    id: DragId,
    snapshot: DragSnapshot,
    before: Board,
}

/// Idle or dragging. An aborted gesture leaves the board as it was at drag start.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    active: Option<ActiveDrag>,
}

impl DragController {
    pub fn new() -> Self {
        DragController::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&DragId> {
        self.active.as_ref().map(|a| &a.id)
    }

    /// The floating overlay's data. Never a live board entry.
    pub fn overlay(&self) -> Option<&DragSnapshot> {
        self.active.as_ref().map(|a| &a.snapshot)
    }

    pub fn handle(&mut self, board: &mut Board, event: DragEvent) -> Result<DragOutcome, DragError> {
        match event {
            DragEvent::Start(id) => self.start(board, id).map(|_| DragOutcome::Started),
            DragEvent::Over(target) => Ok(self.over(board, target.as_ref())),
            DragEvent::End(target) => Ok(self.end(board, target.as_ref())),
            DragEvent::Cancel => Ok(self.cancel(board)),
        }
    }

    pub fn start(&mut self, board: &Board, id: DragId) -> Result<&DragSnapshot, DragError> {
        if self.active.is_some() {
            return Err(DragError::AlreadyDragging);
        }
        let snapshot = match &id {
            DragId::Column(column_id) => board
                .column(column_id)
                .cloned()
                .map(DragSnapshot::Column),
            DragId::Task(task_id) => board.locate_task(task_id).and_then(|location| {
                board.task(task_id).cloned().map(|task| DragSnapshot::Task {
                    task,
                    origin: location.column,
                })
            }),
        }
        .ok_or_else(|| DragError::UnknownItem(id.id().to_string()))?;
        debug!("event=drag_start id={}", id.id());
        let active = self.active.insert(ActiveDrag {
            id,
            snapshot,
            before: board.clone(),
        });
        Ok(&active.snapshot)
    }

    pub fn over(&mut self, board: &mut Board, target: Option<&DragId>) -> DragOutcome {
        let (Some(active), Some(target)) = (self.active.as_ref(), target) else {
            return DragOutcome::Unchanged;
        };
        match drag_over(board, &active.id, target) {
            Some(next) => {
                *board = next;
                DragOutcome::Changed
            }
            None => DragOutcome::Unchanged,
        }
    }

    /// Commits the gesture. The controller is idle afterwards whatever happens.
    pub fn end(&mut self, board: &mut Board, target: Option<&DragId>) -> DragOutcome {
        let Some(active) = self.active.take() else {
            return DragOutcome::Unchanged;
        };
        let Some(target) = target.filter(|t| container_of(board, t).is_some()) else {
            debug!("event=drag_abort id={} reason=no_target", active.id.id());
            *board = active.before;
            return DragOutcome::Aborted;
        };
        if let Some(next) = drag_end(board, &active.id, target) {
            *board = next;
        }
        debug!("event=drag_end id={} over={}", active.id.id(), target.id());
        if *board == active.before {
            DragOutcome::Unchanged
        } else {
            DragOutcome::Changed
        }
    }

    pub fn cancel(&mut self, board: &mut Board) -> DragOutcome {
        match self.active.take() {
            Some(active) => {
                debug!("event=drag_cancel id={}", active.id.id());
                *board = active.before;
                DragOutcome::Aborted
            }
            None => DragOutcome::Unchanged,
        }
    }
}

/// Live cross-column move while hovering. Same-column hovers and column drags
/// are left to [`drag_end`].
pub fn drag_over(board: &Board, active: &DragId, over: &DragId) -> Option<Board> {
    let DragId::Task(active_id) = active else {
        return None;
    };
    let from = board.locate_task(active_id)?;
    let to_column = container_of(board, over)?;
    if from.column == to_column {
        return None;
    }
    let at = match over {
        DragId::Column(_) => board.tasks_in(&to_column).len(),
        DragId::Task(over_id) => {
            let over_index = board.locate_task(over_id)?.index;
            if from.index > over_index {
                over_index
            } else {
                over_index + 1
            }
        }
    };
    let mut next = board.clone();
    next.transfer_task(active_id, &from.column, &to_column, at).ok()?;
    Some(next)
}

/// Drop handling. The active task's container is read from the current board,
/// so a column change already applied by [`drag_over`] is honored; if no hover
/// moved it yet the cross-column transfer happens here instead.
pub fn drag_end(board: &Board, active: &DragId, over: &DragId) -> Option<Board> {
    match active {
        DragId::Column(active_column) => {
            let over_column = container_of(board, over)?;
            if &over_column == active_column {
                return None;
            }
            let from = board.column_index(active_column)?;
            let to = board.column_index(&over_column)?;
            let mut next = board.clone();
            next.move_column(from, to);
            Some(next)
        }
        DragId::Task(active_id) => {
            let from = board.locate_task(active_id)?;
            let to_column = container_of(board, over)?;
            if from.column != to_column {
                return drag_over(board, active, over);
            }
            let DragId::Task(over_id) = over else {
                return None;
            };
            let to = board.locate_task(over_id)?.index;
            if to == from.index {
                return None;
            }
            let mut next = board.clone();
            next.reorder_tasks(&to_column, from.index, to).ok()?;
            Some(next)
        }
    }
}

fn container_of(board: &Board, target: &DragId) -> Option<ColumnId> {
    match target {
        DragId::Column(id) => board.column(id).map(|c| c.id.clone()),
        DragId::Task(id) => board.locate_task(id).map(|l| l.column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, Task};

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

    fn task(id: &str) -> DragId {
        DragId::Task(id.to_string())
    }

    fn column(id: &str) -> DragId {
        DragId::Column(id.to_string())
    }

    #[test]
    fn over_column_appends_to_end() {
        let b = board(&[("a", &["t1", "t2"]), ("b", &["t3"])]);
        let next = drag_over(&b, &task("t1"), &column("b")).unwrap();
        assert_eq!(ids(&next, "a"), vec!["t2"]);
        assert_eq!(ids(&next, "b"), vec!["t3", "t1"]);
    }

    #[test]
    fn over_task_inserts_after_when_coming_from_above() {
        let b = board(&[("a", &["t1"]), ("b", &["x", "y"])]);
        let next = drag_over(&b, &task("t1"), &task("x")).unwrap();
        assert_eq!(ids(&next, "b"), vec!["x", "t1", "y"]);
    }

    #[test]
    fn over_task_inserts_before_when_coming_from_below() {
        let b = board(&[("a", &["p", "q", "t1"]), ("b", &["x", "y"])]);
        let next = drag_over(&b, &task("t1"), &task("y")).unwrap();
        assert_eq!(ids(&next, "b"), vec!["x", "t1", "y"]);
        assert_eq!(ids(&next, "a"), vec!["p", "q"]);
    }

    #[test]
    fn over_same_column_is_deferred() {
        let b = board(&[("a", &["t1", "t2"])]);
        assert!(drag_over(&b, &task("t1"), &task("t2")).is_none());
        assert!(drag_over(&b, &task("t1"), &column("a")).is_none());
        assert!(drag_over(&b, &column("a"), &column("a")).is_none());
    }

    #[test]
    fn end_reorders_within_column() {
        let b = board(&[("a", &["t1", "t2", "t3"])]);
        let next = drag_end(&b, &task("t3"), &task("t1")).unwrap();
        assert_eq!(ids(&next, "a"), vec!["t3", "t1", "t2"]);
    }

    #[test]
    fn end_on_own_slot_is_noop() {
        let b = board(&[("a", &["t1", "t2"])]);
        assert!(drag_end(&b, &task("t2"), &task("t2")).is_none());
        assert!(drag_end(&b, &column("a"), &column("a")).is_none());
    }

    #[test]
    fn end_moves_column_by_task_target() {
        let b = board(&[("x", &["t1"]), ("y", &[]), ("z", &["t2"])]);
        let next = drag_end(&b, &column("x"), &task("t2")).unwrap();
        let order: Vec<_> = next.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["y", "z", "x"]);
        assert_eq!(next.tasks, b.tasks);
    }

    #[test]
    fn controller_rejects_unknown_and_double_start() {
        let b = board(&[("a", &["t1"])]);
        let mut drag = DragController::new();
        assert_eq!(
            drag.start(&b, task("ghost")).unwrap_err(),
            DragError::UnknownItem("ghost".into())
        );
        drag.start(&b, task("t1")).unwrap();
        assert_eq!(
            drag.start(&b, task("t1")).unwrap_err(),
            DragError::AlreadyDragging
        );
    }

    #[test]
    fn overlay_keeps_drag_start_snapshot() {
        let mut b = board(&[("a", &["t1"]), ("b", &[])]);
        let mut drag = DragController::new();
        drag.start(&b, task("t1")).unwrap();
        drag.over(&mut b, Some(&column("b")));
        match drag.overlay() {
            Some(DragSnapshot::Task { task, origin }) => {
                assert_eq!(task.id, "t1");
                assert_eq!(origin, "a");
            }
            other => panic!("unexpected overlay {:?}", other),
        }
        assert_eq!(b.task_ids(), vec!["t1".to_string()]);
    }

    #[test]
    fn end_without_target_restores_board() {
        let mut b = board(&[("a", &["t1", "t2"]), ("b", &[])]);
        let original = b.clone();
        let mut drag = DragController::new();
        drag.start(&b, task("t1")).unwrap();
        assert_eq!(drag.over(&mut b, Some(&column("b"))), DragOutcome::Changed);
        assert_ne!(b, original);
        assert_eq!(drag.end(&mut b, None), DragOutcome::Aborted);
        assert_eq!(b, original);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn handle_dispatches_events() {
        let mut b = board(&[("a", &["t1", "t2"]), ("b", &[])]);
        let mut drag = DragController::new();
        assert_eq!(
            drag.handle(&mut b, DragEvent::Start(task("t2"))).unwrap(),
            DragOutcome::Started
        );
        assert_eq!(
            drag.handle(&mut b, DragEvent::Over(None)).unwrap(),
            DragOutcome::Unchanged
        );
        assert_eq!(
            drag.handle(&mut b, DragEvent::End(Some(task("t1")))).unwrap(),
            DragOutcome::Changed
        );
        assert_eq!(ids(&b, "a"), vec!["t2", "t1"]);
        assert_eq!(
            drag.handle(&mut b, DragEvent::Cancel).unwrap(),
            DragOutcome::Unchanged
        );
    }
}
