use crate::collection::{Collection, CollectionError, Keyed};
use crate::model::{generate_id, Board, BoardError, Task, TaskId};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub type Inbox = Collection<InboxItem>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InboxItem {
    pub id: String,
    pub text: String,
    pub captured_at: String,
}

impl Keyed for InboxItem {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum InboxError {
    #[error("nothing to capture")]
    Empty,
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error(transparent)]
    Board(#[from] BoardError),
}

pub fn seed() -> Inbox {
    Collection::default()
}

/// Quick capture; newest first.
pub fn capture(inbox: &mut Inbox, text: &str) -> Result<String, InboxError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(InboxError::Empty);
    }
    let item = InboxItem {
        id: generate_id(),
        text: text.to_string(),
        captured_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    let id = item.id.clone();
    inbox.prepend(item)?;
    Ok(id)
}

pub fn discard(inbox: &mut Inbox, id: &str) -> Result<InboxItem, InboxError> {
    Ok(inbox.remove(id)?)
}

/// Turns an inbox item into a task at the top of `column_id`. Both sides are
/// checked before either is touched.
pub fn promote(
    inbox: &mut Inbox,
    board: &mut Board,
    id: &str,
    column_id: &str,
) -> Result<TaskId, InboxError> {
    if board.column(column_id).is_none() {
        return Err(BoardError::ColumnNotFound(column_id.to_string()).into());
    }
    let text = inbox
        .get(id)
        .map(|item| item.text.clone())
        .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
    let task = Task::new(text);
    let task_id = task.id.clone();
    board.add_task(column_id, task)?;
    inbox.remove(id)?;
    Ok(task_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_prepends_and_trims() {
        let mut inbox = seed();
        let first = capture(&mut inbox, "  call the bank ").unwrap();
        let second = capture(&mut inbox, "book flights").unwrap();
        assert_eq!(inbox.items()[0].id, second);
        assert_eq!(inbox.items()[1].id, first);
        assert_eq!(inbox.items()[1].text, "call the bank");
        assert_eq!(capture(&mut inbox, "   "), Err(InboxError::Empty));
    }

    #[test]
    fn promote_moves_item_onto_board() {
        let mut inbox = seed();
        let mut board = Board::seed();
        let id = capture(&mut inbox, "draft investor update").unwrap();
        let task_id = promote(&mut inbox, &mut board, &id, "this-week").unwrap();
        assert!(inbox.is_empty());
        assert_eq!(board.tasks_in("this-week")[0].id, task_id);
        assert_eq!(board.tasks_in("this-week")[0].title, "draft investor update");
    }

    #[test]
    fn promote_into_missing_column_keeps_item() {
        let mut inbox = seed();
        let mut board = Board::seed();
        let id = capture(&mut inbox, "keep me").unwrap();
        let before = board.clone();
        assert!(matches!(
            promote(&mut inbox, &mut board, &id, "nowhere"),
            Err(InboxError::Board(BoardError::ColumnNotFound(_)))
        ));
        assert_eq!(inbox.len(), 1);
        assert_eq!(board, before);
    }
}
