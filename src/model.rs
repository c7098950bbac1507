use crate::collection::array_move;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

pub type ColumnId = String;
pub type TaskId = String;

/// Column id -> ordered tasks. Keys mirror `Board::columns`.
pub type TaskState = BTreeMap<ColumnId, Vec<Task>>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Board {
    pub columns: Vec<Column>,
    pub tasks: TaskState,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub avatar_active: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Tag {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TagColor>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
    Gray,
    Blue,
    Green,
    Amber,
    Red,
    Violet,
}

impl TagColor {
    pub const ALL: [TagColor; 6] = [
        TagColor::Gray,
        TagColor::Blue,
        TagColor::Green,
        TagColor::Amber,
        TagColor::Red,
        TagColor::Violet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TagColor::Gray => "gray",
            TagColor::Blue => "blue",
            TagColor::Green => "green",
            TagColor::Amber => "amber",
            TagColor::Red => "red",
            TagColor::Violet => "violet",
        }
    }
}

impl fmt::Display for TagColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagColor {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TagColor::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| BoardError::UnknownTagColor(s.to_string()))
    }
}

impl Tag {
    /// Parses `label` or `label:color`.
    pub fn parse(raw: &str) -> Result<Tag, BoardError> {
        let (label, color) = match raw.split_once(':') {
            Some((label, color)) => (label, Some(color.parse::<TagColor>()?)),
            None => (raw, None),
        };
        let label = label.trim();
        if label.is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        Ok(Tag {
            label: label.to_string(),
            color,
        })
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BoardError {
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("task {task} is not in column {column}")]
    TaskNotInColumn { task: String, column: String },
    #[error("duplicate task id: {0}")]
    DuplicateTask(String),
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("unknown tag color: {0}")]
    UnknownTagColor(String),
}

/// Where a task currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLocation {
    pub column: ColumnId,
    pub index: usize,
}

/// Field-wise patch merged into a task by [`Board::patch_task`].
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub due_date: Option<Option<String>>,
    pub tags: Option<Vec<Tag>>,
    pub avatar: Option<Option<String>>,
    pub avatar_active: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
            && self.avatar.is_none()
            && self.avatar_active.is_none()
    }

    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(due) = self.due_date {
            task.due_date = due;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        if let Some(avatar) = self.avatar {
            task.avatar = avatar;
        }
        if let Some(active) = self.avatar_active {
            task.avatar_active = active;
        }
    }
}

impl Board {
    /// Columns with empty task lists.
    pub fn with_columns(columns: Vec<Column>) -> Self {
        let tasks = columns
            .iter()
            .map(|c| (c.id.clone(), Vec::new()))
            .collect();
        Board { columns, tasks }
    }

    /// Fixed default board written on first launch.
    pub fn seed() -> Self {
        let mut board = Board::with_columns(vec![
            Column::new("focus", "Today's Focus", Some("target"), Some("amber")),
            Column::new("this-week", "This Week", Some("calendar"), Some("sky")),
            Column::new("waiting", "Waiting On", Some("hourglass"), Some("slate")),
            Column::new("someday", "Someday", Some("sparkles"), Some("violet")),
        ]);
        let seeded = [
            (
                "focus",
                Task::with_id("seed-pitch", "Tighten the pitch deck narrative")
                    .due("Today")
                    .tag("fundraising", Some(TagColor::Amber)),
            ),
            (
                "focus",
                Task::with_id("seed-interviews", "Run three customer interviews")
                    .tag("discovery", Some(TagColor::Green)),
            ),
            (
                "this-week",
                Task::with_id("seed-landing", "Ship the landing page copy")
                    .due("Fri")
                    .tag("marketing", Some(TagColor::Blue)),
            ),
            (
                "waiting",
                Task::with_id("seed-legal", "Incorporation paperwork from counsel")
                    .tag("ops", Some(TagColor::Gray)),
            ),
            (
                "someday",
                Task::with_id("seed-podcast", "Start a founder podcast")
                    .tag("ideas", Some(TagColor::Violet)),
            ),
        ];
        for (column, task) in seeded {
            if let Some(list) = board.tasks.get_mut(column) {
                list.push(task);
            }
        }
        board
    }

    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn tasks_in(&self, column_id: &str) -> &[Task] {
        self.tasks.get(column_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn locate_task(&self, task_id: &str) -> Option<TaskLocation> {
        self.tasks.iter().find_map(|(column, tasks)| {
            tasks
                .iter()
                .position(|t| t.id == task_id)
                .map(|index| TaskLocation {
                    column: column.clone(),
                    index,
                })
        })
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks
            .values()
            .flat_map(|tasks| tasks.iter())
            .find(|t| t.id == task_id)
    }

    /// All task ids, columns in board order.
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.columns
            .iter()
            .flat_map(|c| self.tasks_in(&c.id).iter().map(|t| t.id.clone()))
            .collect()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.values().map(Vec::len).sum()
    }

    pub fn add_column(
        &mut self,
        title: &str,
        icon: Option<String>,
        color: Option<String>,
    ) -> Result<ColumnId, BoardError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        let id = self.unique_column_id(&slugify(title));
        self.columns.push(Column {
            id: id.clone(),
            title: title.to_string(),
            icon,
            color,
        });
        self.tasks.insert(id.clone(), Vec::new());
        Ok(id)
    }

    pub fn update_column<F>(&mut self, id: &str, f: F) -> Result<(), BoardError>
    where
        F: FnOnce(&mut Column),
    {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| BoardError::ColumnNotFound(id.to_string()))?;
        f(column);
        Ok(())
    }

    pub fn rename_column(&mut self, id: &str, title: &str) -> Result<(), BoardError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        self.update_column(id, |c| c.title = title.to_string())
    }

    pub fn recolor_column(&mut self, id: &str, color: Option<String>) -> Result<(), BoardError> {
        self.update_column(id, |c| c.color = color)
    }

    pub fn set_column_icon(&mut self, id: &str, icon: Option<String>) -> Result<(), BoardError> {
        self.update_column(id, |c| c.icon = icon)
    }

    /// Removes a column together with every task it owns.
    pub fn remove_column(&mut self, id: &str) -> Result<(Column, Vec<Task>), BoardError> {
        let idx = self
            .column_index(id)
            .ok_or_else(|| BoardError::ColumnNotFound(id.to_string()))?;
        let column = self.columns.remove(idx);
        let tasks = self.tasks.remove(id).unwrap_or_default();
        Ok((column, tasks))
    }

    /// Reorders lanes only; task lists are keyed by id and stay untouched.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        array_move(&mut self.columns, from, to)
    }

    /// Prepends a task into `column_id`.
    pub fn add_task(&mut self, column_id: &str, task: Task) -> Result<(), BoardError> {
        if task.title.trim().is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        if self.column_index(column_id).is_none() {
            return Err(BoardError::ColumnNotFound(column_id.to_string()));
        }
        if self.locate_task(&task.id).is_some() {
            return Err(BoardError::DuplicateTask(task.id));
        }
        self.tasks
            .entry(column_id.to_string())
            .or_default()
            .insert(0, task);
        Ok(())
    }

    pub fn update_task<F>(&mut self, task_id: &str, f: F) -> Result<(), BoardError>
    where
        F: FnOnce(&mut Task),
    {
        let task = self
            .tasks
            .values_mut()
            .flat_map(|tasks| tasks.iter_mut())
            .find(|t| t.id == task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;
        f(task);
        Ok(())
    }

    pub fn patch_task(&mut self, task_id: &str, patch: TaskPatch) -> Result<(), BoardError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(BoardError::EmptyTitle);
            }
        }
        self.update_task(task_id, |task| patch.apply(task))
    }

    pub fn remove_task(&mut self, task_id: &str) -> Result<Task, BoardError> {
        let location = self
            .locate_task(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))?;
        let tasks = self
            .tasks
            .get_mut(&location.column)
            .ok_or_else(|| BoardError::ColumnNotFound(location.column.clone()))?;
        Ok(tasks.remove(location.index))
    }

    /// Completion is deletion; there is no archive.
    pub fn complete_task(&mut self, task_id: &str) -> Result<Task, BoardError> {
        self.remove_task(task_id)
    }

    pub fn reorder_tasks(
        &mut self,
        column_id: &str,
        from: usize,
        to: usize,
    ) -> Result<bool, BoardError> {
        let tasks = self
            .tasks
            .get_mut(column_id)
            .ok_or_else(|| BoardError::ColumnNotFound(column_id.to_string()))?;
        Ok(array_move(tasks, from, to))
    }

    /// Moves ownership of a task from one column to another at `at` (clamped).
    /// Source removal and destination insertion happen in the same call.
    pub fn transfer_task(
        &mut self,
        task_id: &str,
        from: &str,
        to: &str,
        at: usize,
    ) -> Result<(), BoardError> {
        if self.column_index(to).is_none() || !self.tasks.contains_key(to) {
            return Err(BoardError::ColumnNotFound(to.to_string()));
        }
        let source = self
            .tasks
            .get_mut(from)
            .ok_or_else(|| BoardError::ColumnNotFound(from.to_string()))?;
        let idx = source
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| BoardError::TaskNotInColumn {
                task: task_id.to_string(),
                column: from.to_string(),
            })?;
        if from == to {
            array_move(source, idx, at);
            return Ok(());
        }
        let task = source.remove(idx);
        let dest = self
            .tasks
            .get_mut(to)
            .ok_or_else(|| BoardError::ColumnNotFound(to.to_string()))?;
        let at = at.min(dest.len());
        dest.insert(at, task);
        Ok(())
    }

    /// Repairs a loaded board: every column gets a task list, orphan lists are
    /// dropped and duplicated task ids keep only their first occurrence.
    /// Returns true when anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        let known: HashSet<&str> = self.columns.iter().map(|c| c.id.as_str()).collect();
        let before = self.tasks.len();
        self.tasks.retain(|id, _| known.contains(id.as_str()));
        changed |= before != self.tasks.len();

        let mut seen_columns = HashSet::new();
        let column_count = self.columns.len();
        self.columns.retain(|c| seen_columns.insert(c.id.clone()));
        changed |= column_count != self.columns.len();

        for column in &self.columns {
            if !self.tasks.contains_key(&column.id) {
                self.tasks.insert(column.id.clone(), Vec::new());
                changed = true;
            }
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if let Some(tasks) = self.tasks.get_mut(&column.id) {
                let len = tasks.len();
                tasks.retain(|t| seen.insert(t.id.clone()));
                changed |= len != tasks.len();
            }
        }
        changed
    }

    fn unique_column_id(&self, base: &str) -> ColumnId {
        if self.column_index(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| self.column_index(candidate).is_none())
            .unwrap_or_else(|| format!("{}-{}", base, generate_id()))
    }
}

impl Column {
    pub fn new(id: &str, title: &str, icon: Option<&str>, color: Option<&str>) -> Self {
        Column {
            id: id.to_string(),
            title: title.to_string(),
            icon: icon.map(str::to_string),
            color: color.map(str::to_string),
        }
    }
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Task::with_id(generate_id(), title)
    }

    pub fn with_id(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            due_date: None,
            tags: Vec::new(),
            avatar: None,
            avatar_active: false,
        }
    }

    pub fn due(mut self, due: impl Into<String>) -> Self {
        self.due_date = Some(due.into());
        self
    }

    pub fn tag(mut self, label: impl Into<String>, color: Option<TagColor>) -> Self {
        self.tags.push(Tag {
            label: label.into(),
            color,
        });
        self
    }
}

/// Lowercase ASCII slug; runs of anything else collapse to a single `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "column".to_string()
    } else {
        slug
    }
}

pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}
