use crate::commands::Session;
use crate::drag::{DragController, DragId, DragOutcome, DragSnapshot};
use crate::inbox::{self, Inbox};
use crate::model::{Board, BoardError, Column, Tag, TagColor, Task, TaskPatch};
use crate::profile::Profile;
use crate::storage::Synced;
use anyhow::{anyhow, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::debug;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::ListState;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

/// Rows taken by one task card: border, title, meta, border.
const CARD_HEIGHT: u16 = 4;

pub fn run(session: Session) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(session);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    session: Session,
    board: Synced<Board>,
    inbox: Synced<Inbox>,
    profile: Profile,
    drag: DragController,
    /// Current drop target while a drag is active.
    hover: Option<DragId>,
    /// Mouse position while a pointer drag is active.
    pointer: Option<(u16, u16)>,
    layout: BoardLayout,
    selected_column: usize,
    selected_task: usize,
    selected_item: usize,
    scroll_offsets: Vec<usize>,
    last_save: Instant,
    status: String,
    mode: Mode,
    view: ViewMode,
}

enum Mode {
    Normal,
    Creating(TaskForm),
    Editing { task_id: String, form: TaskForm },
    Prompt { purpose: Prompt, field: FieldValue },
    ConfirmComplete { task_id: String },
}

#[derive(Clone)]
enum Prompt {
    Capture,
    NewColumn,
    RenameColumn(String),
}

impl Prompt {
    fn label(&self) -> &'static str {
        match self {
            Prompt::Capture => "Capture",
            Prompt::NewColumn => "New column",
            Prompt::RenameColumn(_) => "Rename column",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum ViewMode {
    Board,
    Inbox,
}

impl ViewMode {
    fn label(&self) -> &'static str {
        match self {
            ViewMode::Board => "Board",
            ViewMode::Inbox => "Inbox",
        }
    }
}

struct TaskForm {
    title: FieldValue,
    due: FieldValue,
    tags: FieldValue,
    avatar: FieldValue,
    field: FormField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Title,
    Due,
    Tags,
    Avatar,
}

enum FormAction {
    Create,
    Edit(String),
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_boundary(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_boundary(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_boundary(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }

    fn apply_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.insert_char(c)
            }
            _ => {}
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum CardLook {
    Plain,
    Selected,
    /// Original slot of the task being dragged.
    Ghost,
    DropTarget,
}

/// Screen geometry of the last board frame, used for pointer hit-testing.
#[derive(Default)]
struct BoardLayout {
    columns: Vec<ColumnSlot>,
}

struct ColumnSlot {
    id: String,
    area: Rect,
    list: Rect,
    offset: usize,
    task_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Hit {
    Header(String),
    Body(String),
    Task(String),
}

impl Hit {
    fn into_target(self) -> DragId {
        match self {
            Hit::Task(id) => DragId::Task(id),
            Hit::Header(id) | Hit::Body(id) => DragId::Column(id),
        }
    }
}

impl BoardLayout {
    fn hit(&self, x: u16, y: u16) -> Option<Hit> {
        let slot = self.columns.iter().find(|s| contains(s.area, x, y))?;
        if y == slot.area.y {
            return Some(Hit::Header(slot.id.clone()));
        }
        if contains(slot.list, x, y) {
            let idx = slot.offset + ((y - slot.list.y) / CARD_HEIGHT) as usize;
            if let Some(id) = slot.task_ids.get(idx) {
                return Some(Hit::Task(id.clone()));
            }
        }
        Some(Hit::Body(slot.id.clone()))
    }

    /// Where a target sits on screen, if visible.
    fn anchor(&self, target: &DragId) -> Option<Rect> {
        match target {
            DragId::Column(id) => self.columns.iter().find(|s| &s.id == id).map(|s| Rect {
                x: s.list.x,
                y: s.area.y,
                width: s.list.width,
                height: CARD_HEIGHT,
            }),
            DragId::Task(id) => self.columns.iter().find_map(|s| {
                let idx = s.task_ids.iter().position(|t| t == id)?;
                let row = idx.checked_sub(s.offset)? as u16;
                let y = s.list.y.saturating_add(row.saturating_mul(CARD_HEIGHT));
                (y < s.list.y.saturating_add(s.list.height)).then_some(Rect {
                    x: s.list.x,
                    y,
                    width: s.list.width,
                    height: CARD_HEIGHT,
                })
            }),
        }
    }
}

impl App {
    fn new(mut session: Session) -> Self {
        let board = session.board();
        let inbox = session.inbox();
        let profile = Profile::load(&mut session.store);
        let status = if profile.privacy_accepted() {
            format!("Loaded from {}", session.location.dir.display())
        } else {
            "Data stays on this machine. Run `route profile accept-privacy` to hide this notice."
                .into()
        };
        let column_count = board.get().columns.len();
        App {
            session,
            board,
            inbox,
            profile,
            drag: DragController::new(),
            hover: None,
            pointer: None,
            layout: BoardLayout::default(),
            selected_column: 0,
            selected_task: 0,
            selected_item: 0,
            scroll_offsets: vec![0; column_count],
            last_save: Instant::now(),
            status,
            mode: Mode::Normal,
            view: ViewMode::Board,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                match event::read()? {
                    Event::Key(key) => {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key)? {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal if self.drag.is_dragging() => {
                self.handle_drag_key(key);
                Ok(false)
            }
            Mode::Normal => self.handle_normal_key(key),
            Mode::Creating(_) | Mode::Editing { .. } => self.handle_form_key(key),
            Mode::Prompt { .. } => self.handle_prompt_key(key),
            Mode::ConfirmComplete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('1') => {
                self.set_view(ViewMode::Board);
                return Ok(false);
            }
            KeyCode::Char('2') => {
                self.set_view(ViewMode::Inbox);
                return Ok(false);
            }
            _ => {}
        }

        match self.view {
            ViewMode::Board => self.handle_board_key(key),
            ViewMode::Inbox => self.handle_inbox_key(key),
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.prev_column(),
            KeyCode::Right | KeyCode::Char('l') => self.next_column(),
            KeyCode::Up | KeyCode::Char('k') => self.prev_task(),
            KeyCode::Down | KeyCode::Char('j') => self.next_task(),
            KeyCode::Char('m') | KeyCode::Char('>') => self.shift_selected(1),
            KeyCode::Char('b') | KeyCode::Char('<') => self.shift_selected(-1),
            KeyCode::Char('n') => {
                if self.current_column_id().is_some() {
                    self.mode = Mode::Creating(TaskForm::new());
                    self.status =
                        "Creating new task (Tab/Shift-Tab move, Enter save, Esc cancel)".into();
                } else {
                    self.status = "Add a column first (a)".into();
                }
            }
            KeyCode::Char('e') => match self.current_task().cloned() {
                Some(task) => {
                    self.status = format!("Editing {}", task.id);
                    self.mode = Mode::Editing {
                        task_id: task.id.clone(),
                        form: TaskForm::from_task(&task),
                    };
                }
                None => self.status = "No task selected to edit".into(),
            },
            KeyCode::Char('x') | KeyCode::Char('d') => match self.current_task().cloned() {
                Some(task) => {
                    self.status = format!("Complete {}? (y to confirm, n/Esc to cancel)", task.id);
                    self.mode = Mode::ConfirmComplete { task_id: task.id };
                }
                None => self.status = "No task selected to complete".into(),
            },
            KeyCode::Char(' ') => match self.current_task().map(|t| t.id.clone()) {
                Some(id) => self.begin_drag(DragId::Task(id)),
                None => self.status = "No task selected to move".into(),
            },
            KeyCode::Char('g') => match self.current_column_id() {
                Some(id) => self.begin_drag(DragId::Column(id)),
                None => self.status = "No column to move".into(),
            },
            KeyCode::Char('a') => {
                self.mode = Mode::Prompt {
                    purpose: Prompt::NewColumn,
                    field: FieldValue::new(""),
                };
            }
            KeyCode::Char('r') => {
                if let Some(column) = self.current_column().cloned() {
                    self.mode = Mode::Prompt {
                        purpose: Prompt::RenameColumn(column.id),
                        field: FieldValue::new(&column.title),
                    };
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_inbox_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_item = self.selected_item.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_item + 1 < self.inbox.get().len() {
                    self.selected_item += 1;
                }
            }
            KeyCode::Char('n') => {
                self.mode = Mode::Prompt {
                    purpose: Prompt::Capture,
                    field: FieldValue::new(""),
                };
            }
            KeyCode::Char('d') | KeyCode::Char('x') => {
                if let Some(id) = self.current_item_id() {
                    match self
                        .inbox
                        .update(&mut self.session.store, |i| inbox::discard(i, &id))
                    {
                        Ok(item) => self.saved(format!("Discarded \"{}\"", item.text)),
                        Err(err) => self.status = format!("Discard failed: {}", err),
                    }
                }
            }
            KeyCode::Char('p') | KeyCode::Enter => self.promote_selected(),
            _ => {}
        }
        Ok(false)
    }

    fn handle_drag_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.cancel_drag(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let target = self.hover.clone();
                self.finish_drag(target);
            }
            KeyCode::Left | KeyCode::Char('h') => self.aim_column(-1),
            KeyCode::Right | KeyCode::Char('l') => self.aim_column(1),
            KeyCode::Up | KeyCode::Char('k') => self.aim_task(-1),
            KeyCode::Down | KeyCode::Char('j') => self.aim_task(1),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.view != ViewMode::Board || !matches!(self.mode, Mode::Normal) {
            return;
        }
        let hit = self.layout.hit(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.drag.is_dragging() {
                    return;
                }
                let id = match hit {
                    Some(Hit::Task(id)) => DragId::Task(id),
                    Some(Hit::Header(id)) => DragId::Column(id),
                    Some(Hit::Body(id)) => {
                        self.select(&DragId::Column(id));
                        return;
                    }
                    None => return,
                };
                self.select(&id);
                self.pointer = Some((mouse.column, mouse.row));
                self.begin_drag(id);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if !self.drag.is_dragging() {
                    return;
                }
                self.pointer = Some((mouse.column, mouse.row));
                self.drag_over(hit.map(Hit::into_target));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag.is_dragging() {
                    self.finish_drag(hit.map(Hit::into_target));
                }
            }
            MouseEventKind::ScrollDown if !self.drag.is_dragging() => self.next_task(),
            MouseEventKind::ScrollUp if !self.drag.is_dragging() => self.prev_task(),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut close_form = false;
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        match &mut mode {
            Mode::Creating(form) => {
                close_form = self.process_form_key(FormAction::Create, form, key);
            }
            Mode::Editing { task_id, form } => {
                let id = task_id.clone();
                close_form = self.process_form_key(FormAction::Edit(id), form, key);
            }
            _ => {}
        }
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Result<bool> {
        let Mode::Prompt { purpose, field } = &mut self.mode else {
            return Ok(false);
        };
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status = "Canceled".into();
            }
            KeyCode::Enter => {
                let purpose = purpose.clone();
                let text = field.value.clone();
                self.mode = Mode::Normal;
                self.submit_prompt(purpose, &text);
            }
            _ => field.apply_key(key),
        }
        Ok(false)
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        let task_id = match &self.mode {
            Mode::ConfirmComplete { task_id } => task_id.clone(),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match self.mutate_board(|b| b.complete_task(&task_id)) {
                    Ok(task) => self.saved(format!("Completed \"{}\"", task.title)),
                    Err(err) => self.status = format!("Complete failed: {}", err),
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        Ok(false)
    }

    fn set_view(&mut self, view: ViewMode) {
        if self.drag.is_dragging() {
            return;
        }
        if self.view != view {
            self.view = view;
            self.status = format!("Switched to {} view", view.label());
        }
        self.clamp_selection();
    }

    fn process_form_key(&mut self, action: FormAction, form: &mut TaskForm, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.status = "Canceled".into();
                true
            }
            KeyCode::Tab => {
                form.next_field();
                false
            }
            KeyCode::BackTab => {
                form.prev_field();
                false
            }
            KeyCode::Enter => self.try_submit(action, form),
            _ => {
                form.active_field_mut().apply_key(key);
                false
            }
        }
    }

    fn try_submit(&mut self, action: FormAction, form: &TaskForm) -> bool {
        match action {
            FormAction::Create => match self.create_task_from_form(form) {
                Ok(()) => true,
                Err(err) => {
                    self.status = format!("Could not create: {}", err);
                    false
                }
            },
            FormAction::Edit(task_id) => match self.edit_task_from_form(&task_id, form) {
                Ok(()) => true,
                Err(err) => {
                    self.status = format!("Could not edit: {}", err);
                    false
                }
            },
        }
    }

    fn submit_prompt(&mut self, purpose: Prompt, text: &str) {
        match purpose {
            Prompt::Capture => {
                match self
                    .inbox
                    .update(&mut self.session.store, |i| inbox::capture(i, text))
                {
                    Ok(_) => {
                        self.selected_item = 0;
                        self.saved("Captured");
                    }
                    Err(err) => self.status = format!("Capture failed: {}", err),
                }
            }
            Prompt::NewColumn => match self.mutate_board(|b| b.add_column(text, None, None)) {
                Ok(id) => {
                    self.scroll_offsets.push(0);
                    self.select(&DragId::Column(id.clone()));
                    self.saved(format!("Added column {}", id));
                }
                Err(err) => self.status = format!("Could not add column: {}", err),
            },
            Prompt::RenameColumn(id) => match self.mutate_board(|b| b.rename_column(&id, text)) {
                Ok(()) => self.saved(format!("Renamed {}", id)),
                Err(err) => self.status = format!("Could not rename: {}", err),
            },
        }
    }

    fn begin_drag(&mut self, id: DragId) {
        match self.drag.start(self.board.get(), id.clone()) {
            Ok(snapshot) => {
                let label = match snapshot {
                    DragSnapshot::Column(column) => column.title.clone(),
                    DragSnapshot::Task { task, .. } => task.title.clone(),
                };
                self.hover = Some(id);
                self.status = format!(
                    "Moving \"{}\" (arrows aim, Enter drop, Esc cancel)",
                    truncate_text(&label, 40)
                );
            }
            Err(err) => self.status = format!("Cannot move: {}", err),
        }
    }

    fn drag_over(&mut self, target: Option<DragId>) {
        let outcome = self.drag.over(self.board.get_mut(), target.as_ref());
        self.hover = target;
        if outcome == DragOutcome::Changed {
            self.board.save(&mut self.session.store);
            self.last_save = Instant::now();
            if let Some(active) = self.drag.active().cloned() {
                self.select(&active);
            }
        }
    }

    fn finish_drag(&mut self, target: Option<DragId>) {
        let active = self.drag.active().cloned();
        let outcome = self.drag.end(self.board.get_mut(), target.as_ref());
        self.settle_drag(active, outcome);
    }

    fn cancel_drag(&mut self) {
        let active = self.drag.active().cloned();
        let outcome = self.drag.cancel(self.board.get_mut());
        self.settle_drag(active, outcome);
    }

    /// Hover moves were saved as they happened, so the settled board is
    /// written even when it matches the drag-start board.
    fn settle_drag(&mut self, active: Option<DragId>, outcome: DragOutcome) {
        self.hover = None;
        self.pointer = None;
        if let Some(id) = &active {
            self.select(id);
        }
        debug!("event=tui_drag_settled outcome={:?}", outcome);
        if active.is_some() {
            self.board.save(&mut self.session.store);
        }
        match outcome {
            DragOutcome::Changed => self.saved("Moved"),
            DragOutcome::Aborted => self.saved("Move canceled"),
            DragOutcome::Unchanged | DragOutcome::Started => self.status = "Nothing moved".into(),
        }
        self.clamp_selection();
    }

    /// Column under the hover target.
    fn hover_column(&self) -> Option<usize> {
        let board = self.board.get();
        let column_id = match self.hover.as_ref()? {
            DragId::Column(id) => id.clone(),
            DragId::Task(id) => board.locate_task(id)?.column,
        };
        board.column_index(&column_id)
    }

    fn aim_column(&mut self, delta: isize) {
        let Some(current) = self.hover_column() else {
            return;
        };
        let last = self.board.get().columns.len().saturating_sub(1) as isize;
        let next = (current as isize + delta).clamp(0, last) as usize;
        if next == current {
            return;
        }
        let target = self
            .board
            .get()
            .columns
            .get(next)
            .map(|c| DragId::Column(c.id.clone()));
        if target.is_some() {
            self.drag_over(target);
        }
    }

    fn aim_task(&mut self, delta: isize) {
        if !matches!(self.drag.active(), Some(DragId::Task(_))) {
            return;
        }
        let Some(col_idx) = self.hover_column() else {
            return;
        };
        let board = self.board.get();
        let Some(column) = board.columns.get(col_idx) else {
            return;
        };
        let tasks = board.tasks_in(&column.id);
        if tasks.is_empty() {
            return;
        }
        let current = match &self.hover {
            Some(DragId::Task(id)) => tasks.iter().position(|t| &t.id == id),
            _ => None,
        };
        let next = match current {
            Some(i) => (i as isize + delta).clamp(0, tasks.len() as isize - 1) as usize,
            None if delta < 0 => tasks.len() - 1,
            None => 0,
        };
        let target = DragId::Task(tasks[next].id.clone());
        self.drag_over(Some(target));
    }

    /// One-keystroke move to the neighbouring column, run through the same
    /// drag events a pointer would produce.
    fn shift_selected(&mut self, delta: isize) {
        let Some(task_id) = self.current_task().map(|t| t.id.clone()) else {
            self.status = "No task selected to move".into();
            return;
        };
        let last = self.board.get().columns.len().saturating_sub(1) as isize;
        let target_idx = (self.selected_column as isize + delta).clamp(0, last) as usize;
        if target_idx == self.selected_column {
            return;
        }
        let Some(target) = self
            .board
            .get()
            .columns
            .get(target_idx)
            .map(|c| DragId::Column(c.id.clone()))
        else {
            return;
        };
        self.begin_drag(DragId::Task(task_id));
        if !self.drag.is_dragging() {
            return;
        }
        self.drag_over(Some(target.clone()));
        self.finish_drag(Some(target));
    }

    fn promote_selected(&mut self) {
        let Some(item_id) = self.current_item_id() else {
            self.status = "Inbox is empty".into();
            return;
        };
        let Some(column_id) = self.current_column_id() else {
            self.status = "Add a column first".into();
            return;
        };
        match inbox::promote(
            self.inbox.get_mut(),
            self.board.get_mut(),
            &item_id,
            &column_id,
        ) {
            Ok(_) => {
                self.board.save(&mut self.session.store);
                self.inbox.save(&mut self.session.store);
                self.saved(format!("Promoted to {}", column_id));
            }
            Err(err) => self.status = format!("Promote failed: {}", err),
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        match self.view {
            ViewMode::Board => {
                self.draw_board(f, layout[1]);
                self.draw_drag_overlay(f, layout[1]);
            }
            ViewMode::Inbox => self.draw_inbox(f, layout[1]),
        }
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::Creating(form) => self.draw_form(f, "New Task", form),
            Mode::Editing { form, .. } => self.draw_form(f, "Edit Task", form),
            Mode::Prompt { purpose, field } => self.draw_prompt(f, purpose.label(), field),
            Mode::ConfirmComplete { task_id } => self.draw_confirm(f, task_id),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                "route ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("hi, {}", self.profile.greeting_name()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(
                self.session.location.scope.label(),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.session.location.dir.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("saved {}", format_elapsed(self.last_save)),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("view {}", self.view.label().to_lowercase()),
                Style::default().fg(Color::Magenta),
            ),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_board(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        self.layout.columns.clear();
        let board = self.board.get();
        if board.columns.is_empty() {
            let msg = Paragraph::new("No columns yet. Press a to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("route"));
            f.render_widget(Clear, area);
            f.render_widget(msg, area);
            return;
        }

        if self.scroll_offsets.len() < board.columns.len() {
            self.scroll_offsets.resize(board.columns.len(), 0);
        }

        let chunk_constraints = column_constraints(board.columns.len());

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(chunk_constraints)
            .split(area);

        let dragging = self.drag.is_dragging();
        let active = self.drag.active();
        let hover = if dragging { self.hover.as_ref() } else { None };

        for (idx, column) in board.columns.iter().enumerate() {
            let chunk = chunks[idx];
            let accent = column_color(column.color.as_deref(), idx);
            let card_width = chunk.width.saturating_sub(2);
            let tasks = board.tasks_in(&column.id);
            let cards = tasks
                .iter()
                .enumerate()
                .map(|(t_idx, task)| {
                    let look = if is_task(active, &task.id) {
                        CardLook::Ghost
                    } else if is_task(hover, &task.id) {
                        CardLook::DropTarget
                    } else if !dragging && idx == self.selected_column && t_idx == self.selected_task
                    {
                        CardLook::Selected
                    } else {
                        CardLook::Plain
                    };
                    task_item(task, card_width, look)
                })
                .collect::<Vec<_>>();

            let mut state = ListState::default();
            let mut offset = *self.scroll_offsets.get(idx).unwrap_or(&0);
            let viewport = (chunk.height.saturating_sub(2) / CARD_HEIGHT) as usize;
            if idx == self.selected_column {
                offset = adjust_offset(self.selected_task, offset, viewport, 0, cards.len());
                state.select(Some(self.selected_task).filter(|_| !dragging));
            }
            *state.offset_mut() = offset.min(cards.len().saturating_sub(1));

            let column_dragged = matches!(active, Some(DragId::Column(id)) if *id == column.id);
            let column_hovered = matches!(hover, Some(DragId::Column(id)) if *id == column.id);
            let border = if column_dragged {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
            } else if column_hovered {
                Style::default().fg(Color::LightYellow)
            } else {
                Style::default().fg(accent)
            };
            let icon = column
                .icon
                .as_deref()
                .map(|i| format!("[{}] ", i))
                .unwrap_or_default();
            let title = format!("{}{} ({})", icon, column.title, tasks.len());
            let block = Block::default()
                .title(Span::styled(
                    title,
                    border.add_modifier(if idx == self.selected_column {
                        Modifier::BOLD | Modifier::UNDERLINED
                    } else {
                        Modifier::BOLD
                    }),
                ))
                .borders(Borders::ALL)
                .border_style(border)
                .style(Style::default().bg(Color::Rgb(16, 18, 24)));

            let list = List::new(cards).block(block);
            f.render_stateful_widget(list, chunk, &mut state);
            if let Some(slot) = self.scroll_offsets.get_mut(idx) {
                *slot = state.offset();
            }
            self.layout.columns.push(ColumnSlot {
                id: column.id.clone(),
                area: chunk,
                list: inner(chunk),
                offset: state.offset(),
                task_ids: tasks.iter().map(|t| t.id.clone()).collect(),
            });
        }
    }

    /// Floating copy of the dragged item, drawn from the drag-start snapshot.
    fn draw_drag_overlay(&self, f: &mut ratatui::Frame<'_>, bounds: Rect) {
        let Some(snapshot) = self.drag.overlay() else {
            return;
        };
        let width = self
            .layout
            .columns
            .first()
            .map(|s| s.list.width)
            .unwrap_or(30)
            .max(12);
        let anchor = match self.pointer {
            Some((x, y)) => Rect {
                x: x.saturating_sub(1),
                y,
                width,
                height: CARD_HEIGHT,
            },
            None => match self.hover.as_ref().and_then(|h| self.layout.anchor(h)) {
                Some(r) => Rect {
                    x: r.x.saturating_add(2),
                    y: r.y.saturating_add(1),
                    ..r
                },
                None => return,
            },
        };
        let area = clamp_rect(anchor, bounds);
        let board = self.board.get();
        let (title, detail) = match snapshot {
            DragSnapshot::Task { task, origin } => (
                task.title.clone(),
                format!(
                    "from {}",
                    board.column(origin).map(|c| c.title.as_str()).unwrap_or(origin)
                ),
            ),
            DragSnapshot::Column(column) => (
                column.title.clone(),
                format!("{} task(s)", board.tasks_in(&column.id).len()),
            ),
        };
        let room = area.width.saturating_sub(2) as usize;
        let body = vec![
            Line::from(Span::styled(
                truncate_text(&title, room),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                truncate_text(&detail, room),
                Style::default().fg(Color::Gray),
            )),
        ];
        let widget = Paragraph::new(body)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::LightYellow))
                    .title("moving"),
            )
            .style(Style::default().bg(Color::Rgb(40, 36, 20)));
        f.render_widget(Clear, area);
        f.render_widget(widget, area);
    }

    fn draw_inbox(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let items = self.inbox.get();
        let block = Block::default()
            .title(Span::styled(
                format!("Inbox ({})", items.len()),
                Style::default()
                    .fg(Color::LightCyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::LightCyan))
            .style(Style::default().bg(Color::Rgb(16, 18, 24)));
        if items.is_empty() {
            let msg = Paragraph::new("Inbox zero. Press n to capture a thought.")
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(msg, area);
            return;
        }
        let width = area.width.saturating_sub(4) as usize;
        let rows = items
            .iter()
            .map(|item| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        truncate_text(&item.text, width),
                        Style::default().fg(Color::White),
                    )),
                    Line::from(Span::styled(
                        format!("[{}] {}", item.id, item.captured_at),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect::<Vec<_>>();
        let mut state = ListState::default();
        state.select(Some(self.selected_item));
        let list = List::new(rows)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::Rgb(40, 44, 56))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, bottom[0]);

        let detail = Paragraph::new(self.detail_line())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title("Selected"),
            );
        f.render_widget(detail, bottom[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let key = |k: &'static str, color: Color| Span::styled(k, Style::default().fg(color));
        if self.drag.is_dragging() {
            return Line::from(vec![
                key("←→", Color::LightCyan),
                Span::raw(" column  "),
                key("↑↓", Color::LightCyan),
                Span::raw(" position  "),
                key("Enter", Color::LightGreen),
                Span::raw(" drop  "),
                key("Esc", Color::LightRed),
                Span::raw(" cancel"),
            ]);
        }
        let mut spans = vec![
            key("1", Color::LightCyan),
            Span::raw(" board  "),
            key("2", Color::LightCyan),
            Span::raw(" inbox  "),
        ];
        match self.view {
            ViewMode::Board => spans.extend([
                key("←↑↓→ / h j k l", Color::LightCyan),
                Span::raw(" select  "),
                key("space", Color::LightGreen),
                Span::raw(" grab task  "),
                key("g", Color::LightGreen),
                Span::raw(" grab column  "),
                key("</>", Color::LightGreen),
                Span::raw(" shift  "),
                key("n", Color::LightMagenta),
                Span::raw(" new  "),
                key("e", Color::LightYellow),
                Span::raw(" edit  "),
                key("x", Color::LightRed),
                Span::raw(" complete  "),
                key("a/r", Color::LightMagenta),
                Span::raw(" add/rename column  "),
                key("q", Color::LightRed),
                Span::raw(" quit"),
            ]),
            ViewMode::Inbox => spans.extend([
                key("↑↓", Color::LightCyan),
                Span::raw(" browse  "),
                key("n", Color::LightMagenta),
                Span::raw(" capture  "),
                key("p", Color::LightGreen),
                Span::raw(" promote to board  "),
                key("d", Color::LightRed),
                Span::raw(" discard  "),
                key("q", Color::LightRed),
                Span::raw(" quit"),
            ]),
        }
        Line::from(spans)
    }

    fn detail_line(&self) -> Line<'static> {
        match self.view {
            ViewMode::Board => match self.current_task() {
                Some(task) => selected_task_detail(task),
                None => Line::from("No task selected"),
            },
            ViewMode::Inbox => {
                let target = self
                    .current_column()
                    .map(|c| c.title.clone())
                    .unwrap_or_else(|| "no column".into());
                Line::from(vec![
                    Span::raw("promotes into "),
                    Span::styled(target, Style::default().fg(Color::LightYellow)),
                ])
            }
        }
    }

    fn draw_form(&self, f: &mut ratatui::Frame<'_>, title: &str, form: &TaskForm) {
        let area = centered_rect(70, 50, f.size());
        let mut fields = Vec::new();
        fields.push(field_line("Title", &form.title, form.field == FormField::Title));
        fields.push(field_line("Due (e.g. Fri)", &form.due, form.field == FormField::Due));
        fields.push(field_line(
            "Tags (label or label:color)",
            &form.tags,
            form.field == FormField::Tags,
        ));
        fields.push(field_line("Owner", &form.avatar, form.field == FormField::Avatar));
        fields.push(Line::from(""));
        fields.push(Line::from(Span::styled(
            format!(
                "Enter to save • Esc to cancel • Tab/Shift-Tab to move • colors: {}",
                TagColor::ALL.map(TagColor::as_str).join(" ")
            ),
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(fields)
            .block(
                Block::default()
                    .title(Span::styled(
                        title.to_string(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_prompt(&self, f: &mut ratatui::Frame<'_>, label: &str, field: &FieldValue) {
        let area = centered_rect(60, 20, f.size());
        let dialog = Paragraph::new(vec![
            field_line(label, field, true),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to save • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ])
        .block(
            Block::default()
                .title(Span::styled(
                    label.to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, task_id: &str) {
        let area = centered_rect(50, 30, f.size());
        let title = self
            .board
            .get()
            .task(task_id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| task_id.to_string());
        let body = vec![
            Line::from(Span::styled(
                format!("Complete \"{}\"?", title),
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from("Completed tasks are removed from the board."),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Complete Task",
                    Style::default()
                        .fg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightGreen)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn prev_column(&mut self) {
        if self.selected_column > 0 {
            self.selected_column -= 1;
            self.selected_task = 0;
        }
    }

    fn next_column(&mut self) {
        if self.selected_column + 1 < self.board.get().columns.len() {
            self.selected_column += 1;
            self.selected_task = 0;
        }
    }

    fn prev_task(&mut self) {
        if self.selected_task > 0 {
            self.selected_task -= 1;
        }
    }

    fn next_task(&mut self) {
        let len = self
            .current_column()
            .map(|c| self.board.get().tasks_in(&c.id).len())
            .unwrap_or(0);
        if self.selected_task + 1 < len {
            self.selected_task += 1;
        }
    }

    fn select(&mut self, id: &DragId) {
        let board = self.board.get();
        match id {
            DragId::Task(task_id) => {
                if let Some(location) = board.locate_task(task_id) {
                    if let Some(col) = board.column_index(&location.column) {
                        self.selected_column = col;
                        self.selected_task = location.index;
                    }
                }
            }
            DragId::Column(column_id) => {
                if let Some(col) = board.column_index(column_id) {
                    if col != self.selected_column {
                        self.selected_task = 0;
                    }
                    self.selected_column = col;
                }
            }
        }
    }

    fn clamp_selection(&mut self) {
        let board = self.board.get();
        if board.columns.is_empty() {
            self.selected_column = 0;
            self.selected_task = 0;
        } else {
            self.selected_column = self.selected_column.min(board.columns.len() - 1);
            let len = board
                .columns
                .get(self.selected_column)
                .map(|c| board.tasks_in(&c.id).len())
                .unwrap_or(0);
            self.selected_task = self.selected_task.min(len.saturating_sub(1));
        }
        self.selected_item = self
            .selected_item
            .min(self.inbox.get().len().saturating_sub(1));
    }

    fn current_column(&self) -> Option<&Column> {
        self.board.get().columns.get(self.selected_column)
    }

    fn current_column_id(&self) -> Option<String> {
        self.current_column().map(|c| c.id.clone())
    }

    fn current_task(&self) -> Option<&Task> {
        let column = self.current_column()?;
        self.board.get().tasks_in(&column.id).get(self.selected_task)
    }

    fn current_item_id(&self) -> Option<String> {
        self.inbox
            .get()
            .items()
            .get(self.selected_item)
            .map(|i| i.id.clone())
    }

    fn create_task_from_form(&mut self, form: &TaskForm) -> Result<()> {
        let column_id = self
            .current_column_id()
            .ok_or_else(|| anyhow!("no column selected"))?;
        let mut task = Task::new(form.title.value.trim());
        task.due_date = non_empty(&form.due.value);
        task.tags = parse_tag_field(&form.tags.value)?;
        task.avatar = non_empty(&form.avatar.value);
        let title = task.title.clone();
        self.mutate_board(|b| b.add_task(&column_id, task))?;
        self.selected_task = 0;
        self.saved(format!("Created \"{}\"", title));
        Ok(())
    }

    fn edit_task_from_form(&mut self, task_id: &str, form: &TaskForm) -> Result<()> {
        let patch = TaskPatch {
            title: Some(form.title.value.trim().to_string()),
            due_date: Some(non_empty(&form.due.value)),
            tags: Some(parse_tag_field(&form.tags.value)?),
            avatar: Some(non_empty(&form.avatar.value)),
            avatar_active: None,
        };
        self.mutate_board(|b| b.patch_task(task_id, patch))?;
        self.saved(format!("Updated {}", task_id));
        Ok(())
    }

    /// Applies `f` and writes the board back.
    fn mutate_board<R>(&mut self, f: impl FnOnce(&mut Board) -> R) -> R {
        let result = self.board.update(&mut self.session.store, f);
        self.clamp_selection();
        result
    }

    fn saved(&mut self, message: impl Into<String>) {
        self.last_save = Instant::now();
        self.status = message.into();
        self.clamp_selection();
    }
}

impl TaskForm {
    fn new() -> Self {
        TaskForm {
            title: FieldValue::new(""),
            due: FieldValue::new(""),
            tags: FieldValue::new(""),
            avatar: FieldValue::new(""),
            field: FormField::Title,
        }
    }

    fn from_task(task: &Task) -> Self {
        let tags = task
            .tags
            .iter()
            .map(|t| match t.color {
                Some(color) => format!("{}:{}", t.label, color),
                None => t.label.clone(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        TaskForm {
            title: FieldValue::new(&task.title),
            due: FieldValue::new(task.due_date.as_deref().unwrap_or_default()),
            tags: FieldValue::new(&tags),
            avatar: FieldValue::new(task.avatar.as_deref().unwrap_or_default()),
            field: FormField::Title,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Due,
            FormField::Due => FormField::Tags,
            FormField::Tags => FormField::Avatar,
            FormField::Avatar => FormField::Title,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Avatar,
            FormField::Due => FormField::Title,
            FormField::Tags => FormField::Due,
            FormField::Avatar => FormField::Tags,
        };
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Due => &mut self.due,
            FormField::Tags => &mut self.tags,
            FormField::Avatar => &mut self.avatar,
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Equal shares for every column, whatever the count.
fn column_constraints(count: usize) -> Vec<Constraint> {
    let share = u32::try_from(count).unwrap_or(u32::MAX).max(1);
    vec![Constraint::Ratio(1, share); count]
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn inner(r: Rect) -> Rect {
    Rect {
        x: r.x.saturating_add(1),
        y: r.y.saturating_add(1),
        width: r.width.saturating_sub(2),
        height: r.height.saturating_sub(2),
    }
}

fn contains(r: Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x.saturating_add(r.width) && y >= r.y && y < r.y.saturating_add(r.height)
}

/// Shrinks and shifts `r` so it lies inside `bounds`.
fn clamp_rect(r: Rect, bounds: Rect) -> Rect {
    let width = r.width.min(bounds.width);
    let height = r.height.min(bounds.height);
    let x = r
        .x
        .max(bounds.x)
        .min((bounds.x + bounds.width).saturating_sub(width));
    let y = r
        .y
        .max(bounds.y)
        .min((bounds.y + bounds.height).saturating_sub(height));
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn is_task(id: Option<&DragId>, task_id: &str) -> bool {
    matches!(id, Some(DragId::Task(t)) if t == task_id)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_tag_field(input: &str) -> Result<Vec<Tag>, BoardError> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.trim().is_empty())
        .map(Tag::parse)
        .collect()
}

fn color_for_index(idx: usize) -> Color {
    let palette = [
        Color::Cyan,
        Color::LightGreen,
        Color::LightMagenta,
        Color::LightBlue,
        Color::LightYellow,
        Color::LightRed,
    ];
    palette[idx % palette.len()]
}

/// Named accent or `#rrggbb`; anything else falls back to the palette.
fn column_color(name: Option<&str>, idx: usize) -> Color {
    let name = name.map(|n| n.trim().to_ascii_lowercase());
    match name.as_deref() {
        Some("amber" | "yellow") => Color::LightYellow,
        Some("sky" | "blue") => Color::LightBlue,
        Some("slate" | "gray" | "grey") => Color::Gray,
        Some("violet" | "purple") => Color::LightMagenta,
        Some("green" | "emerald") => Color::LightGreen,
        Some("red" | "rose") => Color::LightRed,
        Some(hex) if hex.starts_with('#') => parse_hex(hex).unwrap_or_else(|| color_for_index(idx)),
        _ => color_for_index(idx),
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some(Color::Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8))
}

fn tag_color(color: Option<TagColor>) -> Color {
    match color {
        Some(TagColor::Blue) => Color::LightBlue,
        Some(TagColor::Green) => Color::LightGreen,
        Some(TagColor::Amber) => Color::LightYellow,
        Some(TagColor::Red) => Color::LightRed,
        Some(TagColor::Violet) => Color::LightMagenta,
        Some(TagColor::Gray) | None => Color::Gray,
    }
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn prev_boundary(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_boundary(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(cursor)
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

fn task_item(task: &Task, width: u16, look: CardLook) -> ListItem<'static> {
    let inner_width = width.saturating_sub(4).max(10) as usize;
    let border_char = match look {
        CardLook::Selected => "=",
        CardLook::DropTarget => "~",
        CardLook::Ghost => ".",
        CardLook::Plain => "-",
    };
    let edge = format!("+{}+", border_char.repeat(inner_width + 2));
    let title = truncate_text(&task.title, inner_width);
    let colored = look != CardLook::Ghost;

    let mut meta: Vec<Span<'static>> = Vec::new();
    let mut used = 0usize;
    let mut push = |text: String, color: Color| {
        if used >= inner_width {
            return;
        }
        let sep = if used == 0 { "" } else { " " };
        let piece = truncate_text(&format!("{}{}", sep, text), inner_width - used);
        used += piece.chars().count();
        let style = if colored {
            Style::default().fg(color)
        } else {
            Style::default()
        };
        meta.push(Span::styled(piece, style));
    };
    if let Some(due) = &task.due_date {
        push(format!("due {}", due), Color::LightYellow);
    }
    if let Some(avatar) = &task.avatar {
        let color = if task.avatar_active {
            Color::LightGreen
        } else {
            Color::Gray
        };
        push(format!("@{}", avatar), color);
    }
    for tag in &task.tags {
        push(format!("#{}", tag.label), tag_color(tag.color));
    }
    let mut meta_line = vec![Span::raw("| ")];
    meta_line.extend(meta);
    meta_line.push(Span::raw(format!("{} |", " ".repeat(inner_width - used))));

    let lines = vec![
        Line::raw(edge.clone()),
        Line::from(vec![
            Span::raw("| "),
            Span::styled(
                format!("{:width$}", title, width = inner_width),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" |"),
        ]),
        Line::from(meta_line),
        Line::raw(edge),
    ];
    let style = match look {
        CardLook::Plain => Style::default().bg(Color::Rgb(22, 24, 30)).fg(Color::Gray),
        CardLook::Selected => Style::default()
            .bg(Color::Rgb(252, 214, 112))
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
        CardLook::Ghost => Style::default()
            .bg(Color::Rgb(16, 18, 24))
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
        CardLook::DropTarget => Style::default()
            .bg(Color::Rgb(40, 36, 20))
            .fg(Color::LightYellow),
    };
    ListItem::new(lines).style(style)
}

fn field_line(label: &str, field: &FieldValue, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(text, value_style),
    ])
}

fn selected_task_detail(task: &Task) -> Line<'static> {
    let mut spans = vec![Span::styled(
        task.title.clone(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(due) = &task.due_date {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            due.clone(),
            Style::default().fg(Color::LightRed),
        ));
    }
    for tag in &task.tags {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("#{}", tag.label),
            Style::default().fg(tag_color(tag.color)),
        ));
    }
    spans.push(Span::styled(
        format!("  [{}]", task.id),
        Style::default().fg(Color::DarkGray),
    ));
    Line::from(spans)
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, x: u16, tasks: &[&str], offset: usize) -> ColumnSlot {
        let area = Rect {
            x,
            y: 3,
            width: 20,
            height: 14,
        };
        ColumnSlot {
            id: id.into(),
            area,
            list: inner(area),
            offset,
            task_ids: tasks.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn hit_testing_maps_rows_to_cards() {
        let layout = BoardLayout {
            columns: vec![slot("a", 0, &["a1", "a2"], 0), slot("b", 20, &["b1"], 0)],
        };
        assert_eq!(layout.hit(5, 3), Some(Hit::Header("a".into())));
        assert_eq!(layout.hit(5, 4), Some(Hit::Task("a1".into())));
        assert_eq!(layout.hit(5, 7), Some(Hit::Task("a1".into())));
        assert_eq!(layout.hit(5, 8), Some(Hit::Task("a2".into())));
        assert_eq!(layout.hit(5, 13), Some(Hit::Body("a".into())));
        assert_eq!(layout.hit(25, 4), Some(Hit::Task("b1".into())));
        assert_eq!(layout.hit(50, 4), None);
    }

    #[test]
    fn hit_testing_respects_scroll_offset() {
        let layout = BoardLayout {
            columns: vec![slot("a", 0, &["a1", "a2", "a3"], 1)],
        };
        assert_eq!(layout.hit(5, 4), Some(Hit::Task("a2".into())));
        assert_eq!(
            layout.anchor(&DragId::Task("a1".into())),
            None,
            "scrolled-out cards have no anchor"
        );
        assert_eq!(
            layout.anchor(&DragId::Task("a3".into())).map(|r| r.y),
            Some(8)
        );
    }

    #[test]
    fn hits_become_drag_targets() {
        assert_eq!(
            Hit::Body("focus".into()).into_target(),
            DragId::Column("focus".into())
        );
        assert_eq!(
            Hit::Task("t1".into()).into_target(),
            DragId::Task("t1".into())
        );
    }

    #[test]
    fn overlay_rect_stays_on_screen() {
        let bounds = Rect {
            x: 0,
            y: 3,
            width: 80,
            height: 20,
        };
        let r = clamp_rect(
            Rect {
                x: 75,
                y: 21,
                width: 20,
                height: 4,
            },
            bounds,
        );
        assert_eq!((r.x, r.y, r.width, r.height), (60, 19, 20, 4));
    }

    #[test]
    fn offsets_follow_selection() {
        assert_eq!(adjust_offset(0, 0, 3, 0, 10), 0);
        assert_eq!(adjust_offset(5, 0, 3, 0, 10), 3);
        assert_eq!(adjust_offset(2, 5, 3, 0, 10), 2);
        assert_eq!(adjust_offset(9, 0, 3, 0, 10), 7);
    }

    #[test]
    fn column_shares_never_divide_by_zero() {
        assert!(column_constraints(0).is_empty());
        assert_eq!(column_constraints(3), vec![Constraint::Ratio(1, 3); 3]);
        let many = column_constraints(65_536);
        assert_eq!(many.len(), 65_536);
        assert_eq!(many[0], Constraint::Ratio(1, 65_536));
        let area = Rect::new(0, 0, 90, 10);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(column_constraints(3))
            .split(area);
        assert_eq!(chunks.iter().map(|c| c.width).sum::<u16>(), 90);
    }

    #[test]
    fn text_helpers() {
        assert_eq!(truncate_text("hello world", 8), "hello...");
        assert_eq!(truncate_text("short", 8), "short");
        assert_eq!(prev_boundary(3, "aé"), 1);
        assert_eq!(next_boundary(1, "aé"), 3);
        assert_eq!(parse_hex("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(column_color(Some("nope"), 1), Color::LightGreen);
    }

    #[test]
    fn tag_field_accepts_spaces_and_commas() {
        let tags = parse_tag_field("ops, growth:green  legal").unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[1].color, Some(TagColor::Green));
        assert!(parse_tag_field("x:plaid").is_err());
    }
}
