use crate::brand::{self, Asset, AssetKind, Assets};
use crate::cli::{
    BookCommand, BrandCommand, ColumnCommand, EntryCommand, FocusCommand, InboxCommand,
    JournalCommand, LibraryCommand, ProfileCommand, RitualCommand, TaskCommand, TaskFields,
};
use crate::config::{self, Settings, CONFIG_FILE};
use crate::focus::{self, Rituals, TimerSettings, WidgetBody, WidgetKind, Widgets};
use crate::inbox::{self, Inbox};
use crate::journal::{self, Books, Entries, DEFAULT_BOOK_ID};
use crate::library::{self, Library, Playback};
use crate::logging;
use crate::model::{Board, Tag, Task, TaskPatch};
use crate::profile::Profile;
use crate::storage::{
    init_project_dir, locate_data_dir, DataLocation, FileStore, StorageKey, Synced,
};
use crate::tts::HttpSynthesizer;
use crate::ui;
use anyhow::{anyhow, bail, Context, Result};
use log::info;
use std::env;

/// An opened data directory plus the settings that live next to it.
pub struct Session {
    pub location: DataLocation,
    pub store: FileStore,
    pub settings: Settings,
}

impl Session {
    pub fn open() -> Result<Self> {
        let cwd = env::current_dir()?;
        let location = locate_data_dir(&cwd, config::data_dir_override())?;
        Session::at(location)
    }

    pub fn at(location: DataLocation) -> Result<Self> {
        let store = FileStore::open(&location.dir)
            .with_context(|| format!("opening data directory {}", location.dir.display()))?;
        let settings = Settings::load(&location.dir)?;
        if let Err(err) = logging::init_logging(&settings.log_level, &location.dir) {
            eprintln!("warning: {err}");
        }
        info!(
            "event=session_open scope={} dir={}",
            location.scope.label(),
            location.dir.display()
        );
        Ok(Session {
            location,
            store,
            settings,
        })
    }

    /// Loads the board and repairs structural damage before anyone sees it.
    pub fn board(&mut self) -> Synced<Board> {
        let mut board = Synced::load(&mut self.store, StorageKey::Board, Board::seed);
        board.repair(&mut self.store, Board::normalize);
        board
    }

    pub fn inbox(&mut self) -> Synced<Inbox> {
        Synced::load(&mut self.store, StorageKey::Inbox, inbox::seed)
    }

    /// Books and entries; stored entry counts are recomputed on load.
    pub fn journal(&mut self) -> (Synced<Books>, Synced<Entries>) {
        let mut books = Synced::load(&mut self.store, StorageKey::JournalBooks, journal::seed_books);
        let entries = Synced::load(
            &mut self.store,
            StorageKey::JournalEntries,
            journal::seed_entries,
        );
        books.repair(&mut self.store, |b| journal::refresh_entry_counts(b, entries.get()));
        (books, entries)
    }

    pub fn brand(&mut self) -> Synced<Assets> {
        Synced::load(&mut self.store, StorageKey::BrandAssets, brand::seed)
    }

    pub fn widgets(&mut self) -> Synced<Widgets> {
        Synced::load(&mut self.store, StorageKey::FocusWidgets, focus::seed_widgets)
    }

    pub fn rituals(&mut self) -> Synced<Rituals> {
        Synced::load(&mut self.store, StorageKey::FocusRituals, focus::seed_rituals)
    }

    /// Energy level, clamped back into range if the stored value drifted.
    pub fn energy(&mut self) -> Synced<u8> {
        let mut energy = Synced::load(&mut self.store, StorageKey::FocusEnergy, || {
            focus::ENERGY_DEFAULT
        });
        energy.repair(&mut self.store, focus::repair_energy);
        energy
    }

    pub fn timer(&mut self) -> Synced<TimerSettings> {
        let mut timer =
            Synced::load(&mut self.store, StorageKey::FocusTimer, TimerSettings::default);
        timer.repair(&mut self.store, focus::repair_timer);
        timer
    }

    pub fn library(&mut self) -> Synced<Library> {
        Synced::load(&mut self.store, StorageKey::Artifacts, library::seed)
    }

    pub fn profile(&mut self) -> Profile {
        Profile::load(&mut self.store)
    }
}

pub fn init(name: Option<String>) -> Result<()> {
    let cwd = env::current_dir()?;
    let location = init_project_dir(&cwd)?;
    let config_path = location.dir.join(CONFIG_FILE);
    if !config_path.exists() {
        Settings::write_default(&config_path)?;
    }
    let mut session = Session::at(location)?;
    // Writes every seed so the directory is complete from the start.
    session.board();
    session.inbox();
    session.journal();
    session.brand();
    session.widgets();
    session.rituals();
    session.energy();
    session.timer();
    session.library();
    let mut profile = session.profile();
    if let Some(name) = name {
        profile.set_display_name(&mut session.store, &name);
    }
    println!("Initialized data directory at {}", session.location.dir.display());
    Ok(())
}

pub fn board(column: Option<String>) -> Result<()> {
    let mut session = Session::open()?;
    let board = session.board();
    let profile = session.profile();
    println!(
        "Board for {} ({}, {} tasks)",
        profile.greeting_name(),
        session.location.scope.label(),
        board.get().task_count()
    );
    if let Some(filter) = &column {
        if board.get().column(filter).is_none() {
            bail!("column {} not found", filter);
        }
    }
    for col in &board.get().columns {
        if let Some(filter) = &column {
            if &col.id != filter {
                continue;
            }
        }
        let icon = col.icon.as_deref().map(|i| format!(" [{i}]")).unwrap_or_default();
        println!("{}{} ({})", col.title, icon, col.id);
        let tasks = board.get().tasks_in(&col.id);
        if tasks.is_empty() {
            println!("  (empty)");
        }
        for task in tasks {
            print_task(task);
        }
        println!();
    }
    Ok(())
}

pub fn task(command: TaskCommand) -> Result<()> {
    let mut session = Session::open()?;
    let mut board = session.board();
    match command {
        TaskCommand::Add {
            title,
            column,
            fields,
        } => {
            let column_id = column
                .or_else(|| board.get().columns.first().map(|c| c.id.clone()))
                .ok_or_else(|| anyhow!("board has no columns"))?;
            let mut task = Task::new(title);
            task.due_date = fields.due;
            task.tags = parse_tags(&fields.tags)?;
            task.avatar = fields.avatar;
            let id = task.id.clone();
            board
                .update(&mut session.store, |b| b.add_task(&column_id, task))
                .with_context(|| format!("adding task to column {}", column_id))?;
            println!("Added task {} to {}", id, column_id);
        }
        TaskCommand::Edit {
            task_id,
            title,
            fields,
            clear_due,
            clear_tags,
            clear_avatar,
            avatar_active,
        } => {
            let patch = edit_patch(title, fields, clear_due, clear_tags, clear_avatar, avatar_active)?;
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field");
            }
            board
                .update(&mut session.store, |b| b.patch_task(&task_id, patch))
                .with_context(|| format!("editing task {}", task_id))?;
            println!("Updated task {}", task_id);
        }
        TaskCommand::Move {
            task_id,
            column_id,
            at,
        } => {
            let from = board
                .get()
                .locate_task(&task_id)
                .ok_or_else(|| anyhow!("task {} not found", task_id))?
                .column;
            board
                .update(&mut session.store, |b| {
                    b.transfer_task(&task_id, &from, &column_id, at.unwrap_or(usize::MAX))
                })
                .with_context(|| format!("moving task {} to {}", task_id, column_id))?;
            println!("Moved task {} to {}", task_id, column_id);
        }
        TaskCommand::Reorder { task_id, index } => {
            let location = board
                .get()
                .locate_task(&task_id)
                .ok_or_else(|| anyhow!("task {} not found", task_id))?;
            let moved = board.update(&mut session.store, |b| {
                b.reorder_tasks(&location.column, location.index, index)
            })?;
            if moved {
                println!("Moved task {} to position {}", task_id, index);
            } else {
                println!("Task {} is already at position {}", task_id, location.index);
            }
        }
        TaskCommand::Done { task_id } => {
            let task = board
                .update(&mut session.store, |b| b.complete_task(&task_id))
                .with_context(|| format!("completing task {}", task_id))?;
            println!("Completed {}: {}", task.id, task.title);
        }
        TaskCommand::Rm { task_id } => {
            let task = board
                .update(&mut session.store, |b| b.remove_task(&task_id))
                .with_context(|| format!("removing task {}", task_id))?;
            println!("Removed {}: {}", task.id, task.title);
        }
    }
    Ok(())
}

pub fn column(command: ColumnCommand) -> Result<()> {
    let mut session = Session::open()?;
    let mut board = session.board();
    let store = &mut session.store;
    match command {
        ColumnCommand::Add { title, icon, color } => {
            let id = board.update(store, |b| b.add_column(&title, icon, color))?;
            println!("Added column {}", id);
        }
        ColumnCommand::Rename { column_id, title } => {
            board.update(store, |b| b.rename_column(&column_id, &title))?;
            println!("Renamed column {}", column_id);
        }
        ColumnCommand::Color { column_id, color } => {
            board.update(store, |b| b.recolor_column(&column_id, color))?;
            println!("Updated color of {}", column_id);
        }
        ColumnCommand::Icon { column_id, icon } => {
            board.update(store, |b| b.set_column_icon(&column_id, icon))?;
            println!("Updated icon of {}", column_id);
        }
        ColumnCommand::Move { column_id, index } => {
            let from = board
                .get()
                .column_index(&column_id)
                .ok_or_else(|| anyhow!("column {} not found", column_id))?;
            if board.update(store, |b| b.move_column(from, index)) {
                println!("Moved column {} to position {}", column_id, index);
            } else {
                println!("Column {} is already at position {}", column_id, from);
            }
        }
        ColumnCommand::Rm { column_id } => {
            let (column, tasks) = board.update(store, |b| b.remove_column(&column_id))?;
            println!("Removed column {} and {} task(s)", column.title, tasks.len());
        }
    }
    Ok(())
}

pub fn inbox(command: InboxCommand) -> Result<()> {
    let mut session = Session::open()?;
    let mut items = session.inbox();
    match command {
        InboxCommand::Add { text } => {
            let id = items.update(&mut session.store, |i| inbox::capture(i, &text.join(" ")))?;
            println!("Captured {}", id);
        }
        InboxCommand::List => {
            if items.get().is_empty() {
                println!("Inbox zero.");
            }
            for item in items.get().iter() {
                println!("  - {}: {} ({})", item.id, item.text, item.captured_at);
            }
        }
        InboxCommand::Promote { item_id, column } => {
            let mut board = session.board();
            let column_id = column
                .or_else(|| board.get().columns.first().map(|c| c.id.clone()))
                .ok_or_else(|| anyhow!("board has no columns"))?;
            let task_id = inbox::promote(items.get_mut(), board.get_mut(), &item_id, &column_id)
                .with_context(|| format!("promoting {} to {}", item_id, column_id))?;
            board.save(&mut session.store);
            items.save(&mut session.store);
            println!("Promoted {} to task {} in {}", item_id, task_id, column_id);
        }
        InboxCommand::Rm { item_id } => {
            let item = items.update(&mut session.store, |i| inbox::discard(i, &item_id))?;
            println!("Discarded {}", item.text);
        }
    }
    Ok(())
}

pub fn journal(command: JournalCommand) -> Result<()> {
    let mut session = Session::open()?;
    let (mut books, mut entries) = session.journal();
    match command {
        JournalCommand::Book(BookCommand::List) => {
            for book in books.get().iter() {
                println!(
                    "  - {}: {} [{} entries] {}",
                    book.id, book.title, book.entry_count, book.description
                );
            }
        }
        JournalCommand::Book(BookCommand::Add {
            title,
            description,
            color,
            icon,
        }) => {
            let id = books.update(&mut session.store, |b| {
                journal::add_book(b, &title, &description, &color, &icon)
            })?;
            println!("Added book {}", id);
        }
        JournalCommand::Book(BookCommand::Rename { book_id, title }) => {
            books.update(&mut session.store, |b| journal::rename_book(b, &book_id, &title))?;
            println!("Renamed book {}", book_id);
        }
        JournalCommand::Book(BookCommand::Rm { book_id }) => {
            let (book, dropped) =
                journal::remove_book(books.get_mut(), entries.get_mut(), &book_id)?;
            books.save(&mut session.store);
            entries.save(&mut session.store);
            println!("Removed book {} and {} entr(ies)", book.title, dropped);
        }
        JournalCommand::Book(BookCommand::Move { book_id, index }) => {
            books.update(&mut session.store, |b| b.move_to(&book_id, index))?;
            println!("Moved book {} to position {}", book_id, index);
        }
        JournalCommand::Entry(EntryCommand::List { book }) => {
            let book_id = book.unwrap_or_else(|| DEFAULT_BOOK_ID.to_string());
            let title = books
                .get()
                .get(&book_id)
                .map(|b| b.title.clone())
                .ok_or_else(|| anyhow!("book {} not found", book_id))?;
            println!("{}", title);
            let listed = journal::entries_in(entries.get(), &book_id);
            if listed.is_empty() {
                println!("  (empty)");
            }
            for entry in listed {
                let pin = if entry.pinned { " *" } else { "" };
                println!("  - {}: {}{} ({})", entry.id, entry.title, pin, entry.date);
                if !entry.content.is_empty() {
                    println!("    {}", entry.content);
                }
            }
        }
        JournalCommand::Entry(EntryCommand::Add {
            title,
            book,
            content,
        }) => {
            let id = journal::add_entry(
                books.get_mut(),
                entries.get_mut(),
                book.as_deref(),
                &title,
                &content,
            )?;
            entries.save(&mut session.store);
            books.save(&mut session.store);
            println!("Added entry {}", id);
        }
        JournalCommand::Entry(EntryCommand::Edit {
            entry_id,
            title,
            content,
        }) => {
            entries.update(&mut session.store, |e| {
                journal::edit_entry(e, &entry_id, title.as_deref(), content.as_deref())
            })?;
            println!("Updated entry {}", entry_id);
        }
        JournalCommand::Entry(EntryCommand::Pin { entry_id }) => {
            let pinned = entries.update(&mut session.store, |e| e.toggle_pin(&entry_id))?;
            println!("{} entry {}", if pinned { "Pinned" } else { "Unpinned" }, entry_id);
        }
        JournalCommand::Entry(EntryCommand::Rm { entry_id }) => {
            let entry = journal::remove_entry(books.get_mut(), entries.get_mut(), &entry_id)?;
            entries.save(&mut session.store);
            books.save(&mut session.store);
            println!("Removed entry {}", entry.title);
        }
    }
    Ok(())
}

pub fn brand(command: BrandCommand) -> Result<()> {
    let mut session = Session::open()?;
    let mut assets = session.brand();
    let store = &mut session.store;
    match command {
        BrandCommand::List { kind } => {
            let kind = kind.map(|k| k.parse::<AssetKind>()).transpose()?;
            for asset in brand::listing(assets.get(), kind) {
                print_asset(asset);
            }
        }
        BrandCommand::Add { name, kind, value } => {
            let kind: AssetKind = kind.parse()?;
            let id = assets.update(store, |a| brand::add(a, &name, kind, &value))?;
            println!("Added {} {}", kind, id);
        }
        BrandCommand::Import { name, path, kind } => {
            let kind: AssetKind = kind.parse()?;
            let value = brand::image_data_url(&path)?;
            let id = assets.update(store, |a| brand::add(a, &name, kind, &value))?;
            println!("Imported {} as {} {}", path.display(), kind, id);
        }
        BrandCommand::Rename { asset_id, name } => {
            assets.update(store, |a| brand::rename(a, &asset_id, &name))?;
            println!("Renamed asset {}", asset_id);
        }
        BrandCommand::Pin { asset_id } => {
            let pinned = assets.update(store, |a| a.toggle_pin(&asset_id))?;
            println!("{} asset {}", if pinned { "Pinned" } else { "Unpinned" }, asset_id);
        }
        BrandCommand::Move { asset_id, index } => {
            assets.update(store, |a| a.move_to(&asset_id, index))?;
            println!("Moved asset {} to position {}", asset_id, index);
        }
        BrandCommand::Rm { asset_id } => {
            let asset = assets.update(store, |a| a.remove(&asset_id))?;
            println!("Removed asset {}", asset.name);
        }
        BrandCommand::Export { asset_id, dest } => {
            let asset = assets
                .get()
                .get(&asset_id)
                .ok_or_else(|| anyhow!("asset {} not found", asset_id))?;
            let path = brand::export(asset, &dest)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

pub fn focus(command: FocusCommand) -> Result<()> {
    let mut session = Session::open()?;
    match command {
        FocusCommand::List => {
            let widgets = session.widgets();
            for widget in widgets.get().iter() {
                let payload = serde_json::to_string(&widget.body)?;
                println!("  - {} ({}): {}", widget.id, widget.kind(), payload);
            }
        }
        FocusCommand::Kinds => {
            for kind in WidgetKind::ALL {
                println!("  {}", kind);
            }
        }
        FocusCommand::Add { kind } => {
            let kind: WidgetKind = kind.parse()?;
            let mut widgets = session.widgets();
            let id = widgets.update(&mut session.store, |w| focus::add_widget(w, kind))?;
            println!("Added widget {}", id);
        }
        FocusCommand::Set { widget_id, json } => {
            let mut widgets = session.widgets();
            let kind = widgets
                .get()
                .get(&widget_id)
                .map(|w| w.kind())
                .ok_or_else(|| anyhow!("widget {} not found", widget_id))?;
            let value: serde_json::Value =
                serde_json::from_str(&json).context("payload is not valid JSON")?;
            let body = WidgetBody::from_json(kind, value)?;
            widgets.update(&mut session.store, |w| focus::set_body(w, &widget_id, body))?;
            println!("Updated widget {}", widget_id);
        }
        FocusCommand::Move { widget_id, index } => {
            let mut widgets = session.widgets();
            widgets.update(&mut session.store, |w| w.move_to(&widget_id, index))?;
            println!("Moved widget {} to position {}", widget_id, index);
        }
        FocusCommand::Rm { widget_id } => {
            let mut widgets = session.widgets();
            widgets.update(&mut session.store, |w| w.remove(&widget_id))?;
            println!("Removed widget {}", widget_id);
        }
        FocusCommand::Energy { level } => {
            let mut energy = session.energy();
            if let Some(level) = level {
                energy.replace(&mut session.store, focus::clamp_energy(level));
            }
            println!(
                "Energy {}/{} {}",
                energy.get(),
                focus::ENERGY_MAX,
                "#".repeat(*energy.get() as usize)
            );
        }
        FocusCommand::Timer {
            focus: focus_minutes,
            break_minutes,
        } => {
            let mut timer = session.timer();
            if focus_minutes.is_some() || break_minutes.is_some() {
                let current = *timer.get();
                let next = TimerSettings::new(
                    focus_minutes.unwrap_or(current.focus_minutes),
                    break_minutes.unwrap_or(current.break_minutes),
                );
                timer.replace(&mut session.store, next);
            }
            println!(
                "Focus {} min / break {} min",
                timer.get().focus_minutes,
                timer.get().break_minutes
            );
        }
        FocusCommand::Ritual(command) => ritual(&mut session, command)?,
    }
    Ok(())
}

fn ritual(session: &mut Session, command: RitualCommand) -> Result<()> {
    let mut rituals = session.rituals();
    let store = &mut session.store;
    match command {
        RitualCommand::List => {
            for r in rituals.get().iter() {
                println!("  [{}] {}: {}", if r.done { "x" } else { " " }, r.id, r.label);
            }
        }
        RitualCommand::Add { label } => {
            let id = rituals.update(store, |r| focus::add_ritual(r, &label))?;
            println!("Added ritual {}", id);
        }
        RitualCommand::Toggle { ritual_id } => {
            let done = rituals.update(store, |r| focus::toggle_ritual(r, &ritual_id))?;
            println!("{} {}", if done { "Done:" } else { "Not done:" }, ritual_id);
        }
        RitualCommand::Rm { ritual_id } => {
            let removed = rituals.update(store, |r| r.remove(&ritual_id))?;
            println!("Removed ritual {}", removed.label);
        }
        RitualCommand::Reset => {
            let count = rituals.update(store, focus::reset_rituals);
            println!("Reset {} ritual(s)", count);
        }
    }
    Ok(())
}

pub fn library(command: LibraryCommand) -> Result<()> {
    let mut session = Session::open()?;
    let mut artifacts = session.library();
    match command {
        LibraryCommand::Voices => {
            for voice in library::voices() {
                println!(
                    "  - {}: {} ({}, {}) {}",
                    voice.id, voice.name, voice.gender, voice.category, voice.description
                );
            }
        }
        LibraryCommand::Generate { text, title, voice } => {
            let needle = voice
                .or_else(|| session.settings.default_voice.clone())
                .unwrap_or_else(|| "Rachel".to_string());
            let voice = library::find_voice(&needle)
                .ok_or_else(|| anyhow!("unknown voice: {}", needle))?;
            let synth = HttpSynthesizer::new(
                session.settings.tts_endpoint.clone(),
                session.settings.tts_timeout(),
            )?;
            let artifact = library::generate_artifact(
                &synth,
                &title,
                &voice,
                &text,
                &session.settings.tts_model,
            )
            .with_context(|| format!("generating speech via {}", synth.endpoint()))?;
            let fallback = artifact.is_fallback();
            let id = artifact.id.clone();
            artifacts.update(&mut session.store, |a| a.prepend(artifact))?;
            if fallback {
                println!("Saved {} (speech service unavailable; plays with on-device voice)", id);
            } else {
                println!("Saved {}", id);
            }
        }
        LibraryCommand::List => {
            for artifact in artifacts.get().pinned_first() {
                let pin = if artifact.pinned { " *" } else { "" };
                let source = if artifact.is_fallback() { "on-device" } else { "clip" };
                println!(
                    "  - {}: {}{} [{} / {}] {}",
                    artifact.id, artifact.title, pin, artifact.voice.name, source, artifact.date
                );
            }
        }
        LibraryCommand::Pin { artifact_id } => {
            let pinned = artifacts.update(&mut session.store, |a| a.toggle_pin(&artifact_id))?;
            println!("{} {}", if pinned { "Pinned" } else { "Unpinned" }, artifact_id);
        }
        LibraryCommand::Rename { artifact_id, title } => {
            artifacts.update(&mut session.store, |a| library::rename(a, &artifact_id, &title))?;
            println!("Renamed {}", artifact_id);
        }
        LibraryCommand::Rm { artifact_id } => {
            let removed = artifacts.update(&mut session.store, |a| a.remove(&artifact_id))?;
            println!("Removed {}", removed.title);
        }
        LibraryCommand::Export { artifact_id, dest } => {
            let artifact = artifacts
                .get()
                .get(&artifact_id)
                .ok_or_else(|| anyhow!("artifact {} not found", artifact_id))?;
            let path = library::export_audio(artifact, &dest)?;
            println!("Wrote {}", path.display());
        }
        LibraryCommand::Play { artifact_id } => {
            let artifact = artifacts
                .get()
                .get(&artifact_id)
                .ok_or_else(|| anyhow!("artifact {} not found", artifact_id))?;
            match artifact.playback()? {
                Playback::Clip { mime, bytes } => {
                    println!("{} clip, {} bytes; export it to listen", mime, bytes.len())
                }
                Playback::OnDevice { text } => println!("On-device speech: {}", text),
            }
        }
    }
    Ok(())
}

pub fn profile(command: ProfileCommand) -> Result<()> {
    let mut session = Session::open()?;
    let mut profile = session.profile();
    match command {
        ProfileCommand::Show => {
            println!("Name: {}", profile.display_name().unwrap_or("(not set)"));
            println!(
                "Privacy notice: {}",
                if profile.privacy_accepted() { "accepted" } else { "not accepted" }
            );
            println!(
                "Data: {} ({})",
                session.location.dir.display(),
                session.location.scope.label()
            );
            if let Some(path) = logging::log_path() {
                println!("Log: {}", path.display());
            }
        }
        ProfileCommand::Name { name } => {
            profile.set_display_name(&mut session.store, &name);
            println!("Hello, {}", profile.greeting_name());
        }
        ProfileCommand::AcceptPrivacy => {
            profile.accept_privacy(&mut session.store);
            println!("Privacy notice accepted");
        }
    }
    Ok(())
}

pub fn tui() -> Result<()> {
    let session = Session::open()?;
    ui::run(session)
}

/// Parses `label[:color]` tag arguments.
pub fn parse_tags(raw: &[String]) -> Result<Vec<Tag>> {
    raw.iter()
        .flat_map(|r| r.split(',').map(str::trim).filter(|s| !s.is_empty()))
        .map(|r| Tag::parse(r).with_context(|| format!("invalid tag {:?}", r)))
        .collect()
}

fn edit_patch(
    title: Option<String>,
    fields: TaskFields,
    clear_due: bool,
    clear_tags: bool,
    clear_avatar: bool,
    avatar_active: Option<bool>,
) -> Result<TaskPatch> {
    let mut patch = TaskPatch {
        title,
        avatar_active,
        ..TaskPatch::default()
    };
    if clear_due {
        patch.due_date = Some(None);
    }
    if let Some(due) = fields.due {
        patch.due_date = Some(Some(due));
    }
    if clear_tags {
        patch.tags = Some(Vec::new());
    }
    if !fields.tags.is_empty() {
        patch.tags = Some(parse_tags(&fields.tags)?);
    }
    if clear_avatar {
        patch.avatar = Some(None);
    }
    if let Some(avatar) = fields.avatar {
        patch.avatar = Some(Some(avatar));
    }
    Ok(patch)
}

fn print_task(task: &Task) {
    println!("  - {}: {}", task.id, task.title);
    if let Some(due) = &task.due_date {
        println!("    due: {}", due);
    }
    if !task.tags.is_empty() {
        let tags: Vec<String> = task
            .tags
            .iter()
            .map(|t| match t.color {
                Some(color) => format!("{}:{}", t.label, color),
                None => t.label.clone(),
            })
            .collect();
        println!("    tags: {}", tags.join(", "));
    }
    if let Some(avatar) = &task.avatar {
        let state = if task.avatar_active { " (active)" } else { "" };
        println!("    owner: {}{}", avatar, state);
    }
}

fn print_asset(asset: &Asset) {
    let pin = if asset.pinned { " *" } else { "" };
    let value = if asset.kind.is_image() {
        format!("{} image", crate::data_url::mime_of(&asset.value).unwrap_or("unknown"))
    } else {
        asset.value.clone()
    };
    println!("  - {}: {}{} [{}] {}", asset.id, asset.name, pin, asset.kind, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_split_on_commas_and_repeat() {
        let tags = parse_tags(&["ops,growth:green".into(), "legal:red".into()]).unwrap();
        let labels: Vec<&str> = tags.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["ops", "growth", "legal"]);
        assert!(parse_tags(&["x:plaid".into()]).is_err());
    }

    #[test]
    fn edit_patch_prefers_new_values_over_clears() {
        let fields = TaskFields {
            due: Some("Mon".into()),
            tags: Vec::new(),
            avatar: None,
        };
        let patch = edit_patch(None, fields, true, true, false, None).unwrap();
        assert_eq!(patch.due_date, Some(Some("Mon".into())));
        assert_eq!(patch.tags, Some(Vec::new()));
        assert!(patch.avatar.is_none());
    }
}
