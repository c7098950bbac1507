use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "route",
    version,
    about = "Founder's Route: task board, inbox, journals, brand hub and focus room"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project-local data directory in the current directory
    Init {
        /// Display name used in greetings
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the board
    Board {
        /// Only show this column id
        #[arg(long)]
        column: Option<String>,
    },
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Manage board columns
    #[command(subcommand)]
    Column(ColumnCommand),
    /// Quick-capture inbox
    #[command(subcommand)]
    Inbox(InboxCommand),
    /// Journal books and entries
    #[command(subcommand)]
    Journal(JournalCommand),
    /// Brand asset library
    #[command(subcommand)]
    Brand(BrandCommand),
    /// Focus Room widgets, rituals, energy and timer
    #[command(subcommand)]
    Focus(FocusCommand),
    /// AI voice artifacts
    #[command(subcommand)]
    Library(LibraryCommand),
    /// Display name and privacy acknowledgement
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Launch the interactive TUI
    Tui,
}

#[derive(Args, Debug, Default)]
pub struct TaskFields {
    /// Due label shown on the card (free text, e.g. "Fri")
    #[arg(long)]
    pub due: Option<String>,
    /// Tag as `label` or `label:color` (repeatable)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,
    /// Avatar initials or URL
    #[arg(long)]
    pub avatar: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a task at the top of a column
    Add {
        title: String,
        /// Column id (defaults to the first column)
        #[arg(long)]
        column: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Edit an existing task
    Edit {
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
        /// Remove the due label
        #[arg(long)]
        clear_due: bool,
        /// Remove all tags
        #[arg(long)]
        clear_tags: bool,
        /// Remove the avatar
        #[arg(long)]
        clear_avatar: bool,
        /// Mark the avatar as active or inactive
        #[arg(long)]
        avatar_active: Option<bool>,
    },
    /// Move a task into another column
    Move {
        task_id: String,
        column_id: String,
        /// Position in the destination column (defaults to the end)
        #[arg(long)]
        at: Option<usize>,
    },
    /// Move a task to a position within its column
    Reorder { task_id: String, index: usize },
    /// Complete (delete) a task
    Done { task_id: String },
    /// Delete a task without completing it
    Rm { task_id: String },
}

#[derive(Subcommand, Debug)]
pub enum ColumnCommand {
    /// Add a column; its id is derived from the title
    Add {
        title: String,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    Rename { column_id: String, title: String },
    /// Set or clear a column color
    Color {
        column_id: String,
        color: Option<String>,
    },
    /// Set or clear a column icon
    Icon {
        column_id: String,
        icon: Option<String>,
    },
    /// Move a column to a position in the lane order
    Move { column_id: String, index: usize },
    /// Remove a column and all of its tasks
    Rm { column_id: String },
}

#[derive(Subcommand, Debug)]
pub enum InboxCommand {
    /// Capture a thought
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    List,
    /// Turn an inbox item into a task
    Promote {
        item_id: String,
        /// Column id (defaults to the first column)
        #[arg(long)]
        column: Option<String>,
    },
    Rm { item_id: String },
}

#[derive(Subcommand, Debug)]
pub enum JournalCommand {
    #[command(subcommand)]
    Book(BookCommand),
    #[command(subcommand)]
    Entry(EntryCommand),
}

#[derive(Subcommand, Debug)]
pub enum BookCommand {
    List,
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "slate")]
        color: String,
        #[arg(long, default_value = "book")]
        icon: String,
    },
    Rename { book_id: String, title: String },
    /// Remove a book and its entries
    Rm { book_id: String },
    Move { book_id: String, index: usize },
}

#[derive(Subcommand, Debug)]
pub enum EntryCommand {
    /// List entries of a book (defaults to the daily log)
    List {
        #[arg(long)]
        book: Option<String>,
    },
    Add {
        title: String,
        #[arg(long)]
        book: Option<String>,
        #[arg(long, default_value = "")]
        content: String,
    },
    Edit {
        entry_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Toggle the pin flag
    Pin { entry_id: String },
    Rm { entry_id: String },
}

#[derive(Subcommand, Debug)]
pub enum BrandCommand {
    List {
        /// Logo, Icon, Color or Font
        #[arg(long = "type")]
        kind: Option<String>,
    },
    /// Add a color, font or data-URL image
    Add {
        name: String,
        /// Logo, Icon, Color or Font
        #[arg(long = "type")]
        kind: String,
        value: String,
    },
    /// Import an image file as a logo or icon
    Import {
        name: String,
        path: PathBuf,
        #[arg(long = "type", default_value = "Logo")]
        kind: String,
    },
    Rename { asset_id: String, name: String },
    Pin { asset_id: String },
    Move { asset_id: String, index: usize },
    Rm { asset_id: String },
    /// Write a logo or icon to a file or directory
    Export { asset_id: String, dest: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum FocusCommand {
    /// Show the widget grid
    List,
    /// List every widget type
    Kinds,
    /// Add a widget with its default payload
    Add { kind: String },
    /// Replace a widget's payload with JSON
    Set { widget_id: String, json: String },
    Move { widget_id: String, index: usize },
    Rm { widget_id: String },
    /// Show or set the energy level (1-5)
    Energy { level: Option<i64> },
    /// Show or change the focus timer
    Timer {
        #[arg(long)]
        focus: Option<u32>,
        #[arg(long = "break")]
        break_minutes: Option<u32>,
    },
    #[command(subcommand)]
    Ritual(RitualCommand),
}

#[derive(Subcommand, Debug)]
pub enum RitualCommand {
    List,
    Add { label: String },
    Toggle { ritual_id: String },
    Rm { ritual_id: String },
    /// Clear every done flag
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum LibraryCommand {
    /// List available voices
    Voices,
    /// Generate a voice artifact from text
    Generate {
        text: String,
        #[arg(long, default_value = "")]
        title: String,
        /// Voice id or name
        #[arg(long)]
        voice: Option<String>,
    },
    List,
    Pin { artifact_id: String },
    Rename { artifact_id: String, title: String },
    Rm { artifact_id: String },
    /// Write an artifact's audio to a file or directory
    Export { artifact_id: String, dest: PathBuf },
    /// Show how an artifact plays back
    Play { artifact_id: String },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    /// Set the display name (empty clears it)
    Name { name: String },
    /// Record acceptance of the privacy notice
    AcceptPrivacy,
}
