use crate::collection::{Collection, CollectionError, Keyed};
use crate::model::generate_id;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type Widgets = Collection<Widget>;
pub type Rituals = Collection<Ritual>;

pub const ENERGY_MIN: u8 = 1;
pub const ENERGY_MAX: u8 = 5;
pub const ENERGY_DEFAULT: u8 = 3;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Widget {
    pub id: String,
    pub body: WidgetBody,
}

impl Keyed for Widget {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Widget {
    pub fn kind(&self) -> WidgetKind {
        self.body.kind()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    Clock,
    WorldClock,
    Pomodoro,
    Countdown,
    Stopwatch,
    Todo,
    Priorities,
    Habits,
    Notes,
    JournalPrompt,
    Affirmation,
    Quote,
    Gratitude,
    Goals,
    WaterTracker,
    Streak,
    Mood,
    Energy,
    Breathing,
    Soundscape,
    Weather,
    Links,
    VisionBoard,
    Progress,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum WidgetBody {
    Clock(ClockData),
    WorldClock(ClockData),
    Pomodoro(TimerData),
    Countdown(CountdownData),
    Stopwatch(StopwatchData),
    Todo(ChecklistData),
    Priorities(ChecklistData),
    Habits(ChecklistData),
    Notes(NoteData),
    JournalPrompt(NoteData),
    Affirmation(NoteData),
    Quote(QuoteData),
    Gratitude(ListData),
    Goals(ListData),
    WaterTracker(CounterData),
    Streak(CounterData),
    Mood(ScaleData),
    Energy(ScaleData),
    Breathing(BreathingData),
    Soundscape(SoundData),
    Weather(LocationData),
    Links(LinksData),
    VisionBoard(ImageData),
    Progress(ProgressData),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClockData {
    pub timezone: String,
    pub twenty_four_hour: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerData {
    pub focus_minutes: u32,
    pub break_minutes: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CountdownData {
    pub label: String,
    pub target: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StopwatchData {
    pub elapsed_secs: u64,
    pub running: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ChecklistData {
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub text: String,
    pub done: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NoteData {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QuoteData {
    pub text: String,
    pub author: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ListData {
    pub entries: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CounterData {
    pub count: u32,
    pub goal: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScaleData {
    pub value: u8,
    pub max: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BreathingData {
    pub inhale_secs: u32,
    pub hold_secs: u32,
    pub exhale_secs: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SoundData {
    pub track: String,
    pub volume: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LocationData {
    pub city: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct LinksData {
    pub links: Vec<Link>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ImageData {
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProgressData {
    pub label: String,
    pub percent: u8,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 24] = [
        WidgetKind::Clock,
        WidgetKind::WorldClock,
        WidgetKind::Pomodoro,
        WidgetKind::Countdown,
        WidgetKind::Stopwatch,
        WidgetKind::Todo,
        WidgetKind::Priorities,
        WidgetKind::Habits,
        WidgetKind::Notes,
        WidgetKind::JournalPrompt,
        WidgetKind::Affirmation,
        WidgetKind::Quote,
        WidgetKind::Gratitude,
        WidgetKind::Goals,
        WidgetKind::WaterTracker,
        WidgetKind::Streak,
        WidgetKind::Mood,
        WidgetKind::Energy,
        WidgetKind::Breathing,
        WidgetKind::Soundscape,
        WidgetKind::Weather,
        WidgetKind::Links,
        WidgetKind::VisionBoard,
        WidgetKind::Progress,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKind::Clock => "clock",
            WidgetKind::WorldClock => "world-clock",
            WidgetKind::Pomodoro => "pomodoro",
            WidgetKind::Countdown => "countdown",
            WidgetKind::Stopwatch => "stopwatch",
            WidgetKind::Todo => "todo",
            WidgetKind::Priorities => "priorities",
            WidgetKind::Habits => "habits",
            WidgetKind::Notes => "notes",
            WidgetKind::JournalPrompt => "journal-prompt",
            WidgetKind::Affirmation => "affirmation",
            WidgetKind::Quote => "quote",
            WidgetKind::Gratitude => "gratitude",
            WidgetKind::Goals => "goals",
            WidgetKind::WaterTracker => "water-tracker",
            WidgetKind::Streak => "streak",
            WidgetKind::Mood => "mood",
            WidgetKind::Energy => "energy",
            WidgetKind::Breathing => "breathing",
            WidgetKind::Soundscape => "soundscape",
            WidgetKind::Weather => "weather",
            WidgetKind::Links => "links",
            WidgetKind::VisionBoard => "vision-board",
            WidgetKind::Progress => "progress",
        }
    }

    // Exhaustive: a new kind without a default payload does not compile.
    pub fn default_body(self) -> WidgetBody {
        match self {
            WidgetKind::Clock => WidgetBody::Clock(ClockData {
                timezone: "local".into(),
                twenty_four_hour: false,
            }),
            WidgetKind::WorldClock => WidgetBody::WorldClock(ClockData {
                timezone: "UTC".into(),
                twenty_four_hour: true,
            }),
            WidgetKind::Pomodoro => WidgetBody::Pomodoro(TimerData {
                focus_minutes: 25,
                break_minutes: 5,
            }),
            WidgetKind::Countdown => WidgetBody::Countdown(CountdownData {
                label: "Launch".into(),
                target: None,
            }),
            WidgetKind::Stopwatch => WidgetBody::Stopwatch(StopwatchData {
                elapsed_secs: 0,
                running: false,
            }),
            WidgetKind::Todo => WidgetBody::Todo(ChecklistData::default()),
            WidgetKind::Priorities => WidgetBody::Priorities(ChecklistData {
                items: ["", "", ""]
                    .iter()
                    .map(|t| ChecklistItem {
                        text: t.to_string(),
                        done: false,
                    })
                    .collect(),
            }),
            WidgetKind::Habits => WidgetBody::Habits(ChecklistData::default()),
            WidgetKind::Notes => WidgetBody::Notes(NoteData {
                text: String::new(),
            }),
            WidgetKind::JournalPrompt => WidgetBody::JournalPrompt(NoteData {
                text: "What would make today a win?".into(),
            }),
            WidgetKind::Affirmation => WidgetBody::Affirmation(NoteData {
                text: "I ship before I'm ready.".into(),
            }),
            WidgetKind::Quote => WidgetBody::Quote(QuoteData {
                text: "Make something people want.".into(),
                author: "Paul Graham".into(),
            }),
            WidgetKind::Gratitude => WidgetBody::Gratitude(ListData::default()),
            WidgetKind::Goals => WidgetBody::Goals(ListData::default()),
            WidgetKind::WaterTracker => WidgetBody::WaterTracker(CounterData { count: 0, goal: 8 }),
            WidgetKind::Streak => WidgetBody::Streak(CounterData { count: 0, goal: 30 }),
            WidgetKind::Mood => WidgetBody::Mood(ScaleData { value: 3, max: 5 }),
            WidgetKind::Energy => WidgetBody::Energy(ScaleData {
                value: ENERGY_DEFAULT,
                max: ENERGY_MAX,
            }),
            WidgetKind::Breathing => WidgetBody::Breathing(BreathingData {
                inhale_secs: 4,
                hold_secs: 4,
                exhale_secs: 4,
            }),
            WidgetKind::Soundscape => WidgetBody::Soundscape(SoundData {
                track: "rain".into(),
                volume: 50,
            }),
            WidgetKind::Weather => WidgetBody::Weather(LocationData {
                city: "San Francisco".into(),
            }),
            WidgetKind::Links => WidgetBody::Links(LinksData::default()),
            WidgetKind::VisionBoard => WidgetBody::VisionBoard(ImageData::default()),
            WidgetKind::Progress => WidgetBody::Progress(ProgressData {
                label: "MVP".into(),
                percent: 0,
            }),
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = FocusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        WidgetKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| FocusError::UnknownKind(s.to_string()))
    }
}

impl WidgetBody {
    pub fn kind(&self) -> WidgetKind {
        match self {
            WidgetBody::Clock(_) => WidgetKind::Clock,
            WidgetBody::WorldClock(_) => WidgetKind::WorldClock,
            WidgetBody::Pomodoro(_) => WidgetKind::Pomodoro,
            WidgetBody::Countdown(_) => WidgetKind::Countdown,
            WidgetBody::Stopwatch(_) => WidgetKind::Stopwatch,
            WidgetBody::Todo(_) => WidgetKind::Todo,
            WidgetBody::Priorities(_) => WidgetKind::Priorities,
            WidgetBody::Habits(_) => WidgetKind::Habits,
            WidgetBody::Notes(_) => WidgetKind::Notes,
            WidgetBody::JournalPrompt(_) => WidgetKind::JournalPrompt,
            WidgetBody::Affirmation(_) => WidgetKind::Affirmation,
            WidgetBody::Quote(_) => WidgetKind::Quote,
            WidgetBody::Gratitude(_) => WidgetKind::Gratitude,
            WidgetBody::Goals(_) => WidgetKind::Goals,
            WidgetBody::WaterTracker(_) => WidgetKind::WaterTracker,
            WidgetBody::Streak(_) => WidgetKind::Streak,
            WidgetBody::Mood(_) => WidgetKind::Mood,
            WidgetBody::Energy(_) => WidgetKind::Energy,
            WidgetBody::Breathing(_) => WidgetKind::Breathing,
            WidgetBody::Soundscape(_) => WidgetKind::Soundscape,
            WidgetBody::Weather(_) => WidgetKind::Weather,
            WidgetBody::Links(_) => WidgetKind::Links,
            WidgetBody::VisionBoard(_) => WidgetKind::VisionBoard,
            WidgetBody::Progress(_) => WidgetKind::Progress,
        }
    }

    /// Builds a body for `kind` from a raw JSON payload.
    pub fn from_json(kind: WidgetKind, data: serde_json::Value) -> Result<Self, FocusError> {
        let tagged = serde_json::json!({ "type": kind.as_str(), "data": data });
        serde_json::from_value(tagged).map_err(|err| FocusError::InvalidPayload {
            kind,
            reason: err.to_string(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Ritual {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub done: bool,
}

impl Keyed for Ritual {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub focus_minutes: u32,
    pub break_minutes: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        TimerSettings {
            focus_minutes: 25,
            break_minutes: 5,
        }
    }
}

impl TimerSettings {
    pub fn new(focus_minutes: u32, break_minutes: u32) -> Self {
        TimerSettings {
            focus_minutes: focus_minutes.max(1),
            break_minutes: break_minutes.max(1),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FocusError {
    #[error("unknown widget type: {0}")]
    UnknownKind(String),
    #[error("widget {id} is a {actual}, not a {expected}")]
    KindMismatch {
        id: String,
        expected: WidgetKind,
        actual: WidgetKind,
    },
    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: WidgetKind, reason: String },
    #[error("label must not be empty")]
    EmptyLabel,
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

pub fn seed_widgets() -> Widgets {
    Collection::new(
        [WidgetKind::Clock, WidgetKind::Pomodoro, WidgetKind::Priorities]
            .into_iter()
            .map(|kind| Widget {
                id: format!("{}-0", kind),
                body: kind.default_body(),
            })
            .collect(),
    )
}

pub fn seed_rituals() -> Rituals {
    Collection::new(vec![
        ritual("ritual-pages", "Morning pages"),
        ritual("ritual-move", "Move for 20 minutes"),
        ritual("ritual-plan", "Plan tomorrow"),
    ])
}

fn ritual(id: &str, label: &str) -> Ritual {
    Ritual {
        id: id.to_string(),
        label: label.to_string(),
        done: false,
    }
}

/// Appends a widget with its default payload. Ids are `<kind>-<unix millis>`.
pub fn add_widget(widgets: &mut Widgets, kind: WidgetKind) -> Result<String, FocusError> {
    let base = format!("{}-{}", kind, Utc::now().timestamp_millis());
    let id = if widgets.contains(&base) {
        format!("{}-{}", base, generate_id())
    } else {
        base
    };
    widgets.append(Widget {
        id: id.clone(),
        body: kind.default_body(),
    })?;
    Ok(id)
}

/// Replaces a widget's payload; the kind must stay the same.
pub fn set_body(widgets: &mut Widgets, id: &str, body: WidgetBody) -> Result<(), FocusError> {
    let actual = widgets
        .get(id)
        .map(Widget::kind)
        .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
    if actual != body.kind() {
        return Err(FocusError::KindMismatch {
            id: id.to_string(),
            expected: body.kind(),
            actual,
        });
    }
    widgets.update(id, |w| w.body = body)?;
    Ok(())
}

pub fn add_ritual(rituals: &mut Rituals, label: &str) -> Result<String, FocusError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(FocusError::EmptyLabel);
    }
    let new = Ritual {
        id: generate_id(),
        label: label.to_string(),
        done: false,
    };
    let id = new.id.clone();
    rituals.append(new)?;
    Ok(id)
}

pub fn toggle_ritual(rituals: &mut Rituals, id: &str) -> Result<bool, FocusError> {
    let mut done = false;
    rituals.update(id, |r| {
        r.done = !r.done;
        done = r.done;
    })?;
    Ok(done)
}

/// Clears every ritual's done flag. Returns how many were reset.
pub fn reset_rituals(rituals: &mut Rituals) -> usize {
    let mut count = 0;
    rituals.for_each_mut(|r| {
        if r.done {
            r.done = false;
            count += 1;
        }
    });
    count
}

pub fn clamp_energy(level: i64) -> u8 {
    level.clamp(ENERGY_MIN as i64, ENERGY_MAX as i64) as u8
}

/// Pulls a stored energy level back into range. Returns true if it moved.
pub fn repair_energy(level: &mut u8) -> bool {
    let clamped = clamp_energy(i64::from(*level));
    let changed = clamped != *level;
    *level = clamped;
    changed
}

/// Applies the one-minute floor to stored timer settings.
pub fn repair_timer(timer: &mut TimerSettings) -> bool {
    let fixed = TimerSettings::new(timer.focus_minutes, timer.break_minutes);
    let changed = fixed != *timer;
    *timer = fixed;
    changed
}
