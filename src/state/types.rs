//! Presentation state type definitions
//!
//! Defines the shared document every connected client renders from, the
//! partial documents used to update it, and the navigation directions.

use serde::{Deserialize, Deserializer, Serialize};

/// Default display font size (pixels)
pub const DEFAULT_FONT_SIZE: u32 = 48;

/// Default display theme
pub const DEFAULT_THEME: &str = "dark";

/// Which panel the display surface renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Idle welcome screen
    #[default]
    Welcome,
    /// Scripture passage
    Bible,
    /// Song lyrics slide
    Lyrics,
    /// Service program / agenda
    Program,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Welcome => write!(f, "welcome"),
            Mode::Bible => write!(f, "bible"),
            Mode::Lyrics => write!(f, "lyrics"),
            Mode::Program => write!(f, "program"),
        }
    }
}

/// Scripture passage currently on screen
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BibleSlide {
    pub book: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub chapter: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub verse: String,
    pub text: String,
}

/// Song lyrics split into slides
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Lyrics {
    pub title: String,
    pub current_slide: usize,
    pub slides: Vec<String>,
}

/// Service program with a highlighted entry
///
/// Event descriptors are relayed verbatim; only the control pages interpret them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Program {
    pub current_index: usize,
    pub events: Vec<serde_json::Value>,
}

/// Display settings, orthogonal to the mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplaySettings {
    pub font_size: u32,
    pub theme: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

/// Partial display settings; absent fields are left untouched
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl DisplayPatch {
    fn apply_to(self, display: &mut DisplaySettings) {
        if let Some(font_size) = self.font_size {
            display.font_size = font_size;
        }
        if let Some(theme) = self.theme {
            display.theme = theme;
        }
    }
}

/// Partial presentation state for top-level shallow merges
///
/// Present fields replace the whole sub-document, except `display`, which is
/// merged field by field like `update-display`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bible: Option<BibleSlide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<Lyrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<Program>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayPatch>,
}

/// Relative navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Next,
    Prev,
}

/// Navigation request: `"next"`, `"prev"` or an absolute index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Direction {
    Step(Step),
    /// Absolute position, accepted without a bounds check
    Index(usize),
}

impl Direction {
    pub const NEXT: Direction = Direction::Step(Step::Next);
    pub const PREV: Direction = Direction::Step(Step::Prev);

    /// Move `cursor` over a list of `len` items.
    ///
    /// Steps clamp at both ends and never wrap; an absolute index is taken as is.
    pub fn apply(self, cursor: &mut usize, len: usize) {
        match self {
            Direction::Step(Step::Next) => {
                if cursor.saturating_add(1) < len {
                    *cursor += 1;
                }
            }
            Direction::Step(Step::Prev) => {
                if *cursor > 0 {
                    *cursor -= 1;
                }
            }
            Direction::Index(index) => *cursor = index,
        }
    }
}

/// A single mutation of the presentation state
#[derive(Debug, Clone, PartialEq)]
pub enum StateMutation {
    /// Shallow-merge top-level fields
    Merge(StatePatch),
    /// Show a scripture passage
    SetBible(BibleSlide),
    /// Show song lyrics
    SetLyrics(Lyrics),
    /// Show the service program
    SetProgram(Program),
    /// Move through the lyrics slides
    NavigateLyrics(Direction),
    /// Move through the program events
    NavigateProgram(Direction),
    /// Merge display settings only
    SetDisplay(DisplayPatch),
    /// Switch panel, keeping payloads
    SetMode(Mode),
    /// Back to the welcome screen, keeping payloads
    Clear,
}

impl StateMutation {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            StateMutation::Merge(_) => "merge",
            StateMutation::SetBible(_) => "set-bible",
            StateMutation::SetLyrics(_) => "set-lyrics",
            StateMutation::SetProgram(_) => "set-program",
            StateMutation::NavigateLyrics(_) => "navigate-lyrics",
            StateMutation::NavigateProgram(_) => "navigate-program",
            StateMutation::SetDisplay(_) => "set-display",
            StateMutation::SetMode(_) => "set-mode",
            StateMutation::Clear => "clear",
        }
    }
}

/// The document shown on every display
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PresentationState {
    pub mode: Mode,
    pub bible: BibleSlide,
    pub lyrics: Lyrics,
    pub program: Program,
    pub display: DisplaySettings,
}

impl PresentationState {
    /// Apply one mutation in place
    pub fn apply(&mut self, mutation: StateMutation) {
        match mutation {
            StateMutation::Merge(patch) => self.merge(patch),
            StateMutation::SetBible(bible) => {
                self.mode = Mode::Bible;
                self.bible = bible;
            }
            StateMutation::SetLyrics(lyrics) => {
                self.mode = Mode::Lyrics;
                self.lyrics = lyrics;
            }
            StateMutation::SetProgram(program) => {
                self.mode = Mode::Program;
                self.program = program;
            }
            StateMutation::NavigateLyrics(direction) => {
                let len = self.lyrics.slides.len();
                direction.apply(&mut self.lyrics.current_slide, len);
            }
            StateMutation::NavigateProgram(direction) => {
                let len = self.program.events.len();
                direction.apply(&mut self.program.current_index, len);
            }
            StateMutation::SetDisplay(patch) => patch.apply_to(&mut self.display),
            StateMutation::SetMode(mode) => self.mode = mode,
            StateMutation::Clear => self.mode = Mode::Welcome,
        }
    }

    fn merge(&mut self, patch: StatePatch) {
        let StatePatch {
            mode,
            bible,
            lyrics,
            program,
            display,
        } = patch;

        if let Some(mode) = mode {
            self.mode = mode;
        }
        if let Some(bible) = bible {
            self.bible = bible;
        }
        if let Some(lyrics) = lyrics {
            self.lyrics = lyrics;
        }
        if let Some(program) = program {
            self.program = program;
        }
        if let Some(display) = display {
            display.apply_to(&mut self.display);
        }
    }
}

/// Accept either a JSON string or a JSON number for reference fields
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
