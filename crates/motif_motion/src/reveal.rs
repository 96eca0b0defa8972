//! Text reveal effects
//!
//! Three frame-driven text treatments:
//!
//! - [`TextReveal`] uncovers a string unit by unit (letters or words) at a
//!   fixed cadence
//! - [`Typewriter`] types characters one at a time behind a cursor that
//!   lingers briefly after the last character
//! - [`TextScramble`] resolves a string out of random glyph noise, locking
//!   characters left to right as the run progresses
//!
//! All three honor the motion gate: under reduced motion a start produces the
//! finished text immediately.

use motif_core::MotionGate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Granularity of a [`TextReveal`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevealMode {
    #[default]
    Letter,
    Word,
}

enum RevealPhase {
    Idle,
    Running { elapsed_ms: f32 },
    Complete,
}

/// Unit-by-unit text reveal
pub struct TextReveal {
    gate: MotionGate,
    units: Vec<String>,
    mode: RevealMode,
    /// Delay before the first unit appears
    delay_ms: f32,
    /// Interval between consecutive units
    unit_delay_ms: f32,
    revealed: usize,
    phase: RevealPhase,
}

impl TextReveal {
    pub fn new(gate: MotionGate, text: &str, mode: RevealMode) -> Self {
        let units = match mode {
            RevealMode::Letter => text.chars().map(String::from).collect(),
            RevealMode::Word => text.split_whitespace().map(str::to_string).collect(),
        };
        Self {
            gate,
            units,
            mode,
            delay_ms: 0.0,
            unit_delay_ms: 50.0,
            revealed: 0,
            phase: RevealPhase::Idle,
        }
    }

    pub fn with_timing(mut self, delay_ms: f32, unit_delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self.unit_delay_ms = unit_delay_ms;
        self
    }

    /// Begin the reveal; idempotent while running
    pub fn start(&mut self) {
        if matches!(self.phase, RevealPhase::Running { .. }) {
            return;
        }

        if self.gate.prefers_reduced() {
            self.revealed = self.units.len();
            self.phase = RevealPhase::Complete;
            return;
        }

        self.revealed = 0;
        self.phase = RevealPhase::Running { elapsed_ms: 0.0 };
    }

    /// Advance by `dt_ms`; a large delta may reveal several units at once
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        let elapsed = match &mut self.phase {
            RevealPhase::Running { elapsed_ms } => {
                *elapsed_ms += dt_ms;
                *elapsed_ms
            }
            _ => return false,
        };

        let due = if self.unit_delay_ms <= 0.0 {
            self.units.len()
        } else {
            (((elapsed - self.delay_ms) / self.unit_delay_ms).floor().max(0.0)) as usize
        };
        // Monotonic: never un-reveal
        self.revealed = self.revealed.max(due.min(self.units.len()));

        if self.revealed == self.units.len() {
            self.phase = RevealPhase::Complete;
            return false;
        }
        true
    }

    /// Number of units currently revealed
    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    /// The revealed portion of the text
    pub fn revealed_text(&self) -> String {
        let separator = match self.mode {
            RevealMode::Letter => "",
            RevealMode::Word => " ",
        };
        self.units[..self.revealed].join(separator)
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, RevealPhase::Complete)
    }
}

const CURSOR: char = '|';
const CURSOR_LINGER_MS: f32 = 1000.0;

enum TypewriterPhase {
    Idle,
    Typing { elapsed_ms: f32 },
    /// All characters shown; the cursor lingers before hiding
    Lingering { remaining_ms: f32 },
    Done,
}

/// Character-by-character typewriter
pub struct Typewriter {
    gate: MotionGate,
    chars: Vec<char>,
    delay_ms: f32,
    char_delay_ms: f32,
    cursor: bool,
    revealed: usize,
    phase: TypewriterPhase,
}

impl Typewriter {
    pub fn new(gate: MotionGate, text: &str) -> Self {
        Self {
            gate,
            chars: text.chars().collect(),
            delay_ms: 0.0,
            char_delay_ms: 100.0,
            cursor: true,
            revealed: 0,
            phase: TypewriterPhase::Idle,
        }
    }

    /// Delay before the first character appears
    pub fn with_delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_char_delay(mut self, char_delay_ms: f32) -> Self {
        self.char_delay_ms = char_delay_ms;
        self
    }

    /// Disable the trailing cursor glyph
    pub fn with_cursor(mut self, cursor: bool) -> Self {
        self.cursor = cursor;
        self
    }

    /// Begin typing; idempotent while active
    pub fn start(&mut self) {
        if matches!(
            self.phase,
            TypewriterPhase::Typing { .. } | TypewriterPhase::Lingering { .. }
        ) {
            return;
        }

        if self.gate.prefers_reduced() {
            self.revealed = self.chars.len();
            self.phase = TypewriterPhase::Done;
            return;
        }

        self.revealed = 0;
        self.phase = TypewriterPhase::Typing { elapsed_ms: 0.0 };
    }

    /// Advance by `dt_ms`
    ///
    /// Keeps returning `true` through the cursor linger so hosts repaint the
    /// cursor removal.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        match &mut self.phase {
            TypewriterPhase::Typing { elapsed_ms } => {
                *elapsed_ms += dt_ms;
                let typing_ms = (*elapsed_ms - self.delay_ms).max(0.0);
                let due = if self.char_delay_ms <= 0.0 {
                    self.chars.len()
                } else {
                    (typing_ms / self.char_delay_ms).floor() as usize
                };
                self.revealed = due.min(self.chars.len());
                if self.revealed == self.chars.len() {
                    if !self.cursor {
                        self.phase = TypewriterPhase::Done;
                        return false;
                    }
                    self.phase = TypewriterPhase::Lingering {
                        remaining_ms: CURSOR_LINGER_MS,
                    };
                }
                true
            }
            TypewriterPhase::Lingering { remaining_ms } => {
                *remaining_ms -= dt_ms;
                if *remaining_ms <= 0.0 {
                    self.phase = TypewriterPhase::Done;
                    return false;
                }
                true
            }
            _ => false,
        }
    }

    /// The text the host should render, cursor included
    pub fn displayed(&self) -> String {
        let mut out: String = self.chars[..self.revealed].iter().collect();
        if self.cursor_visible() {
            out.push(CURSOR);
        }
        out
    }

    pub fn is_complete(&self) -> bool {
        self.revealed == self.chars.len()
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor
            && matches!(
                self.phase,
                TypewriterPhase::Typing { .. } | TypewriterPhase::Lingering { .. }
            )
    }
}

const SCRAMBLE_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";

enum ScramblePhase {
    Idle,
    Running { elapsed_ms: f32 },
    Complete,
}

/// Scramble-in text effect
///
/// Each character locks to its final glyph once overall progress passes the
/// character's position in the string; before that it shows random charset
/// noise, resampled every frame. Whitespace is never scrambled.
pub struct TextScramble {
    gate: MotionGate,
    chars: Vec<char>,
    delay_ms: f32,
    duration_ms: f32,
    charset: Vec<char>,
    rng: StdRng,
    current: Vec<char>,
    phase: ScramblePhase,
}

impl TextScramble {
    pub fn new(gate: MotionGate, text: &str) -> Self {
        Self::with_rng_seed(gate, text, rand::random())
    }

    /// Construct with a fixed glyph-noise seed, for reproducible output
    pub fn with_rng_seed(gate: MotionGate, text: &str, seed: u64) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Self {
            gate,
            current: chars.clone(),
            chars,
            delay_ms: 0.0,
            duration_ms: 2000.0,
            charset: SCRAMBLE_CHARSET.chars().collect(),
            rng: StdRng::seed_from_u64(seed),
            phase: ScramblePhase::Idle,
        }
    }

    /// Delay before the run's progress starts counting
    pub fn with_delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_duration(mut self, duration_ms: f32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Replace the glyph-noise character set
    ///
    /// An empty charset disables noise; unresolved characters render as
    /// their true value.
    pub fn with_charset(mut self, charset: &str) -> Self {
        self.charset = charset.chars().collect();
        self
    }

    /// Begin the scramble; idempotent while running
    pub fn start(&mut self) {
        if matches!(self.phase, ScramblePhase::Running { .. }) {
            return;
        }

        if self.gate.prefers_reduced() || self.chars.is_empty() {
            self.current = self.chars.clone();
            self.phase = ScramblePhase::Complete;
            return;
        }

        self.phase = ScramblePhase::Running { elapsed_ms: 0.0 };
        self.resample(0.0);
    }

    /// Advance by `dt_ms`
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        let elapsed = match &mut self.phase {
            ScramblePhase::Running { elapsed_ms } => {
                *elapsed_ms += dt_ms;
                *elapsed_ms
            }
            _ => return false,
        };

        let active_ms = (elapsed - self.delay_ms).max(0.0);
        let progress = if self.duration_ms <= 0.0 {
            1.0
        } else {
            (active_ms / self.duration_ms).min(1.0)
        };

        if progress >= 1.0 {
            self.current = self.chars.clone();
            self.phase = ScramblePhase::Complete;
            return false;
        }

        self.resample(progress);
        true
    }

    fn resample(&mut self, progress: f32) {
        let total = self.chars.len() as f32;
        for (index, &ch) in self.chars.iter().enumerate() {
            if ch.is_whitespace() {
                self.current[index] = ch;
                continue;
            }
            let threshold = index as f32 / total;
            self.current[index] = if progress > threshold || self.charset.is_empty() {
                ch
            } else {
                self.charset[self.rng.gen_range(0..self.charset.len())]
            };
        }
    }

    /// The text the host should render this frame
    pub fn output(&self) -> String {
        self.current.iter().collect()
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, ScramblePhase::Complete)
    }
}
