use crate::backend::SoundBackend;
use crate::error::BackendError;
use std::fmt;

/// Chromatic note names, indexed by `key % 12`
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    pub fn from_key(key: u8) -> Self {
        Self::ALL[usize::from(key % 12)]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        NOTE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| Self::ALL[i])
    }

    /// Semitone offset from C
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self as usize]
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a note starts or stops sounding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    On,
    Off,
}

impl NoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteKind::On => "ON",
            NoteKind::Off => "OFF",
        }
    }

    /// Sends this transition to a backend
    pub fn apply<B: SoundBackend + ?Sized>(
        self,
        backend: &mut B,
        channel: u8,
        pitch: &str,
        velocity: u8,
    ) -> Result<(), BackendError> {
        match self {
            NoteKind::On => backend.note_on(channel, pitch, velocity),
            NoteKind::Off => backend.note_off(channel, pitch, velocity),
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single note transition read from a MIDI track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEvent {
    kind: NoteKind,
    pitch_class: PitchClass,
    octave: i8,
    key: u8,
    velocity: u8,
    channel: u8,
    instrument: String,
}

impl NoteEvent {
    pub fn new(
        kind: NoteKind,
        key: u8,
        velocity: u8,
        channel: u8,
        instrument: impl Into<String>,
    ) -> Self {
        let key = key & 0x7F;
        Self {
            kind,
            pitch_class: PitchClass::from_key(key),
            // key <= 127 so this always fits
            octave: (key / 12) as i8 - 1,
            key,
            velocity: velocity & 0x7F,
            channel,
            instrument: instrument.into(),
        }
    }

    pub fn kind(&self) -> NoteKind {
        self.kind
    }

    pub fn pitch_class(&self) -> PitchClass {
        self.pitch_class
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn key(&self) -> u8 {
        self.key
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Renders as `<octave><pitch class>`, e.g. `4C#`
    pub fn printable(&self) -> String {
        format!("{}{}", self.octave, self.pitch_class)
    }

    pub fn apply<B: SoundBackend + ?Sized>(&self, backend: &mut B) -> Result<(), BackendError> {
        self.kind
            .apply(backend, self.channel, &self.printable(), self.velocity)
    }
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ch={} vel={} [{}]",
            self.kind,
            self.printable(),
            self.channel,
            self.velocity,
            self.instrument
        )
    }
}

/// Inverse of [`NoteEvent::printable`]: `"4C"` -> 60.
pub fn key_from_printable(pitch: &str) -> Option<u8> {
    let split = pitch.find(|c: char| c.is_ascii_alphabetic())?;
    let (octave, name) = pitch.split_at(split);
    let octave: i16 = octave.parse().ok()?;
    let class = PitchClass::from_name(name)?;
    let key = i16::from(class.index()) + 12 * (octave + 1);
    u8::try_from(key).ok().filter(|k| *k <= 127)
}
