//! Normalized keyboard event types

/// Type of keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    /// Key was pressed down
    Press,
    /// Key was released
    Release,
}

/// A normalized keyboard event with a numeric-epoch timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    /// Symbolic key identifier as recorded by the capture collaborator
    /// (e.g. "f", "j", "SPACE")
    pub key: String,
    /// Seconds since the Unix epoch, fractional precision preserved
    pub timestamp: f64,
    /// Press or release
    pub kind: KeyEventKind,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, timestamp: f64, kind: KeyEventKind) -> Self {
        Self {
            key: key.into(),
            timestamp,
            kind,
        }
    }

    pub fn press(key: impl Into<String>, timestamp: f64) -> Self {
        Self::new(key, timestamp, KeyEventKind::Press)
    }

    pub fn release(key: impl Into<String>, timestamp: f64) -> Self {
        Self::new(key, timestamp, KeyEventKind::Release)
    }

    pub fn is_press(&self) -> bool {
        self.kind == KeyEventKind::Press
    }
}
