//! Validated primitive types shared by the casematch crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Trims `input` and returns `None` when nothing is left.
    ///
    /// Corpus and query fields treat blank text as absent, so this is the common entry point
    /// for optional text.
    pub fn from_optional(input: Option<&str>) -> Option<Self> {
        input.and_then(|s| Self::new(s).ok())
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// A whole-number percentage in `[0, 100]`.
///
/// Construction clamps rather than fails: every percentage leaving the engine is bounded, and
/// an out-of-range input is a rounding artefact rather than a caller error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const MAX: Percent = Percent(100);

    /// Clamp an integer into `[0, 100]`.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// Round `numerator / denominator * 100` to the nearest whole percent.
    ///
    /// Returns `None` when `denominator` is zero so callers pick their own default.
    pub fn from_ratio(numerator: usize, denominator: usize) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let pct = (numerator as f64 / denominator as f64 * 100.0).round();
        Some(Self::clamped(pct as i64))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl serde::Serialize for Percent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}
