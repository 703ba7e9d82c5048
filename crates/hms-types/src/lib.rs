//! # HMS Types
//!
//! Small validated primitives shared by the HMS crates. Each type guarantees its invariant once
//! constructed, so request payloads built from them never need re-checking.

/// Errors that can occur when creating validated primitive types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// A quantity was zero or negative
    #[error("Quantity must be greater than zero (got {0})")]
    NonPositiveQuantity(i64),
    /// A quantity did not fit the dispensable range
    #[error("Quantity must be at most {max} (got {0})", max = Quantity::MAX)]
    QuantityTooLarge(i64),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction. Used for batch
/// numbers and substitution reasons on dispense requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, rejecting empty or whitespace-only input.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
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

impl std::str::FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
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

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A strictly positive item count, as dispensed against stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Largest count a single line can carry.
    pub const MAX: u32 = u32::MAX;

    /// Creates a quantity from a signed count.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::NonPositiveQuantity`] for zero or negative counts and
    /// [`TextError::QuantityTooLarge`] for counts above [`Quantity::MAX`].
    pub fn new(count: i64) -> Result<Self, TextError> {
        if count <= 0 {
            return Err(TextError::NonPositiveQuantity(count));
        }
        u32::try_from(count)
            .map(Self)
            .map_err(|_| TextError::QuantityTooLarge(count))
    }

    /// Whether `count` would be accepted by [`Quantity::new`].
    pub fn is_valid(count: i64) -> bool {
        count > 0 && count <= i64::from(Self::MAX)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl<'de> serde::Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let n = i64::deserialize(deserializer)?;
        Quantity::new(n).map_err(serde::de::Error::custom)
    }
}
