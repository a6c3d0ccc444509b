use std::fmt;

/// Stable external identifier of a card.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardId(pub String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        CardId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        CardId(id.to_string())
    }
}

/// Opaque reference to the card's payload in the renderer's store.
///
/// The engine carries it through untouched and never inspects it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadRef(pub String);

impl PayloadRef {
    pub fn new(reference: impl Into<String>) -> Self {
        PayloadRef(reference.into())
    }
}

/// An immutable tagged record.
///
/// Tags are plain names here; the registry build maps them to dense ids.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub tags: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub payload: PayloadRef,
}

impl Card {
    pub fn new<I, S>(id: impl Into<CardId>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Card {
            id: id.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            payload: PayloadRef::default(),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<PayloadRef>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        CardId(id)
    }
}

impl From<String> for PayloadRef {
    fn from(reference: String) -> Self {
        PayloadRef(reference)
    }
}

impl From<&str> for PayloadRef {
    fn from(reference: &str) -> Self {
        PayloadRef(reference.to_string())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [{}]", self.id, self.tags.join(", "))
    }
}
