//! Tag Dictionary
//!
//! Assigns a dense integer id to every tag name, deterministically and
//! totally. Names are sorted lexicographically and ids handed out in order,
//! so building twice from the same input yields identical assignments.
//! Immutable after build; string comparisons stop here and the rest of the
//! engine works on ids.

use crate::error::BuildError;
use std::collections::HashMap;

/// Dense non-negative tag identifier.
pub type TagId = u32;

#[derive(Debug, Clone, Default)]
pub struct TagDictionary {
    /// Tag names indexed by id.
    names: Vec<String>,
    /// Reverse lookup from name to id.
    ids: HashMap<String, TagId>,
}

impl TagDictionary {
    /// Build a dictionary from an arbitrary collection of tag names.
    ///
    /// Duplicates are collapsed. Fails with `LimitExceeded` when the number
    /// of distinct tags is above `max_tags`.
    pub fn build<I, S>(tags: I, max_tags: usize) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = tags.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();

        if names.len() > max_tags {
            return Err(BuildError::LimitExceeded {
                what: "tags",
                actual: names.len() as u64,
                limit: max_tags as u64,
            });
        }

        let ids = names
            .iter()
            .enumerate()
            .map(|(id, name)| (name.clone(), id as TagId))
            .collect();

        Ok(Self { names, ids })
    }

    /// Look up the id for a tag name. Unknown tags are not an error; callers
    /// treat them as "matches nothing".
    pub fn id_of(&self, name: &str) -> Option<TagId> {
        self.ids.get(name).copied()
    }

    /// Look up the name for a tag id. Out-of-range ids are a programmer
    /// error and surface as a typed failure.
    pub fn name_of(&self, id: TagId) -> Result<&str, BuildError> {
        self.names
            .get(id as usize)
            .map(String::as_str)
            .ok_or(BuildError::UnknownTagId(id))
    }

    /// Whether `id` was assigned by this dictionary.
    pub fn contains_id(&self, id: TagId) -> bool {
        (id as usize) < self.names.len()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All tag names in id order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
