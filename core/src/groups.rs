//! Tag groups
//!
//! Named bundles of tags, expanded at drop time. Groups may contain other
//! groups but must stay a DAG: cycle detection runs on every membership
//! insert, and a depth cap bounds expansion.

use crate::error::DispatchError;
use crate::tags::TagId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupMember {
    Tag(TagId),
    Group(String),
}

#[derive(Debug, Clone, Default)]
struct TagGroup {
    members: Vec<GroupMember>,
}

#[derive(Debug, Clone)]
pub struct GroupStore {
    groups: HashMap<String, TagGroup>,
    max_depth: usize,
    max_size: usize,
}

impl GroupStore {
    pub fn new(max_depth: usize, max_size: usize) -> Self {
        Self {
            groups: HashMap::new(),
            max_depth,
            max_size,
        }
    }

    /// Create an empty group. Idempotent.
    pub fn define(&mut self, name: impl Into<String>) {
        self.groups.entry(name.into()).or_default();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Add a tag to a group. Returns `false` when the tag was already a
    /// member; membership is a set even though order is kept for display.
    pub fn add_tag(&mut self, group: &str, tag: TagId) -> Result<bool, DispatchError> {
        self.check_size(group)?;
        let entry = self.group_mut(group)?;
        if entry.members.contains(&GroupMember::Tag(tag)) {
            return Ok(false);
        }
        entry.members.push(GroupMember::Tag(tag));
        Ok(true)
    }

    /// Nest `child` inside `parent`. Rejected when either group is unknown
    /// or when the edge would close a cycle.
    pub fn add_group_member(&mut self, parent: &str, child: &str) -> Result<bool, DispatchError> {
        if !self.contains(child) {
            return Err(unknown_group(child));
        }
        self.check_size(parent)?;
        if parent == child || self.reaches(child, parent) {
            return Err(DispatchError::CycleDetected {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        let entry = self.group_mut(parent)?;
        let member = GroupMember::Group(child.to_string());
        if entry.members.contains(&member) {
            return Ok(false);
        }
        entry.members.push(member);
        Ok(true)
    }

    /// Remove a tag from a group. Exact inverse of `add_tag`.
    pub fn remove_tag(&mut self, group: &str, tag: TagId) -> Result<bool, DispatchError> {
        let entry = self.group_mut(group)?;
        let before = entry.members.len();
        entry.members.retain(|m| *m != GroupMember::Tag(tag));
        Ok(entry.members.len() < before)
    }

    pub fn remove_group_member(&mut self, parent: &str, child: &str) -> Result<bool, DispatchError> {
        let entry = self.group_mut(parent)?;
        let member = GroupMember::Group(child.to_string());
        let before = entry.members.len();
        entry.members.retain(|m| *m != member);
        Ok(entry.members.len() < before)
    }

    /// Flatten a group to its tag ids, depth first, keeping first-occurrence
    /// order and dropping duplicates. Nesting deeper than the depth cap is
    /// rejected.
    pub fn expand(&self, name: &str) -> Result<Vec<TagId>, DispatchError> {
        if !self.contains(name) {
            return Err(unknown_group(name));
        }
        let mut seen = HashSet::new();
        let mut tags = Vec::new();
        self.expand_into(name, 0, &mut seen, &mut tags)?;
        Ok(tags)
    }

    fn expand_into(
        &self,
        name: &str,
        depth: usize,
        seen: &mut HashSet<TagId>,
        tags: &mut Vec<TagId>,
    ) -> Result<(), DispatchError> {
        if depth >= self.max_depth {
            return Err(DispatchError::CapacityExceeded {
                what: "group nesting depth",
                limit: self.max_depth,
            });
        }
        let group = self.groups.get(name).ok_or_else(|| unknown_group(name))?;
        for member in &group.members {
            match member {
                GroupMember::Tag(tag) => {
                    if seen.insert(*tag) {
                        tags.push(*tag);
                    }
                }
                GroupMember::Group(child) => {
                    self.expand_into(child, depth + 1, seen, tags)?;
                }
            }
        }
        Ok(())
    }

    /// Whether `to` is reachable from `from` through group membership.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut stack = vec![from];
        let mut visited = HashSet::new();
        while let Some(name) = stack.pop() {
            if name == to {
                return true;
            }
            if !visited.insert(name.to_string()) {
                continue;
            }
            if let Some(group) = self.groups.get(name) {
                for member in &group.members {
                    if let GroupMember::Group(child) = member {
                        stack.push(child);
                    }
                }
            }
        }
        false
    }

    fn check_size(&self, group: &str) -> Result<(), DispatchError> {
        if let Some(entry) = self.groups.get(group) {
            if entry.members.len() >= self.max_size {
                return Err(DispatchError::CapacityExceeded {
                    what: "group size",
                    limit: self.max_size,
                });
            }
        }
        Ok(())
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut TagGroup, DispatchError> {
        self.groups.get_mut(name).ok_or_else(|| unknown_group(name))
    }
}

fn unknown_group(name: &str) -> DispatchError {
    DispatchError::UnknownEntity {
        kind: "group",
        reference: name.to_string(),
    }
}
