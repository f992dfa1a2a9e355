//! Field normalization against platform vocabularies.
//!
//! Resolution misses are never errors: an unknown label or alias is dropped
//! from the outgoing payload so one bad value cannot block a whole batch.

use std::collections::HashMap;

use tracing::warn;

use crate::models::Member;

/// Map a free-text priority to the platform label id configured for it.
/// Case-insensitive; an unmapped priority returns None and the field is
/// omitted downstream.
pub fn resolve_priority_label(
    priority: &str,
    priority_label_map: &HashMap<String, String>,
) -> Option<String> {
    priority_label_map
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(priority))
        .map(|(_, id)| id.clone())
}

/// Map label names to platform label ids, silently dropping unknown labels.
pub fn resolve_labels(labels: &[String], known_labels: &HashMap<String, String>) -> Vec<String> {
    labels
        .iter()
        .filter_map(|label| {
            let resolved = known_labels
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(label))
                .map(|(_, id)| id.clone());
            if resolved.is_none() {
                warn!(label = %label, "unknown label dropped from payload");
            }
            resolved
        })
        .collect()
}

/// Resolve assignee aliases to member ids.
///
/// Two-step resolution: first an exact case-insensitive match against the
/// directory's username or display name, then the configured alias→username
/// indirection followed by a directory lookup. Unresolvable aliases are
/// dropped, not errored.
pub fn resolve_assignees(
    aliases: &[String],
    directory: &[Member],
    alias_map: &HashMap<String, String>,
) -> Vec<String> {
    aliases
        .iter()
        .filter_map(|alias| {
            if let Some(member) = find_member(directory, alias) {
                return Some(member.id.clone());
            }
            if let Some(username) = lookup_alias(alias_map, alias) {
                if let Some(member) = find_member(directory, username) {
                    return Some(member.id.clone());
                }
            }
            warn!(alias = %alias, "unresolvable assignee dropped from payload");
            None
        })
        .collect()
}

fn find_member<'a>(directory: &'a [Member], name: &str) -> Option<&'a Member> {
    directory.iter().find(|member| {
        member.username.eq_ignore_ascii_case(name)
            || member.display_name.eq_ignore_ascii_case(name)
    })
}

fn lookup_alias<'a>(alias_map: &'a HashMap<String, String>, alias: &str) -> Option<&'a str> {
    alias_map
        .iter()
        .find(|(from, _)| from.eq_ignore_ascii_case(alias))
        .map(|(_, to)| to.as_str())
}
