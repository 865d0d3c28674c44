//! Column and table name normalization.
//!
//! Arbitrary event keys are mapped to canonical warehouse identifiers:
//!
//! 1. Split into words on non-alphanumeric runs and camelCase boundaries
//! 2. Lowercase and join with `_`
//! 3. Prefix `_` when the name starts with a digit
//! 4. Escape dialect keywords with a leading `_`
//! 5. Truncate to the dialect's identifier limit
//! 6. Apply the dialect's casing
//!
//! Steps 1-3 are [`to_snake_case`] and are dialect independent. [`Namer`]
//! applies the remaining steps for one destination.

use crate::dialect::{is_rudder_reserved_table, Dialect};

/// Normalize a raw key into lowercase snake_case.
///
/// Digits stay attached to the word they follow, so `address1` stays
/// `address1`. Normalizing an already canonical name returns it unchanged.
pub fn to_snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_numeric()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    let name = words.join("_");
    match name.chars().next() {
        Some(first) if first.is_numeric() => format!("_{name}"),
        _ => name,
    }
}

/// Truncate to at most `max` bytes without splitting a character. A cut that
/// leaves a trailing `_` drops it so the result stays canonical.
fn truncate(mut name: String, max: usize) -> String {
    if name.len() > max {
        let mut end = max;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
        let trimmed = name.trim_end_matches('_').len();
        name.truncate(trimmed);
    }
    name
}

/// Produces identifiers for one destination dialect.
#[derive(Debug, Clone, Copy)]
pub struct Namer<'a> {
    dialect: &'a Dialect,
    skip_escaping: bool,
}

impl<'a> Namer<'a> {
    /// Create a namer. With `skip_escaping` set, neither dialect keywords nor
    /// pipeline-owned table names are prefixed.
    pub fn new(dialect: &'a Dialect, skip_escaping: bool) -> Self {
        Self {
            dialect,
            skip_escaping,
        }
    }

    /// The dialect names are produced for.
    pub fn dialect(&self) -> &'a Dialect {
        self.dialect
    }

    fn escape_keyword(&self, name: String) -> String {
        if !self.skip_escaping && self.dialect.is_reserved_keyword(&name) {
            format!("_{name}")
        } else {
            name
        }
    }

    /// Canonical column name for a raw key. Empty when the key has no
    /// alphanumeric content.
    pub fn column(&self, key: &str) -> String {
        let name = to_snake_case(key);
        if name.is_empty() {
            return name;
        }
        let name = self.escape_keyword(name);
        let name = truncate(name, self.dialect.max_identifier_len);
        self.dialect.apply_case(name)
    }

    /// Normalized table form of an event name, without escaping.
    pub fn table_value(&self, name: &str) -> String {
        let name = truncate(to_snake_case(name), self.dialect.max_identifier_len);
        self.dialect.apply_case(name)
    }

    /// Name of a fixed pipeline table such as `identifies` or `groups`.
    pub fn table(&self, name: &str) -> String {
        let name = to_snake_case(name);
        let name = self.escape_keyword(name);
        let name = truncate(name, self.dialect.max_identifier_len);
        self.dialect.apply_case(name)
    }

    /// Table for a user-named event, escaped away from pipeline-owned tables.
    pub fn event_table(&self, event: &str) -> String {
        let name = self.table(event);
        if !self.skip_escaping && is_rudder_reserved_table(&name) {
            format!("_{name}")
        } else {
            name
        }
    }
}
