// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Utils to build FRR config files

use std::collections::HashMap;
use std::fmt::Display;
use std::ops::AddAssign;

pub const MARKER: &str = "!";

#[derive(Debug, Default)]
/// Object to ease building FRR configs.
pub struct ConfigBuilder {
    lines: Vec<String>,
}

/// Impl Display for [`ConfigBuilder`]. This provides to_string().
impl Display for ConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for s in &self.lines {
            writeln!(f, "{s}",)?;
        }
        Ok(())
    }
}

/// Main operations on a [`ConfigBuilder`]
impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: Vec::with_capacity(2),
        }
    }
    fn append(&mut self, stanza: &str) {
        match self.lines.last() {
            Some(x) if x == MARKER && stanza == MARKER => {}
            _ => self.lines.push(stanza.to_owned()),
        }
    }
    fn merge(&mut self, other: &mut Self) {
        self.lines.append(&mut other.lines);
        self.dedup();
    }
    fn dedup(&mut self) {
        self.lines.dedup_by(|a, b| a == b && a == MARKER);
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Make it very easy to add config lines to a [`ConfigBuilder`]
impl AddAssign<Self> for ConfigBuilder {
    fn add_assign(&mut self, mut rhs: Self) {
        self.merge(&mut rhs);
    }
}
impl AddAssign<String> for ConfigBuilder {
    fn add_assign(&mut self, rhs: String) {
        self.append(&rhs);
    }
}
impl AddAssign<&str> for ConfigBuilder {
    fn add_assign(&mut self, rhs: &str) {
        self.append(rhs);
    }
}

/// Main trait to build FRR configs
pub(crate) trait Render {
    type Context; /* context passed to renderer */
    type Output; /* type of output produced */
    fn render(&self, ctx: &Self::Context) -> Self::Output;
}

/// Hands out sequence numbers for the entries of prefix lists and route maps. A fresh
/// counter is used on every render so that rendering the same config twice yields
/// the same text.
#[derive(Debug, Default)]
pub struct Counter(HashMap<String, u32>);
impl Counter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// The next sequence number for the object with the given name: 5, 10, 15...
    pub fn next(&mut self, name: &str) -> u32 {
        let seq = self.0.entry(name.to_owned()).or_insert(0);
        *seq += 5;
        *seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_dedups_markers() {
        let mut cfg = ConfigBuilder::new();
        cfg += "router bgp 65000";
        cfg += MARKER;
        let mut other = ConfigBuilder::new();
        other += MARKER;
        other += "exit";
        cfg += other;
        cfg += MARKER;
        cfg += MARKER;
        assert_eq!(cfg.to_string(), "router bgp 65000\n!\nexit\n!\n");
    }

    #[test]
    fn test_counter() {
        let mut counter = Counter::new();
        assert_eq!(counter.next("a"), 5);
        assert_eq!(counter.next("a"), 10);
        assert_eq!(counter.next("b"), 5);
        let mut fresh = Counter::new();
        assert_eq!(fresh.next("a"), 5);
    }
}
