//! Pattern compilation and the two-slot match policy.

use regex::Regex;
use tracing::warn;

use crate::config::ConfigError;
use crate::error::{PatternSlot, SearchError};
use crate::network::NetworkParams;

/// A compiled, immutable pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    fragment: String,
    regex: Regex,
}

impl Matcher {
    /// Compiles `fragment` anchored after `prefix`.
    ///
    /// The fragment is wrapped in a non-capturing group so that a top-level
    /// alternation such as `a|b` stays anchored.
    pub fn new(prefix: &str, fragment: &str) -> Result<Self, regex::Error> {
        let source = format!("^{}(?:{})", regex::escape(prefix), fragment);
        Ok(Self {
            fragment: fragment.to_string(),
            regex: Regex::new(&source)?,
        })
    }

    /// Returns the user-supplied fragment.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Returns the full anchored expression.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    #[inline]
    pub fn is_match(&self, address: &str) -> bool {
        self.regex.is_match(address)
    }
}

/// What the policy decided for one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Secondary pattern matched: report, keep searching
    pub secondary_hit: bool,
    /// Primary pattern matched under the active mode: stop
    pub terminal: bool,
}

/// The primary/secondary matchers plus the mode that combines them.
#[derive(Debug, Clone)]
pub struct PatternSet {
    primary: Option<Matcher>,
    secondary: Option<Matcher>,
    inclusive: bool,
}

impl PatternSet {
    /// Compiles the two pattern slots for `network`.
    ///
    /// Empty fragments leave their slot without a matcher. Inclusive mode
    /// only ever tests primary on addresses that matched secondary, so an
    /// empty secondary would never test anything and is rejected. An
    /// exclusive set with neither slot is rejected for the same reason.
    pub fn compile(
        primary: &str,
        secondary: &str,
        inclusive: bool,
        network: &NetworkParams,
    ) -> Result<Self, SearchError> {
        if secondary.is_empty() {
            if inclusive {
                return Err(ConfigError::SecondaryRequired.into());
            }
            if primary.is_empty() {
                return Err(ConfigError::NoPatterns.into());
            }
        }

        let compile = |fragment: &str, slot: PatternSlot| {
            if fragment.is_empty() {
                return Ok(None);
            }
            Matcher::new(network.address_prefix, fragment)
                .map(Some)
                .map_err(|source| SearchError::PatternCompile { slot, source })
        };

        let secondary = compile(secondary, PatternSlot::Secondary)?;
        let primary = compile(primary, PatternSlot::Primary)?;

        let set = Self {
            primary,
            secondary,
            inclusive,
        };
        if set.is_unbounded() {
            warn!("no primary pattern: the search will only stop when cancelled or out of budget");
        }
        Ok(set)
    }

    pub fn primary(&self) -> Option<&Matcher> {
        self.primary.as_ref()
    }

    pub fn secondary(&self) -> Option<&Matcher> {
        self.secondary.as_ref()
    }

    pub fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    /// True when nothing can end the search except cancellation or a budget.
    pub fn is_unbounded(&self) -> bool {
        self.primary.is_none()
    }

    /// Applies the match policy to one encoded address.
    ///
    /// Inclusive mode assumes every primary match is also a secondary match
    /// and tests primary only after a secondary hit, so an address matching
    /// primary alone is never terminal. Exclusive mode tests both slots
    /// independently.
    #[inline]
    pub fn evaluate(&self, address: &str) -> Evaluation {
        let secondary_hit = slot_matches(&self.secondary, address);

        let terminal = if self.inclusive {
            secondary_hit && slot_matches(&self.primary, address)
        } else {
            slot_matches(&self.primary, address)
        };

        Evaluation {
            secondary_hit,
            terminal,
        }
    }
}

#[inline]
fn slot_matches(slot: &Option<Matcher>, address: &str) -> bool {
    slot.as_ref().is_some_and(|m| m.is_match(address))
}
