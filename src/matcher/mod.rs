//! Pattern matching for encoded Decred addresses.
//!
//! User fragments are regular expressions anchored right after the network's
//! address prefix. Two slots exist:
//! - Primary: a match ends the search
//! - Secondary: a match is reported and the search goes on

mod pattern;

pub use pattern::{Evaluation, Matcher, PatternSet};
