//! Canonical fixed-form codec for two-element (alive/dead) automata.
//!
//! A complete table has one entry per `(from ∈ {0,1}, neighbor sum ∈ 1..=8)`
//! pair, so a 16-bit integer is bijective with it. Bit `from*8 + (sum-1)`
//! stores a *change* flag: for the empty bank a set bit means the cell
//! grows to element 1, for the live bank a set bit means the cell dies back
//! to element 0. Cleared bits are stand-still entries (empty stays empty,
//! alive stays alive), which is exactly what minimization prunes — so the
//! reconstruction in [`index_from_rule_set`] starts from an all-zero word
//! and the round trip `index_from_rule_set(rule_set_from_index(n)) == n`
//! holds for every `n`.

use std::error::Error;
use std::fmt;

use crate::rule::{Rule, RuleSet};

/// One past the largest canonical table index.
pub const INDEX_SPACE: u32 = 1 << 16;

/// One past the largest expanding-variant index.
pub const EXPANDING_INDEX_SPACE: u32 = 3 * 4096;

/// Table bits for the guaranteed outward-growth entries `(0,[3])` and
/// `(0,[4])`, always forced on by the expanding variant.
const FORCED_GROWTH_BITS: u16 = (1 << 2) | (1 << 3);

/// Low-bit patterns for the growth selector: which of `(0,[1])` / `(0,[2])`
/// the selector turns on.
const SELECTOR_BITS: [u16; 3] = [0b10, 0b01, 0b11];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    IndexOutOfRange { max: u32, actual: u32 },
    /// The table does not carry the expansion guarantee.
    InvalidRuleTable,
    MalformedBinary,
}

impl fmt::Display for CanonicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalError::IndexOutOfRange { max, actual } => {
                write!(f, "index {actual} must be between 0 and {}", max - 1)
            }
            CanonicalError::InvalidRuleTable => write!(f, "Invalid rule table"),
            CanonicalError::MalformedBinary => {
                write!(f, "binary id must be exactly 16 binary digits")
            }
        }
    }
}

impl Error for CanonicalError {}

/// Expand a 16-bit table index into its minimized rule set.
pub fn rule_set_from_index(index: u16) -> RuleSet {
    let mut rules = Vec::with_capacity(16);
    for from in 0..2u8 {
        for sum in 1..=8u8 {
            let bit = ((index >> (from * 8 + sum - 1)) & 1) as u8;
            // A set bit flips the cell: the live bank reads inverted.
            rules.push(Rule::new(from, vec![sum], bit ^ from));
        }
    }
    RuleSet::normalized(rules)
}

/// Rebuild the table index from a (possibly minimized) rule set. Entries
/// absent from the set take the stand-still defaults: empty cells stay
/// empty, live cells stay live. Rules outside the canonical two-element,
/// single-sum domain are ignored.
pub fn index_from_rule_set(rule_set: &RuleSet) -> u16 {
    let mut index: u16 = 0;
    for rule in rule_set {
        let &[sum] = rule.neighbor_sums.as_slice() else {
            continue;
        };
        if rule.from_element > 1 || rule.to_element > 1 || !(1..=8).contains(&sum) {
            continue;
        }
        let position = u16::from(rule.from_element) * 8 + u16::from(sum) - 1;
        if rule.to_element ^ rule.from_element == 1 {
            index |= 1 << position;
        } else {
            index &= !(1 << position);
        }
    }
    index
}

/// Expand a constrained index in `[0, 3*4096)` into a table guaranteed to
/// contain at least one outward-growth transition. The index splits into a
/// growth selector (choosing which of the `(0,[1])`/`(0,[2])` entries are
/// forced on alongside the always-on `(0,[3])`/`(0,[4])`) and a free
/// 12-bit remainder filling the rest of the table.
pub fn rule_set_from_expanding_index(index: u32) -> Result<RuleSet, CanonicalError> {
    if index >= EXPANDING_INDEX_SPACE {
        return Err(CanonicalError::IndexOutOfRange {
            max: EXPANDING_INDEX_SPACE,
            actual: index,
        });
    }
    let selector = SELECTOR_BITS[(index / 4096) as usize];
    let free = (index % 4096) as u16;
    Ok(rule_set_from_index(
        selector | FORCED_GROWTH_BITS | (free << 4),
    ))
}

/// Inverse of [`rule_set_from_expanding_index`]. Fails unless the table
/// keeps the forced growth entries and a valid selector combination.
pub fn expanding_index_from_rule_set(rule_set: &RuleSet) -> Result<u32, CanonicalError> {
    let table = index_from_rule_set(rule_set);
    if table & FORCED_GROWTH_BITS != FORCED_GROWTH_BITS {
        return Err(CanonicalError::InvalidRuleTable);
    }
    let selector = match table & 0b11 {
        0b10 => 0u32,
        0b01 => 1,
        0b11 => 2,
        _ => return Err(CanonicalError::InvalidRuleTable),
    };
    Ok(selector * 4096 + u32::from(table >> 4))
}

/// Render a canonical index as its 16-character binary genome string.
pub fn to_binary16(index: u16) -> String {
    format!("{index:016b}")
}

/// Parse a genome string: exactly 16 binary digits, interior whitespace
/// (the display-formatted variant) allowed.
pub fn parse_binary16(text: &str) -> Result<u16, CanonicalError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() != 16 || !compact.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(CanonicalError::MalformedBinary);
    }
    u16::from_str_radix(&compact, 2).map_err(|_| CanonicalError::MalformedBinary)
}
