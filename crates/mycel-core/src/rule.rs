use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single transition: a cell holding `from_element` whose 8-neighborhood
/// matches `neighbor_sums` becomes `to_element`.
///
/// `neighbor_sums` has one slot per spreadable element: slot `i` is the
/// required count of neighbors holding element `i + 1`. The derived ordering
/// (`from_element`, then `neighbor_sums` lexicographically, then
/// `to_element`) is the canonical sort used everywhere.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub from_element: u8,
    pub neighbor_sums: Vec<u8>,
    pub to_element: u8,
}

impl Rule {
    pub fn new(from_element: u8, neighbor_sums: Vec<u8>, to_element: u8) -> Self {
        Self {
            from_element,
            neighbor_sums,
            to_element,
        }
    }

    /// Number of per-element count slots in the signature.
    pub fn arity(&self) -> usize {
        self.neighbor_sums.len()
    }

    /// Identity transitions never change a cell and are pruned on
    /// normalization.
    pub fn is_identity(&self) -> bool {
        self.from_element == self.to_element
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},[", self.from_element)?;
        for (i, sum) in self.neighbor_sums.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{sum}")?;
        }
        write!(f, "],{}", self.to_element)
    }
}

/// Ordered rule table for one colony.
///
/// A normalized set holds at most one rule per `(from_element, signature)`
/// pair and no identity transitions. Lookup is a first-match linear scan;
/// tables stay small enough that nothing fancier pays for itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Wrap rules as-is, preserving order. Codec decoding uses this so the
    /// round-trip law holds for arbitrary input order.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Dedup by `(from_element, neighbor_sums)` keeping the first
    /// occurrence, sort ascending, then drop identity rules.
    pub fn normalized(rules: Vec<Rule>) -> Self {
        let mut seen = HashSet::new();
        let mut unique: Vec<Rule> = Vec::with_capacity(rules.len());
        for rule in rules {
            if seen.insert((rule.from_element, rule.neighbor_sums.clone())) {
                unique.push(rule);
            }
        }
        unique.sort();
        unique.retain(|rule| !rule.is_identity());
        Self { rules: unique }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// First rule matching the element and neighbor-count vector, if any.
    /// No match is the normal "no transition" outcome, not an error.
    pub fn find(&self, element: u8, sums: &[u8]) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|rule| rule.from_element == element && rule.neighbor_sums == sums)
    }

    /// Largest signature length present (0 for an empty set).
    pub fn max_arity(&self) -> usize {
        self.rules.iter().map(Rule::arity).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_keeps_first_duplicate_and_sorts() {
        let rules = vec![
            Rule::new(1, vec![2, 0], 0),
            Rule::new(0, vec![3, 1], 2),
            Rule::new(0, vec![3, 1], 1), // duplicate key, later occurrence
            Rule::new(0, vec![1, 0], 2),
        ];
        let set = RuleSet::normalized(rules);
        assert_eq!(
            set.rules(),
            &[
                Rule::new(0, vec![1, 0], 2),
                Rule::new(0, vec![3, 1], 2),
                Rule::new(1, vec![2, 0], 0),
            ]
        );
    }

    #[test]
    fn normalization_prunes_identity_rules() {
        let rules = vec![
            Rule::new(1, vec![4], 1),
            Rule::new(0, vec![2], 1),
            Rule::new(2, vec![1], 2),
        ];
        let set = RuleSet::normalized(rules);
        assert_eq!(set.rules(), &[Rule::new(0, vec![2], 1)]);
    }

    #[test]
    fn find_matches_element_and_signature_exactly() {
        let set = RuleSet::new(vec![
            Rule::new(0, vec![2, 1], 1),
            Rule::new(1, vec![2, 1], 0),
        ]);
        assert_eq!(set.find(1, &[2, 1]), Some(&Rule::new(1, vec![2, 1], 0)));
        assert_eq!(set.find(0, &[2, 0]), None);
        assert_eq!(set.find(0, &[2, 1, 0]), None, "length must match");
    }

    #[test]
    fn display_uses_the_wire_shape() {
        let rule = Rule::new(0, vec![3, 0, 1], 2);
        assert_eq!(rule.to_string(), "0,[3,0,1],2");
    }

    #[test]
    fn derived_order_compares_elementwise_then_length_then_result() {
        let mut rules = vec![
            Rule::new(0, vec![2, 1], 0),
            Rule::new(0, vec![2, 0], 1),
            Rule::new(1, vec![0, 0], 0),
            Rule::new(0, vec![2, 0], 0),
        ];
        rules.sort();
        assert_eq!(
            rules,
            vec![
                Rule::new(0, vec![2, 0], 0),
                Rule::new(0, vec![2, 0], 1),
                Rule::new(0, vec![2, 1], 0),
                Rule::new(1, vec![0, 0], 0),
            ]
        );
    }
}
