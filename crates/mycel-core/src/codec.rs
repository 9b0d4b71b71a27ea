//! Compact textual encoding for rule sets of arbitrary signature arity.
//!
//! Every rule packs into one base-9 positional integer; the per-rule
//! integers concatenate into a single arbitrary-precision value at a fixed
//! bit width, serialized as `"{arity}:{rule_count}:{base36 payload}"`. The
//! encoding is the only persisted/shared representation of a general rule
//! set, and `decode(encode(set)) == set` holds for any arity-homogeneous
//! set, order included.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use std::error::Error;
use std::fmt;

use crate::rule::{Rule, RuleSet};

/// Wire sentinel for the empty rule set.
pub const EMPTY_RULE_SET_ID: &str = "0:0:0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Encoding requires every rule to share one signature length.
    ArityMismatch { expected: usize, actual: usize },
    /// The input is not a well-formed `"n:count:payload"` id.
    MalformedId { reason: &'static str },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::ArityMismatch { expected, actual } => write!(
                f,
                "all rules must share the same signature length ({expected} != {actual})"
            ),
            CodecError::MalformedId { reason } => write!(f, "invalid rule set id: {reason}"),
        }
    }
}

impl Error for CodecError {}

/// Bits needed for one packed rule index: `ceil(log2((n+1)^2 * 9^n))`.
fn chunk_width(arity: usize) -> usize {
    let total = BigUint::from((arity + 1) * (arity + 1)) * BigUint::from(9u32).pow(arity as u32);
    if total <= BigUint::one() {
        0
    } else {
        (total - 1u32).bits() as usize
    }
}

/// Fold one rule into its positional index:
/// `from * 9^n * (n+1) + base9(sums) * (n+1) + to`.
fn rule_index(rule: &Rule, arity: usize) -> BigUint {
    let mut sums_value = BigUint::zero();
    for &sum in &rule.neighbor_sums {
        sums_value = sums_value * 9u32 + sum;
    }
    let nine_pow = BigUint::from(9u32).pow(arity as u32);
    BigUint::from(rule.from_element) * nine_pow * (arity as u32 + 1)
        + sums_value * (arity as u32 + 1)
        + rule.to_element
}

/// Pack a rule set into its compact `"{n}:{count}:{base36}"` form. The
/// first rule lands in the most significant chunk.
pub fn encode(rule_set: &RuleSet) -> Result<String, CodecError> {
    if rule_set.is_empty() {
        return Ok(EMPTY_RULE_SET_ID.to_owned());
    }
    let arity = rule_set.rules()[0].arity();
    for rule in rule_set {
        if rule.arity() != arity {
            return Err(CodecError::ArityMismatch {
                expected: arity,
                actual: rule.arity(),
            });
        }
    }

    let width = chunk_width(arity);
    let mut packed = BigUint::zero();
    for rule in rule_set {
        packed = (packed << width) | rule_index(rule, arity);
    }
    Ok(format!(
        "{}:{}:{}",
        arity,
        rule_set.len(),
        packed.to_str_radix(36)
    ))
}

/// Invert [`encode`]: parse the three colon-delimited fields and unpack
/// the payload chunk by chunk, most significant (first) rule last to be
/// masked off.
pub fn decode(id: &str) -> Result<RuleSet, CodecError> {
    let parts: Vec<&str> = id.split(':').collect();
    if parts.len() != 3 {
        return Err(CodecError::MalformedId {
            reason: "expected three ':'-separated fields",
        });
    }
    let arity: usize = parts[0].parse().map_err(|_| CodecError::MalformedId {
        reason: "signature length is not a number",
    })?;
    let count: usize = parts[1].parse().map_err(|_| CodecError::MalformedId {
        reason: "rule count is not a number",
    })?;
    let payload = parts[2].to_ascii_lowercase();
    let mut packed =
        BigUint::parse_bytes(payload.as_bytes(), 36).ok_or(CodecError::MalformedId {
            reason: "payload is not base-36",
        })?;

    let width = chunk_width(arity);
    let mask = (BigUint::one() << width) - 1u32;
    let mut indices = Vec::with_capacity(count);
    for _ in 0..count {
        indices.push(&packed & &mask);
        packed >>= width;
    }
    indices.reverse();

    let group = BigUint::from(arity as u32 + 1);
    let factor = BigUint::from(9u32).pow(arity as u32) * &group;
    let mut rules = Vec::with_capacity(count);
    for index in indices {
        let from = (&index / &factor)
            .to_u8()
            .ok_or(CodecError::MalformedId {
                reason: "packed source element out of range",
            })?;
        let rem = index % &factor;
        let to = (&rem % &group).to_u8().ok_or(CodecError::MalformedId {
            reason: "packed result element out of range",
        })?;
        let mut sums_value = rem / &group;
        let mut sums = vec![0u8; arity];
        for slot in sums.iter_mut().rev() {
            *slot = (&sums_value % 9u32).to_u8().unwrap_or(0);
            sums_value /= 9u32;
        }
        rules.push(Rule::new(from, sums, to));
    }
    Ok(RuleSet::new(rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;

    #[test]
    fn single_rule_encodes_to_a_known_id() {
        // (0,[3],1): index = 0*9*2 + 3*2 + 1 = 7, one 6-bit chunk, base36 "7".
        let set = RuleSet::new(vec![Rule::new(0, vec![3], 1)]);
        assert_eq!(encode(&set).unwrap(), "1:1:7");
    }

    #[test]
    fn two_rules_pack_most_significant_first() {
        // Indices 7 and 22; packed = 7 << 6 | 22 = 470 = "d2" in base 36.
        let set = RuleSet::new(vec![Rule::new(0, vec![3], 1), Rule::new(1, vec![2], 0)]);
        assert_eq!(encode(&set).unwrap(), "1:2:d2");
        assert_eq!(decode("1:2:d2").unwrap(), set);
    }

    #[test]
    fn round_trip_preserves_order_and_content() {
        // Deliberately unsorted: decoding must restore the exact sequence.
        let set = RuleSet::new(vec![
            Rule::new(2, vec![1, 4], 0),
            Rule::new(0, vec![3, 0], 2),
            Rule::new(1, vec![0, 2], 2),
        ]);
        let id = encode(&set).unwrap();
        assert_eq!(decode(&id).unwrap(), set);
    }

    #[test]
    fn generated_sets_round_trip() {
        for seed in 0u64..20 {
            let set = generate(16, 5, seed);
            let id = encode(&set).unwrap();
            assert_eq!(decode(&id).unwrap(), set, "seed {seed}, id {id}");
        }
    }

    #[test]
    fn arbitrary_homogeneous_sets_round_trip() {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha12Rng;

        let mut rng = ChaCha12Rng::seed_from_u64(2024);
        for _ in 0..100 {
            let arity = rng.random_range(1..5usize);
            // Element ids live in [0, arity + 1), signature digits in base 9.
            let element_bound = arity as u8;
            let rules: Vec<Rule> = (0..rng.random_range(1..12))
                .map(|_| {
                    let sums = (0..arity).map(|_| rng.random_range(0..9u8)).collect();
                    Rule::new(
                        rng.random_range(0..=element_bound),
                        sums,
                        rng.random_range(0..=element_bound),
                    )
                })
                .collect();
            let set = RuleSet::new(rules);
            let id = encode(&set).unwrap();
            assert_eq!(decode(&id).unwrap(), set, "id {id}");
        }
    }

    #[test]
    fn empty_set_uses_the_sentinel() {
        assert_eq!(encode(&RuleSet::default()).unwrap(), EMPTY_RULE_SET_ID);
        assert!(decode(EMPTY_RULE_SET_ID).unwrap().is_empty());
    }

    #[test]
    fn mixed_arity_is_rejected() {
        let set = RuleSet::new(vec![Rule::new(0, vec![1], 1), Rule::new(0, vec![1, 0], 1)]);
        assert_eq!(
            encode(&set),
            Err(CodecError::ArityMismatch {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn malformed_ids_are_rejected() {
        for id in ["", "1:2", "1:2:3:4", "x:1:0", "1:x:0", "1:1:!!"] {
            assert!(
                matches!(decode(id), Err(CodecError::MalformedId { .. })),
                "{id:?} should not decode"
            );
        }
    }

    #[test]
    fn uppercase_payloads_decode_like_lowercase() {
        let set = RuleSet::new(vec![Rule::new(0, vec![3], 1), Rule::new(1, vec![2], 0)]);
        assert_eq!(decode("1:2:D2").unwrap(), set);
    }
}
