// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ratio Allocation
//!
//! Turns user-facing percentages into the smallest integer ratios with the
//! same proportions. The contract stores ratios, not percentages, so
//! `{25%, 25%, 50%}` is written on-chain as `{1, 1, 2}`.
//!
//! Percents arrive as [`Decimal`] and are scaled to integers over a common
//! power of ten; from there everything is exact `U256` arithmetic and any
//! overflow is an error rather than a wrapped value.

use std::collections::{BTreeMap, HashSet};

use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::error::GatewayError;

/// Delegate address (as supplied) to on-chain ratio, ordered by key.
pub type RatioSet = BTreeMap<String, U256>;

/// Convert `(address, percent)` pairs into minimal proportional ratios.
///
/// Each percent becomes the fraction `percent / sum(percents)`, reduced to
/// lowest terms; the numerators rescaled to the LCM of the denominators are
/// the ratios. The denominator is the supplied sum, so inputs that do not add
/// up to 100 keep their relative weights.
///
/// Zero percents are dropped. Negative percents, duplicate addresses and an
/// input with nothing left after dropping zeros are rejected.
pub fn allocate_ratios<I, K>(allocations: I) -> Result<RatioSet, GatewayError>
where
    I: IntoIterator<Item = (K, Decimal)>,
    K: Into<String>,
{
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    let mut total_percent = Some(Decimal::ZERO);
    let mut max_scale = 0;

    for (address, percent) in allocations {
        let address = address.into();
        if !seen.insert(address.clone()) {
            return Err(GatewayError::InvalidAllocation(format!(
                "duplicate delegate {address}"
            )));
        }
        if percent.is_sign_negative() && !percent.is_zero() {
            return Err(GatewayError::InvalidAllocation(format!(
                "negative percent {percent} for {address}"
            )));
        }
        if percent.is_zero() {
            continue;
        }
        let percent = percent.normalize();
        max_scale = max_scale.max(percent.scale());
        total_percent = total_percent.and_then(|t| t.checked_add(percent));
        entries.push((address, percent));
    }

    if entries.is_empty() {
        return Err(GatewayError::InvalidAllocation(
            "no delegate with a positive percent".into(),
        ));
    }
    if total_percent != Some(Decimal::ONE_HUNDRED) {
        tracing::debug!(?total_percent, "Percents do not sum to 100, normalizing by their sum");
    }

    let numerators = entries
        .iter()
        .map(|(_, percent)| scaled_integer(*percent, max_scale))
        .collect::<Result<Vec<_>, _>>()?;

    let sum = numerators.iter().try_fold(U256::ZERO, |acc, n| {
        acc.checked_add(*n)
            .ok_or(GatewayError::RatioOverflow("summing percents"))
    })?;

    // percent / sum in lowest terms
    let fractions: Vec<(U256, U256)> = numerators
        .iter()
        .map(|n| {
            let divisor = gcd(*n, sum);
            (*n / divisor, sum / divisor)
        })
        .collect();

    let common = fractions
        .iter()
        .try_fold(U256::from(1u64), |acc, (_, den)| lcm(acc, *den))?;

    let mut ratios = RatioSet::new();
    for ((address, _), (num, den)) in entries.into_iter().zip(fractions) {
        let ratio = num
            .checked_mul(common / den)
            .ok_or(GatewayError::RatioOverflow("rescaling numerators"))?;
        ratios.insert(address, ratio);
    }

    Ok(ratios)
}

/// `percent * 10^scale` as an integer.
fn scaled_integer(percent: Decimal, scale: u32) -> Result<U256, GatewayError> {
    let mantissa = u128::try_from(percent.mantissa())
        .map_err(|_| GatewayError::InvalidAllocation(format!("negative percent {percent}")))?;
    let factor = U256::from(10u64)
        .checked_pow(U256::from(scale - percent.scale()))
        .ok_or(GatewayError::RatioOverflow("scaling percents"))?;
    U256::from(mantissa)
        .checked_mul(factor)
        .ok_or(GatewayError::RatioOverflow("scaling percents"))
}

fn gcd(mut a: U256, mut b: U256) -> U256 {
    while !b.is_zero() {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

fn lcm(a: U256, b: U256) -> Result<U256, GatewayError> {
    (a / gcd(a, b))
        .checked_mul(b)
        .ok_or(GatewayError::RatioOverflow("computing common denominator"))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ratios(input: &[(&str, &str)]) -> RatioSet {
        allocate_ratios(input.iter().map(|(a, p)| (*a, dec(p)))).unwrap()
    }

    fn expect(pairs: &[(&str, u64)]) -> RatioSet {
        pairs
            .iter()
            .map(|(a, r)| (a.to_string(), U256::from(*r)))
            .collect()
    }

    #[test]
    fn quarter_quarter_half() {
        let got = ratios(&[("0x1", "25"), ("0x2", "25"), ("0x3", "50")]);
        assert_eq!(got, expect(&[("0x1", 1), ("0x2", 1), ("0x3", 2)]));
    }

    #[test]
    fn equal_thirds_not_summing_to_hundred() {
        let got = ratios(&[("0x1", "33"), ("0x2", "33"), ("0x3", "33")]);
        assert_eq!(got, expect(&[("0x1", 1), ("0x2", 1), ("0x3", 1)]));
    }

    #[test]
    fn one_to_two() {
        let got = ratios(&[("0x1", "28"), ("0x2", "56")]);
        assert_eq!(got, expect(&[("0x1", 1), ("0x2", 2)]));
    }

    #[test]
    fn single_delegate_gets_one() {
        assert_eq!(ratios(&[("0xabc", "100")]), expect(&[("0xabc", 1)]));
        assert_eq!(ratios(&[("0xabc", "12.5")]), expect(&[("0xabc", 1)]));
    }

    #[test]
    fn decimal_percents_stay_exact() {
        let got = ratios(&[("0x1", "33.3"), ("0x2", "66.7")]);
        assert_eq!(got, expect(&[("0x1", 333), ("0x2", 667)]));

        let got = ratios(&[("0x1", "12.5"), ("0x2", "37.50"), ("0x3", "50")]);
        assert_eq!(got, expect(&[("0x1", 1), ("0x2", 3), ("0x3", 4)]));
    }

    #[test]
    fn zero_percent_entries_are_dropped() {
        let got = ratios(&[("0x1", "0"), ("0x2", "40"), ("0x3", "60")]);
        assert_eq!(got, expect(&[("0x2", 2), ("0x3", 3)]));
    }

    #[test]
    fn ratios_preserve_pairwise_proportion() {
        let cases: &[&[(&str, &str)]] = &[
            &[("0x1", "10"), ("0x2", "20"), ("0x3", "30"), ("0x4", "40")],
            &[("0x1", "0.01"), ("0x2", "99.99")],
            &[("0x1", "14.2857"), ("0x2", "28.5714"), ("0x3", "57.1429")],
            &[("0x1", "7"), ("0x2", "11"), ("0x3", "13"), ("0x4", "69")],
            &[("0x1", "1.5"), ("0x2", "2.25"), ("0x3", "96.25")],
        ];

        for case in cases {
            let got = ratios(case);
            for (a, pa) in case.iter() {
                for (b, pb) in case.iter() {
                    let ra = Decimal::from(got[*a].to::<u64>());
                    let rb = Decimal::from(got[*b].to::<u64>());
                    assert_eq!(ra * dec(pb), rb * dec(pa), "case {case:?}: {a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn wide_scales_and_coprime_weights() {
        let input = [
            ("0x1", "0.0000000007"),
            ("0x2", "11"),
            ("0x3", "13.0000000003"),
        ];
        let forward = ratios(&input);
        assert_eq!(
            forward,
            expect(&[("0x1", 7), ("0x2", 110_000_000_000), ("0x3", 130_000_000_003)])
        );

        let mut reversed = input;
        reversed.reverse();
        assert_eq!(ratios(&reversed), forward);
    }

    #[test]
    fn extreme_decimal_does_not_overflow() {
        let got = allocate_ratios([("0x1", Decimal::MAX), ("0x2", Decimal::ONE)]).unwrap();
        let max = u128::try_from(Decimal::MAX.mantissa()).unwrap();
        assert_eq!(got["0x1"], U256::from(max));
        assert_eq!(got["0x2"], U256::from(1u64));

        let single = allocate_ratios([("0x1", Decimal::MAX)]).unwrap();
        assert_eq!(single["0x1"], U256::from(1u64));
    }

    #[test]
    fn ratios_are_minimal() {
        let got = ratios(&[("0x1", "20"), ("0x2", "30"), ("0x3", "50")]);
        let divisor = got.values().fold(U256::ZERO, |acc, r| gcd(acc, *r));
        assert_eq!(divisor, U256::from(1u64));
        assert_eq!(got, expect(&[("0x1", 2), ("0x2", 3), ("0x3", 5)]));
    }

    #[test]
    fn input_order_does_not_matter() {
        let input = [("0xa", "12.5"), ("0xb", "37.5"), ("0xc", "30"), ("0xd", "20")];
        let forward = ratios(&input);

        let mut reversed = input;
        reversed.reverse();
        assert_eq!(ratios(&reversed), forward);

        let mut rotated = input;
        rotated.rotate_left(2);
        assert_eq!(ratios(&rotated), forward);
    }

    #[test]
    fn rejects_empty_and_all_zero_input() {
        let empty: Vec<(&str, Decimal)> = Vec::new();
        assert!(matches!(
            allocate_ratios(empty),
            Err(GatewayError::InvalidAllocation(_))
        ));
        assert!(matches!(
            allocate_ratios([("0x1", Decimal::ZERO)]),
            Err(GatewayError::InvalidAllocation(_))
        ));
    }

    #[test]
    fn rejects_negative_and_duplicate_entries() {
        assert!(matches!(
            allocate_ratios([("0x1", dec("-5")), ("0x2", dec("105"))]),
            Err(GatewayError::InvalidAllocation(_))
        ));
        assert!(matches!(
            allocate_ratios([("0x1", dec("50")), ("0x1", dec("50"))]),
            Err(GatewayError::InvalidAllocation(_))
        ));
    }

    #[test]
    fn gcd_and_lcm() {
        assert_eq!(gcd(U256::from(84u64), U256::from(28u64)), U256::from(28u64));
        assert_eq!(gcd(U256::ZERO, U256::from(9u64)), U256::from(9u64));
        assert_eq!(lcm(U256::from(4u64), U256::from(6u64)).unwrap(), U256::from(12u64));
        assert!(lcm(U256::MAX, U256::MAX - U256::from(1u64)).is_err());
    }
}
