// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Split delegation contract call encoding.

use std::collections::BTreeMap;
use std::str::FromStr;

use alloy::{
    hex,
    primitives::{Address, U256},
    sol,
    sol_types::SolCall,
};

use super::ratio::RatioSet;
use crate::error::GatewayError;

// Define the split delegation interface using alloy's sol! macro
sol! {
    interface ISplitDelegation {
        struct Delegation {
            address delegate;
            uint256 ratio;
        }

        function setDelegation(
            string dao,
            Delegation[] delegation,
            uint256 expirationTimestamp
        ) external;
    }
}

/// ABI-encode `setDelegation(dao, delegation, expirationTimestamp)`.
///
/// Delegates are encoded in ascending address order regardless of how the
/// ratio set was keyed, so identical inputs always yield identical calldata.
/// Addresses are parsed case-insensitively; two keys naming the same address
/// are rejected. Nothing here touches the network.
pub fn encode_set_delegation(
    dao: &str,
    ratios: &RatioSet,
    expiration_timestamp: i64,
) -> Result<String, GatewayError> {
    if dao.trim().is_empty() {
        return Err(GatewayError::AbiEncoding("DAO alias must not be empty".into()));
    }
    if ratios.is_empty() {
        return Err(GatewayError::AbiEncoding("no delegates to encode".into()));
    }
    let expiration = u64::try_from(expiration_timestamp).map_err(|_| {
        GatewayError::AbiEncoding(format!(
            "expiration timestamp {expiration_timestamp} is before the unix epoch"
        ))
    })?;

    let mut sorted: BTreeMap<Address, U256> = BTreeMap::new();
    for (raw, ratio) in ratios {
        let address = Address::from_str(raw.trim()).map_err(|e| {
            GatewayError::AbiEncoding(format!("invalid delegate address {raw}: {e}"))
        })?;
        if ratio.is_zero() {
            return Err(GatewayError::AbiEncoding(format!("zero ratio for {raw}")));
        }
        if sorted.insert(address, *ratio).is_some() {
            return Err(GatewayError::AbiEncoding(format!(
                "delegate {address} appears more than once"
            )));
        }
    }

    let call = ISplitDelegation::setDelegationCall {
        dao: dao.to_string(),
        delegation: sorted
            .into_iter()
            .map(|(delegate, ratio)| ISplitDelegation::Delegation { delegate, ratio })
            .collect(),
        expirationTimestamp: U256::from(expiration),
    };

    Ok(hex::encode_prefixed(call.abi_encode()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0x00000000000000000000000000000000000000a1";
    const BOB: &str = "0x00000000000000000000000000000000000000b2";

    fn ratio_set(pairs: &[(&str, u64)]) -> RatioSet {
        pairs
            .iter()
            .map(|(a, r)| (a.to_string(), U256::from(*r)))
            .collect()
    }

    fn word(hex_str: &str, index: usize) -> &str {
        // skip "0x" and the 4-byte selector
        let start = 2 + 8 + index * 64;
        &hex_str[start..start + 64]
    }

    #[test]
    fn calldata_starts_with_selector() {
        let data =
            encode_set_delegation("ens.eth", &ratio_set(&[(ALICE, 1)]), 1_700_000_000).unwrap();
        let selector = hex::encode_prefixed(ISplitDelegation::setDelegationCall::SELECTOR);
        assert!(data.starts_with(&selector));
    }

    #[test]
    fn encodes_head_and_tail_layout() {
        let data = encode_set_delegation(
            "ens.eth",
            &ratio_set(&[(BOB, 2), (ALICE, 1)]),
            0x6553f100,
        )
        .unwrap();

        // head: offset(dao), offset(delegation), expirationTimestamp
        assert_eq!(word(&data, 0), format!("{:064x}", 0x60));
        assert_eq!(word(&data, 2), format!("{:064x}", 0x6553f100u64));

        // dao: length then right-padded bytes
        assert_eq!(word(&data, 3), format!("{:064x}", 7));
        assert!(word(&data, 4).starts_with(&hex::encode("ens.eth")));

        // delegation: length, then (address, ratio) tuples in address order
        assert_eq!(word(&data, 1), format!("{:064x}", 0xa0));
        assert_eq!(word(&data, 5), format!("{:064x}", 2));
        assert_eq!(word(&data, 6), format!("{:0>64}", &ALICE[2..]));
        assert_eq!(word(&data, 7), format!("{:064x}", 1));
        assert_eq!(word(&data, 8), format!("{:0>64}", &BOB[2..]));
        assert_eq!(word(&data, 9), format!("{:064x}", 2));
    }

    #[test]
    fn encoding_is_deterministic_and_order_independent() {
        let upper_bob = BOB.to_uppercase().replace("0X", "0x");
        let a = encode_set_delegation("dao", &ratio_set(&[(ALICE, 3), (BOB, 5)]), 42).unwrap();
        let b = encode_set_delegation("dao", &ratio_set(&[(BOB, 5), (ALICE, 3)]), 42).unwrap();
        let c = encode_set_delegation(
            "dao",
            &ratio_set(&[(upper_bob.as_str(), 5), (ALICE, 3)]),
            42,
        )
        .unwrap();

        assert_eq!(a, b);
        assert_eq!(a, c);
        let again = encode_set_delegation("dao", &ratio_set(&[(ALICE, 3), (BOB, 5)]), 42).unwrap();
        assert_eq!(a, again);
    }

    #[test]
    fn rejects_malformed_inputs() {
        let good = ratio_set(&[(ALICE, 1)]);

        assert!(matches!(
            encode_set_delegation("  ", &good, 1),
            Err(GatewayError::AbiEncoding(_))
        ));
        assert!(matches!(
            encode_set_delegation("dao", &ratio_set(&[("0x1", 1)]), 1),
            Err(GatewayError::AbiEncoding(_))
        ));
        assert!(matches!(
            encode_set_delegation("dao", &good, -1),
            Err(GatewayError::AbiEncoding(_))
        ));
        assert!(matches!(
            encode_set_delegation("dao", &RatioSet::new(), 1),
            Err(GatewayError::AbiEncoding(_))
        ));
    }

    #[test]
    fn rejects_same_address_in_different_case() {
        let lower = "0x000000000000000000000000000000000000abcd";
        let upper = "0x000000000000000000000000000000000000ABCD";
        let err =
            encode_set_delegation("dao", &ratio_set(&[(lower, 1), (upper, 1)]), 1).unwrap_err();
        assert!(matches!(err, GatewayError::AbiEncoding(msg) if msg.contains("more than once")));
    }
}
