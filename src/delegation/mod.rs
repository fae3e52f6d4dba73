// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Split delegation: percent allocation, contract encoding, and the service
//! facade used by the HTTP layer.

pub mod contract;
pub mod ratio;
pub mod service;

pub use contract::encode_set_delegation;
pub use ratio::{allocate_ratios, RatioSet};
pub use service::SplitDelegationService;
