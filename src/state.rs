// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::ChainRegistry;
use crate::config::{ConfigError, GatewayConfig};
use crate::delegation::SplitDelegationService;

/// Shared state handed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ChainRegistry>,
    pub delegation: Arc<SplitDelegationService>,
}

impl AppState {
    pub fn new(registry: Arc<ChainRegistry>) -> Self {
        Self {
            delegation: Arc::new(SplitDelegationService::new(registry.clone())),
            registry,
        }
    }

    /// Validate the config and connect one client per chain.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let registry = ChainRegistry::connect(config)?;
        Ok(Self::new(Arc::new(registry)))
    }
}
