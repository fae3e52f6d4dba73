// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors produced by the split delegation core.
///
/// Chain-layer failures carry the chain id and the operation name so they can
/// be traced back to a specific node call. Nothing here is retried internally;
/// [`GatewayError::is_retryable`] tells the caller whether backing off and
/// trying again makes sense.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("chain {chain_id} unreachable during {operation}: {reason}")]
    ChainUnreachable {
        chain_id: u64,
        operation: &'static str,
        reason: String,
    },

    #[error("unknown chain: {0}")]
    UnknownChain(u64),

    #[error("fee estimation failed on chain {chain_id}: {reason}")]
    EstimateFeeFailed { chain_id: u64, reason: String },

    #[error("ABI encoding failed: {0}")]
    AbiEncoding(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid transaction hash: {0}")]
    InvalidTxHash(String),

    #[error("invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("ratio arithmetic overflowed while {0}")]
    RatioOverflow(&'static str),

    #[error("request cancelled")]
    Cancelled,

    #[error("chain query timed out after {0:?}")]
    Timeout(Duration),
}

impl GatewayError {
    /// Whether the caller may retry the same request with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ChainUnreachable { .. }
                | Self::EstimateFeeFailed { .. }
                | Self::Cancelled
                | Self::Timeout(_)
        )
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let message = err.to_string();
        match err {
            GatewayError::UnknownChain(_) => Self::not_found(message),
            GatewayError::AbiEncoding(_)
            | GatewayError::InvalidAddress(_)
            | GatewayError::InvalidTxHash(_)
            | GatewayError::InvalidAllocation(_)
            | GatewayError::RatioOverflow(_) => Self::unprocessable(message),
            GatewayError::EstimateFeeFailed { .. } => Self::bad_gateway(message),
            GatewayError::ChainUnreachable { .. }
            | GatewayError::Cancelled
            | GatewayError::Timeout(_) => Self::service_unavailable(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
