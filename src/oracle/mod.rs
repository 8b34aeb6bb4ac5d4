// Copyright (c) 2026 Bountyy Oy. All rights reserved.
//
// Oracle contract for blind fingerprinting
//
// The fingerprint engine never talks to the target directly. Everything it
// learns comes through two questions:
//
// - `evaluate(predicate)`: does the back-end consider this predicate true?
// - `evaluate_text(expression, mode)`: what scalar does this expression yield?
//
// Predicates and expressions are opaque fragments of the target's SQL dialect.
// Implementations own transport, injection and any retry policy; the engine
// treats `FingerprintError::OracleUnavailable` as the end of the current chain.

pub mod http;
pub mod inference;

pub use http::HttpBooleanChannel;
pub use inference::InferenceOracle;

use crate::errors::FingerprintResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// How a scalar result is decoded by the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Printable text
    Default,
    /// Constrained small-integer decode ('0'..='9'), used for single-character comparisons
    Digits,
}

impl DecodeMode {
    /// Inclusive character-code bounds searched when inferring one character
    pub fn charset_bounds(&self) -> (u32, u32) {
        match self {
            DecodeMode::Default => (32, 126),
            DecodeMode::Digits => (48, 57),
        }
    }
}

/// Full oracle: boolean predicates plus scalar extraction
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn evaluate(&self, predicate: &str) -> FingerprintResult<bool>;

    async fn evaluate_text(
        &self,
        expression: &str,
        mode: DecodeMode,
    ) -> FingerprintResult<Option<String>>;
}

/// Bare boolean side channel, e.g. a page that differs on true/false conditions
#[async_trait]
pub trait BooleanChannel: Send + Sync {
    async fn evaluate(&self, predicate: &str) -> FingerprintResult<bool>;
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for Arc<T> {
    async fn evaluate(&self, predicate: &str) -> FingerprintResult<bool> {
        (**self).evaluate(predicate).await
    }

    async fn evaluate_text(
        &self,
        expression: &str,
        mode: DecodeMode,
    ) -> FingerprintResult<Option<String>> {
        (**self).evaluate_text(expression, mode).await
    }
}

#[async_trait]
impl<T: BooleanChannel + ?Sized> BooleanChannel for Arc<T> {
    async fn evaluate(&self, predicate: &str) -> FingerprintResult<bool> {
        (**self).evaluate(predicate).await
    }
}

/// Wraps an oracle and counts round-trips, one per `evaluate`/`evaluate_text`
pub struct CountingOracle<O> {
    inner: O,
    calls: AtomicUsize,
}

impl<O: Oracle> CountingOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

#[async_trait]
impl<O: Oracle> Oracle for CountingOracle<O> {
    async fn evaluate(&self, predicate: &str) -> FingerprintResult<bool> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.evaluate(predicate).await
    }

    async fn evaluate_text(
        &self,
        expression: &str,
        mode: DecodeMode,
    ) -> FingerprintResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.evaluate_text(expression, mode).await
    }
}
