// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod core;
pub mod loader;
pub mod validation;

pub use core::{FingerprintConfig, HttpChannelConfig, InferenceConfig, ObservabilityConfig};

pub use loader::{ConfigFormat, ConfigLoader};

pub use validation::ConfigValidator;
