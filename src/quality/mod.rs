//! Quality gate - the scored accept/retry decision point.
//!
//! A bounded iterative controller that assesses an asset bundle, compares the
//! score against a threshold, and applies improvement actions until standards
//! are met or the iteration budget runs out.

pub mod gate;

pub use gate::{AssetImprover, QualityAssessor, QualityGate, QualityGateConfig, QualityReport};
