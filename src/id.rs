//! ID generation utilities for Reelr
//!
//! Provides functions for generating unique identifiers for workflows,
//! messages, and responses.

use rand::Rng;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// Generate a unique workflow ID
///
/// Format: `workflow-{timestamp_ms}-{random_hex}`
/// Example: `workflow-1738300800123-a1b2`
pub fn generate_workflow_id() -> String {
    let timestamp = now_ms();
    let random: u16 = rand::rng().random();
    format!("workflow-{}-{:04x}", timestamp, random)
}

/// Generate a unique message ID
///
/// Format: `msg-{timestamp_ms}-{random_hex}`
pub fn generate_message_id() -> String {
    let timestamp = now_ms();
    let random: u16 = rand::rng().random();
    format!("msg-{}-{:04x}", timestamp, random)
}

/// Generate a unique response ID
///
/// Format: `resp-{timestamp_ms}-{random_hex}`
pub fn generate_response_id() -> String {
    let timestamp = now_ms();
    let random: u16 = rand::rng().random();
    format!("resp-{}-{:04x}", timestamp, random)
}
