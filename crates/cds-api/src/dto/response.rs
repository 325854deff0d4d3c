//! Response DTOs.

use serde::{Deserialize, Serialize};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Builds with a live log subscriber.
    pub log_streams: usize,
}

/// Rows removed by a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

/// Result of a log ingest call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestLogResponse {
    /// Lines handed to the subscriber.
    pub delivered: usize,
    /// Lines dropped because nobody was listening.
    pub discarded: usize,
}

/// Result of closing a build's log stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishResponse {
    /// Whether a subscriber was attached.
    pub closed: bool,
}
