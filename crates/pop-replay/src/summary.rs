//! Session summary: the fields a verification certificate carries

use serde::{Deserialize, Serialize};

use crate::sandbox::SessionOutcome;

pub const STATUS_VERIFIED: &str = "Correctly verified!";
pub const STATUS_FLAGGED: &str = "You are a liar!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub player_name: String,
    pub verified: bool,
    pub status: String,
    /// Final stats timestamp in seconds
    pub time_seconds: Option<f64>,
    pub health: Option<i32>,
    pub armor: Option<i32>,
    /// The digest, or the computed digest with the claimed one as evidence
    pub digest: String,
    pub log: String,
}

impl SessionSummary {
    pub fn from_outcome(outcome: &SessionOutcome) -> Self {
        let verified = outcome.verification.is_verified();
        let last = outcome.record.final_stats();
        Self {
            player_name: outcome.record.player_name.clone().unwrap_or_default(),
            verified,
            status: if verified { STATUS_VERIFIED } else { STATUS_FLAGGED }.to_string(),
            time_seconds: last.map(|s| s.timestamp / 1000.0),
            health: last.map(|s| s.health),
            armor: last.map(|s| s.armor),
            digest: outcome.verification.to_string(),
            log: outcome.log.joined(),
        }
    }

    pub fn time_text(&self) -> String {
        match self.time_seconds {
            Some(seconds) => format!("{seconds} seconds"),
            None => "unknown".to_string(),
        }
    }
}
