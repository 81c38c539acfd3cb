//! Digest functions and the verifier
//!
//! The verifier is a pure comparison. How a digest is computed is up to the
//! [`Digester`] the sandbox is given, or to the program if it submits one.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::RecordError;
use crate::record::{Digest, GameplayRecord, InputEvent, StatsSnapshot};

/// Computes a session digest from the replayed input and resulting stats
pub trait Digester {
    fn digest(&self, events: &[InputEvent], stats: &[StatsSnapshot]) -> Result<Digest, RecordError>;
}

impl<F> Digester for F
where
    F: Fn(&[InputEvent], &[StatsSnapshot]) -> Digest,
{
    fn digest(&self, events: &[InputEvent], stats: &[StatsSnapshot]) -> Result<Digest, RecordError> {
        Ok(self(events, stats))
    }
}

/// BLAKE3 over the canonical JSON of events and stats, hex-encoded
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Digester;

#[derive(Serialize)]
struct Canonical<'a> {
    events: &'a [InputEvent],
    stats: &'a [StatsSnapshot],
}

impl Digester for Blake3Digester {
    fn digest(&self, events: &[InputEvent], stats: &[StatsSnapshot]) -> Result<Digest, RecordError> {
        let mut hasher = blake3::Hasher::new();
        serde_json::to_writer(&mut hasher, &Canonical { events, stats }).map_err(RecordError::Encode)?;
        Ok(Digest::Text(hex::encode(hasher.finalize().as_bytes())))
    }
}

/// Outcome of comparing a claimed digest against a computed one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The replay reproduced the claim
    Verified { digest: Digest },
    /// The replay diverged, or there was nothing to compare; both sides are kept
    Flagged {
        computed: Option<Digest>,
        claimed: Option<Digest>,
    },
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified { .. })
    }

    pub fn computed(&self) -> Option<&Digest> {
        match self {
            Verification::Verified { digest } => Some(digest),
            Verification::Flagged { computed, .. } => computed.as_ref(),
        }
    }

    pub fn claimed(&self) -> Option<&Digest> {
        match self {
            Verification::Verified { digest } => Some(digest),
            Verification::Flagged { claimed, .. } => claimed.as_ref(),
        }
    }
}

fn or_none(digest: &Option<Digest>) -> String {
    digest.as_ref().map_or_else(|| "none".to_string(), ToString::to_string)
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verification::Verified { digest } => write!(f, "{digest}"),
            Verification::Flagged { computed, claimed } => {
                write!(f, "{} - Proof of fraud: {}", or_none(computed), or_none(claimed))
            }
        }
    }
}

/// Compare the armed record's claim with the replay's result
///
/// Verified only when both digests are present and equal.
pub fn verify(claimed: &GameplayRecord, produced: &GameplayRecord) -> Verification {
    let verification = match (&claimed.digest, &produced.digest) {
        (Some(a), Some(b)) if a == b => Verification::Verified { digest: b.clone() },
        _ => Verification::Flagged {
            computed: produced.digest.clone(),
            claimed: claimed.digest.clone(),
        },
    };
    if verification.is_verified() {
        info!(digest = %verification, "replay verified");
    } else {
        warn!(evidence = %verification, "replay flagged");
    }
    verification
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(digest: Option<Digest>) -> GameplayRecord {
        GameplayRecord {
            digest,
            ..GameplayRecord::new(Vec::new())
        }
    }

    #[test]
    fn test_equal_digests_verify() {
        let v = verify(&record(Some("abc".into())), &record(Some("abc".into())));
        assert!(v.is_verified());
        assert_eq!(v.to_string(), "abc");
    }

    #[test]
    fn test_mismatch_keeps_both() {
        let v = verify(&record(Some("claimed".into())), &record(Some("computed".into())));
        assert_eq!(
            v,
            Verification::Flagged {
                computed: Some("computed".into()),
                claimed: Some("claimed".into()),
            }
        );
        assert_eq!(v.to_string(), "computed - Proof of fraud: claimed");
    }

    #[test]
    fn test_number_never_equals_string() {
        let v = verify(&record(Some(Digest::from(7))), &record(Some("7".into())));
        assert!(!v.is_verified());
    }

    #[test]
    fn test_missing_claim_is_flagged() {
        let v = verify(&record(None), &record(Some("x".into())));
        assert!(!v.is_verified());
        assert_eq!(v.claimed(), None);
        assert_eq!(v.computed(), Some(&Digest::from("x")));
        assert_eq!(v.to_string(), "x - Proof of fraud: none");
    }

    #[test]
    fn test_blake3_digest_shape_and_sensitivity() {
        let events = vec![InputEvent::key("keydown", "w", 0.0)];
        let stats = vec![StatsSnapshot { timestamp: 28.0, health: 100, ..Default::default() }];
        let a = Blake3Digester.digest(&events, &stats).unwrap();
        let Digest::Text(text) = &a else {
            panic!("expected text digest");
        };
        assert_eq!(text.len(), 64);
        assert_eq!(a, Blake3Digester.digest(&events, &stats).unwrap());

        let mut tampered = events.clone();
        tampered[0].key_code = 87;
        assert_ne!(a, Blake3Digester.digest(&tampered, &stats).unwrap());
    }

    #[test]
    fn test_closure_digester() {
        let count = |events: &[InputEvent], _: &[StatsSnapshot]| Digest::from(events.len() as i64);
        assert_eq!(count.digest(&[], &[]).unwrap(), Digest::from(0));
    }
}
