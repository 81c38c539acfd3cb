//! Gameplay records: the persisted input log, stats history and digest
//!
//! Field names on the wire are camelCase (`timeStamp`, `keyCode`,
//! `playerName`) so records exchange with browser-side recorders as-is.

use std::fmt;

use pop_dom::{Event, KeyModifiers, KeyboardData};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// One recorded keyboard input
///
/// Only `type` and `timeStamp` are required when parsing; the remaining
/// fields default to zero, empty or false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEvent {
    #[serde(default)]
    pub location: u32,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    pub char_code: u32,
    #[serde(default)]
    pub key_code: u32,
    #[serde(default)]
    pub which: u32,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub code: String,
    #[serde(rename = "type")]
    pub event_type: String,
    /// Virtual milliseconds since session start
    pub time_stamp: f64,
}

impl InputEvent {
    /// Minimal event with only a type, key and timestamp
    pub fn key(event_type: &str, key: &str, time_stamp: f64) -> Self {
        Self {
            location: 0,
            ctrl_key: false,
            shift_key: false,
            alt_key: false,
            meta_key: false,
            repeat: false,
            char_code: 0,
            key_code: 0,
            which: 0,
            key: key.to_string(),
            code: String::new(),
            event_type: event_type.to_string(),
            time_stamp,
        }
    }

    pub fn keyboard_data(&self) -> KeyboardData {
        KeyboardData {
            key: self.key.clone(),
            code: self.code.clone(),
            key_code: self.key_code,
            char_code: self.char_code,
            which: self.which,
            location: self.location,
            repeat: self.repeat,
            modifiers: KeyModifiers::from_flags(self.shift_key, self.ctrl_key, self.alt_key, self.meta_key),
        }
    }

    /// The DOM event delivered to the program for this input
    pub fn to_event(&self) -> Event {
        Event::keyboard(&self.event_type, self.keyboard_data(), self.time_stamp)
    }

    /// Build a record entry from a live keyboard event
    pub fn from_event(event: &Event) -> Self {
        let data = event.keyboard.clone().unwrap_or_default();
        Self {
            location: data.location,
            ctrl_key: data.modifiers.ctrl,
            shift_key: data.modifiers.shift,
            alt_key: data.modifiers.alt,
            meta_key: data.modifiers.meta,
            repeat: data.repeat,
            char_code: data.char_code,
            key_code: data.key_code,
            which: data.which,
            key: data.key,
            code: data.code,
            event_type: event.event_type.clone(),
            time_stamp: event.time_stamp,
        }
    }
}

/// Point-in-time read of program state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub timestamp: f64,
    pub health: i32,
    pub armor: i32,
    pub episode: i32,
    pub mission: i32,
    pub skill: i32,
}

/// Result digest, either a JSON number or a string
///
/// Numbers and strings never compare equal, even when they print the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Digest {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Digest::Number(n) => write!(f, "{n}"),
            Digest::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Digest {
    fn from(s: &str) -> Self {
        Digest::Text(s.to_string())
    }
}

impl From<String> for Digest {
    fn from(s: String) -> Self {
        Digest::Text(s)
    }
}

impl From<i64> for Digest {
    fn from(n: i64) -> Self {
        Digest::Number(n.into())
    }
}

/// The exchange and replay unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameplayRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    pub events: Vec<InputEvent>,
    #[serde(default)]
    pub stats: Vec<StatsSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<Digest>,
}

impl GameplayRecord {
    pub fn new(events: Vec<InputEvent>) -> Self {
        Self {
            player_name: None,
            events,
            stats: Vec::new(),
            digest: None,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, RecordError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        serde_json::to_string(self).map_err(RecordError::Encode)
    }

    pub fn to_json_pretty(&self) -> Result<String, RecordError> {
        serde_json::to_string_pretty(self).map_err(RecordError::Encode)
    }

    /// Timestamp of the last recorded input
    pub fn last_event_time(&self) -> Option<f64> {
        self.events.last().map(|e| e.time_stamp)
    }

    pub fn final_stats(&self) -> Option<&StatsSnapshot> {
        self.stats.last()
    }
}

/// Builds an input log from live events
///
/// Timestamps may repeat but must never decrease.
#[derive(Debug, Default)]
pub struct InputRecorder {
    events: Vec<InputEvent>,
}

impl InputRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: InputEvent) -> Result<(), RecordError> {
        if let Some(last) = self.events.last() {
            if event.time_stamp < last.time_stamp {
                return Err(RecordError::NonMonotonic {
                    previous: last.time_stamp,
                    got: event.time_stamp,
                });
            }
        }
        self.events.push(event);
        Ok(())
    }

    pub fn record_event(&mut self, event: &Event) -> Result<(), RecordError> {
        self.record(InputEvent::from_event(event))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    /// Close the log into a record carrying the digest claimed by the player
    pub fn finish(self, player_name: Option<String>, stats: Vec<StatsSnapshot>, digest: Option<Digest>) -> GameplayRecord {
        GameplayRecord {
            player_name,
            events: self.events,
            stats,
            digest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_record() {
        let record = GameplayRecord::from_json(
            r#"{"events":[{"type":"keydown","key":"w","timeStamp":0},{"type":"keyup","key":"w","timeStamp":100}]}"#,
        )
        .unwrap();
        assert_eq!(record.events.len(), 2);
        assert_eq!(record.events[1].event_type, "keyup");
        assert_eq!(record.events[1].time_stamp, 100.0);
        assert!(record.stats.is_empty());
        assert_eq!(record.digest, None);
        assert_eq!(record.player_name, None);
    }

    #[test]
    fn test_missing_events_is_parse_error() {
        let err = GameplayRecord::from_json(r#"{"stats":[]}"#).unwrap_err();
        assert!(matches!(err, RecordError::Parse(_)));
        assert!(GameplayRecord::from_json("not json").is_err());
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let mut event = InputEvent::key("keydown", "ArrowUp", 12.5);
        event.key_code = 38;
        event.shift_key = true;
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "keydown");
        assert_eq!(json["timeStamp"], 12.5);
        assert_eq!(json["keyCode"], 38);
        assert_eq!(json["shiftKey"], true);
    }

    #[test]
    fn test_digest_number_and_string() {
        let record = GameplayRecord::from_json(r#"{"events":[],"digest":1234567}"#).unwrap();
        assert_eq!(record.digest, Some(Digest::from(1234567)));
        assert_eq!(record.digest.as_ref().unwrap().to_string(), "1234567");

        let record = GameplayRecord::from_json(r#"{"events":[],"digest":"1234567"}"#).unwrap();
        assert_eq!(record.digest, Some(Digest::from("1234567")));
        assert_ne!(Digest::from("1234567"), Digest::from(1234567));
    }

    #[test]
    fn test_optional_fields_omitted_on_output() {
        let json = GameplayRecord::new(Vec::new()).to_json().unwrap();
        assert_eq!(json, r#"{"events":[],"stats":[]}"#);
    }

    #[test]
    fn test_event_conversion_keeps_modifiers() {
        let mut input = InputEvent::key("keydown", "a", 5.0);
        input.ctrl_key = true;
        input.key_code = 65;
        let event = input.to_event();
        assert!(event.bubbles);
        assert!(event.cancelable);
        assert_eq!(InputEvent::from_event(&event), input);
    }

    #[test]
    fn test_recorder_rejects_backwards_time() {
        let mut recorder = InputRecorder::new();
        recorder.record(InputEvent::key("keydown", "w", 10.0)).unwrap();
        recorder.record(InputEvent::key("keyup", "w", 10.0)).unwrap();
        let err = recorder.record(InputEvent::key("keydown", "s", 9.0)).unwrap_err();
        assert!(matches!(err, RecordError::NonMonotonic { previous, got } if previous == 10.0 && got == 9.0));
        assert_eq!(recorder.len(), 2);

        let record = recorder.finish(Some("Ada".into()), Vec::new(), Some("abc".into()));
        assert_eq!(record.events.len(), 2);
        assert_eq!(record.player_name.as_deref(), Some("Ada"));
    }
}
