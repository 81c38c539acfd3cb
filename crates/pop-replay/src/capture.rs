//! Capture sink: per-tick frames, stats history and end-of-session
//!
//! Frames borrow the program's pixel buffer and live only for the duration
//! of the callback. The one exception is the still frame, which is encoded
//! to PNG on the spot rather than retained raw.

use std::fmt;

use pop_png::{encode_rgba, PngResult};
use tracing::{debug, error, info, warn};

use crate::digest::Digester;
use crate::record::{Digest, GameplayRecord, InputEvent, StatsSnapshot};

/// One rendered RGBA frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Wrap a `width * height * 4` buffer
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> PngResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(pop_png::PngError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn to_png(&self) -> PngResult<Vec<u8>> {
        encode_rgba(self.width, self.height, self.data)
    }
}

/// Frame callback: `(frame, tick)` where tick is virtual milliseconds
pub type FrameHandler = Box<dyn FnMut(&Frame<'_>, f64)>;
/// End-of-session callback
pub type EndHandler = Box<dyn FnMut(&GameplayRecord)>;

/// Selects the first frame at or past a threshold tick
#[derive(Debug, Clone, PartialEq)]
pub struct StillCapture {
    threshold: f64,
    png: Option<Vec<u8>>,
}

impl StillCapture {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, png: None }
    }

    /// Threshold at half the latest input timestamp (0 for an empty log)
    pub fn for_events(events: &[InputEvent]) -> Self {
        let latest = events
            .iter()
            .map(|e| e.time_stamp)
            .max_by(f64::total_cmp)
            .unwrap_or(0.0);
        Self::new(latest / 2.0)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_captured(&self) -> bool {
        self.png.is_some()
    }

    pub fn png(&self) -> Option<&[u8]> {
        self.png.as_deref()
    }

    pub fn into_png(self) -> Option<Vec<u8>> {
        self.png
    }

    /// Offer a frame; returns true if it became the still
    pub fn offer(&mut self, frame: &Frame<'_>, tick: f64) -> bool {
        if self.png.is_some() || tick < self.threshold {
            return false;
        }
        match frame.to_png() {
            Ok(png) => {
                info!(tick, threshold = self.threshold, bytes = png.len(), "still frame captured");
                self.png = Some(png);
                true
            }
            Err(err) => {
                warn!(tick, %err, "still frame could not be encoded");
                false
            }
        }
    }
}

/// Receives frames and stats while the program runs
#[derive(Default)]
pub struct CaptureSink {
    stats: Vec<StatsSnapshot>,
    last_tick: Option<f64>,
    frames: u64,
    still: Option<StillCapture>,
    submitted_digest: Option<Digest>,
    frame_handlers: Vec<FrameHandler>,
    end_handlers: Vec<EndHandler>,
    finalized: bool,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_still(mut self, still: StillCapture) -> Self {
        self.still = Some(still);
        self
    }

    pub fn on_frame(&mut self, handler: FrameHandler) {
        self.frame_handlers.push(handler);
    }

    pub fn on_session_end(&mut self, handler: EndHandler) {
        self.end_handlers.push(handler);
    }

    /// Per-tick frame callback
    ///
    /// Ticks must strictly increase; a repeated or earlier tick is dropped
    /// and `false` returned.
    pub fn frame(&mut self, frame: &Frame<'_>, tick: f64) -> bool {
        if let Some(last) = self.last_tick {
            if tick <= last {
                warn!(tick, last, "frame tick not increasing, dropped");
                return false;
            }
        }
        self.last_tick = Some(tick);
        self.frames += 1;

        for handler in &mut self.frame_handlers {
            handler(frame, tick);
        }
        if let Some(still) = &mut self.still {
            still.offer(frame, tick);
        }
        true
    }

    /// Append to the stats history
    pub fn record_stats(&mut self, snapshot: StatsSnapshot) {
        debug!(
            timestamp = snapshot.timestamp,
            health = snapshot.health,
            armor = snapshot.armor,
            "stats"
        );
        self.stats.push(snapshot);
    }

    /// Use a program-computed digest instead of the digester
    pub fn submit_digest(&mut self, digest: Digest) {
        self.submitted_digest = Some(digest);
    }

    pub fn stats(&self) -> &[StatsSnapshot] {
        &self.stats
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_tick(&self) -> Option<f64> {
        self.last_tick
    }

    pub fn still(&self) -> Option<&StillCapture> {
        self.still.as_ref()
    }

    pub fn take_still(&mut self) -> Option<StillCapture> {
        self.still.take()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Produce the final record and fire end-of-session handlers
    ///
    /// Only the first call does anything; later calls return `None`.
    pub fn finalize(
        &mut self,
        player_name: &str,
        events: &[InputEvent],
        digester: &dyn Digester,
    ) -> Option<GameplayRecord> {
        if self.finalized {
            return None;
        }
        self.finalized = true;

        let stats = std::mem::take(&mut self.stats);
        // A digest that cannot be computed leaves the record without one.
        let digest = match self.submitted_digest.take() {
            Some(digest) => Some(digest),
            None => match digester.digest(events, &stats) {
                Ok(digest) => Some(digest),
                Err(err) => {
                    error!(%err, "session digest failed");
                    None
                }
            },
        };
        let record = GameplayRecord {
            player_name: Some(player_name.to_string()),
            events: events.to_vec(),
            stats,
            digest,
        };

        info!(
            frames = self.frames,
            stats = record.stats.len(),
            digest = %record.digest.as_ref().map(ToString::to_string).unwrap_or_default(),
            "session finalized"
        );
        for handler in &mut self.end_handlers {
            handler(&record);
        }
        Some(record)
    }
}

impl fmt::Debug for CaptureSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSink")
            .field("stats", &self.stats.len())
            .field("last_tick", &self.last_tick)
            .field("frames", &self.frames)
            .field("still", &self.still)
            .field("frame_handlers", &self.frame_handlers.len())
            .field("end_handlers", &self.end_handlers.len())
            .field("finalized", &self.finalized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::digest::{verify, Blake3Digester};
    use crate::error::RecordError;

    const PIXELS: [u8; 16] = [255; 16];

    fn frame() -> Frame<'static> {
        Frame::new(2, 2, &PIXELS).unwrap()
    }

    #[test]
    fn test_frame_rejects_wrong_length() {
        assert!(Frame::new(2, 2, &PIXELS[..12]).is_err());
    }

    #[test]
    fn test_ticks_must_increase() {
        let mut sink = CaptureSink::new();
        assert!(sink.frame(&frame(), 10.0));
        assert!(!sink.frame(&frame(), 10.0));
        assert!(!sink.frame(&frame(), 5.0));
        assert!(sink.frame(&frame(), 11.0));
        assert_eq!(sink.frames(), 2);
    }

    #[test]
    fn test_still_selected_at_threshold() {
        let events = vec![
            InputEvent::key("keydown", "w", 0.0),
            InputEvent::key("keyup", "w", 100.0),
        ];
        let mut sink = CaptureSink::new().with_still(StillCapture::for_events(&events));
        assert_eq!(sink.still().unwrap().threshold(), 50.0);

        sink.frame(&frame(), 28.0);
        assert!(!sink.still().unwrap().is_captured());
        sink.frame(&frame(), 57.0);
        let png = sink.still().unwrap().png().unwrap().to_vec();
        sink.frame(&frame(), 86.0);
        assert_eq!(sink.take_still().unwrap().into_png().unwrap(), png);
    }

    #[test]
    fn test_still_threshold_ignores_log_order() {
        let events = vec![
            InputEvent::key("keydown", "b", 80.0),
            InputEvent::key("keydown", "a", 5.0),
        ];
        assert_eq!(StillCapture::for_events(&events).threshold(), 40.0);
        assert_eq!(StillCapture::for_events(&[]).threshold(), 0.0);
    }

    #[test]
    fn test_frame_handlers_see_every_frame() {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let mut sink = CaptureSink::new();
        sink.on_frame(Box::new(move |f, _| {
            assert_eq!(f.width(), 2);
            seen.set(seen.get() + 1);
        }));
        sink.frame(&frame(), 1.0);
        sink.frame(&frame(), 2.0);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_finalize_fires_once() {
        let fired = Rc::new(Cell::new(0));
        let seen = Rc::clone(&fired);
        let mut sink = CaptureSink::new();
        sink.on_session_end(Box::new(move |record| {
            assert!(record.digest.is_some());
            seen.set(seen.get() + 1);
        }));
        sink.record_stats(StatsSnapshot { timestamp: 28.0, health: 100, ..Default::default() });

        let events = [InputEvent::key("keydown", "w", 0.0)];
        let record = sink.finalize("Anonymous", &events, &Blake3Digester).unwrap();
        assert_eq!(record.stats.len(), 1);
        assert_eq!(record.player_name.as_deref(), Some("Anonymous"));
        assert!(sink.finalize("Anonymous", &events, &Blake3Digester).is_none());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_submitted_digest_wins() {
        let mut sink = CaptureSink::new();
        sink.submit_digest(Digest::from(42));
        let record = sink.finalize("p", &[], &Blake3Digester).unwrap();
        assert_eq!(record.digest, Some(Digest::from(42)));
    }

    struct Unhashable;

    impl Digester for Unhashable {
        fn digest(&self, _: &[InputEvent], _: &[StatsSnapshot]) -> Result<Digest, RecordError> {
            let err = serde_json::from_str::<u8>("not json").unwrap_err();
            Err(RecordError::Encode(err))
        }
    }

    #[test]
    fn test_failed_digest_leaves_record_unverifiable() {
        let mut sink = CaptureSink::new();
        let record = sink.finalize("p", &[], &Unhashable).unwrap();
        assert_eq!(record.digest, None);

        let mut claimed = GameplayRecord::new(Vec::new());
        claimed.digest = Some(Digest::from("claimed"));
        let verification = verify(&claimed, &record);
        assert!(!verification.is_verified());
        assert_eq!(verification.computed(), None);
    }
}
