//! The sandbox: document, clock, input feed and capture wired together
//!
//! A [`Program`] runs its own loop and calls back into the [`Host`] once per
//! tick. Everything it touches is owned by the sandbox instance, so two
//! sandboxes never share listener or log state.

use pop_dom::{Document, NodeId};
use tracing::{debug, info};

use crate::capture::{CaptureSink, EndHandler, Frame, FrameHandler, StillCapture};
use crate::clock::{Clock, SteppingPolicy};
use crate::config::{InputTarget, SandboxConfig};
use crate::digest::{verify, Digester, Verification};
use crate::error::{ProgramError, SandboxError};
use crate::feed::InputFeed;
use crate::record::{Digest, GameplayRecord, StatsSnapshot};

/// A program that runs inside the sandbox
pub trait Program {
    fn run(&mut self, host: &mut Host<'_>) -> Result<(), ProgramError>;
}

/// Program log lines for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLog {
    lines: Vec<String>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, mirrored to tracing under target `program`
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!(target: "program", "{line}");
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines joined with `"; "`
    pub fn joined(&self) -> String {
        self.lines.join("; ")
    }
}

/// Everything a finished session produced
#[derive(Debug)]
pub struct SessionOutcome {
    /// The replayed input log with the new stats history and computed digest
    pub record: GameplayRecord,
    pub verification: Verification,
    /// Still frame as PNG, when still capture was enabled and reached
    pub still_png: Option<Vec<u8>>,
    pub log: SessionLog,
    pub frames: u64,
    /// The document as the program left it
    pub document: Document,
}

/// Per-session mutable state handed to the program through [`Host`]
struct Session {
    document: Document,
    feed: InputFeed,
    capture: CaptureSink,
    log: SessionLog,
    player_name: String,
    target: NodeId,
    record: Option<GameplayRecord>,
}

/// The program's view of the sandbox
pub struct Host<'a> {
    session: &'a mut Session,
    clock: &'a dyn Clock,
    stepping: SteppingPolicy,
    digester: &'a dyn Digester,
    config: &'a SandboxConfig,
    ticks: u64,
}

impl Host<'_> {
    pub fn document(&self) -> &Document {
        &self.session.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.session.document
    }

    pub fn config(&self) -> &SandboxConfig {
        self.config
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Ticks started so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Start a tick: step the clock and deliver every input now due
    ///
    /// Returns the tick's virtual time in milliseconds.
    pub fn begin_tick(&mut self) -> Result<f64, ProgramError> {
        if self.session_ended() {
            return Err(ProgramError::SessionEnded);
        }
        self.stepping.step(self.clock);
        self.ticks += 1;
        let now = self.clock.now_ms();

        let session = &mut *self.session;
        let delivered = session.feed.deliver_due(now, &session.document, session.target)?;
        if delivered > 0 {
            debug!(tick = self.ticks, now, delivered, "tick input");
        }
        Ok(now)
    }

    /// Hand the current frame to the capture sink at the current time
    ///
    /// Returns false if the frame was dropped for not advancing the tick.
    pub fn present(&mut self, frame: Frame<'_>) -> Result<bool, ProgramError> {
        if self.session_ended() {
            return Err(ProgramError::SessionEnded);
        }
        let tick = self.clock.now_ms();
        Ok(self.session.capture.frame(&frame, tick))
    }

    pub fn record_stats(&mut self, snapshot: StatsSnapshot) {
        self.session.capture.record_stats(snapshot);
    }

    /// Line-oriented program log
    pub fn log(&mut self, line: impl Into<String>) {
        self.session.log.push(line);
    }

    /// Use this digest instead of the sandbox's digester
    pub fn submit_digest(&mut self, digest: Digest) {
        self.session.capture.submit_digest(digest);
    }

    pub fn input_exhausted(&self) -> bool {
        self.session.feed.is_exhausted()
    }

    /// Timestamp of the last recorded input
    pub fn last_input_time(&self) -> Option<f64> {
        self.session.feed.events().last().map(|e| e.time_stamp)
    }

    pub fn session_ended(&self) -> bool {
        self.session.capture.is_finalized()
    }

    /// Finalize the record; later calls are no-ops
    pub fn end_session(&mut self) {
        let session = &mut *self.session;
        if let Some(record) = session
            .capture
            .finalize(&session.player_name, session.feed.events(), self.digester)
        {
            info!(ticks = self.ticks, now = self.clock.now_ms(), "session ended");
            session.record = Some(record);
        }
    }
}

/// Headless replay sandbox
pub struct Sandbox {
    config: SandboxConfig,
    clock: Box<dyn Clock>,
    digester: Box<dyn Digester>,
    armed: Option<GameplayRecord>,
    frame_handlers: Vec<FrameHandler>,
    end_handlers: Vec<EndHandler>,
}

impl Sandbox {
    pub fn new(config: SandboxConfig, clock: impl Clock + 'static, digester: impl Digester + 'static) -> Self {
        Self {
            config,
            clock: Box::new(clock),
            digester: Box::new(digester),
            armed: None,
            frame_handlers: Vec::new(),
            end_handlers: Vec::new(),
        }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Load the record whose input will be replayed and whose digest is the claim
    pub fn arm(&mut self, record: GameplayRecord) {
        info!(
            player = record.player_name.as_deref().unwrap_or(&self.config.player_name),
            events = record.events.len(),
            claimed = record.digest.is_some(),
            "sandbox armed"
        );
        self.armed = Some(record);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Register a per-tick frame callback (e.g. a video encoder)
    pub fn on_frame(&mut self, handler: FrameHandler) {
        self.frame_handlers.push(handler);
    }

    pub fn on_session_end(&mut self, handler: EndHandler) {
        self.end_handlers.push(handler);
    }

    /// Run `program` against the armed record
    pub fn run(self, program: &mut dyn Program) -> Result<SessionOutcome, SandboxError> {
        let Sandbox {
            config,
            clock,
            digester,
            armed,
            frame_handlers,
            end_handlers,
        } = self;
        let claimed = armed.ok_or(SandboxError::NotArmed)?;
        let feed = InputFeed::arm(claimed.events.clone());

        let mut capture = CaptureSink::new();
        if config.still_capture {
            capture = capture.with_still(StillCapture::for_events(feed.events()));
        }
        for handler in frame_handlers {
            capture.on_frame(handler);
        }
        for handler in end_handlers {
            capture.on_session_end(handler);
        }

        let document = Document::new();
        let target = match config.input_target {
            InputTarget::Document => document.root(),
            InputTarget::Body => document.body(),
        };
        let player_name = claimed
            .player_name
            .clone()
            .unwrap_or_else(|| config.player_name.clone());

        let mut session = Session {
            document,
            feed,
            capture,
            log: SessionLog::new(),
            player_name,
            target,
            record: None,
        };

        info!(
            player = %session.player_name,
            events = session.feed.len(),
            tick_ms = config.tick_ms,
            "session started"
        );

        let mut host = Host {
            session: &mut session,
            clock: clock.as_ref(),
            stepping: config.stepping(),
            digester: digester.as_ref(),
            config: &config,
            ticks: 0,
        };
        program.run(&mut host)?;

        let record = session.record.take().ok_or(SandboxError::SessionNotEnded)?;
        let verification = verify(&claimed, &record);
        let still_png = session.capture.take_still().and_then(StillCapture::into_png);

        Ok(SessionOutcome {
            record,
            verification,
            still_png,
            log: session.log,
            frames: session.capture.frames(),
            document: session.document,
        })
    }
}

impl std::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sandbox")
            .field("config", &self.config)
            .field("now_ms", &self.clock.now_ms())
            .field("armed", &self.armed.is_some())
            .finish()
    }
}
