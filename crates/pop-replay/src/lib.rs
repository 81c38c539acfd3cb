//! Proof-of-play replay sandbox
//!
//! Runs a program against a recorded input log on a virtual clock, collects
//! its frames and stats, and checks the resulting digest against the claim.
//!
//! # Example
//!
//! ```ignore
//! let record = GameplayRecord::from_json(&text)?;
//! let mut sandbox = Sandbox::new(SandboxConfig::default(), VirtualClock::default(), Blake3Digester);
//! sandbox.arm(record);
//! let outcome = sandbox.run(&mut program)?;
//! println!("{}", outcome.verification);
//! ```

pub mod capture;
pub mod clock;
pub mod config;
pub mod digest;
pub mod error;
pub mod feed;
pub mod record;
pub mod sandbox;
pub mod summary;

pub use capture::{CaptureSink, EndHandler, Frame, FrameHandler, StillCapture};
pub use clock::{Clock, SteppingPolicy, SystemClock, VirtualClock};
pub use config::{InputTarget, SandboxConfig};
pub use digest::{verify, Blake3Digester, Digester, Verification};
pub use error::{ConfigError, ProgramError, RecordError, SandboxError};
pub use feed::InputFeed;
pub use record::{Digest, GameplayRecord, InputEvent, InputRecorder, StatsSnapshot};
pub use sandbox::{Host, Program, Sandbox, SessionLog, SessionOutcome};
pub use summary::{SessionSummary, STATUS_FLAGGED, STATUS_VERIFIED};

/// Result type for sandbox runs
pub type SandboxResult<T> = Result<T, SandboxError>;
