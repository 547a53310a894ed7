//! # pgn
//!
//! An interpreter for PGN visual novel scripts: line-oriented text files of
//! `say`, `choose`, `if`, `jump`, `set` and friends. Each line is parsed when
//! it is about to run, so a mistake on one line is reported and skipped
//! instead of stopping the story.
//!
//! Everything the engine shows or asks for goes through the traits in
//! [`host`], so the same runner drives the terminal player and tests.
//!
//! ## Quick Start
//!
//! ```rust
//! use pgn::config::EngineConfig;
//! use pgn::host::{Host, MemoryEndingStore, MemoryFileViewer, MemoryPluginHost, ScriptedPresentation};
//! use pgn::runtime::{RunOutcome, ScriptRunner, StartMode};
//! use pgn::types::Script;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let script = Script::from_source(
//!     "Novel/demo/demo.pgn",
//!     "say \"Left or right?\"\nchoose 2 left:Left right:Right\nleft:\nsay \"You went left.\"\nend\nright:\nsay \"You went right.\"",
//! );
//!
//! let mut presentation = ScriptedPresentation::new().with_choices([1]);
//! let mut plugins = MemoryPluginHost::new();
//! let mut viewer = MemoryFileViewer::new();
//! let mut endings = MemoryEndingStore::new();
//! let host = Host::new(&mut presentation, &mut plugins, &mut viewer, &mut endings);
//!
//! let outcome = ScriptRunner::new(&EngineConfig::default(), host)
//!     .run_script(&script, StartMode::Fresh)?;
//!
//! assert_eq!(outcome, RunOutcome::Finished);
//! assert_eq!(presentation.texts(), ["Left or right?", "You went right."]);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod condition;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod parser;
pub mod runtime;
pub mod storage;
pub mod types;

pub use config::EngineConfig;
pub use error::{Diagnostic, EngineError, ScriptError};
pub use parser::parse_line;
pub use runtime::{LineInterpreter, RunOutcome, ScriptRunner, StartMode};
pub use storage::{load, save};
pub use types::{Command, GameState, Script, Signal};
