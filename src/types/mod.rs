//! Core types shared by the parser, the interpreter and the save store
//!
//! - Command: pre-parsed form of one script line
//! - Script: the loaded lines and their label table
//! - Signal: what the interpreter tells the runner after a line
//! - GameState: variables, choice history and endings of a run

pub mod command;
pub mod script;
pub mod signal;
pub mod state;

pub use command::{ChoiceOption, Command, SayArgs, SetOp, TextColor};
pub use script::Script;
pub use signal::{Interrupt, Signal};
pub use state::GameState;
