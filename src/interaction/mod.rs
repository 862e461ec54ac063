//! Operator confirmation gates
//!
//! Gates only report the operator's decision. Acting on a refusal is left to
//! the caller so that tests can assert on the decision itself.

pub mod mocks;
pub mod prompts;

pub use mocks::ScriptedPrompter;
pub use prompts::{is_affirmative, matches_phrase, Prompter, TerminalPrompter};
