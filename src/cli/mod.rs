//! Command-line interface

pub mod args;
pub mod router;
pub mod selection;

pub use args::{Cli, Commands, TransferArgs};
pub use router::{execute_command, run};
pub use selection::{select, Selection};
