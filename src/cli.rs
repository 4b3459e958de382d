pub mod commands;
pub mod wizard;

pub use commands::{GenerateArgs, SelectionArgs};
pub use wizard::{Command, Flow, Step, Wizard, run_wizard};
