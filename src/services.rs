pub mod compose;
pub mod dockerfile;
mod generator;
pub mod validate;

pub use compose::{compose, render_compose};
pub use dockerfile::dockerfile;
pub use generator::{Generator, Rendered};
pub use validate::selection_warnings;
