//! Command-line interface module.

mod commands;
mod render;
mod serve;

pub use commands::{Cli, Commands};
pub use render::{handle_batch, handle_render};
pub use serve::handle_serve;
