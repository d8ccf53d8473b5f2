//! Request handlers.

pub mod health;
pub mod render;
pub mod sources;

pub use health::*;
pub use render::*;
pub use sources::*;
