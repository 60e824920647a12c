// Horimono Directory - API Core
//
// Backend API for the tattoo studio/artist directory crawler. The HTTP layer
// is a thin admin surface over the `crawler` crate: it starts batch crawls,
// serves live progress, and stops running sessions.

pub mod config;
pub mod server;

pub use config::*;
