//! Request handler module
//!
//! Routes each request onto the working directory: listings for directories,
//! full or ranged content for files, 404 for anything else.

pub mod files;
pub mod listing;
pub mod router;
pub mod target;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
pub use target::ResolvedTarget;
