//! HTTP protocol layer module
//!
//! Range resolution, bounded streaming and response builders, decoupled from
//! how requests are routed onto the filesystem.

pub mod completion;
pub mod range;
pub mod response;
pub mod stream;

// Re-export commonly used types
pub use completion::OnComplete;
pub use range::{resolve_range, ByteRange, ResolvedRange};
pub use response::{
    build_404_response, build_405_response, build_500_response, build_options_response,
    ResponseBody,
};
pub use stream::{ContentStreamer, CHUNK_SIZE};
