mod http;
mod trait_def;

pub use http::HttpStatClient;
pub use trait_def::{StatClient, UpstreamChunk};
