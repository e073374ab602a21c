mod registry;
mod ws_handler;

pub use registry::*;
pub use ws_handler::*;
