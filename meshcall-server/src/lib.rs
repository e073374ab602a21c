mod relay;

pub use relay::{SessionRegistry, ws_handler};
