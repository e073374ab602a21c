mod command;
mod controller;
mod link;

pub use command::*;
pub use controller::*;
pub use link::*;
