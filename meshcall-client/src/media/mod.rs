mod devices;
mod manager;
mod track;

pub use devices::*;
pub use manager::*;
pub use track::*;
