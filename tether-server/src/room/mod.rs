mod membership_table;
mod room_directory;

pub use membership_table::*;
pub use room_directory::*;
