pub mod game_data;
pub mod pgn;

pub use game_data::{GameMetadata, MainLine};
pub use pgn::{parse_main_lines, MainLineReader, PgnError};
