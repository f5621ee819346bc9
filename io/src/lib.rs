// io holds the .terrain file parser and the PNG/GIF frame encoders
pub mod encode;
pub mod parse;

pub use encode::{EncodeError, GifOptions, save_gif, save_png};
pub use parse::{TerrainFileError, load_terrain, parse_terrain};
