// engine holds the flood fill, the color-ramp frame renderer, and the terrain session
pub mod flood;
pub mod font;
pub mod render;
pub mod session;
pub mod utils;

pub use flood::flood2;
pub use render::{FrameSeries, band_color, render_frame2};
pub use session::Terrain2D;
pub use utils::{count_flooded2, min_max2};
