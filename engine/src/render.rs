use image::{Rgb, RgbImage};
use palette::Srgb;

use crate::font::draw_text;
use crate::session::Terrain2D;
use crate::utils::{HeightMap2D, WaterMask2D};

const WATER_RGB: [u8; 3] = [0, 0, 255];
const LABEL_RGB: [u8; 3] = [255, 255, 255];
const LABEL_ANCHOR: (u32, u32) = (10, 10);

// Topographic color ramp over normalized elevation [0, 1]:
// dark green valleys through yellow mid-slopes up to red peaks.
// Bands are piecewise-constant, no interpolation between them.
const ELEVATION_BANDS: [(f32, [u8; 3]); 21] = [
    (0.00, [0, 60, 0]),
    (0.05, [0, 80, 0]),
    (0.10, [0, 100, 0]),
    (0.15, [0, 120, 0]),
    (0.20, [0, 140, 0]),
    (0.25, [0, 160, 0]),
    (0.30, [20, 180, 0]),
    (0.35, [40, 200, 0]),
    (0.40, [80, 215, 0]),
    (0.45, [120, 230, 0]),
    (0.50, [160, 240, 0]),
    (0.55, [200, 245, 0]),
    (0.60, [240, 240, 0]),
    (0.65, [250, 220, 0]),
    (0.70, [255, 200, 0]),
    (0.75, [255, 170, 0]),
    (0.80, [255, 140, 0]),
    (0.85, [255, 110, 0]),
    (0.90, [255, 80, 0]),
    (0.95, [255, 40, 0]),
    (1.00, [255, 0, 0]),
];

// Submerged cells always render in this fixed blue
pub fn water_color() -> Srgb<u8> {
    let [r, g, b] = WATER_RGB;
    Srgb::new(r, g, b)
}

// Map a normalized elevation to its band color: the band with the
// last threshold at or below the value. A value exactly on a threshold
// belongs to that band, never the previous one.
pub fn band_color(norm_elevation: f32) -> Srgb<u8> {
    for &(threshold, [r, g, b]) in ELEVATION_BANDS.iter().rev() {
        if norm_elevation >= threshold {
            return Srgb::new(r, g, b);
        }
    }
    // below the first threshold
    let [r, g, b] = ELEVATION_BANDS[0].1;
    Srgb::new(r, g, b)
}

fn to_pixel(color: Srgb<u8>) -> Rgb<u8> {
    let (r, g, b) = color.into_components();
    Rgb([r, g, b])
}

// Render one frame: water overlay on top of the elevation ramp, with a
// "Water Level" label stamped at a fixed anchor. Image width is the
// grid's column count and height its row count.
pub fn render_frame2(
    grid: &HeightMap2D,
    mask: &WaterMask2D,
    terrain_min: f32,
    terrain_max: f32,
    level: f32,
) -> RgbImage {
    let num_rows = grid.len();
    let num_cols = grid[0].len();
    let range = terrain_max - terrain_min;

    let mut img = RgbImage::new(num_cols as u32, num_rows as u32);
    for row in 0..num_rows {
        for col in 0..num_cols {
            let color = if mask[row][col] {
                water_color()
            } else {
                // flat terrain normalizes to 0 instead of dividing by zero
                let norm = if range > 0.0 {
                    (grid[row][col] - terrain_min) / range
                } else {
                    0.0
                };
                band_color(norm)
            };
            img.put_pixel(col as u32, row as u32, to_pixel(color));
        }
    }

    let [r, g, b] = LABEL_RGB;
    draw_text(
        &mut img,
        LABEL_ANCHOR.0,
        LABEL_ANCHOR.1,
        &format!("Water Level: {level:.1}"),
        Rgb([r, g, b]),
    );

    img
}

// Lazy frame sequence over ascending water levels.
//
// Yields (level, frame) pairs for start, start+step, ... and keeps
// going until the level passes end + step, so the final frame always
// reaches at least `end` even when the range is not a step multiple.
// Nothing is rendered ahead of the consumer, so peak memory stays at
// one frame regardless of how many levels the range covers.
pub struct FrameSeries<'a> {
    terrain: &'a Terrain2D,
    start: f32,
    end: f32,
    step: f32,
    index: usize,
}

impl<'a> FrameSeries<'a> {
    pub(crate) fn new(terrain: &'a Terrain2D, start: f32, end: f32, step: f32) -> Self {
        Self {
            terrain,
            start,
            end,
            step,
            index: 0,
        }
    }

    pub(crate) fn empty(terrain: &'a Terrain2D) -> Self {
        Self::new(terrain, 0.0, 0.0, 0.0)
    }

    // The water level the next frame will be rendered at, if any
    pub fn next_level(&self) -> Option<f32> {
        let level = self.start + self.index as f32 * self.step;
        if self.step <= 0.0 || level >= self.end + self.step {
            None
        } else {
            Some(level)
        }
    }
}

impl Iterator for FrameSeries<'_> {
    type Item = (f32, RgbImage);

    fn next(&mut self) -> Option<Self::Item> {
        let level = self.next_level()?;
        self.index += 1;
        Some((level, self.terrain.render_frame(level)))
    }
}

#[cfg(test)]
mod tests {
    use super::{band_color, render_frame2, to_pixel, water_color};
    use crate::session::Terrain2D;
    use image::Rgb;

    #[test]
    fn band_color_thresholds_are_inclusive() {
        // a value exactly on a threshold takes that band's color
        assert_eq!(band_color(0.0).into_components(), (0, 60, 0));
        assert_eq!(band_color(0.05).into_components(), (0, 80, 0));
        assert_eq!(band_color(0.95).into_components(), (255, 40, 0));
        assert_eq!(band_color(1.0).into_components(), (255, 0, 0));
    }

    #[test]
    fn band_color_between_thresholds_takes_lower_band() {
        assert_eq!(band_color(0.07).into_components(), (0, 80, 0));
        assert_eq!(band_color(0.99).into_components(), (255, 40, 0));
    }

    #[test]
    fn band_color_clamps_out_of_range() {
        assert_eq!(band_color(-0.5).into_components(), (0, 60, 0));
        assert_eq!(band_color(1.5).into_components(), (255, 0, 0));
    }

    #[test]
    fn render_frame2_dimensions_follow_grid() {
        let grid = vec![vec![0.0; 7]; 3];
        let mask = vec![vec![false; 7]; 3];
        let img = render_frame2(&grid, &mask, 0.0, 1.0, 0.0);
        // width = cols, height = rows
        assert_eq!(img.dimensions(), (7, 3));
    }

    #[test]
    fn render_frame2_flooded_cells_are_blue() {
        let grid = vec![vec![0.0, 1.0]];
        let mask = vec![vec![true, false]];
        let img = render_frame2(&grid, &mask, 0.0, 1.0, 0.5);
        assert_eq!(*img.get_pixel(0, 0), to_pixel(water_color()));
        assert_eq!(*img.get_pixel(1, 0), to_pixel(band_color(1.0)));
    }

    #[test]
    fn render_frame2_flat_terrain_uses_lowest_band() {
        let grid = vec![vec![4.0; 50]; 40];
        let mask = vec![vec![false; 50]; 40];
        let img = render_frame2(&grid, &mask, 4.0, 4.0, 0.0);
        // away from the label every pixel sits in band 0
        assert_eq!(*img.get_pixel(0, 39), to_pixel(band_color(0.0)));
        assert_eq!(*img.get_pixel(49, 39), to_pixel(band_color(0.0)));
    }

    #[test]
    fn render_frame2_stamps_label() {
        let grid = vec![vec![0.0; 120]; 30];
        let mask = vec![vec![false; 120]; 30];
        let img = render_frame2(&grid, &mask, 0.0, 1.0, 5.0);
        // 'W' puts a stroke in the label anchor's top-left corner
        assert_eq!(*img.get_pixel(10, 10), Rgb([255, 255, 255]));
    }

    #[test]
    fn frame_series_levels_ascend_and_reach_end() {
        let grid = vec![vec![0.0, 10.0]];
        let terrain = Terrain2D::new(grid, &[(0, 0)]);
        let levels: Vec<f32> = terrain
            .render_series(Some(0.0), Some(7.0), 3.0)
            .map(|(level, _)| level)
            .collect();
        // arange semantics: the last level passes the end bound
        assert_eq!(levels, vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn frame_series_single_level_when_range_is_zero() {
        let grid = vec![vec![5.0]];
        let terrain = Terrain2D::new(grid, &[(0, 0)]);
        let levels: Vec<f32> = terrain
            .render_series(None, None, 2.0)
            .map(|(level, _)| level)
            .collect();
        assert_eq!(levels, vec![5.0]);
    }

    #[test]
    fn frame_series_zero_step_is_empty() {
        let grid = vec![vec![0.0, 10.0]];
        let terrain = Terrain2D::new(grid, &[(0, 0)]);
        assert_eq!(terrain.render_series(None, None, 0.0).count(), 0);
        assert_eq!(terrain.render_series(None, None, -1.0).count(), 0);
    }
}
