use std::fmt;

use image::RgbImage;
use log::warn;

use crate::flood::flood2;
use crate::render::{FrameSeries, render_frame2};
use crate::utils::{HeightMap2D, WaterMask2D, min_max2};

// One loaded terrain dataset: the elevation grid, its validated water
// sources, and the precomputed values every flood query and render needs.
// All queries borrow it immutably, so evaluating several water levels
// in parallel over one session is safe.
#[derive(Debug)]
pub struct Terrain2D {
    grid: HeightMap2D,
    num_rows: usize,
    num_cols: usize,
    sources: Vec<(usize, usize)>,
    min_elevation: f32,
    max_elevation: f32,
    baseline_level: Option<f32>,
}

impl Terrain2D {
    // Sources are (col, row) pairs as declared in the terrain file.
    // Out-of-bounds sources are dropped with a warning; the elevation of
    // the first valid one becomes the dataset's baseline water level.
    pub fn new(grid: HeightMap2D, declared_sources: &[(i64, i64)]) -> Self {
        assert!(
            !grid.is_empty() && !grid[0].is_empty(),
            "terrain grid must have at least one cell"
        );
        let num_rows = grid.len();
        let num_cols = grid[0].len();

        let mut sources = Vec::with_capacity(declared_sources.len());
        for &(col, row) in declared_sources {
            if col < 0 || row < 0 || col >= num_cols as i64 || row >= num_rows as i64 {
                warn!(
                    "water source at ({col}, {row}) is outside the \
                     {num_rows}x{num_cols} terrain, skipping"
                );
                continue;
            }
            sources.push((col as usize, row as usize));
        }

        let baseline_level = sources.first().map(|&(col, row)| grid[row][col]);
        if baseline_level.is_none() {
            warn!("terrain has no valid water sources; flood series need an explicit start level");
        }

        let (min_elevation, max_elevation) = min_max2(&grid);

        Self {
            grid,
            num_rows,
            num_cols,
            sources,
            min_elevation,
            max_elevation,
            baseline_level,
        }
    }

    // (rows, cols)
    pub fn size(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    pub fn grid(&self) -> &HeightMap2D {
        &self.grid
    }

    // the in-bounds (col, row) sources that survived validation
    pub fn sources(&self) -> &[(usize, usize)] {
        &self.sources
    }

    pub fn min_elevation(&self) -> f32 {
        self.min_elevation
    }

    pub fn max_elevation(&self) -> f32 {
        self.max_elevation
    }

    // None when the terrain declared no usable water source
    pub fn baseline_level(&self) -> Option<f32> {
        self.baseline_level
    }

    // Flood mask at the given water level; a fresh mask per call
    pub fn flood(&self, water_level: f32) -> WaterMask2D {
        flood2(&self.grid, &self.sources, water_level)
    }

    // Flood at the given level, then render the frame for it
    pub fn render_frame(&self, water_level: f32) -> RgbImage {
        let mask = self.flood(water_level);
        render_frame2(
            &self.grid,
            &mask,
            self.min_elevation,
            self.max_elevation,
            water_level,
        )
    }

    // Frames for ascending water levels from min_level to max_level.
    //
    // min_level is clamped up to the baseline water level and max_level
    // down to the highest elevation; out-of-range input is corrected
    // silently. Without a baseline the caller must pass min_level
    // explicitly, otherwise the series is empty.
    pub fn render_series(
        &self,
        min_level: Option<f32>,
        max_level: Option<f32>,
        step: f32,
    ) -> FrameSeries<'_> {
        if step <= 0.0 {
            warn!("water level step must be positive, got {step}; series is empty");
            return FrameSeries::empty(self);
        }

        let start = match (min_level, self.baseline_level) {
            (Some(level), Some(baseline)) => level.max(baseline),
            (Some(level), None) => level,
            (None, Some(baseline)) => baseline,
            (None, None) => {
                warn!("no water sources and no explicit start level; series is empty");
                return FrameSeries::empty(self);
            }
        };
        let end = max_level.map_or(self.max_elevation, |level| level.min(self.max_elevation));

        FrameSeries::new(self, start, end, step)
    }
}

impl fmt::Display for Terrain2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows x {} cols, elevation {}..{}, {} sources, baseline {}",
            self.num_rows,
            self.num_cols,
            self.min_elevation,
            self.max_elevation,
            self.sources.len(),
            match self.baseline_level {
                Some(level) => level.to_string(),
                None => "none".to_string(),
            },
        )
    }
}
