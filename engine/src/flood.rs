use std::collections::VecDeque;

use crate::utils::{HeightMap2D, WaterMask2D};

// The four cardinal directions: up, right, down, left
const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

// Multi-source BFS flood fill over an elevation map.
//
// Sources are (col, row) pairs. A source seeds the flood only if it is
// in bounds and its elevation is at or below `water_level`; from there
// the water spreads through 4-connected neighbours whose elevation is
// at or below `water_level`. Each cell is enqueued at most once, so a
// call does O(rows·cols) work and always terminates.
//
// The result depends only on the arguments, never on source order.
pub fn flood2(grid: &HeightMap2D, sources: &[(usize, usize)], water_level: f32) -> WaterMask2D {
    let num_rows = grid.len();
    let num_cols = if num_rows > 0 { grid[0].len() } else { 0 };

    let mut flooded = vec![vec![false; num_cols]; num_rows];
    let mut queue = VecDeque::new();

    // Seed the frontier with every in-bounds source at or below the water level
    for &(col, row) in sources {
        if row >= num_rows || col >= num_cols {
            continue;
        }
        if !flooded[row][col] && grid[row][col] <= water_level {
            flooded[row][col] = true;
            queue.push_back((row, col));
        }
    }

    while let Some((row, col)) = queue.pop_front() {
        for &(dr, dc) in &DIRECTIONS {
            let nr = row as isize + dr;
            let nc = col as isize + dc;
            if nr < 0 || nr >= num_rows as isize || nc < 0 || nc >= num_cols as isize {
                continue;
            }
            let (nr, nc) = (nr as usize, nc as usize);
            if !flooded[nr][nc] && grid[nr][nc] <= water_level {
                flooded[nr][nc] = true;
                queue.push_back((nr, nc));
            }
        }
    }

    flooded
}
