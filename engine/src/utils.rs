// 2D elevation map: row-major Vec<Vec<f32>> of size rows×cols
// access as `map[row][col]`.
pub type HeightMap2D = Vec<Vec<f32>>;

// Boolean flood mask with the same shape as the elevation map it was
// computed from. `true` = submerged.
pub type WaterMask2D = Vec<Vec<bool>>;

// Scan a height map once for its minimum and maximum elevation
pub fn min_max2(map: &HeightMap2D) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;

    for row in map.iter() {
        for &val in row.iter() {
            min = min.min(val);
            max = max.max(val);
        }
    }

    (min, max)
}

// Count the submerged cells in a flood mask
pub fn count_flooded2(mask: &WaterMask2D) -> usize {
    mask.iter()
        .map(|row| row.iter().filter(|&&wet| wet).count())
        .sum()
}
