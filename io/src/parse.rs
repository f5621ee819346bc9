use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use engine::Terrain2D;
use engine::utils::HeightMap2D;
use log::warn;
use thiserror::Error;

// Structural failures while reading a .terrain file. Any of these abort
// the load; out-of-bounds water sources are not here on purpose, they
// only warn and get skipped.
#[derive(Debug, Error)]
pub enum TerrainFileError {
    #[error("not a terrain file: expected 'terrain' header, found {found:?}")]
    InvalidHeader { found: String },

    #[error("file ended early: expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("line {line}: expected an integer, found {token:?}")]
    BadInt { line: usize, token: String },

    #[error("line {line}: expected an elevation value, found {token:?}")]
    BadElevation { line: usize, token: String },

    #[error("line {line}: ragged elevation row, expected {expected} values, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("terrain file contains no elevation rows")]
    EmptyGrid,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn next_line(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
    line_no: &mut usize,
    expected: &'static str,
) -> Result<String, TerrainFileError> {
    *line_no += 1;
    match lines.next() {
        Some(Ok(line)) => Ok(line),
        Some(Err(err)) => Err(err.into()),
        None => Err(TerrainFileError::UnexpectedEof { expected }),
    }
}

fn parse_int(token: &str, line_no: usize) -> Result<i64, TerrainFileError> {
    token.parse().map_err(|_| TerrainFileError::BadInt {
        line: line_no,
        token: token.to_string(),
    })
}

// Parse a .terrain stream:
//
//   line 1:      the literal "terrain"
//   line 2:      <num_cols> <num_rows>
//   line 3:      <num_sources>
//   next n:      <col> <row> per source
//   remaining:   one grid row of whitespace-separated elevations per line
//
// The declared dimensions are validated as integers but the parsed
// elevation rows are authoritative; a mismatch only warns. Blank lines
// in the grid section are ignored.
pub fn parse_terrain<R: BufRead>(reader: R) -> Result<Terrain2D, TerrainFileError> {
    let mut lines = reader.lines();
    let mut line_no = 0;

    let header = next_line(&mut lines, &mut line_no, "'terrain' header")?;
    if header.trim() != "terrain" {
        return Err(TerrainFileError::InvalidHeader {
            found: header.trim().to_string(),
        });
    }

    let dims = next_line(&mut lines, &mut line_no, "grid dimensions")?;
    let mut declared = [0i64; 2];
    let mut tokens = dims.split_whitespace();
    for slot in declared.iter_mut() {
        let token = tokens.next().ok_or(TerrainFileError::UnexpectedEof {
            expected: "grid dimensions",
        })?;
        *slot = parse_int(token, line_no)?;
    }
    let (declared_cols, declared_rows) = (declared[0], declared[1]);

    let count_line = next_line(&mut lines, &mut line_no, "water source count")?;
    let num_sources = parse_int(count_line.trim(), line_no)?.max(0) as usize;

    let mut sources = Vec::with_capacity(num_sources);
    for _ in 0..num_sources {
        let line = next_line(&mut lines, &mut line_no, "water source coordinates")?;
        let mut tokens = line.split_whitespace();
        let col = parse_int(
            tokens.next().ok_or(TerrainFileError::UnexpectedEof {
                expected: "water source coordinates",
            })?,
            line_no,
        )?;
        let row = parse_int(
            tokens.next().ok_or(TerrainFileError::UnexpectedEof {
                expected: "water source coordinates",
            })?,
            line_no,
        )?;
        sources.push((col, row));
    }

    let mut grid: HeightMap2D = Vec::new();
    for line in lines {
        line_no += 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for token in line.split_whitespace() {
            let value: f32 = token.parse().map_err(|_| TerrainFileError::BadElevation {
                line: line_no,
                token: token.to_string(),
            })?;
            row.push(value);
        }
        if let Some(first) = grid.first() {
            if row.len() != first.len() {
                return Err(TerrainFileError::RaggedRow {
                    line: line_no,
                    expected: first.len(),
                    found: row.len(),
                });
            }
        }
        grid.push(row);
    }

    if grid.is_empty() || grid[0].is_empty() {
        return Err(TerrainFileError::EmptyGrid);
    }

    // the parsed shape wins over the declared one
    if declared_rows != grid.len() as i64 || declared_cols != grid[0].len() as i64 {
        warn!(
            "declared dimensions {declared_cols}x{declared_rows} differ from parsed \
             {}x{} grid, using the parsed shape",
            grid[0].len(),
            grid.len(),
        );
    }

    Ok(Terrain2D::new(grid, &sources))
}

// Open and parse a .terrain file from disk
pub fn load_terrain(path: impl AsRef<Path>) -> Result<Terrain2D, TerrainFileError> {
    let file = File::open(path.as_ref())?;
    parse_terrain(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::{TerrainFileError, parse_terrain};

    fn parse(text: &str) -> Result<engine::Terrain2D, TerrainFileError> {
        parse_terrain(text.as_bytes())
    }

    const BOWL: &str = "terrain\n3 3\n1\n1 1\n5 5 5\n5 1 5\n5 5 5\n";

    #[test]
    fn parse_terrain_valid_file() {
        let terrain = parse(BOWL).unwrap();
        assert_eq!(terrain.size(), (3, 3));
        assert_eq!(terrain.sources(), &[(1, 1)]);
        assert_eq!(terrain.baseline_level(), Some(1.0));
        assert_eq!(terrain.min_elevation(), 1.0);
        assert_eq!(terrain.max_elevation(), 5.0);
    }

    #[test]
    fn parse_terrain_rejects_wrong_header() {
        let err = parse("not-terrain\n2 2\n0\n1 2\n3 4\n").unwrap_err();
        assert!(matches!(err, TerrainFileError::InvalidHeader { .. }));
    }

    #[test]
    fn parse_terrain_rejects_bad_dimensions() {
        let err = parse("terrain\nthree 3\n0\n1 2\n").unwrap_err();
        assert!(matches!(err, TerrainFileError::BadInt { line: 2, .. }));
    }

    #[test]
    fn parse_terrain_rejects_bad_source_count() {
        let err = parse("terrain\n2 2\nmany\n1 2\n3 4\n").unwrap_err();
        assert!(matches!(err, TerrainFileError::BadInt { line: 3, .. }));
    }

    #[test]
    fn parse_terrain_rejects_ragged_rows() {
        let err = parse("terrain\n3 2\n0\n1 2 3\n4 5\n").unwrap_err();
        assert!(matches!(
            err,
            TerrainFileError::RaggedRow {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn parse_terrain_rejects_bad_elevation_token() {
        let err = parse("terrain\n2 1\n0\n1.0 high\n").unwrap_err();
        assert!(matches!(err, TerrainFileError::BadElevation { .. }));
    }

    #[test]
    fn parse_terrain_rejects_truncated_file() {
        let err = parse("terrain\n2 2\n2\n0 0\n").unwrap_err();
        assert!(matches!(err, TerrainFileError::UnexpectedEof { .. }));
    }

    #[test]
    fn parse_terrain_rejects_empty_grid() {
        let err = parse("terrain\n0 0\n0\n").unwrap_err();
        assert!(matches!(err, TerrainFileError::EmptyGrid));
    }

    #[test]
    fn parse_terrain_skips_out_of_bounds_source() {
        // the stray source warns and is dropped, the load still succeeds
        let text = "terrain\n3 3\n2\n9 9\n1 1\n5 5 5\n5 1 5\n5 5 5\n";
        let terrain = parse(text).unwrap();
        assert_eq!(terrain.sources(), &[(1, 1)]);
        assert_eq!(terrain.baseline_level(), Some(1.0));
    }

    #[test]
    fn parse_terrain_accepts_negative_source_as_out_of_bounds() {
        let text = "terrain\n3 3\n1\n-1 0\n5 5 5\n5 1 5\n5 5 5\n";
        let terrain = parse(text).unwrap();
        assert!(terrain.sources().is_empty());
        assert_eq!(terrain.baseline_level(), None);
    }

    #[test]
    fn parse_terrain_ignores_blank_trailing_lines() {
        let text = "terrain\n3 3\n1\n1 1\n5 5 5\n5 1 5\n5 5 5\n\n\n";
        let terrain = parse(text).unwrap();
        assert_eq!(terrain.size(), (3, 3));
    }

    #[test]
    fn parse_terrain_trusts_parsed_shape_over_declared() {
        // declared 9x9, actual 3x3: warns, keeps the parsed grid
        let text = "terrain\n9 9\n1\n1 1\n5 5 5\n5 1 5\n5 5 5\n";
        let terrain = parse(text).unwrap();
        assert_eq!(terrain.size(), (3, 3));
    }
}
