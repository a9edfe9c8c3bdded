//! Terrain blueprints
//!
//! A blueprint is a JSON map of single-character cells:
//!
//! ```json
//! { "name": "Blocks", "block": { "width": 20, "height": 20 },
//!   "terrain": ["||||", "|H |", "||||"] }
//! ```
//!
//! `' '` is empty space, `'|'` a wall and `'H'` the turret spawn. Blueprints
//! are validated on load and never change afterwards.

use std::path::Path;

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

use super::collision::{Face, Rect};

/// Maps shipped with the crate, by name
const BUILTIN: &[(&str, &str)] = &[
    ("blocks", include_str!("../../blueprints/blocks.json")),
    ("open", include_str!("../../blueprints/open.json")),
];

#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("failed to read blueprint: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed blueprint: {0}")]
    Json(#[from] serde_json::Error),
    #[error("blueprint has no terrain rows")]
    Empty,
    #[error("row {row} is {found} cells wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell {cell:?} at column {col}, row {row}")]
    UnknownCell { cell: char, col: usize, row: usize },
    #[error("turret spawn 'H' missing from blueprint")]
    MissingTurret,
    #[error("block size must be positive, got {width}x{height}")]
    BadBlockSize { width: u32, height: u32 },
    #[error("no builtin blueprint named {0:?}")]
    UnknownBuiltin(String),
}

#[derive(Debug, Deserialize)]
struct BlockSize {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct BlueprintData {
    name: String,
    block: BlockSize,
    terrain: Vec<String>,
}

/// Terrain cell kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Space,
    Wall,
    Turret,
}

impl Cell {
    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            ' ' => Some(Cell::Space),
            '|' => Some(Cell::Wall),
            'H' => Some(Cell::Turret),
            _ => None,
        }
    }
}

/// Static terrain map
#[derive(Debug, Clone)]
pub struct Blueprint {
    name: String,
    block_size: Vec2,
    /// Row-major cells
    cells: Vec<Vec<Cell>>,
    width: usize,
    /// One rectangle per wall cell, in screen coordinates
    walls: Vec<Rect>,
    /// (column, row) of each entry in `walls`
    wall_cells: Vec<(usize, usize)>,
    /// First 'H' scanning row-major, as (column, row)
    turret: (usize, usize),
}

impl Blueprint {
    /// Parse and validate a blueprint from JSON
    pub fn from_json(json: &str) -> Result<Self, BlueprintError> {
        let data: BlueprintData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// Load `<dir>/<name>.json`
    pub fn load(dir: &Path, name: &str) -> Result<Self, BlueprintError> {
        let path = dir.join(format!("{name}.json"));
        let json = std::fs::read_to_string(&path)?;
        let blueprint = Self::from_json(&json)?;
        log::info!("Loaded blueprint {:?} from {}", blueprint.name, path.display());
        Ok(blueprint)
    }

    /// One of the maps compiled into the crate
    pub fn builtin(name: &str) -> Result<Self, BlueprintError> {
        let json = BUILTIN
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, json)| *json)
            .ok_or_else(|| BlueprintError::UnknownBuiltin(name.to_string()))?;
        let blueprint = Self::from_json(json)?;
        log::info!("Loaded builtin blueprint {:?}", blueprint.name);
        Ok(blueprint)
    }

    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(n, _)| *n)
    }

    fn from_data(data: BlueprintData) -> Result<Self, BlueprintError> {
        let BlockSize { width: bw, height: bh } = data.block;
        if bw == 0 || bh == 0 {
            return Err(BlueprintError::BadBlockSize {
                width: bw,
                height: bh,
            });
        }

        let width = data
            .terrain
            .first()
            .map(|row| row.chars().count())
            .ok_or(BlueprintError::Empty)?;
        if width == 0 {
            return Err(BlueprintError::Empty);
        }

        let mut cells = Vec::with_capacity(data.terrain.len());
        for (row, line) in data.terrain.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(BlueprintError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            let parsed = line
                .chars()
                .enumerate()
                .map(|(col, c)| {
                    Cell::from_char(c).ok_or(BlueprintError::UnknownCell { cell: c, col, row })
                })
                .collect::<Result<Vec<_>, _>>()?;
            cells.push(parsed);
        }

        let turret = cells
            .iter()
            .enumerate()
            .find_map(|(row, line)| {
                line.iter()
                    .position(|c| *c == Cell::Turret)
                    .map(|col| (col, row))
            })
            .ok_or(BlueprintError::MissingTurret)?;

        let block_size = Vec2::new(bw as f32, bh as f32);
        let wall_cells: Vec<(usize, usize)> = cells
            .iter()
            .enumerate()
            .flat_map(|(row, line)| {
                line.iter()
                    .enumerate()
                    .filter(|(_, c)| **c == Cell::Wall)
                    .map(move |(col, _)| (col, row))
            })
            .collect();
        let walls = wall_cells
            .iter()
            .map(|&(col, row)| {
                Rect::new(Vec2::new(col as f32, row as f32) * block_size, block_size)
            })
            .collect();

        Ok(Self {
            name: data.name,
            block_size,
            cells,
            width,
            walls,
            wall_cells,
            turret,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of a single block in px
    pub fn block_size(&self) -> Vec2 {
        self.block_size
    }

    /// Columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows
    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|line| line.get(col)).copied()
    }

    /// Whole playfield in px
    pub fn rect(&self) -> Rect {
        let size = Vec2::new(self.width as f32, self.height() as f32) * self.block_size;
        Rect::new(Vec2::ZERO, size)
    }

    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    /// Whether `face` of wall number `wall` borders a non-wall cell
    ///
    /// Faces on the map edge count as closed.
    pub fn face_open(&self, wall: usize, face: Face) -> bool {
        let Some(&(col, row)) = self.wall_cells.get(wall) else {
            return false;
        };
        let (dc, dr) = face.offset();
        let (Some(col), Some(row)) = (col.checked_add_signed(dc), row.checked_add_signed(dr)) else {
            return false;
        };
        self.cell(col, row).is_some_and(|c| c != Cell::Wall)
    }

    /// Turret spawn cell as (column, row)
    pub fn turret_cell(&self) -> (usize, usize) {
        self.turret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(terrain: &[&str]) -> String {
        serde_json::json!({
            "name": "test",
            "block": { "width": 10, "height": 5 },
            "terrain": terrain,
        })
        .to_string()
    }

    #[test]
    fn test_parse_walls_and_turret() {
        let bp = Blueprint::from_json(&json(&["|  |", " H H", "||  "])).unwrap();
        assert_eq!(bp.width(), 4);
        assert_eq!(bp.height(), 3);
        assert_eq!(bp.rect().size(), Vec2::new(40.0, 15.0));
        // First H row-major
        assert_eq!(bp.turret_cell(), (1, 1));
        assert_eq!(bp.walls().len(), 4);
        assert_eq!(
            bp.walls()[1],
            Rect::new(Vec2::new(30.0, 0.0), Vec2::new(10.0, 5.0))
        );
        assert_eq!(bp.cell(0, 2), Some(Cell::Wall));
        assert_eq!(bp.cell(9, 9), None);
    }

    #[test]
    fn test_face_open_between_wall_cells() {
        // Walls 0 and 1 sit side by side, wall 2 below wall 0
        let bp = Blueprint::from_json(&json(&["||  ", "| H "])).unwrap();
        assert!(!bp.face_open(0, Face::Right));
        assert!(!bp.face_open(1, Face::Left));
        assert!(!bp.face_open(0, Face::Bottom));
        assert!(!bp.face_open(2, Face::Top));
        assert!(bp.face_open(1, Face::Right));
        assert!(bp.face_open(1, Face::Bottom));
        assert!(bp.face_open(2, Face::Right));
        // Map edge
        assert!(!bp.face_open(0, Face::Top));
        assert!(!bp.face_open(0, Face::Left));
        assert!(!bp.face_open(9, Face::Top));
    }

    #[test]
    fn test_missing_turret_is_fatal() {
        let err = Blueprint::from_json(&json(&["|  |", "    "])).unwrap_err();
        assert!(matches!(err, BlueprintError::MissingTurret));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Blueprint::from_json(&json(&["H  ", "  "])).unwrap_err();
        assert!(matches!(
            err,
            BlueprintError::RaggedRow { row: 1, expected: 3, found: 2 }
        ));
    }

    #[test]
    fn test_unknown_cell_rejected() {
        let err = Blueprint::from_json(&json(&["H x"])).unwrap_err();
        assert!(matches!(err, BlueprintError::UnknownCell { cell: 'x', col: 2, row: 0 }));
    }

    #[test]
    fn test_empty_and_bad_block() {
        assert!(matches!(
            Blueprint::from_json(&json(&[])).unwrap_err(),
            BlueprintError::Empty
        ));
        let bad = r#"{"name":"x","block":{"width":0,"height":4},"terrain":["H"]}"#;
        assert!(matches!(
            Blueprint::from_json(bad).unwrap_err(),
            BlueprintError::BadBlockSize { .. }
        ));
        assert!(matches!(
            Blueprint::from_json("{}").unwrap_err(),
            BlueprintError::Json(_)
        ));
    }

    #[test]
    fn test_builtins_are_valid() {
        for name in Blueprint::builtin_names() {
            let bp = Blueprint::builtin(name).unwrap();
            assert!(!bp.walls().is_empty());
            let (col, row) = bp.turret_cell();
            assert_eq!(bp.cell(col, row), Some(Cell::Turret));
        }
        assert!(matches!(
            Blueprint::builtin("nope").unwrap_err(),
            BlueprintError::UnknownBuiltin(_)
        ));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = std::env::temp_dir().join(format!("arcade-lab-bp-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tiny.json"), json(&["H|"])).unwrap();

        let bp = Blueprint::load(&dir, "tiny").unwrap();
        assert_eq!(bp.name(), "test");
        assert!(matches!(
            Blueprint::load(&dir, "missing").unwrap_err(),
            BlueprintError::Io(_)
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
