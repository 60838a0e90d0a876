//! ASCII views of the maze and of a distance field.
//!
//! Physical walls are drawn with `---` and `|`, virtual walls with `~~~`
//! and `:`.

use rescue_perception::{CellWalls, DistanceField, MazeMap};
use rescue_types::{Compass, Coordinate, GRID_HEIGHT, GRID_WIDTH};

/// Draw `map`, labelling each cell with the three-character string returned
/// by `label`.
pub fn render_map(map: &MazeMap, label: impl Fn(Coordinate) -> String) -> String {
    let mut out = String::new();
    for y in 0..GRID_HEIGHT {
        out.push_str(&horizontal_edge(map, y, Compass::North));
        out.push('\n');
        for x in 0..GRID_WIDTH {
            let cell = Coordinate::at(x, y);
            let walls = map.cell(cell);
            if x == 0 {
                out.push(vertical(walls, Compass::West));
            }
            out.push_str(&format!("{:^3}", label(cell)));
            out.push(vertical(walls, Compass::East));
        }
        out.push('\n');
    }
    out.push_str(&horizontal_edge(map, GRID_HEIGHT - 1, Compass::South));
    out.push('\n');
    out
}

/// Draw `map` with every cell labelled by its value in `field`; `.` marks
/// cells the field never reached.
pub fn render_field(map: &MazeMap, field: &DistanceField) -> String {
    render_map(map, |cell| match field.get(cell) {
        Some(v) => v.to_string(),
        None => ".".to_string(),
    })
}

fn horizontal_edge(map: &MazeMap, y: u8, side: Compass) -> String {
    let mut line = String::from("+");
    for x in 0..GRID_WIDTH {
        let walls = map.cell(Coordinate::at(x, y));
        let edge = if walls.physical.contains(side) {
            "---"
        } else if walls.virtual_walls.contains(side) {
            "~~~"
        } else {
            "   "
        };
        line.push_str(edge);
        line.push('+');
    }
    line
}

fn vertical(walls: CellWalls, side: Compass) -> char {
    if walls.physical.contains(side) {
        '|'
    } else if walls.virtual_walls.contains(side) {
        ':'
    } else {
        ' '
    }
}
