use std::collections::HashMap;

use crate::shared::geo::{CellSize, Coordinate, Distance};

/// For every coordinate, the indexes of all other coordinates within `radius`, ascending.
///
/// Points are bucketed into a grid whose cells are at least `radius` wide, so only the
/// 3x3 block around a point has to be checked against the exact haversine distance.
pub fn within_radius(coordinates: &[Coordinate], radius: Distance) -> Vec<Vec<usize>> {
    let max_latitude = coordinates
        .iter()
        .map(|coordinate| coordinate.latitude.abs())
        .fold(0.0, f64::max);
    let cell = CellSize::covering(radius, max_latitude);

    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    coordinates.iter().enumerate().for_each(|(i, coordinate)| {
        grid.entry(coordinate.to_grid(&cell)).or_default().push(i);
    });

    coordinates
        .iter()
        .enumerate()
        .map(|(i, coordinate)| {
            let mut found: Vec<usize> = neighbour_cells(coordinate.to_grid(&cell), cell.columns)
                .iter()
                .filter_map(|key| grid.get(key))
                .flatten()
                .copied()
                .filter(|&j| j != i && coordinate.distance(&coordinates[j]) <= radius)
                .collect();
            found.sort_unstable();
            found
        })
        .collect()
}

fn neighbour_cells((x, y): (i64, i64), columns: i64) -> Vec<(i64, i64)> {
    let mut cells: Vec<(i64, i64)> = (-1..=1)
        .flat_map(|dx| (-1..=1).map(move |dy| ((x + dx).rem_euclid(columns), y + dy)))
        .collect();
    // Narrow grids wrap onto the same column more than once
    cells.sort_unstable();
    cells.dedup();
    cells
}
