//! Grid pathfinding
//!
//! Breadth-first search over the level's walkability grid. Live combatants
//! other than the walker are treated as extra obstacles, recomputed on every
//! call.
//!
//! An unreachable destination is not a failure: the search falls back to the
//! reached cell closest (in a straight line) to the destination. An empty path
//! is the single "nowhere to go" signal.

use std::collections::{HashSet, VecDeque};

use bevy::prelude::*;

use super::components::{MapGrid, Motion};

/// Neighbour offsets, in the order they are checked
const NEIGHBOURS: [IVec2; 4] = [
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(0, -1),
    IVec2::new(0, 1),
];

/// Per-cell search state
struct SearchGrid {
    width: usize,
    visited: Vec<bool>,
    distance: Vec<i32>,
}

impl SearchGrid {
    fn new(map: &MapGrid) -> Self {
        let size = map.width() * map.height();
        Self {
            width: map.width(),
            visited: vec![false; size],
            distance: vec![i32::MAX; size],
        }
    }

    fn index(&self, cell: IVec2) -> usize {
        cell.y as usize * self.width + cell.x as usize
    }

    fn visit(&mut self, cell: IVec2, distance: i32) {
        let index = self.index(cell);
        self.visited[index] = true;
        self.distance[index] = distance;
    }

    fn is_visited(&self, cell: IVec2) -> bool {
        self.visited[self.index(cell)]
    }

    fn distance(&self, cell: IVec2) -> i32 {
        self.distance[self.index(cell)]
    }
}

/// Shortest 4-connected path from `source` toward `destination`.
///
/// The returned waypoints are world positions of each cell after the
/// source cell, ending at the destination cell or the nearest reachable
/// cell to it. `obstacles` are grid cells blocked in addition to the map.
pub fn shortest_path(
    map: &MapGrid,
    obstacles: &HashSet<IVec2>,
    source: Vec2,
    destination: Vec2,
) -> Vec<Vec2> {
    let start = map.world_to_cell(source);
    let goal = map.world_to_cell(destination);

    let walkable = |cell: IVec2| map.is_walkable_tile(cell) && !obstacles.contains(&cell);

    if start == goal || !map.is_walkable_tile(start) {
        return Vec::new();
    }

    let mut grid = SearchGrid::new(map);
    let mut queue = VecDeque::new();
    grid.visit(start, 0);
    queue.push_back(start);

    let straight_line = |cell: IVec2| cell.as_vec2().distance(goal.as_vec2());
    let mut closest = start;
    let mut closest_distance = straight_line(start);
    let mut reached_goal = false;

    while let Some(cell) = queue.pop_front() {
        if cell == goal {
            reached_goal = true;
            break;
        }
        let next_distance = grid.distance(cell) + 1;
        for offset in NEIGHBOURS {
            let neighbour = cell + offset;
            if !walkable(neighbour) || grid.is_visited(neighbour) {
                continue;
            }
            grid.visit(neighbour, next_distance);
            queue.push_back(neighbour);

            let distance = straight_line(neighbour);
            if distance < closest_distance {
                closest = neighbour;
                closest_distance = distance;
            }
        }
    }

    let end = if reached_goal { goal } else { closest };
    if end == start {
        return Vec::new();
    }

    // Walk back downhill through the distance field
    let mut cells = vec![end];
    let mut current = end;
    while current != start {
        let mut best: Option<(IVec2, i32)> = None;
        for offset in NEIGHBOURS {
            let neighbour = current + offset;
            if !map.in_bounds(neighbour) || !grid.is_visited(neighbour) {
                continue;
            }
            let distance = grid.distance(neighbour);
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((neighbour, distance));
            }
        }

        match best {
            Some((next, distance)) if distance < grid.distance(current) => {
                current = next;
                if current != start {
                    cells.push(current);
                }
            }
            _ => {
                error!("Path backtrack stalled at {:?}", current);
                return Vec::new();
            }
        }
    }

    cells
        .into_iter()
        .rev()
        .map(|cell| map.cell_to_world(cell))
        .collect()
}

/// Path for `walker` toward `destination`, treating the other `bodies` as
/// obstacles.
///
/// `bodies` should be the living combatants; the walker must be among them.
pub fn path_for<'a>(
    map: &MapGrid,
    walker: Entity,
    destination: Vec2,
    bodies: impl IntoIterator<Item = (Entity, &'a Motion)>,
) -> Vec<Vec2> {
    let mut source = None;
    let mut obstacles = HashSet::new();
    for (entity, motion) in bodies {
        if entity == walker {
            source = Some(motion.position);
        } else {
            obstacles.insert(map.world_to_cell(motion.position));
        }
    }

    let Some(source) = source else {
        debug!("{:?} has no position, no path", walker);
        return Vec::new();
    };
    shortest_path(map, &obstacles, source, destination)
}
