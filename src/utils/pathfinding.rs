//! # Pathfinding Algorithms
//!
//! Breadth-first search over 4-connected grid positions.
//!
//! Both helpers take a passability predicate instead of a concrete grid, so the
//! generator can check connectivity on a half-built layout and the autopilot
//! can search the finished dungeon with the same code.

use crate::Position;
use ::pathfinding::prelude::{bfs, bfs_reach};
use std::collections::HashSet;

/// Passable cardinal neighbours of `pos`.
fn successors<F>(pos: Position, passable: &F) -> Vec<Position>
where
    F: Fn(Position) -> bool,
{
    pos.cardinal_adjacent_positions()
        .into_iter()
        .filter(|&next| passable(next))
        .collect()
}

/// Collects every position reachable from `start` by 4-directional steps.
///
/// `start` itself is always included, even if it is not passable.
///
/// # Examples
///
/// ```
/// use cairn::{reachable_from, Position};
///
/// let open = |p: Position| (0..3).contains(&p.x) && p.y == 0;
/// let reached = reachable_from(Position::new(0, 0), open);
/// assert_eq!(reached.len(), 3);
/// ```
pub fn reachable_from<F>(start: Position, passable: F) -> HashSet<Position>
where
    F: Fn(Position) -> bool,
{
    bfs_reach(start, |&pos| successors(pos, &passable)).collect()
}

/// Finds a shortest 4-directional path from `start` to the first position that
/// satisfies `goal`.
///
/// The returned path starts with `start` and ends at the goal.
pub fn path_to<F, G>(start: Position, passable: F, goal: G) -> Option<Vec<Position>>
where
    F: Fn(Position) -> bool,
    G: Fn(Position) -> bool,
{
    bfs(&start, |&pos| successors(pos, &passable), |&pos| goal(pos))
}
