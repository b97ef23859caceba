//! Multi-stop route sequencing over one floor.
//!
//! The planner is a greedy nearest-neighbour heuristic: from the current tail
//! it walks to whichever remaining target has the shortest path, then repeats.
//! It does not search for an optimal tour.

use std::iter;

use crate::pathfinding::shortest_path;
use crate::state::Venue;
use crate::types::*;

/// A non-empty, walkable sequence of positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route(Vec<Position>);

impl Route {
    pub fn new(positions: Vec<Position>) -> Result<Self, NavError> {
        if positions.is_empty() {
            return Err(NavError::EmptyRoute);
        }
        Ok(Self(positions))
    }

    pub fn positions(&self) -> &[Position] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true: a route always holds its start.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Position {
        self.0[0]
    }

    pub fn last(&self) -> Position {
        self.0[self.0.len() - 1]
    }
}

/// Ordered set of selected destinations. Selecting a member again removes it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetSet {
    members: Vec<Position>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `position` is selected after the toggle.
    pub fn toggle(&mut self, position: Position) -> bool {
        match self.members.iter().position(|member| *member == position) {
            Some(slot) => {
                self.members.remove(slot);
                false
            }
            None => {
                self.members.push(position);
                true
            }
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.members.contains(&position)
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.members.iter()
    }
}

impl FromIterator<Position> for TargetSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        let mut set = Self::new();
        for position in iter {
            if !set.contains(position) {
                set.members.push(position);
            }
        }
        set
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutePlan {
    pub route: Route,
    /// Targets in the order the route reaches them.
    pub visit_order: Vec<Position>,
    /// Targets that could not be reached from where the route ended.
    pub dropped: Vec<Position>,
}

pub fn plan_route(
    venue: &Venue,
    start: Position,
    targets: &TargetSet,
) -> Result<RoutePlan, NavError> {
    if targets.is_empty() {
        return Err(NavError::NoTargets);
    }
    let offending: Vec<Position> =
        targets.iter().filter(|target| target.floor != start.floor).copied().collect();
    if !offending.is_empty() {
        return Err(NavError::CrossFloorTargets { start_floor: start.floor, offending });
    }
    venue.floor(start.floor)?;
    for index in iter::once(start.index).chain(targets.iter().map(|target| target.index)) {
        if !venue.dims().contains(index) {
            return Err(NavError::OutOfRange(OutOfRange::Index(index)));
        }
    }

    let mut route: Vec<Position> = Vec::new();
    let mut visit_order = Vec::with_capacity(targets.len());
    let mut remaining: Vec<Position> = targets.iter().copied().collect();
    let mut current = start;

    while !remaining.is_empty() {
        let mut best: Option<(usize, Vec<Position>)> = None;
        for (slot, target) in remaining.iter().enumerate() {
            let path = match shortest_path(venue, current.floor, current.index, target.index) {
                Ok(path) => path,
                Err(NavError::Unreachable { .. }) => continue,
                Err(err) => return Err(err),
            };
            if best.as_ref().is_none_or(|(_, shortest)| path.len() < shortest.len()) {
                best = Some((slot, path));
            }
        }
        let Some((slot, path)) = best else {
            break;
        };
        if route.is_empty() {
            route = path;
        } else {
            route.extend(path.into_iter().skip(1));
        }
        current = remaining.remove(slot);
        visit_order.push(current);
    }

    if route.is_empty() {
        let first = targets.iter().next().copied().unwrap_or(start);
        return Err(NavError::Unreachable { from: start, to: first });
    }
    if !remaining.is_empty() {
        log::warn!("route from {start} dropped {} unreachable target(s)", remaining.len());
    }
    log::debug!("planned {} stops over {} nodes", visit_order.len(), route.len());
    Ok(RoutePlan { route: Route(route), visit_order, dropped: remaining })
}
