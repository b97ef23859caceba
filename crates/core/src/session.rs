//! Navigation session: the single owner of venue, selection and avatar state.
//! This module exists so every interaction runs against an explicit context instead of globals.
//! It does not render anything or decide how long to wait between traversal steps.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::content::SHOP_PALETTE;
use crate::route::{RoutePlan, TargetSet, plan_route};
use crate::state::{Venue, parse_item_list};
use crate::traversal::{CancelToken, Traversal};
use crate::types::*;

/// Demo stops on the ground floor, as `(x, y)`.
const DEMO_START: Coord = Coord { x: 1, y: 1 };
const DEMO_STOPS: [Coord; 2] = [Coord { x: 2, y: 2 }, Coord { x: 3, y: 2 }];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// No location was set; the clicked tile became the avatar position.
    LocationSet(Position),
    TargetToggled { position: Position, selected: bool },
    /// Same-floor tile: a walk to it has started with this first step.
    WalkStarted(Step),
    /// Avatar lives on another floor; it was moved to the clicked tile.
    Relocated(Position),
}

pub struct NavSession {
    venue: Venue,
    active_floor: usize,
    avatar: Option<Position>,
    targets: TargetSet,
    traversal: Option<Traversal>,
    rng: ChaCha8Rng,
}

impl NavSession {
    pub fn new(venue: Venue, seed: u64) -> Self {
        Self {
            venue,
            active_floor: 0,
            avatar: None,
            targets: TargetSet::new(),
            traversal: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn venue(&self) -> &Venue {
        &self.venue
    }

    pub fn active_floor(&self) -> usize {
        self.active_floor
    }

    pub fn avatar(&self) -> Option<Position> {
        self.avatar
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    pub fn switch_floor(&mut self, floor: usize) -> Result<(), NavError> {
        self.venue.floor(floor)?;
        self.active_floor = floor;
        Ok(())
    }

    /// Places the avatar directly, cancelling any walk in progress.
    pub fn set_location(&mut self, position: Position) -> Result<(), NavError> {
        self.venue.cell_at(position.floor, position.index)?;
        self.cancel_traversal();
        self.avatar = Some(position);
        log::info!("location set to {position}");
        Ok(())
    }

    /// Handles a click on `index` of the active floor.
    pub fn click_tile(&mut self, index: usize) -> Result<ClickOutcome, NavError> {
        let position = Position::new(self.active_floor, index);
        let is_shop = self.venue.cell_at(position.floor, index)?.shop().is_some();

        let Some(avatar) = self.avatar else {
            self.set_location(position)?;
            return Ok(ClickOutcome::LocationSet(position));
        };
        if is_shop {
            let selected = self.targets.toggle(position);
            return Ok(ClickOutcome::TargetToggled { position, selected });
        }
        if avatar.floor != position.floor {
            self.set_location(position)?;
            return Ok(ClickOutcome::Relocated(position));
        }

        self.cancel_traversal();
        let path = self
            .venue
            .shortest_path(position.floor, avatar.index, index)
            .inspect_err(|err| log::warn!("no walk from {avatar} to {position}: {err}"))?;
        let step = self.start_walk(path)?;
        Ok(ClickOutcome::WalkStarted(step))
    }

    pub fn toggle_target(&mut self, position: Position) -> Result<bool, NavError> {
        if self.venue.cell_at(position.floor, position.index)?.shop().is_none() {
            return Err(NavError::NotAShop(position));
        }
        Ok(self.targets.toggle(position))
    }

    pub fn clear_selection(&mut self) {
        self.targets.clear();
    }

    /// Stops any walk and forgets its remaining path.
    pub fn clear_path(&mut self) {
        self.cancel_traversal();
        self.traversal = None;
    }

    /// Plans a route through every selected target and starts walking it.
    pub fn begin_route(&mut self) -> Result<(RoutePlan, Step), NavError> {
        let start = self.avatar.ok_or(NavError::NoLocation)?;
        let plan = plan_route(&self.venue, start, &self.targets)?;
        let step = self.start_walk(plan.route.positions().to_vec())?;
        log::info!(
            "route started: {} stop(s), {} node(s), {} dropped",
            plan.visit_order.len(),
            plan.route.len(),
            plan.dropped.len()
        );
        Ok((plan, step))
    }

    /// Walks from the current location (ground floor `(1,1)` when unset) to
    /// two fixed ground-floor stops.
    pub fn demo_route(&mut self) -> Result<Step, NavError> {
        let dims = self.venue.dims();
        let start = match self.avatar {
            Some(avatar) => avatar,
            None => Position::new(0, dims.to_index(DEMO_START)?),
        };
        let mut stops = Vec::with_capacity(DEMO_STOPS.len());
        for coord in DEMO_STOPS {
            stops.push(Position::new(0, dims.to_index(coord)?));
        }
        if start.floor != 0 {
            return Err(NavError::CrossFloorTargets { start_floor: start.floor, offending: stops });
        }

        let mut route = vec![start];
        let mut tail = start;
        for stop in stops {
            let leg = self.venue.shortest_path(0, tail.index, stop.index)?;
            route.extend(leg.into_iter().skip(1));
            tail = stop;
        }
        self.start_walk(route)
    }

    /// Moves the avatar one step along the walk in progress.
    pub fn advance(&mut self) -> StepResult {
        let Some(traversal) = self.traversal.as_mut() else {
            return StepResult::Halted(HaltReason::Idle);
        };
        let result = traversal.advance();
        match &result {
            StepResult::Stepped(step) => self.apply_step(step),
            StepResult::Halted(_) => self.traversal = None,
        }
        result
    }

    /// Halts the walk in progress, including one whose token was raised from
    /// outside. Returns true if a walk was actually interrupted.
    pub fn cancel_traversal(&mut self) -> bool {
        let Some(traversal) = self.traversal.as_mut() else {
            return false;
        };
        let interrupted = traversal.cancel();
        if interrupted {
            log::info!("walk cancelled at {}", traversal.position());
        }
        interrupted
    }

    pub fn is_walking(&self) -> bool {
        self.traversal.as_ref().is_some_and(Traversal::is_walking)
    }

    pub fn remaining_path(&self) -> &[Position] {
        match &self.traversal {
            Some(traversal) => traversal.remaining(),
            None => &[],
        }
    }

    /// Token for the walk in progress, for cancelling from outside the loop.
    pub fn walk_token(&self) -> Option<CancelToken> {
        self.traversal.as_ref().map(Traversal::cancel_token)
    }

    pub fn add_shop(&mut self, floor: usize) -> Result<usize, NavError> {
        self.cancel_traversal();
        let color = self.pick_color();
        self.venue.add_shop(floor, color)
    }

    /// Saves the editor form for `(floor, index)`: a name and `name:price` item text.
    pub fn save_shop(
        &mut self,
        floor: usize,
        index: usize,
        name: &str,
        items_text: &str,
    ) -> Result<(), NavError> {
        self.cancel_traversal();
        let color = self.pick_color();
        self.venue.save_shop(floor, index, name, parse_item_list(items_text), color)
    }

    pub fn delete_shop(&mut self, floor: usize, index: usize) -> Result<ShopMeta, NavError> {
        self.cancel_traversal();
        let meta = self.venue.delete_shop(floor, index)?;
        let position = Position::new(floor, index);
        if self.targets.contains(position) {
            self.targets.toggle(position);
        }
        Ok(meta)
    }

    fn start_walk(&mut self, positions: Vec<Position>) -> Result<Step, NavError> {
        self.cancel_traversal();
        let (traversal, step) = Traversal::start(positions, Some(self.active_floor))?;
        self.apply_step(&step);
        self.traversal = Some(traversal);
        Ok(step)
    }

    fn apply_step(&mut self, step: &Step) {
        if let Some(switch) = step.floor_switch {
            self.active_floor = switch.to;
        }
        self.avatar = Some(step.position);
    }

    fn pick_color(&mut self) -> &'static str {
        let slot = self.rng.next_u64() % SHOP_PALETTE.len() as u64;
        SHOP_PALETTE[slot as usize]
    }
}
