/// Transition observed by the dispatcher on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlackoutEdge {
    Entered,
    Released,
}

/// Edge-triggered override forcing every output to zero.
///
/// Input handlers flip `active`; the dispatcher calls [`observe`] once per
/// tick and acts only on the edges it reports.
///
/// [`observe`]: BlackoutOverride::observe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlackoutOverride {
    active: bool,
    previous_active: bool,
}

impl BlackoutOverride {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn observe(&mut self) -> Option<BlackoutEdge> {
        let edge = match (self.previous_active, self.active) {
            (false, true) => Some(BlackoutEdge::Entered),
            (true, false) => Some(BlackoutEdge::Released),
            _ => None,
        };
        self.previous_active = self.active;
        edge
    }
}
