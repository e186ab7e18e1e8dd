//! Navigation stage mapping and alignment checks.

use crate::{
    Axis, Constants, GameContent, NavigationState, NavigationValues, PerPlayer, Player, Quadrant,
};

impl Quadrant {
    /// Band containing `traveled`. Anything past the last boundary is Delta.
    pub fn from_traveled(traveled: f64, quadrant_length: f64) -> Quadrant {
        let band = if quadrant_length > 0.0 && traveled > 0.0 {
            (traveled / quadrant_length).floor()
        } else {
            0.0
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = band.min(3.0) as usize;
        Quadrant::ALL[index]
    }
}

/// Stage whose puzzles are active. Looks one unit ahead so a ship resting on a
/// checkpoint already faces the next quadrant.
pub fn navigation_stage(traveled: f64, constants: &Constants) -> Quadrant {
    Quadrant::from_traveled(traveled + 1.0, constants.quadrant_length)
}

pub fn targets_for(content: &GameContent, quadrant: Quadrant) -> Option<&PerPlayer<NavigationValues>> {
    content
        .navigation
        .iter()
        .find(|entry| entry.quadrant == quadrant)
        .map(|entry| &entry.targets)
}

impl NavigationValues {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Pitch => self.pitch,
            Axis::Yaw => self.yaw,
            Axis::Roll => self.roll,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Pitch => self.pitch = value,
            Axis::Yaw => self.yaw = value,
            Axis::Roll => self.roll = value,
        }
    }

    pub fn axis_matches(&self, target: &NavigationValues, axis: Axis, tolerance: f64) -> bool {
        (self.get(axis) - target.get(axis)).abs() <= tolerance
    }
}

impl NavigationState {
    pub fn new(targets: PerPlayer<NavigationValues>, stage: Quadrant, player: Player) -> Self {
        Self {
            current: *targets.get(player),
            correct: targets,
            stage,
        }
    }

    /// Axes off `player`'s target by more than `tolerance`.
    pub fn errors_for(&self, player: Player, tolerance: f64) -> u32 {
        let target = self.correct.get(player);
        let count = Axis::ALL
            .iter()
            .filter(|axis| !self.current.axis_matches(target, **axis, tolerance))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Axes that match neither ship's target.
    pub fn errors_against_either(&self, tolerance: f64) -> u32 {
        let count = Axis::ALL
            .iter()
            .filter(|axis| {
                Player::ALL
                    .iter()
                    .all(|p| !self.current.axis_matches(self.correct.get(*p), **axis, tolerance))
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub fn is_aligned(&self, player: Player, tolerance: f64) -> bool {
        self.errors_for(player, tolerance) == 0
    }

    /// Switches both ships' targets to `stage`. Returns false when already
    /// there or when content has no entry for it.
    pub fn enter_stage(&mut self, content: &GameContent, stage: Quadrant) -> bool {
        if stage == self.stage {
            return false;
        }
        let Some(targets) = targets_for(content, stage) else {
            tracing::warn!(?stage, "no navigation targets for stage");
            return false;
        };
        self.correct = targets.clone();
        self.stage = stage;
        true
    }

    /// Puts `current` back onto `player`'s target.
    pub fn reset_for(&mut self, player: Player) {
        self.current = *self.correct.get(player);
    }
}
