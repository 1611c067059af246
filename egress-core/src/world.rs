//! Locked-room world — the bundled reference oracle
//!
//! A minimal ground truth for exercising the decision core end to end: the
//! agent is in a room whose door is either locked or unlocked (hidden), and
//! escapes through the door or, more slowly, through the window. Peeking at
//! the lock reveals the hidden state; trying a locked door costs a setback.

use crate::action::{ActionCandidate, ActionKind, ValueModel};
use crate::belief::Observation;
use crate::contracts::{ObservationOracle, StepOutcome};

/// Canonical action names understood by the world
pub const PEEK: &str = "peek";
pub const TRY_DOOR: &str = "try_door";
pub const CLIMB_WINDOW: &str = "climb_window";

/// Reference world with one hidden bit: whether the door is unlocked.
#[derive(Debug)]
pub struct LockedRoomWorld {
    unlocked: bool,
    lock_inspected: bool,
    escaped: bool,
}

impl LockedRoomWorld {
    pub fn new(unlocked: bool) -> Self {
        Self {
            unlocked,
            lock_inspected: false,
            escaped: false,
        }
    }

    /// The action catalog this world understands: one probe, one
    /// belief-gated exit, one guaranteed fallback exit.
    pub fn standard_catalog() -> Vec<ActionCandidate> {
        vec![
            ActionCandidate::new(PEEK, ActionKind::Sense, 1.0, ValueModel::Probe),
            ActionCandidate::new(
                TRY_DOOR,
                ActionKind::Act,
                1.5,
                ValueModel::BeliefScaled { payoff: 1.0 },
            ),
            ActionCandidate::new(
                CLIMB_WINDOW,
                ActionKind::Act,
                2.0,
                ValueModel::Fixed { payoff: 0.8 },
            ),
        ]
    }

    pub fn escaped(&self) -> bool {
        self.escaped
    }
}

impl ObservationOracle for LockedRoomWorld {
    fn execute(&mut self, action: &ActionCandidate) -> StepOutcome {
        match action.name.as_str() {
            PEEK => {
                self.lock_inspected = true;
                StepOutcome {
                    observation: if self.unlocked {
                        Observation::Confirming
                    } else {
                        Observation::Disconfirming
                    },
                    terminal: false,
                    reward: -0.05,
                }
            }
            TRY_DOOR => {
                if self.unlocked {
                    self.escaped = true;
                    StepOutcome {
                        observation: Observation::Confirming,
                        terminal: true,
                        reward: 1.0,
                    }
                } else {
                    // Rattling a locked door is a setback, and also evidence.
                    StepOutcome {
                        observation: Observation::Disconfirming,
                        terminal: false,
                        reward: -0.5,
                    }
                }
            }
            CLIMB_WINDOW => {
                self.escaped = true;
                StepOutcome {
                    observation: Observation::Ambiguous,
                    terminal: true,
                    reward: 0.5,
                }
            }
            _ => StepOutcome {
                observation: Observation::Ambiguous,
                terminal: false,
                reward: -0.05,
            },
        }
    }

    fn distance_to_goal(&self) -> f64 {
        if self.escaped {
            0.0
        } else if self.lock_inspected {
            1.0
        } else {
            2.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(name: &str) -> ActionCandidate {
        LockedRoomWorld::standard_catalog()
            .into_iter()
            .find(|a| a.name == name)
            .unwrap()
    }

    #[test]
    fn test_peek_reveals_the_lock_state() {
        let mut unlocked = LockedRoomWorld::new(true);
        let mut locked = LockedRoomWorld::new(false);
        assert_eq!(
            unlocked.execute(&action(PEEK)).observation,
            Observation::Confirming
        );
        assert_eq!(
            locked.execute(&action(PEEK)).observation,
            Observation::Disconfirming
        );
    }

    #[test]
    fn test_unlocked_door_is_terminal() {
        let mut world = LockedRoomWorld::new(true);
        let outcome = world.execute(&action(TRY_DOOR));
        assert!(outcome.terminal);
        assert!(outcome.reward > 0.0);
        assert!(world.escaped());
    }

    #[test]
    fn test_locked_door_is_a_setback_not_an_exit() {
        let mut world = LockedRoomWorld::new(false);
        let outcome = world.execute(&action(TRY_DOOR));
        assert!(!outcome.terminal);
        assert!(outcome.reward < 0.0);
        assert_eq!(outcome.observation, Observation::Disconfirming);
    }

    #[test]
    fn test_window_always_works_but_pays_less() {
        let mut world = LockedRoomWorld::new(false);
        let outcome = world.execute(&action(CLIMB_WINDOW));
        assert!(outcome.terminal);
        assert!(outcome.reward < 1.0);
    }

    #[test]
    fn test_distance_shrinks_as_the_agent_learns() {
        let mut world = LockedRoomWorld::new(true);
        assert_eq!(world.distance_to_goal(), 2.0);
        world.execute(&action(PEEK));
        assert_eq!(world.distance_to_goal(), 1.0);
        world.execute(&action(TRY_DOOR));
        assert_eq!(world.distance_to_goal(), 0.0);
    }
}
