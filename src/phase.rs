//! The fixed table of ten phases.
//!
//! Each phase is a list of one or two meld clauses; validation interprets the
//! table generically (see [`crate::meld::validate_phase`]).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape of a single meld clause.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MeldKind {
    /// Cards sharing one rank.
    Set,
    /// Cards forming consecutive ranks.
    Run,
    /// Cards sharing one color.
    Color,
}

/// One structural clause of a phase, e.g. "run of 4".
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PhaseRequirement {
    pub kind: MeldKind,
    pub count: usize,
}

impl PhaseRequirement {
    pub const fn set(count: usize) -> Self {
        Self { kind: MeldKind::Set, count }
    }

    pub const fn run(count: usize) -> Self {
        Self { kind: MeldKind::Run, count }
    }

    pub const fn color(count: usize) -> Self {
        Self { kind: MeldKind::Color, count }
    }
}

impl fmt::Display for PhaseRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MeldKind::Set => write!(f, "set of {}", self.count),
            MeldKind::Run => write!(f, "run of {}", self.count),
            MeldKind::Color => write!(f, "{} cards of one color", self.count),
        }
    }
}

/// A catalog entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Phase {
    pub number: u8,
    pub requirements: &'static [PhaseRequirement],
    pub description: &'static str,
}

impl Phase {
    /// Number of cards needed to lay the phase down.
    pub fn card_count(&self) -> usize {
        self.requirements.iter().map(|req| req.count).sum()
    }

    pub fn is_two_sets(&self) -> bool {
        matches!(
            self.requirements,
            [
                PhaseRequirement { kind: MeldKind::Set, .. },
                PhaseRequirement { kind: MeldKind::Set, .. }
            ]
        )
    }

    pub fn is_set_and_run(&self) -> bool {
        matches!(
            self.requirements,
            [
                PhaseRequirement { kind: MeldKind::Set, .. },
                PhaseRequirement { kind: MeldKind::Run, .. }
            ]
        )
    }

    pub fn is_single_run(&self) -> bool {
        matches!(self.requirements, [PhaseRequirement { kind: MeldKind::Run, .. }])
    }

    pub fn is_color(&self) -> bool {
        matches!(self.requirements, [PhaseRequirement { kind: MeldKind::Color, .. }])
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phase {}: {}", self.number, self.description)
    }
}

pub const FIRST_PHASE: u8 = 1;
pub const FINAL_PHASE: u8 = 10;
/// Value of `current_phase` for a player who has completed every phase.
pub const FINISHED_PHASE: u8 = FINAL_PHASE + 1;

pub static PHASES: [Phase; FINAL_PHASE as usize] = [
    Phase {
        number: 1,
        requirements: &[PhaseRequirement::set(3), PhaseRequirement::set(3)],
        description: "2 sets of 3",
    },
    Phase {
        number: 2,
        requirements: &[PhaseRequirement::set(3), PhaseRequirement::run(4)],
        description: "1 set of 3 + 1 run of 4",
    },
    Phase {
        number: 3,
        requirements: &[PhaseRequirement::set(4), PhaseRequirement::run(4)],
        description: "1 set of 4 + 1 run of 4",
    },
    Phase {
        number: 4,
        requirements: &[PhaseRequirement::run(7)],
        description: "1 run of 7",
    },
    Phase {
        number: 5,
        requirements: &[PhaseRequirement::run(8)],
        description: "1 run of 8",
    },
    Phase {
        number: 6,
        requirements: &[PhaseRequirement::run(9)],
        description: "1 run of 9",
    },
    Phase {
        number: 7,
        requirements: &[PhaseRequirement::set(4), PhaseRequirement::set(4)],
        description: "2 sets of 4",
    },
    Phase {
        number: 8,
        requirements: &[PhaseRequirement::color(7)],
        description: "7 cards of one color",
    },
    Phase {
        number: 9,
        requirements: &[PhaseRequirement::set(5), PhaseRequirement::set(2)],
        description: "1 set of 5 + 1 set of 2",
    },
    Phase {
        number: 10,
        requirements: &[PhaseRequirement::set(5), PhaseRequirement::set(3)],
        description: "1 set of 5 + 1 set of 3",
    },
];

/// Looks up a phase by its 1-based number.
pub fn phase(number: u8) -> Option<&'static Phase> {
    if number < FIRST_PHASE {
        return None;
    }
    PHASES.get(usize::from(number - FIRST_PHASE))
}
