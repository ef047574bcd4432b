use cellpath_grid::{CPos, CellLayer, MapShape};

/// Identifies a mover (or any other agent that can occupy a cell).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub u32);

/// Which occupants stop a mover from entering a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockingMode {
    /// Only permanent obstacles block; agents that may move away are ignored.
    IgnoreTransient,
    /// Every occupant blocks.
    #[default]
    RespectAll,
    /// Every occupant blocks, except the given agent.
    RespectAllExcept(AgentId),
}

/// Decides whether a mover may enter a cell right now.
pub trait Blocking {
    fn can_enter(&self, cell: CPos, mover: AgentId, mode: BlockingMode) -> bool;
}

impl<B: Blocking + ?Sized> Blocking for &B {
    fn can_enter(&self, cell: CPos, mover: AgentId, mode: BlockingMode) -> bool {
        (**self).can_enter(cell, mover, mode)
    }
}

/// Nothing ever blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBlocking;

impl Blocking for NoBlocking {
    fn can_enter(&self, _cell: CPos, _mover: AgentId, _mode: BlockingMode) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupant {
    pub agent: AgentId,
    /// Immovable occupants (deployed structures, crushed wrecks) block in every mode.
    pub immovable: bool,
}

/// At most one occupant per cell.
#[derive(Clone)]
pub struct OccupancyMap {
    occupants: CellLayer<Option<Occupant>>,
}

impl OccupancyMap {
    pub fn new(shape: MapShape) -> Self {
        OccupancyMap {
            occupants: CellLayer::filled(shape, None),
        }
    }

    pub fn occupant(&self, cell: CPos) -> Option<Occupant> {
        self.occupants.get(cell).copied().flatten()
    }

    /// Places a transient occupant.
    #[track_caller]
    pub fn occupy(&mut self, cell: CPos, agent: AgentId) {
        self.occupants[cell] = Some(Occupant {
            agent,
            immovable: false,
        });
    }

    #[track_caller]
    pub fn occupy_immovable(&mut self, cell: CPos, agent: AgentId) {
        self.occupants[cell] = Some(Occupant {
            agent,
            immovable: true,
        });
    }

    #[track_caller]
    pub fn vacate(&mut self, cell: CPos) {
        self.occupants[cell] = None;
    }
}

impl Blocking for OccupancyMap {
    fn can_enter(&self, cell: CPos, mover: AgentId, mode: BlockingMode) -> bool {
        let Some(slot) = self.occupants.get(cell) else {
            return false;
        };
        let Some(occupant) = slot else {
            return true;
        };
        if occupant.agent == mover {
            return true;
        }
        if occupant.immovable {
            return false;
        }
        match mode {
            BlockingMode::IgnoreTransient => true,
            BlockingMode::RespectAll => false,
            BlockingMode::RespectAllExcept(ignored) => occupant.agent == ignored,
        }
    }
}
