use crate::{AgentId, BlockingMode};

/// Heuristic weight used when a search does not ask for one. Paths cost at most 25% more than the
/// cheapest path.
pub const DEFAULT_HEURISTIC_WEIGHT_PERCENTAGE: u32 = 125;

/// Whether forward searches apply lane bias unless told otherwise.
pub const DEFAULT_LANE_BIAS: bool = true;

/// Cost added per axis when a step goes against the lane of the cell it enters.
pub const LANE_BIAS_COST: u32 = 1;

/// How a [`GridPathGraph`](crate::GridPathGraph) turns the map into edges for one mover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GraphOptions {
    /// The agent searching. Cells it occupies itself never block it.
    pub mover: AgentId,
    pub blocking: BlockingMode,
    /// The graph is searched from the destination back towards the mover. Flips lane parity.
    pub reverse: bool,
    /// Explicit lane bias setting. When unset, forward searches use [`DEFAULT_LANE_BIAS`] and
    /// reverse searches go without.
    pub lane_bias: Option<bool>,
    /// Only enumerate the neighbors ahead of the arrival direction.
    ///
    /// Finds optimal paths on maps where every cell costs the same. On maps with mixed terrain it
    /// can miss a cheaper detour, in exchange for evaluating fewer edges.
    pub prune_by_arrival: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        GraphOptions {
            mover: AgentId::default(),
            blocking: BlockingMode::default(),
            reverse: false,
            lane_bias: None,
            prune_by_arrival: false,
        }
    }
}

impl GraphOptions {
    pub fn new(mover: AgentId) -> Self {
        GraphOptions {
            mover,
            ..GraphOptions::default()
        }
    }

    pub fn lane_bias_enabled(&self) -> bool {
        self.lane_bias.unwrap_or(!self.reverse && DEFAULT_LANE_BIAS)
    }

    pub fn blocking(mut self, blocking: BlockingMode) -> Self {
        self.blocking = blocking;
        self
    }

    /// Respect every occupant except `agent`.
    pub fn ignoring(self, agent: AgentId) -> Self {
        self.blocking(BlockingMode::RespectAllExcept(agent))
    }

    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn lane_bias(mut self, lane_bias: bool) -> Self {
        self.lane_bias = Some(lane_bias);
        self
    }

    pub fn prune_by_arrival(mut self, prune: bool) -> Self {
        self.prune_by_arrival = prune;
        self
    }
}

/// Tuning shared by every search a caller starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchOptions {
    /// Percentage the heuristic is scaled by. 100 gives optimal paths; larger values expand fewer
    /// cells and return paths costing at most this percentage of the optimum.
    pub heuristic_weight_percentage: u32,
    /// Record the order cells are closed in.
    pub trace_closures: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            heuristic_weight_percentage: DEFAULT_HEURISTIC_WEIGHT_PERCENTAGE,
            trace_closures: false,
        }
    }
}

#[test]
fn lane_bias_defaults_depend_on_direction() {
    let forward = GraphOptions::default();
    assert!(forward.lane_bias_enabled());
    assert!(!forward.reversed(true).lane_bias_enabled());
    assert!(forward.reversed(true).lane_bias(true).lane_bias_enabled());
    assert!(!forward.lane_bias(false).lane_bias_enabled());

    let options = GraphOptions::new(AgentId(4)).ignoring(AgentId(9));
    assert_eq!(options.mover, AgentId(4));
    assert_eq!(options.blocking, BlockingMode::RespectAllExcept(AgentId(9)));
    assert_eq!(SearchOptions::default().heuristic_weight_percentage, 125);
}
