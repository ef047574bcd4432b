//! Interfaces between searches and the graphs they run over.

use crate::Cost;

/// A directed edge produced by a [`PathGraph`].
///
/// `cost` is always finite. Edges that cannot be taken are simply not produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphConnection<S> {
    /// State the edge leads to.
    pub destination: S,
    /// Cost of taking the edge.
    pub cost: Cost,
}

/// A directed graph with non-negative integer edge costs.
pub trait PathGraph {
    /// Identifies a vertex of the graph.
    type State: Copy + Eq;

    /// Appends the outgoing edges of `state` to `edges`. The caller clears `edges` beforehand.
    ///
    /// `previous` is the state `state` was reached from, or `state` itself for start states.
    /// Graphs may use it to skip edges that a path through `previous` always reaches at least as
    /// cheaply.
    fn connections(
        &self,
        state: Self::State,
        previous: Self::State,
        edges: &mut Vec<GraphConnection<Self::State>>,
    );
}

impl<G: PathGraph + ?Sized> PathGraph for &G {
    type State = G::State;

    fn connections(
        &self,
        state: Self::State,
        previous: Self::State,
        edges: &mut Vec<GraphConnection<Self::State>>,
    ) {
        (**self).connections(state, previous, edges)
    }
}
