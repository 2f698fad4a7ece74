//! Transition Graph
//!
//! A directed graph view of a status family's transition table, used to explain which
//! intermediate steps a rejected request would need.

use petgraph::{
    algo::{astar, is_cyclic_directed},
    graph::{DiGraph, NodeIndex},
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::status::{DeliveryStatus, InvalidTransition, LifecycleStatus, OrderStatus, Status};

/// A status family's transition table as a graph.
#[derive(Debug, Clone)]
pub struct TransitionGraph<S: Status> {
    graph: DiGraph<S, ()>,
    nodes: FxHashMap<S, NodeIndex>,
}

impl<S: Status> Default for TransitionGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Status> TransitionGraph<S> {
    /// Build the graph from the family's successor table.
    pub fn new() -> Self {
        let mut graph = DiGraph::with_capacity(S::ALL.len(), S::ALL.len() * 2);
        let mut nodes = FxHashMap::default();

        for &status in S::ALL {
            nodes.insert(status, graph.add_node(status));
        }

        for &from in S::ALL {
            for &to in from.successors() {
                if let (Some(&a), Some(&b)) = (nodes.get(&from), nodes.get(&to)) {
                    graph.add_edge(a, b, ());
                }
            }
        }

        Self { graph, nodes }
    }

    /// Shortest sequence of statuses leading from `from` to `to`, both included.
    pub fn path(&self, from: S, to: S) -> Option<SmallVec<[S; 8]>> {
        let (&start, &goal) = (self.nodes.get(&from)?, self.nodes.get(&to)?);

        if start == goal {
            return None;
        }

        let (_, route) = astar(&self.graph, start, |node| node == goal, |_| 1_u32, |_| 0)?;

        Some(
            route
                .into_iter()
                .filter_map(|node| self.graph.node_weight(node).copied())
                .collect(),
        )
    }

    /// Whether the table never allows returning to an earlier status.
    pub fn is_monotonic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }
}

/// Explain why a transition was rejected, naming the next step when the target is still
/// reachable.
pub fn explain(rejection: &InvalidTransition) -> String {
    if let Some(reason) = blocked_by_other_family(rejection) {
        return reason;
    }

    let next_step = match (rejection.from, rejection.to) {
        (LifecycleStatus::Order(from), LifecycleStatus::Order(to)) => {
            first_step(&TransitionGraph::<OrderStatus>::new(), from, to)
                .map(LifecycleStatus::Order)
        }
        (LifecycleStatus::Delivery(from), LifecycleStatus::Delivery(to)) => {
            first_step(&TransitionGraph::<DeliveryStatus>::new(), from, to)
                .map(LifecycleStatus::Delivery)
        }
        _ => None,
    };

    match next_step {
        Some(step) => format!(
            "{} is not directly reachable from {}; it must first become {}",
            rejection.to.label(),
            rejection.from.label(),
            step.label()
        ),
        None if rejection.from.is_terminal() => {
            format!("{} is final and cannot change", rejection.from.label())
        }
        None => format!(
            "{} can no longer become {}",
            rejection.from.label(),
            rejection.to.label()
        ),
    }
}

fn blocked_by_other_family(rejection: &InvalidTransition) -> Option<String> {
    let to = rejection.to.label();

    match (rejection.from, rejection.to) {
        (_, LifecycleStatus::Delivery(DeliveryStatus::Assigned)) => {
            Some(format!("{to} is set by assigning a driver"))
        }
        (LifecycleStatus::Order(order), LifecycleStatus::Delivery(_)) => Some(format!(
            "{to} needs the order to be Ready; it is {}",
            order.label()
        )),
        (LifecycleStatus::Delivery(delivery), LifecycleStatus::Order(OrderStatus::Completed)) => {
            Some(format!(
                "{to} needs the delivery to be Delivered; it is {}",
                delivery.label()
            ))
        }
        (LifecycleStatus::Delivery(delivery), LifecycleStatus::Order(_)) => Some(format!(
            "the order can no longer become {to}; the delivery is {}",
            delivery.label()
        )),
        _ => None,
    }
}

fn first_step<S: Status>(graph: &TransitionGraph<S>, from: S, to: S) -> Option<S> {
    graph.path(from, to)?.get(1).copied()
}
