//! Cycle detection over blueprint labels.

use std::collections::{BTreeMap, HashMap};

/// Tracks the visitation state of a label during cycle detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

/// Edges from each label to the labels it refers to.
pub(super) type Graph<'a> = BTreeMap<&'a str, Vec<&'a str>>;

/// Return the first cycle reachable from the labels in sorted order.
///
/// Labels referenced but absent from `graph` are ignored; linking reports
/// them separately.
pub(super) fn find_cycle(graph: &Graph<'_>) -> Option<Vec<String>> {
    let mut detector = CycleDetector::new(graph);
    graph.keys().find_map(|label| {
        if detector.is_visited(label) {
            return None;
        }
        detector.visit(*label)
    })
}

struct CycleDetector<'g, 'a> {
    graph: &'g Graph<'a>,
    stack: Vec<&'a str>,
    states: HashMap<&'a str, VisitState>,
}

impl<'g, 'a> CycleDetector<'g, 'a> {
    fn new(graph: &'g Graph<'a>) -> Self {
        Self {
            graph,
            stack: Vec::new(),
            states: HashMap::new(),
        }
    }

    fn is_visited(&self, label: &str) -> bool {
        matches!(self.states.get(label), Some(VisitState::Visited))
    }

    fn visit(&mut self, label: &'a str) -> Option<Vec<String>> {
        match self.states.get(label) {
            Some(VisitState::Visited) => return None,
            Some(VisitState::Visiting) => {
                let idx = self
                    .stack
                    .iter()
                    .position(|entry| *entry == label)
                    .unwrap_or_default();
                let mut cycle: Vec<String> = self
                    .stack
                    .iter()
                    .skip(idx)
                    .map(|entry| (*entry).to_owned())
                    .collect();
                cycle.push(label.to_owned());
                return Some(canonicalize_cycle(cycle));
            }
            None => {
                self.states.insert(label, VisitState::Visiting);
            }
        }
        self.stack.push(label);

        let graph = self.graph;
        for dep in graph.get(label).into_iter().flatten() {
            if !graph.contains_key(dep) {
                continue;
            }
            if let Some(cycle) = self.visit(*dep) {
                return Some(cycle);
            }
        }

        self.stack.pop();
        self.states.insert(label, VisitState::Visited);
        None
    }
}

/// Rotate a closed cycle so it starts and ends at its smallest label.
fn canonicalize_cycle(mut cycle: Vec<String>) -> Vec<String> {
    if cycle.len() < 2 {
        return cycle;
    }
    let len = cycle.len() - 1;
    let start = cycle
        .iter()
        .take(len)
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(idx, _)| idx);
    let (prefix, suffix) = cycle.split_at_mut(len);
    prefix.rotate_left(start);
    if let (Some(first), Some(slot)) = (prefix.first().cloned(), suffix.first_mut()) {
        *slot = first;
    }
    cycle
}
