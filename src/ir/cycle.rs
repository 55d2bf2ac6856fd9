//! Cycle detection over the target dependency relation.
//!
//! Runs once, globally, before any edge is emitted. Dangling dependency
//! references are collected during the same walk so the caller can report
//! them as schema errors instead of letting them surface as confusing build
//! failures downstream.

use std::collections::HashMap;

use crate::registry::TargetRegistry;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

pub(crate) struct DependencyReport {
    pub(crate) cycle: Option<Vec<String>>,
    pub(crate) missing: Vec<(String, String)>,
}

pub(crate) fn analyse(registry: &TargetRegistry) -> DependencyReport {
    let mut detector = CycleDetector::new(registry);
    let mut cycle = None;
    for target in registry.iter() {
        if detector.is_visited(&target.name) {
            continue;
        }
        if let Some(found) = detector.visit(target.name.clone()) {
            cycle = Some(found);
            break;
        }
    }
    DependencyReport {
        cycle,
        missing: detector.missing,
    }
}

struct CycleDetector<'a> {
    registry: &'a TargetRegistry,
    stack: Vec<String>,
    states: HashMap<String, VisitState>,
    missing: Vec<(String, String)>,
}

impl<'a> CycleDetector<'a> {
    fn new(registry: &'a TargetRegistry) -> Self {
        Self {
            registry,
            stack: Vec::new(),
            states: HashMap::new(),
            missing: Vec::new(),
        }
    }

    fn is_visited(&self, node: &str) -> bool {
        matches!(self.states.get(node), Some(VisitState::Visited))
    }

    fn visit(&mut self, node: String) -> Option<Vec<String>> {
        match self.states.get(&node) {
            Some(VisitState::Visited) => return None,
            Some(VisitState::Visiting) => {
                let idx = self.stack.iter().position(|n| n == &node).unwrap_or(0);
                let mut cycle: Vec<String> = self.stack.iter().skip(idx).cloned().collect();
                cycle.push(node);
                return Some(canonicalize_cycle(cycle));
            }
            None => {
                self.states.insert(node.clone(), VisitState::Visiting);
            }
        }

        self.stack.push(node.clone());

        if let Some(target) = self.registry.get(&node) {
            for dep in &target.dependencies {
                if self.registry.get(&dep.target).is_none() {
                    self.missing.push((node.clone(), dep.target.clone()));
                    continue;
                }
                if let Some(cycle) = self.visit(dep.target.clone()) {
                    return Some(cycle);
                }
            }
        }

        self.stack.pop();
        self.states.insert(node, VisitState::Visited);
        None
    }
}

/// Rotate the cycle so the lexicographically smallest member leads, giving a
/// stable report regardless of traversal entry point.
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
        slot.clone_from(&first);
    }
    cycle
}
