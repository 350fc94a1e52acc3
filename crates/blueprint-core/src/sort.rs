//! Dependency ordering of nodes.

use crate::node::{Node, NodeWithPosition};
use std::collections::HashMap;

/// Something with a name that depends on other names
pub trait Dependent {
    fn name(&self) -> &str;

    /// Names this item depends on, in insertion order
    fn dependencies(&self) -> Vec<&str>;
}

impl Dependent for Node {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<&str> {
        self.uses().into_iter().collect()
    }
}

impl Dependent for NodeWithPosition {
    fn name(&self) -> &str {
        &self.node.name
    }

    fn dependencies(&self) -> Vec<&str> {
        self.node.dependencies()
    }
}

struct Frame {
    index: usize,
    dependencies: Vec<usize>,
    next: usize,
}

/// Order `items` so that dependencies come before their dependents.
///
/// Depth-first post-order, starting from each item in input order. Names
/// outside `items` are ignored. An item already visited (including one
/// further up the current path) is not descended into again, so cycles
/// produce a complete order instead of looping. Returns indices into `items`.
pub fn topological_order<T: Dependent>(items: &[T]) -> Vec<usize> {
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        index_of.entry(item.name()).or_insert(i);
    }
    let dependencies_of = |i: usize| -> Vec<usize> {
        items[i]
            .dependencies()
            .into_iter()
            .filter_map(|name| index_of.get(name).copied())
            .collect()
    };

    let mut visited = vec![false; items.len()];
    let mut order = Vec::with_capacity(items.len());
    let mut stack: Vec<Frame> = Vec::new();

    for root in 0..items.len() {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        stack.push(Frame {
            index: root,
            dependencies: dependencies_of(root),
            next: 0,
        });

        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.dependencies.len() {
                let dependency = frame.dependencies[frame.next];
                frame.next += 1;
                if !visited[dependency] {
                    visited[dependency] = true;
                    stack.push(Frame {
                        index: dependency,
                        dependencies: dependencies_of(dependency),
                        next: 0,
                    });
                }
            } else {
                order.push(frame.index);
                stack.pop();
            }
        }
    }

    order
}

/// [`topological_order`], returning references.
pub fn topological_sort<T: Dependent>(items: &[T]) -> Vec<&T> {
    topological_order(items).into_iter().map(|i| &items[i]).collect()
}
