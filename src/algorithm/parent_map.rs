/*
 * Copyright (C) 2023 Open Source Robotics Foundation
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 *
*/

use crate::{
    error::ThisError,
    motion::Path,
    roadmap::{EdgeId, NodeId, Roadmap},
};
use std::collections::HashMap;

/// A shortest-path tree over a roadmap, rooted at one node and represented
/// as a flat map from each reachable node to the incoming edge on its
/// shortest known path back to the root.
///
/// Exactly one node, the root, maps to `None`. For every other mapped node
/// `n` the stored edge satisfies `edge.to() == n` and `edge.from()` is also
/// mapped, so following parents from any mapped node reaches the root in
/// finitely many steps.
///
/// Nodes are owned by the roadmap; the map stores only handles, which is
/// what lets a single node belong to two parent maps at once.
#[derive(Debug, Clone)]
pub struct ParentMap {
    root: NodeId,
    parents: HashMap<NodeId, Option<EdgeId>>,
}

impl ParentMap {
    /// A fresh map containing only its root.
    pub fn new(root: NodeId) -> Self {
        let mut parents = HashMap::new();
        parents.insert(root, None);
        Self { root, parents }
    }

    pub(crate) fn from_parts(root: NodeId, parents: HashMap<NodeId, Option<EdgeId>>) -> Self {
        Self { root, parents }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.parents.contains_key(&node)
    }

    /// The parent entry of a node: `None` if the node is not mapped,
    /// `Some(None)` if it is the root, and `Some(Some(edge))` otherwise.
    pub fn parent(&self, node: NodeId) -> Option<Option<EdgeId>> {
        self.parents.get(&node).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.parents.keys().copied()
    }

    /// Establish the parent of a node, inserting the node into the map if it
    /// was not mapped yet.
    ///
    /// When an edge is given, its origin must already be mapped; otherwise
    /// the map would no longer be a tree anchored at the root, which is a
    /// logic bug in the caller.
    pub fn set_parent<C, P>(
        &mut self,
        roadmap: &Roadmap<C, P>,
        node: NodeId,
        parent: Option<EdgeId>,
    ) -> Result<(), ParentMapError> {
        if let Some(edge) = parent {
            let edge = roadmap.edge(edge);
            debug_assert_eq!(edge.to(), node);
            if !self.parents.contains_key(&edge.from()) {
                return Err(ParentMapError::Inconsistent {
                    node,
                    from: edge.from(),
                });
            }
        }

        self.parents.insert(node, parent);
        Ok(())
    }

    /// The accumulated path length from the root down to a node, computed by
    /// walking the parent chain. O(depth); costs are deliberately not cached
    /// so that re-pointing a parent stays O(1).
    pub fn cost_to_root<C, P: Path<C>>(
        &self,
        roadmap: &Roadmap<C, P>,
        node: NodeId,
    ) -> Result<f64, ParentMapError> {
        let mut cost = 0.0;
        let mut current = node;
        loop {
            match self.parents.get(&current) {
                None => return Err(ParentMapError::OrphanNode(current)),
                Some(None) => return Ok(cost),
                Some(Some(edge)) => {
                    let edge = roadmap.edge(*edge);
                    cost += edge.path().length();
                    current = edge.from();
                }
            }
        }
    }
}

#[derive(ThisError, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentMapError {
    #[error(
        "the edge into node {node:?} comes from {from:?}, which is not in the \
        parent map - this is a critical implementation error, please report \
        this bug"
    )]
    Inconsistent { node: NodeId, from: NodeId },
    #[error(
        "node {0:?} is not connected to the root of the parent map - this is \
        a critical implementation error, please report this bug"
    )]
    OrphanNode(NodeId),
}
