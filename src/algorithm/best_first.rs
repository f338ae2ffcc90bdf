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
    algorithm::ParentMap,
    motion::Path,
    roadmap::{EdgeId, NodeId, Roadmap},
};
use float_ord::FloatOrd;
use std::{
    cmp::{Ordering, Reverse},
    collections::{hash_map::Entry, BinaryHeap, HashMap},
};

/// An entry of the best-first frontier queue.
#[derive(Debug, Clone, Copy)]
struct FrontierTicket {
    evaluation: FloatOrd<f64>,
    node: NodeId,
    parent: Option<EdgeId>,
}

impl PartialEq for FrontierTicket {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierTicket {}

impl PartialOrd for FrontierTicket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierTicket {
    fn cmp(&self, other: &Self) -> Ordering {
        // Equal-cost tickets are ordered by node id, then by incoming edge
        // id, so that the expansion order, and with it the winner of cost
        // ties, is deterministic.
        self.evaluation
            .cmp(&other.evaluation)
            .then_with(|| self.node.cmp(&other.node))
            .then_with(|| self.parent.cmp(&other.parent))
    }
}

/// Compute a fresh [`ParentMap`] rooted at `root`, covering every node that
/// can be reached by following out-edges, by best-first expansion in order
/// of accumulated cost.
///
/// Edge path lengths must be non-negative; a negative length makes the
/// expansion order undefined and is a contract violation of the steering
/// method that produced the path.
pub fn compute_parent_map<C, P: Path<C>>(roadmap: &Roadmap<C, P>, root: NodeId) -> ParentMap {
    let mut visited: HashMap<NodeId, (Option<EdgeId>, f64)> = HashMap::new();
    let mut queue = BinaryHeap::new();
    queue.push(Reverse(FrontierTicket {
        evaluation: FloatOrd(0.0),
        node: root,
        parent: None,
    }));

    while let Some(Reverse(ticket)) = queue.pop() {
        let cost = ticket.evaluation.0;
        let expand = match visited.entry(ticket.node) {
            Entry::Vacant(entry) => {
                entry.insert((ticket.parent, cost));
                true
            }
            Entry::Occupied(mut entry) => {
                // Normally every node is settled at its best cost before any
                // of its children are popped, but if a cheaper way in shows
                // up late we overwrite the record and re-expand.
                if entry.get().1 > cost {
                    entry.insert((ticket.parent, cost));
                    true
                } else {
                    false
                }
            }
        };

        if !expand {
            continue;
        }

        for edge_id in roadmap.out_edges(ticket.node) {
            let edge = roadmap.edge(edge_id);
            queue.push(Reverse(FrontierTicket {
                evaluation: FloatOrd(cost + edge.path().length()),
                node: edge.to(),
                parent: Some(edge_id),
            }));
        }
    }

    ParentMap::from_parts(
        root,
        visited
            .into_iter()
            .map(|(node, (parent, _))| (node, parent))
            .collect(),
    )
}
