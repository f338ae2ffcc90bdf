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

use crate::domain::Space;
use smallvec::SmallVec;

/// Identifies a node in a [`Roadmap`]. Handles are only meaningful for the
/// roadmap that minted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Identifies a directed edge in a [`Roadmap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(usize);

impl EdgeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Identifies a connected component of a [`Roadmap`]. Component handles are
/// invalidated when their component is merged into another one, so they
/// should be re-read from a node rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(usize);

/// A roadmap vertex: a configuration plus its current connected component.
#[derive(Debug, Clone)]
pub struct Node<C> {
    configuration: C,
    component: ComponentId,
}

impl<C> Node<C> {
    pub fn configuration(&self) -> &C {
        &self.configuration
    }

    pub fn component(&self) -> ComponentId {
        self.component
    }
}

/// A directed roadmap edge carrying the path that realizes it.
#[derive(Debug, Clone)]
pub struct Edge<P> {
    from: NodeId,
    to: NodeId,
    path: P,
}

impl<P> Edge<P> {
    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn path(&self) -> &P {
        &self.path
    }
}

/// A growing collection of configurations and the directed paths between
/// them, with connected component tracking.
///
/// Nodes and edges are stored in arenas and referred to by integer handles;
/// neither is ever removed. Inserting an edge between two different
/// components merges them, and a merge is permanent.
#[derive(Debug, Clone)]
pub struct Roadmap<C, P> {
    nodes: Vec<Node<C>>,
    edges: Vec<Edge<P>>,
    out_edges: Vec<SmallVec<[EdgeId; 4]>>,
    /// Member lists per component. A slot is `None` once its component has
    /// been merged into another one.
    components: Vec<Option<Vec<NodeId>>>,
    component_count: usize,
}

impl<C, P> Default for Roadmap<C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, P> Roadmap<C, P> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            out_edges: Vec::new(),
            components: Vec::new(),
            component_count: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: NodeId) -> &Node<C> {
        &self.nodes[id.0]
    }

    pub fn configuration(&self, id: NodeId) -> &C {
        &self.nodes[id.0].configuration
    }

    pub fn edge(&self, id: EdgeId) -> &Edge<P> {
        &self.edges[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edges[id.0].iter().copied()
    }

    pub fn component_of(&self, id: NodeId) -> ComponentId {
        self.nodes[id.0].component
    }

    pub fn component_count(&self) -> usize {
        self.component_count
    }

    pub fn same_component(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes[a.0].component == self.nodes[b.0].component
    }

    /// The nodes currently belonging to a component. Empty for component
    /// handles that have been merged away.
    pub fn component_nodes(&self, component: ComponentId) -> &[NodeId] {
        self.components[component.0].as_deref().unwrap_or(&[])
    }

    /// Insert a configuration as a new node in its own fresh component.
    ///
    /// If the roadmap already contains a node with an equal configuration,
    /// that node is returned instead of inserting a duplicate. This is what
    /// lets two trees grown towards the same sample become connectable: an
    /// extension that lands exactly on a node of the other tree resolves to
    /// that node, and the subsequent edge insertion merges the components.
    pub fn add_node(&mut self, configuration: C) -> NodeId
    where
        C: PartialEq,
    {
        if let Some(existing) = self
            .nodes
            .iter()
            .position(|node| node.configuration == configuration)
        {
            return NodeId(existing);
        }

        let id = NodeId(self.nodes.len());
        let component = ComponentId(self.components.len());
        self.components.push(Some(vec![id]));
        self.component_count += 1;
        self.nodes.push(Node {
            configuration,
            component,
        });
        self.out_edges.push(SmallVec::new());
        id
    }

    /// Insert a directed edge. When `from` and `to` belong to different
    /// components, the components are merged.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, path: P) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge { from, to, path });
        self.out_edges[from.0].push(id);

        let keep = self.nodes[from.0].component;
        let absorb = self.nodes[to.0].component;
        if keep != absorb {
            self.merge_components(keep, absorb);
        }

        id
    }

    fn merge_components(&mut self, a: ComponentId, b: ComponentId) {
        let a_len = self.components[a.0].as_ref().map_or(0, Vec::len);
        let b_len = self.components[b.0].as_ref().map_or(0, Vec::len);
        let (keep, absorb) = if a_len >= b_len { (a, b) } else { (b, a) };

        let moved = self.components[absorb.0]
            .take()
            .unwrap_or_default();
        for id in &moved {
            self.nodes[id.0].component = keep;
        }

        self.components[keep.0]
            .as_mut()
            .expect("merge target component must be live")
            .extend(moved);
        self.component_count -= 1;
    }

    /// The node closest to `q`, optionally restricted to one connected
    /// component, along with its distance. `None` on an empty roadmap or an
    /// empty component.
    pub fn nearest<S: Space<C>>(
        &self,
        space: &S,
        q: &C,
        within: Option<ComponentId>,
    ) -> Option<(NodeId, f64)> {
        let mut best: Option<(NodeId, f64)> = None;
        self.for_each_candidate(within, |id| {
            let distance = space.distance(&self.nodes[id.0].configuration, q);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((id, distance));
            }
        });
        best
    }

    /// All nodes within `radius` of `q`, optionally restricted to one
    /// connected component, in ascending node id order.
    pub fn nodes_within_ball<S: Space<C>>(
        &self,
        space: &S,
        q: &C,
        radius: f64,
        within: Option<ComponentId>,
    ) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.for_each_candidate(within, |id| {
            if space.distance(&self.nodes[id.0].configuration, q) <= radius {
                found.push(id);
            }
        });
        found.sort_unstable();
        found
    }

    fn for_each_candidate(&self, within: Option<ComponentId>, mut f: impl FnMut(NodeId)) {
        match within {
            Some(component) => {
                for id in self.component_nodes(component) {
                    f(*id);
                }
            }
            None => {
                for index in 0..self.nodes.len() {
                    f(NodeId(index));
                }
            }
        }
    }
}
