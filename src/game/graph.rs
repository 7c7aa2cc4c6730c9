//! Undirected room connectivity graph.
//!
//! The graph knows nothing about room metadata; it only tracks which room ids
//! are directly reachable from which. Every edge is stored in both directions
//! inside a single call so the adjacency sets stay symmetric.

use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;

use log::{debug, warn};

use crate::game::errors::GameError;
use crate::game::types::{Connection, RoomId};

/// Adjacency-list graph over room ids with BFS shortest-path lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomGraph {
    adjacency: HashMap<RoomId, HashSet<RoomId>>,
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from persisted connection rows.
    pub fn from_connections<I>(connections: I) -> Self
    where
        I: IntoIterator<Item = Connection>,
    {
        let mut graph = Self::new();
        for connection in connections {
            graph.connect(connection.from, connection.to);
        }
        graph
    }

    /// Connect `a` and `b` in both directions. Connecting an existing pair is a no-op.
    pub fn connect(&mut self, a: RoomId, b: RoomId) {
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    pub fn is_connected(&self, a: RoomId, b: RoomId) -> bool {
        self.adjacency
            .get(&a)
            .map(|neighbors| neighbors.contains(&b))
            .unwrap_or(false)
    }

    /// Neighbours of `room` in ascending id order. Unknown rooms have none.
    pub fn neighbors(&self, room: RoomId) -> Vec<RoomId> {
        let mut out: Vec<RoomId> = self
            .adjacency
            .get(&room)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    pub fn contains_room(&self, room: RoomId) -> bool {
        self.adjacency.contains_key(&room)
    }

    /// Number of rooms that take part in at least one connection.
    pub fn room_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges; a self-loop counts once.
    pub fn edge_count(&self) -> usize {
        self.edges().len()
    }

    /// All undirected edges with the lower id first, sorted.
    pub fn edges(&self) -> Vec<Connection> {
        let mut edges: Vec<Connection> = self
            .adjacency
            .iter()
            .flat_map(|(&a, neighbors)| {
                neighbors
                    .iter()
                    .filter(move |&&b| a <= b)
                    .map(move |&b| Connection::new(a, b))
            })
            .collect();
        edges.sort();
        edges
    }

    /// Breadth-first shortest path from `from` to `to`, endpoints included.
    ///
    /// Neighbours are expanded lowest id first, so among several minimum-length
    /// paths the same one is always returned. An empty vector means no path:
    /// either endpoint is unknown, the rooms are in different components, or
    /// `from == to` without a self-loop. With a self-loop the path is `[from]`.
    pub fn find_shortest_path(&self, from: RoomId, to: RoomId) -> Vec<RoomId> {
        if from == to {
            return if self.is_connected(from, from) {
                vec![from]
            } else {
                Vec::new()
            };
        }
        if !self.contains_room(from) || !self.contains_room(to) {
            return Vec::new();
        }

        let mut parents: HashMap<RoomId, RoomId> = HashMap::new();
        let mut visited: HashSet<RoomId> = HashSet::from([from]);
        let mut queue: VecDeque<RoomId> = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if !visited.insert(next) {
                    continue;
                }
                parents.insert(next, current);
                if next == to {
                    return Self::rebuild_path(&parents, from, to);
                }
                queue.push_back(next);
            }
        }

        Vec::new()
    }

    /// Minimum number of edges between two rooms, if they are connected at all.
    pub fn distance(&self, from: RoomId, to: RoomId) -> Option<usize> {
        let path = self.find_shortest_path(from, to);
        if path.is_empty() {
            None
        } else {
            Some(path.len() - 1)
        }
    }

    fn rebuild_path(parents: &HashMap<RoomId, RoomId>, from: RoomId, to: RoomId) -> Vec<RoomId> {
        let mut path = vec![to];
        let mut cursor = to;
        while cursor != from {
            match parents.get(&cursor) {
                Some(&parent) => {
                    path.push(parent);
                    cursor = parent;
                }
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }

    /// Bulk-load edges from the storage collaborator.
    ///
    /// Resolves with the number of pairs applied. On failure the graph keeps
    /// whatever it held before; no rollback is attempted.
    pub async fn preload_connections<F>(&mut self, fetch: F) -> Result<usize, GameError>
    where
        F: Future<Output = Result<Vec<Connection>, GameError>>,
    {
        let connections = match fetch.await {
            Ok(connections) => connections,
            Err(e) => {
                warn!("Room graph preload failed: {}", e);
                return Err(e);
            }
        };
        let count = connections.len();
        for connection in connections {
            self.connect(connection.from, connection.to);
        }
        debug!(
            "Room graph preloaded {} connections ({} rooms, {} edges)",
            count,
            self.room_count(),
            self.edge_count()
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> RoomGraph {
        let mut graph = RoomGraph::new();
        graph.connect(1, 2);
        graph.connect(2, 3);
        graph
    }

    #[test]
    fn connect_is_symmetric() {
        let graph = chain();
        assert!(graph.is_connected(1, 2));
        assert!(graph.is_connected(2, 1));
        assert!(graph.is_connected(2, 3));
        assert!(graph.is_connected(3, 2));
        assert!(!graph.is_connected(1, 3));
    }

    #[test]
    fn unknown_and_self_pairs_are_not_connected() {
        let graph = chain();
        assert!(!graph.is_connected(1, 1));
        assert!(!graph.is_connected(9, 1));
        assert!(!graph.is_connected(1, 9));
    }

    #[test]
    fn connect_twice_is_idempotent() {
        let mut once = RoomGraph::new();
        once.connect(4, 7);
        let mut twice = once.clone();
        twice.connect(4, 7);
        twice.connect(7, 4);
        assert_eq!(once, twice);
        assert_eq!(twice.neighbors(4), vec![7]);
        assert_eq!(twice.edge_count(), 1);
    }

    #[test]
    fn shortest_path_through_middle_room() {
        let graph = chain();
        assert_eq!(graph.find_shortest_path(1, 3), vec![1, 2, 3]);
        assert_eq!(graph.find_shortest_path(3, 1), vec![3, 2, 1]);
        assert_eq!(graph.find_shortest_path(1, 2), vec![1, 2]);
    }

    #[test]
    fn missing_room_yields_empty_path() {
        let graph = chain();
        assert!(graph.find_shortest_path(1, 4).is_empty());
        assert!(graph.find_shortest_path(4, 1).is_empty());
        assert_eq!(graph.distance(1, 4), None);
    }

    #[test]
    fn same_room_needs_a_self_loop() {
        let mut graph = chain();
        assert!(graph.find_shortest_path(2, 2).is_empty());
        graph.connect(2, 2);
        assert!(graph.is_connected(2, 2));
        assert_eq!(graph.find_shortest_path(2, 2), vec![2]);
        assert_eq!(graph.distance(2, 2), Some(0));
    }

    #[test]
    fn disconnected_components_have_no_path() {
        let mut graph = chain();
        graph.connect(10, 11);
        assert!(graph.find_shortest_path(1, 11).is_empty());
    }

    #[test]
    fn ties_break_towards_lower_ids() {
        // Two routes of equal length from 1 to 4: via 2 and via 3.
        let mut graph = RoomGraph::new();
        graph.connect(1, 3);
        graph.connect(3, 4);
        graph.connect(1, 2);
        graph.connect(2, 4);
        assert_eq!(graph.find_shortest_path(1, 4), vec![1, 2, 4]);
    }

    #[test]
    fn path_length_matches_minimum_edge_count() {
        // Ring of six rooms plus a shortcut 1-4.
        let mut graph = RoomGraph::new();
        for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1), (1, 4)] {
            graph.connect(a, b);
        }
        assert_eq!(graph.find_shortest_path(2, 5).len(), 1 + 3);
        assert_eq!(graph.distance(1, 5), Some(2));
        assert_eq!(graph.distance(3, 6), Some(3));
    }

    #[test]
    fn edges_are_listed_once() {
        let graph = RoomGraph::from_connections([Connection::new(3, 1), Connection::new(1, 2)]);
        assert_eq!(
            graph.edges(),
            vec![Connection::new(1, 2), Connection::new(1, 3)]
        );
        assert_eq!(graph.room_count(), 3);
    }

    #[test]
    fn preload_connects_every_pair() {
        let mut graph = RoomGraph::new();
        let seeded = vec![Connection::new(1, 2), Connection::new(2, 3), Connection::new(5, 3)];
        let expected = seeded.clone();
        let applied = tokio_test::block_on(graph.preload_connections(async move { Ok(seeded) }))
            .expect("preload");
        assert_eq!(applied, 3);
        for connection in expected {
            assert!(graph.is_connected(connection.from, connection.to));
            assert!(graph.is_connected(connection.to, connection.from));
        }
    }

    #[test]
    fn failed_preload_keeps_existing_edges() {
        let mut graph = chain();
        let result = tokio_test::block_on(graph.preload_connections(async {
            Err(GameError::Internal("connection refused".into()))
        }));
        assert!(matches!(result, Err(GameError::Internal(_))));
        assert!(graph.is_connected(1, 2));
        assert_eq!(graph.edge_count(), 2);
    }
}
