//! In-memory social graph
//!
//! Users and collapsed interactions live in insertion-ordered maps so every
//! derived view (CSR projection, partitions, rankings) is deterministic for a
//! fixed input order.

use super::edge::Interaction;
use super::node::User;
use super::record::ValidationError;
use super::types::{EdgeKey, UserId};
use indexmap::IndexMap;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Invalid edge {source_user}--{target_user}: {reason}")]
    InvalidEdge {
        source_user: String,
        target_user: String,
        reason: String,
    },

    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Undirected, weighted social graph
///
/// - nodes: UserId -> User, in first-insertion order
/// - edges: EdgeKey -> Interaction, in first-insertion order
/// - incident: node position -> positions of its edges
#[derive(Debug, Clone, Default)]
pub struct SocialGraph {
    nodes: IndexMap<UserId, User>,
    edges: IndexMap<EdgeKey, Interaction>,
    incident: Vec<Vec<usize>>,
}

impl SocialGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.nodes.get(id)
    }

    pub fn contains_user(&self, id: &UserId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Users in insertion order
    pub fn users(&self) -> impl Iterator<Item = &User> + '_ {
        self.nodes.values()
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> + '_ {
        self.nodes.keys()
    }

    /// Insertion position of a user
    pub fn user_index(&self, id: &UserId) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub fn user_at(&self, index: usize) -> Option<&User> {
        self.nodes.get_index(index).map(|(_, user)| user)
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Interaction> + '_ {
        self.edges.values()
    }

    /// The edge between two users, in either orientation
    pub fn edge(&self, a: &UserId, b: &UserId) -> Option<&Interaction> {
        self.edges.get(&EdgeKey::new(a.clone(), b.clone()))
    }

    pub fn has_edge(&self, a: &UserId, b: &UserId) -> bool {
        self.edge(a, b).is_some()
    }

    /// Adjacent users, ordered by when the connecting edge was first seen
    pub fn neighbors(&self, id: &UserId) -> GraphResult<Vec<&UserId>> {
        let edges = self.user_interactions(id)?;
        Ok(edges.into_iter().filter_map(|e| e.other(id)).collect())
    }

    pub fn degree(&self, id: &UserId) -> GraphResult<usize> {
        let index = self.require(id)?;
        Ok(self.incident[index].len())
    }

    /// Every edge touching `id`
    pub fn user_interactions(&self, id: &UserId) -> GraphResult<Vec<&Interaction>> {
        let index = self.require(id)?;
        Ok(self.incident[index]
            .iter()
            .filter_map(|&e| self.edges.get_index(e).map(|(_, edge)| edge))
            .collect())
    }

    /// Insert a user. A user with the same id is replaced in place and
    /// returned; its edges are kept.
    pub fn add_user(&mut self, user: User) -> Option<User> {
        let (index, previous) = self.nodes.insert_full(user.id.clone(), user);
        if index == self.incident.len() {
            self.incident.push(Vec::new());
        }
        previous
    }

    /// Insert an interaction between two existing users.
    ///
    /// Returns `true` when a new edge was created and `false` when the record
    /// was collapsed onto an existing edge.
    pub fn add_interaction(&mut self, interaction: Interaction) -> GraphResult<bool> {
        if interaction.source == interaction.target {
            return Err(ValidationError::SelfInteraction(interaction.source).into());
        }
        if interaction.weight == 0 {
            return Err(ValidationError::InvalidWeight {
                source_user: interaction.source,
                target_user: interaction.target,
                weight: 0,
            }
            .into());
        }
        let source = self
            .user_index(&interaction.source)
            .ok_or_else(|| ValidationError::UnknownEndpoint(interaction.source.clone()))?;
        let target = self
            .user_index(&interaction.target)
            .ok_or_else(|| ValidationError::UnknownEndpoint(interaction.target.clone()))?;

        let key = interaction.key();
        if let Some(existing) = self.edges.get_mut(&key) {
            existing.absorb(interaction);
            return Ok(false);
        }

        let (position, _) = self.edges.insert_full(key, interaction);
        self.incident[source].push(position);
        self.incident[target].push(position);
        Ok(true)
    }

    /// Sum of all edge weights, saturating at `u64::MAX`
    pub fn total_weight(&self) -> u64 {
        self.edges
            .values()
            .fold(0u64, |total, e| total.saturating_add(e.weight))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.incident.clear();
    }

    fn require(&self, id: &UserId) -> GraphResult<usize> {
        self.user_index(id)
            .ok_or_else(|| GraphError::UserNotFound(id.clone()))
    }
}
