//! Graph construction from snapshot records

use super::record::{InteractionRecord, UserRecord, ValidationError};
use super::store::{GraphError, SocialGraph};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// Which kind of record was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    User,
    Interaction,
}

/// A record left out of the graph, with its position in the input slice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub kind: RecordKind,
    pub index: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: ValidationError,
}

fn serialize_display<S: serde::Serializer>(
    error: &ValidationError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// What happened to every input record during a build
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub users_accepted: usize,
    /// Accepted user records that replaced an earlier record with the same id
    pub users_replaced: usize,
    pub interactions_accepted: usize,
    /// Accepted interactions collapsed onto an already existing edge
    pub interactions_collapsed: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl BuildReport {
    pub fn skipped_users(&self) -> impl Iterator<Item = &SkippedRecord> + '_ {
        self.skipped.iter().filter(|s| s.kind == RecordKind::User)
    }

    pub fn skipped_interactions(&self) -> impl Iterator<Item = &SkippedRecord> + '_ {
        self.skipped
            .iter()
            .filter(|s| s.kind == RecordKind::Interaction)
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Incremental graph builder.
///
/// All users must be added before the interactions referencing them; an
/// interaction with an endpoint not yet present is skipped.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: SocialGraph,
    report: BuildReport,
    users_seen: usize,
    interactions_seen: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a full snapshot and report on every record
    pub fn build_with_report(
        users: &[UserRecord],
        interactions: &[InteractionRecord],
    ) -> (SocialGraph, BuildReport) {
        let started = Instant::now();
        let mut builder = GraphBuilder::new();
        for record in users {
            builder.add_user_record(record);
        }
        for record in interactions {
            builder.add_interaction_record(record);
        }
        let (graph, report) = builder.finish();

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            skipped = report.skipped.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Built social graph"
        );
        (graph, report)
    }

    pub fn add_user_record(&mut self, record: &UserRecord) {
        let index = self.users_seen;
        self.users_seen += 1;

        match record.validate() {
            Ok(user) => {
                if self.graph.add_user(user).is_some() {
                    self.report.users_replaced += 1;
                }
                self.report.users_accepted += 1;
            }
            Err(error) => self.skip(RecordKind::User, index, error),
        }
    }

    pub fn add_interaction_record(&mut self, record: &InteractionRecord) {
        let index = self.interactions_seen;
        self.interactions_seen += 1;

        let result = record
            .validate()
            .map_err(GraphError::from)
            .and_then(|edge| self.graph.add_interaction(edge));
        match result {
            Ok(created) => {
                self.report.interactions_accepted += 1;
                if !created {
                    self.report.interactions_collapsed += 1;
                }
            }
            Err(GraphError::Validation(error)) => self.skip(RecordKind::Interaction, index, error),
            Err(GraphError::UserNotFound(id)) => self.skip(
                RecordKind::Interaction,
                index,
                ValidationError::UnknownEndpoint(id),
            ),
            Err(other) => {
                debug!(index, error = %other, "Skipping interaction record");
            }
        }
    }

    pub fn graph(&self) -> &SocialGraph {
        &self.graph
    }

    pub fn finish(self) -> (SocialGraph, BuildReport) {
        (self.graph, self.report)
    }

    fn skip(&mut self, kind: RecordKind, index: usize, error: ValidationError) {
        debug!(?kind, index, error = %error, "Skipping record");
        self.report.skipped.push(SkippedRecord { kind, index, error });
    }
}

/// Build the social graph for a snapshot, dropping invalid records
pub fn build_graph(users: &[UserRecord], interactions: &[InteractionRecord]) -> SocialGraph {
    GraphBuilder::build_with_report(users, interactions).0
}
