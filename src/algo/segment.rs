//! Interest segmentation
//!
//! Groups users by what they are interested in, independent of who they
//! interact with. Each user becomes a one-hot vector over the sorted interest
//! vocabulary, columns are standardized, and k-means (k-means++ seeding,
//! Lloyd iterations) splits the vectors into clusters.

use crate::graph::{UserId, UserRecord};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;
use tracing::info;

const MAX_ITERATIONS: usize = 300;

/// Segmentation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Requested number of clusters
    pub clusters: usize,
    pub seed: u64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            clusters: 4,
            seed: 42,
        }
    }
}

/// Cluster assignment of every valid user
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InterestSegmentation {
    /// Clusters actually formed, at most the number of distinct interest sets
    pub clusters: usize,
    /// Interest vocabulary, one vector column per tag
    pub interests: Vec<String>,
    /// Cluster of each user, users in snapshot order
    pub assignments: IndexMap<UserId, usize>,
    pub cluster_sizes: Vec<usize>,
}

impl InterestSegmentation {
    pub fn cluster_of(&self, user: &UserId) -> Option<usize> {
        self.assignments.get(user).copied()
    }

    /// Users of one cluster in snapshot order
    pub fn members(&self, cluster: usize) -> Vec<&UserId> {
        self.assignments
            .iter()
            .filter(|(_, &c)| c == cluster)
            .map(|(user, _)| user)
            .collect()
    }
}

pub fn interest_segmentation_with(
    users: &[UserRecord],
    config: &SegmentationConfig,
) -> InterestSegmentation {
    interest_segmentation(users, config.clusters, config.seed)
}

/// Cluster users into at most `k` interest segments.
///
/// Only records that validate take part; when several share an id the last
/// one counts. Cluster labels are numbered in order of first appearance, so
/// the first user is always in cluster 0.
pub fn interest_segmentation(users: &[UserRecord], k: usize, seed: u64) -> InterestSegmentation {
    let mut latest: IndexMap<UserId, BTreeSet<String>> = IndexMap::new();
    for user in users.iter().filter_map(|r| r.validate().ok()) {
        latest.insert(user.id, user.interests);
    }
    if latest.is_empty() {
        return InterestSegmentation::default();
    }

    let started = Instant::now();
    let vocabulary: Vec<String> = latest
        .values()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let points = standardized_one_hot(&latest, &vocabulary);

    let distinct = latest.values().collect::<BTreeSet<_>>().len();
    let k = k.clamp(1, distinct);

    let mut rng = StdRng::seed_from_u64(seed);
    let centroids = seed_centroids(&points, k, &mut rng);
    let labels = lloyd(&points, centroids);

    let mut renumbered: HashMap<usize, usize> = HashMap::new();
    let mut cluster_sizes = Vec::new();
    let mut assignments = IndexMap::with_capacity(latest.len());
    for (user, label) in latest.keys().zip(labels) {
        let next = renumbered.len();
        let cluster = *renumbered.entry(label).or_insert(next);
        if cluster == cluster_sizes.len() {
            cluster_sizes.push(0);
        }
        cluster_sizes[cluster] += 1;
        assignments.insert(user.clone(), cluster);
    }

    info!(
        users = assignments.len(),
        interests = vocabulary.len(),
        clusters = cluster_sizes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Segmented users by interest"
    );

    InterestSegmentation {
        clusters: cluster_sizes.len(),
        interests: vocabulary,
        assignments,
        cluster_sizes,
    }
}

/// One row per user. Columns have zero mean and unit variance; a column that
/// every user shares (or nobody has) stays at zero.
fn standardized_one_hot(
    users: &IndexMap<UserId, BTreeSet<String>>,
    vocabulary: &[String],
) -> Vec<Vec<f64>> {
    let n = users.len() as f64;
    let scales: Vec<(f64, f64)> = vocabulary
        .iter()
        .map(|tag| {
            let mean = users.values().filter(|tags| tags.contains(tag)).count() as f64 / n;
            (mean, (mean * (1.0 - mean)).sqrt())
        })
        .collect();

    users
        .values()
        .map(|tags| {
            vocabulary
                .iter()
                .zip(&scales)
                .map(|(tag, &(mean, std))| {
                    if std == 0.0 {
                        return 0.0;
                    }
                    let x = if tags.contains(tag) { 1.0 } else { 0.0 };
                    (x - mean) / std
                })
                .collect()
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(point, centroid);
        // strict: ties keep the lower centroid
        if d < best_distance {
            best = c;
            best_distance = d;
        }
    }
    best
}

/// k-means++: the first centroid uniformly, each next one with probability
/// proportional to its squared distance from the chosen ones.
///
/// `k` must not exceed the number of distinct points, so every pick lands on
/// a new point.
fn seed_centroids(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = vec![points[rng.gen_range(0..points.len())].clone()];
    let mut distances: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = distances.iter().sum();
        if total <= 0.0 {
            break;
        }
        let threshold = rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        let mut selected = None;
        for (i, &d) in distances.iter().enumerate() {
            if d <= 0.0 {
                continue;
            }
            selected = Some(i);
            cumulative += d;
            if cumulative >= threshold {
                break;
            }
        }
        let Some(selected) = selected else {
            break;
        };

        let centroid = points[selected].clone();
        for (d, p) in distances.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &centroid));
        }
        centroids.push(centroid);
    }
    centroids
}

/// Lloyd iterations until assignments stop changing. An emptied cluster
/// keeps its previous centroid.
fn lloyd(points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>) -> Vec<usize> {
    let dims = points.first().map_or(0, Vec::len);
    let mut labels: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();

    for _ in 0..MAX_ITERATIONS {
        let mut sums = vec![vec![0.0; dims]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for (point, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for (s, x) in sums[label].iter_mut().zip(point) {
                *s += x;
            }
        }
        for ((centroid, sum), &count) in centroids.iter_mut().zip(sums).zip(&counts) {
            if count > 0 {
                *centroid = sum.into_iter().map(|s| s / count as f64).collect();
            }
        }

        let next: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();
        if next == labels {
            break;
        }
        labels = next;
    }
    labels
}
