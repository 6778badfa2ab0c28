//! KYN CLI: runs social graph analytics over a JSON snapshot on disk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use kyn::algo::TrendGranularity;
use kyn::{AnalyticsEngine, Dataset, EngineConfig, UserId};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "kyn", version, about = "KYN social graph analytics")]
struct Cli {
    /// Snapshot file with `users` and `interactions` arrays
    #[arg(long, global = true, env = "KYN_DATA", default_value = "social_media_data.json")]
    data: PathBuf,

    /// Engine config (YAML)
    #[arg(long, global = true, env = "KYN_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Density, connectivity and component sizes
    Metrics,
    /// Detected communities and modularity
    Communities,
    /// Most influential users
    Influencers {
        /// Number of users (defaults to influence.top_k)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Centralities, influence and rank of one user
    User { id: String },
    /// Suggested connections for a user
    RecommendConnections { id: String },
    /// Suggested communities for a user
    RecommendCommunities { id: String },
    /// Most common interests
    Trending {
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Interactions per time bucket
    Trends {
        /// hour, day or month (defaults to trends.granularity)
        #[arg(long)]
        granularity: Option<TrendGranularity>,
    },
    /// Communities ranked by internal interaction weight
    ActiveCommunities,
    /// Key members and interests of every community
    Insights,
    /// Users per location
    Geography,
    /// Users clustered by their interests
    Segments {
        /// Number of clusters (defaults to segmentation.clusters)
        #[arg(long)]
        clusters: Option<usize>,
        /// Random seed (defaults to segmentation.seed)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Interactions of one user
    UserInteractions { id: String },
    /// The community a user belongs to
    UserCommunity { id: String },
    /// Node-link JSON of the built graph
    Export,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    match &cli.command {
        Commands::Trends {
            granularity: Some(granularity),
        } => config.trends.granularity = *granularity,
        Commands::Segments { clusters, seed } => {
            if let Some(clusters) = clusters {
                config.segmentation.clusters = *clusters;
            }
            if let Some(seed) = seed {
                config.segmentation.seed = *seed;
            }
        }
        _ => {}
    }

    let dataset = load_dataset(&cli.data)?;
    let mut engine = AnalyticsEngine::new(config).context("invalid engine config")?;

    let report = engine.build_report(&dataset);
    if !report.is_clean() {
        info!(skipped = report.skipped.len(), "Some records were skipped");
    }

    let format = cli.format;
    match cli.command {
        Commands::Metrics => {
            let m = engine.metrics(&dataset);
            emit(format, &m, || {
                key_value_table(vec![
                    ("Nodes", m.number_of_nodes.to_string()),
                    ("Edges", m.number_of_edges.to_string()),
                    ("Density", format!("{:.4}", m.density)),
                    ("Average degree", format!("{:.2}", m.average_degree)),
                    ("Connected", m.is_connected.to_string()),
                    ("Components", m.number_of_components.to_string()),
                    ("Largest component", m.largest_component_size.to_string()),
                    ("Isolated users", m.isolated_users.to_string()),
                ])
            })
        }
        Commands::Communities => {
            let partition = engine.communities(&dataset);
            emit(format, &*partition, || {
                let mut table = table(&["Community", "Size", "Members"]);
                for c in partition.communities() {
                    let members: Vec<&str> = c.members.iter().map(UserId::as_str).collect();
                    table.add_row(vec![c.id.to_string(), c.size().to_string(), members.join(", ")]);
                }
                format!("{}\nModularity: {:.4}", table, partition.modularity())
            })
        }
        Commands::Influencers { top } => {
            let ranking = engine.top_influencers(&dataset, top);
            emit(format, &ranking, || {
                let mut table = table(&[
                    "Rank",
                    "User",
                    "Influence",
                    "Degree",
                    "Betweenness",
                    "Closeness",
                ]);
                for r in &ranking {
                    table.add_row(vec![
                        r.rank.to_string(),
                        r.user.to_string(),
                        format!("{:.2}%", r.as_percentage()),
                        format!("{:.4}", r.metrics.degree),
                        format!("{:.4}", r.metrics.betweenness),
                        format!("{:.4}", r.metrics.closeness),
                    ]);
                }
                table.to_string()
            })
        }
        Commands::User { id } => {
            let influence = engine.user_influence(&dataset, &UserId::from(id))?;
            emit(format, &influence, || {
                key_value_table(vec![
                    ("User", influence.user.to_string()),
                    ("Rank", format!("{} of {}", influence.rank, influence.total_users)),
                    ("Influence", format!("{:.2}%", influence.as_percentage())),
                    ("Degree", format!("{:.4}", influence.metrics.degree)),
                    ("Betweenness", format!("{:.4}", influence.metrics.betweenness)),
                    ("Closeness", format!("{:.4}", influence.metrics.closeness)),
                ])
            })
        }
        Commands::RecommendConnections { id } => {
            let recs = engine.recommend_connections(&dataset, &UserId::from(id))?;
            emit(format, &recs, || {
                let mut table = table(&["Candidate", "Strength"]);
                for r in &recs {
                    table.add_row(vec![
                        r.candidate.to_string(),
                        format!("{:.2}%", r.strength_percentage()),
                    ]);
                }
                table.to_string()
            })
        }
        Commands::RecommendCommunities { id } => {
            let recs = engine.recommend_communities(&dataset, &UserId::from(id))?;
            emit(format, &recs, || {
                let mut table = table(&["Community", "Shared", "Interests"]);
                for r in &recs {
                    table.add_row(vec![
                        r.community_id.to_string(),
                        r.shared_interest_count.to_string(),
                        r.shared_interests.join(", "),
                    ]);
                }
                table.to_string()
            })
        }
        Commands::Trending { top } => {
            let mut trending = engine.trending_interests(&dataset);
            trending.truncate(top);
            emit(format, &trending, || {
                let mut table = table(&["Interest", "Users"]);
                for t in &trending {
                    table.add_row(vec![t.interest.clone(), t.count.to_string()]);
                }
                table.to_string()
            })
        }
        Commands::Trends { .. } => {
            let trends = engine.interaction_trends(&dataset);
            emit(format, &trends, || {
                let mut table = table(&["Bucket", "Interactions"]);
                for t in &trends {
                    table.add_row(vec![t.bucket.clone(), t.count.to_string()]);
                }
                table.to_string()
            })
        }
        Commands::ActiveCommunities => {
            let active = engine.active_communities(&dataset);
            emit(format, &active, || {
                let mut table = table(&["Community", "Size", "Activity", "Interactions", "Edges"]);
                for a in &active {
                    table.add_row(vec![
                        a.community_id.to_string(),
                        a.size.to_string(),
                        a.activity_score.to_string(),
                        a.interaction_count.to_string(),
                        a.internal_edges.to_string(),
                    ]);
                }
                table.to_string()
            })
        }
        Commands::Insights => {
            let insights = engine.community_insights(&dataset);
            emit(format, &insights, || {
                let mut table = table(&[
                    "Community",
                    "Size",
                    "Top degree",
                    "Top betweenness",
                    "Top closeness",
                    "Interests",
                ]);
                for i in &insights {
                    let top = |t: &Option<kyn::algo::TopMember>| {
                        t.as_ref().map_or_else(String::new, |m| m.user.to_string())
                    };
                    let interests: Vec<String> = i
                        .interest_distribution
                        .iter()
                        .take(5)
                        .map(|c| format!("{} ({})", c.interest, c.count))
                        .collect();
                    table.add_row(vec![
                        i.community_id.to_string(),
                        i.size.to_string(),
                        top(&i.top_degree),
                        top(&i.top_betweenness),
                        top(&i.top_closeness),
                        interests.join(", "),
                    ]);
                }
                table.to_string()
            })
        }
        Commands::Geography => {
            let locations = engine.geographic_distribution(&dataset);
            emit(format, &locations, || {
                let mut table = table(&["Location", "Users"]);
                for l in &locations {
                    table.add_row(vec![l.location.clone(), l.count.to_string()]);
                }
                table.to_string()
            })
        }
        Commands::Segments { .. } => {
            let segments = engine.interest_segmentation(&dataset);
            emit(format, &segments, || {
                let mut table = table(&["Cluster", "Size", "Members"]);
                for (cluster, size) in segments.cluster_sizes.iter().enumerate() {
                    let members: Vec<&str> =
                        segments.members(cluster).into_iter().map(UserId::as_str).collect();
                    table.add_row(vec![cluster.to_string(), size.to_string(), members.join(", ")]);
                }
                table.to_string()
            })
        }
        Commands::UserInteractions { id } => {
            let user = UserId::from(id);
            let edges = engine.user_interactions(&dataset, &user)?;
            emit(format, &edges, || {
                let mut table = table(&["With", "Type", "Weight", "Count", "Last seen"]);
                for e in &edges {
                    table.add_row(vec![
                        e.other(&user).map_or_else(String::new, UserId::to_string),
                        e.interaction_type.map_or_else(String::new, |t| t.to_string()),
                        e.weight.to_string(),
                        e.interaction_count.to_string(),
                        e.timestamp.clone().unwrap_or_default(),
                    ]);
                }
                table.to_string()
            })
        }
        Commands::UserCommunity { id } => {
            let community = engine.user_community(&dataset, &UserId::from(id))?;
            emit(format, &community, || {
                let members: Vec<&str> = community.members.iter().map(UserId::as_str).collect();
                key_value_table(vec![
                    ("Community", community.id.to_string()),
                    ("Size", community.size().to_string()),
                    ("Members", members.join(", ")),
                ])
            })
        }
        Commands::Export => {
            let data = engine.export_node_link(&dataset);
            println!("{}", data.to_json_pretty()?);
            Ok(())
        }
    }
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let dataset = Dataset::from_json(&raw)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    info!(
        users = dataset.users.len(),
        interactions = dataset.interactions.len(),
        "Loaded snapshot"
    );
    Ok(dataset)
}

fn emit<T, F>(format: OutputFormat, value: &T, render: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => println!("{}", render()),
    }
    Ok(())
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

fn key_value_table(rows: Vec<(&str, String)>) -> String {
    let mut table = table(&["Metric", "Value"]);
    for (key, value) in rows {
        table.add_row(vec![key.to_string(), value]);
    }
    table.to_string()
}
