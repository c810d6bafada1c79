//! Drives a running pairchat server with random two-party traffic.
//!
//! Every virtual user loops until the deadline: send a greeting from one
//! random user to another, then pull that chat. The run fails if more than
//! 1% of requests fail or the p99 latency reaches the budget.

use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::Parser;
use futures_util::future::join_all;
use rand::Rng;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "pairchat-loadtest", about = "Load test a pairchat gateway")]
struct Args {
    /// Gateway base URL.
    #[arg(long, env = "PAIRCHAT_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Concurrent virtual users, also the size of the user name pool.
    #[arg(long, default_value_t = 100)]
    users: u32,

    /// Test duration in seconds.
    #[arg(long, default_value_t = 60)]
    duration: u64,

    /// p99 latency budget in milliseconds.
    #[arg(long, default_value_t = 100)]
    p99_ms: u64,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,
}

#[derive(Debug, Default)]
struct Stats {
    latencies: Vec<Duration>,
    failures: usize,
}

impl Stats {
    fn record(&mut self, started: Instant, ok: bool) {
        self.latencies.push(started.elapsed());
        if !ok {
            self.failures += 1;
        }
    }

    fn merge(&mut self, other: Stats) {
        self.latencies.extend(other.latencies);
        self.failures += other.failures;
    }

    fn total(&self) -> usize {
        self.latencies.len()
    }

    fn failure_rate(&self) -> f64 {
        if self.latencies.is_empty() {
            return 0.0;
        }
        self.failures as f64 / self.latencies.len() as f64
    }

    fn percentile(&mut self, p: f64) -> Duration {
        if self.latencies.is_empty() {
            return Duration::ZERO;
        }
        self.latencies.sort_unstable();
        let rank = (self.latencies.len() as f64 * p).ceil() as usize;
        self.latencies[rank.clamp(1, self.latencies.len()) - 1]
    }
}

async fn virtual_user(
    client: reqwest::Client,
    base_url: String,
    users: u32,
    deadline: Instant,
) -> Stats {
    let mut stats = Stats::default();

    while Instant::now() < deadline {
        let (sender, receiver) = {
            let mut rng = rand::rng();
            (rng.random_range(0..users), rng.random_range(0..users))
        };

        let started = Instant::now();
        let sent = client
            .post(format!("{base_url}/api/send"))
            .query(&[
                ("sender", sender.to_string()),
                ("receiver", receiver.to_string()),
                ("text", "Hi! How are you?".to_owned()),
            ])
            .send()
            .await;
        stats.record(started, sent.is_ok_and(|r| r.status().is_success()));

        let started = Instant::now();
        let pulled = client
            .get(format!("{base_url}/api/pull"))
            .query(&[("chat", format!("{sender}:{receiver}"))])
            .send()
            .await;
        stats.record(started, pulled.is_ok_and(|r| r.status().is_success()));
    }

    stats
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.users == 0 {
        bail!("--users must be at least 1");
    }
    let base_url = args.base_url.trim_end_matches('/').to_owned();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(args.timeout_ms))
        .build()
        .context("building http client")?;

    client
        .get(format!("{base_url}/ping"))
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .with_context(|| format!("{base_url} is not answering /ping"))?;

    info!(users = args.users, duration = args.duration, %base_url, "starting load test");
    let deadline = Instant::now() + Duration::from_secs(args.duration);
    let tasks = (0..args.users).map(|_| {
        tokio::spawn(virtual_user(client.clone(), base_url.clone(), args.users, deadline))
    });

    let mut stats = Stats::default();
    for joined in join_all(tasks).await {
        match joined {
            Ok(user_stats) => stats.merge(user_stats),
            Err(e) => warn!("virtual user panicked: {e}"),
        }
    }

    let p99 = stats.percentile(0.99);
    let failure_rate = stats.failure_rate();
    println!("requests:     {}", stats.total());
    println!("failures:     {} ({:.2}%)", stats.failures, failure_rate * 100.0);
    println!("p50 latency:  {:?}", stats.percentile(0.50));
    println!("p99 latency:  {p99:?}");

    if failure_rate >= 0.01 {
        bail!("failure rate {:.2}% is over the 1% threshold", failure_rate * 100.0);
    }
    if p99 >= Duration::from_millis(args.p99_ms) {
        bail!("p99 latency {p99:?} is over the {}ms budget", args.p99_ms);
    }
    Ok(())
}
