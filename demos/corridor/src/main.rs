//! corridor — a client walking past three access points.
//!
//! Three agents hang along a straight corridor.  A single client walks from
//! one end to the other, every agent reports what it hears every few
//! seconds, and the mobility manager decides when to move the client.  After
//! reaching the far end the client goes quiet long enough to trip the idle
//! timeout, then reappears.
//!
//! Pass a CSV trace (`client,agent,value,timestamp_ms`) to replay recorded
//! telemetry instead:
//!
//! ```text
//! cargo run -p corridor -- demos/corridor/data/walk.csv
//! RUST_LOG=debug cargo run -p corridor
//! ```

mod trace;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wm_agent::{AgentError, ChannelPlan, ClientPattern, InMemoryNetwork, Relation, Subscription};
use wm_core::{AgentAddr, Channel, ClientMac, Dbm, SignalEvent, Timestamp};
use wm_manager::{ManagerBuilder, ManagerObserver, MobilityManager};
use wm_mobility::MobilityRecord;
use wm_policy::Action;

use trace::load_trace;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:            u64 = 7;
const STEP_MS:         u64 = 5_000;  // one report round every 5 s
const WALK_SPEED_MPS:  f64 = 1.0;
const CORRIDOR_M:      f64 = 80.0;
const IDLE_GAP_MS:     u64 = 200_000; // longer than the default idle threshold
const TX_POWER_DBM:    f64 = -30.0;   // received at 1 m
const PATH_LOSS_EXP:   f64 = 2.7;     // indoor, some obstruction
const NOISE_DB:        f64 = 2.0;
const SETTLE_TIMEOUT:  Duration = Duration::from_secs(10);

const CLIENT: ClientMac = ClientMac::new([0x40, 0xa5, 0xef, 0xe5, 0x93, 0xdf]);

/// Agents and their position along the corridor (metres).
const AGENTS: [(AgentAddr, f64); 3] = [
    (AgentAddr::v4(192, 168, 1, 7), 0.0),
    (AgentAddr::v4(192, 168, 1, 8), 40.0),
    (AgentAddr::v4(192, 168, 1, 9), 80.0),
];

/// Every plausible RSSI reading; the default `signal > 0` filter would drop
/// all dBm values.
const SUBSCRIPTION_FLOOR: i64 = -127;

// ── Observer ──────────────────────────────────────────────────────────────────

/// Counts processed events and keeps every bootstrap / handoff for the
/// summary table.
#[derive(Default)]
struct Timeline {
    processed:   AtomicU64,
    transitions: Mutex<Vec<(Timestamp, Action)>>,
    failures:    AtomicU64,
}

impl Timeline {
    fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }
}

impl ManagerObserver for Timeline {
    fn on_decision(&self, event: &SignalEvent, action: &Action) {
        if action.needs_dispatch() {
            if let Ok(mut t) = self.transitions.lock() {
                t.push((event.timestamp, *action));
            }
        }
    }

    fn on_committed(&self, _client: ClientMac, _record: &MobilityRecord) {
        self.processed.fetch_add(1, Ordering::Release);
    }

    fn on_handoff_failed(&self, _client: ClientMac, _target: AgentAddr, _error: &AgentError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}

type Manager = MobilityManager<InMemoryNetwork, InMemoryNetwork, InMemoryNetwork, Timeline>;

// ── Telemetry generation ──────────────────────────────────────────────────────

/// Log-distance path loss with a little uniform noise.
fn rssi(distance_m: f64, rng: &mut SmallRng) -> Dbm {
    let d     = distance_m.max(1.0);
    let clean = TX_POWER_DBM - 10.0 * PATH_LOSS_EXP * d.log10();
    let noisy = clean + rng.gen_range(-NOISE_DB..=NOISE_DB);
    Dbm(noisy.round() as i32)
}

/// One report per agent for a client standing at `position_m`.
fn report_round(position_m: f64, at: Timestamp, rng: &mut SmallRng) -> Vec<SignalEvent> {
    AGENTS
        .iter()
        .map(|&(agent, x)| SignalEvent::new(CLIENT, agent, rssi((position_m - x).abs(), rng), at))
        .collect()
}

/// The synthetic walk: end to end, a long silence, then one more round.
fn corridor_walk() -> Vec<SignalEvent> {
    let mut rng    = SmallRng::seed_from_u64(SEED);
    let mut events = Vec::new();
    let mut t      = 0;
    loop {
        let position = WALK_SPEED_MPS * (t as f64 / 1_000.0);
        if position > CORRIDOR_M {
            break;
        }
        events.extend(report_round(position, Timestamp(t), &mut rng));
        t += STEP_MS;
    }
    let last = t - STEP_MS;
    events.extend(report_round(CORRIDOR_M / 2.0, Timestamp(last + IDLE_GAP_MS), &mut rng));
    events
}

// ── Driving the manager ───────────────────────────────────────────────────────

/// Wait until the manager has committed `expected` events.
async fn settle(manager: &Manager, expected: u64) -> Result<()> {
    let started = Instant::now();
    while manager.observer().processed() < expected {
        if started.elapsed() > SETTLE_TIMEOUT {
            bail!(
                "manager processed {} of {expected} events",
                manager.observer().processed()
            );
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    Ok(())
}

/// Publish events in order, waiting for each to be committed before the next.
///
/// The agents' scan tables are updated as readings arrive, so a probe sees
/// the most recent value the agent reported.
async fn replay(net: &InMemoryNetwork, manager: &Manager, events: &[SignalEvent]) -> Result<()> {
    let mut expected = 0;
    for &event in events {
        net.set_signal(event.agent, event.client, event.value);
        if net.publish(event).await == 0 {
            continue;
        }
        expected += 1;
        settle(manager, expected).await?;
    }
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Telemetry: a CSV trace if one was given, else the synthetic walk.
    let (label, events) = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => (path.display().to_string(), load_trace(&path)?),
        None       => ("synthetic corridor walk".to_string(), corridor_walk()),
    };
    println!("=== corridor — wireless mobility manager ===");
    println!("Telemetry: {label} ({} events)", events.len());
    println!();

    // 2. Network: the corridor agents plus any other agent the trace names.
    let net = Arc::new(InMemoryNetwork::new());
    let agents: BTreeSet<AgentAddr> = AGENTS
        .iter()
        .map(|&(a, _)| a)
        .chain(events.iter().map(|e| e.agent))
        .collect();
    for &agent in &agents {
        net.add_agent(agent, Channel(1));
    }
    for client in events.iter().map(|e| e.client).collect::<BTreeSet<_>>() {
        net.register_client(client);
    }

    // 3. Manager.
    let manager = ManagerBuilder::for_network(Arc::clone(&net))
        .channel_plan(ChannelPlan::lab_default())
        .subscription(Subscription::new(ClientPattern::Any, Relation::GreaterThan, SUBSCRIPTION_FLOOR))
        .observer(Timeline::default())
        .build()?;
    let manager = Arc::new(manager);
    let task    = Arc::clone(&manager).start(net.as_ref()).await?;

    // 4. Replay.
    let t0 = Instant::now();
    replay(&net, &manager, &events).await?;
    let elapsed = t0.elapsed();
    task.abort();
    info!(elapsed_ms = elapsed.as_millis() as u64, "replay finished");

    // 5. Summary.
    let stats = manager.stats().snapshot();
    println!();
    println!("Processed {} events in {:.3} s", stats.events, elapsed.as_secs_f64());
    println!(
        "  bootstraps: {}  handoffs: {}  suppressed: {}  failed: {}  probe failures: {}",
        stats.bootstraps, stats.handoffs, stats.suppressed, stats.failed_dispatches, stats.probe_failures
    );
    println!();

    println!("{:<12} {}", "Time", "Action");
    println!("{}", "-".repeat(56));
    if let Ok(transitions) = manager.observer().transitions.lock() {
        for (at, action) in transitions.iter() {
            println!("{:<12} {}", at.to_string(), action);
        }
    }
    println!();

    println!("{:<20} {:<16} {:<10} {:<10}", "Client", "Serving", "Signal", "Assigned");
    println!("{}", "-".repeat(56));
    for client in manager.store().clients() {
        if let Some(record) = manager.store().snapshot(client).await {
            let serving = record.serving_agent.map_or_else(|| "-".to_string(), |a| a.to_string());
            println!(
                "{:<20} {:<16} {:<10} {:<10}",
                client.to_string(),
                serving,
                record.signal_strength.to_string(),
                record.assignment_timestamp.to_string(),
            );
        }
    }

    for &agent in &agents {
        if let Some(channel) = net.channel_of(agent) {
            println!("agent {agent:<16} {channel}");
        }
    }

    if manager.observer().failures.load(Ordering::Relaxed) > 0 {
        bail!("some handoffs could not be dispatched");
    }
    Ok(())
}
