//! Unit tests for wm-mobility.

use std::sync::Arc;
use std::time::Duration;

use wm_agent::InMemoryNetwork;
use wm_core::{AgentAddr, Channel, ClientMac, Dbm, Timestamp};

use crate::{ClientState, MobilityRecord, MobilityStateStore, ScanAggregator, ScanResult};

// ── Helpers ───────────────────────────────────────────────────────────────────

const A1: AgentAddr = AgentAddr::v4(10, 0, 0, 1);
const A2: AgentAddr = AgentAddr::v4(10, 0, 0, 2);
const A3: AgentAddr = AgentAddr::v4(10, 0, 0, 3);
const C:  ClientMac = ClientMac::new([0x02, 0, 0, 0, 0, 0x01]);

const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

/// Three agents on distinct channels, all hearing nothing yet.
fn three_agents() -> Arc<InMemoryNetwork> {
    let net = InMemoryNetwork::new();
    net.add_agent(A1, Channel(1));
    net.add_agent(A2, Channel(6));
    net.add_agent(A3, Channel(11));
    Arc::new(net)
}

fn aggregator(net: &Arc<InMemoryNetwork>) -> ScanAggregator<InMemoryNetwork> {
    ScanAggregator::new(Arc::clone(net), PROBE_TIMEOUT)
}

// ── MobilityRecord ────────────────────────────────────────────────────────────

#[cfg(test)]
mod mobility_record {
    use super::*;

    #[test]
    fn unassigned_seeds_every_field() {
        let r = MobilityRecord::unassigned(Dbm(-40), Timestamp(5), A1);
        assert_eq!(r.state(), ClientState::Unassigned);
        assert_eq!(r.signal_strength, Dbm(-40));
        assert_eq!(r.last_heard, Timestamp(5));
        assert_eq!(r.assignment_timestamp, Timestamp(5));
        assert_eq!(r.best_scan, ScanResult::new(A1, Dbm(-40)));
    }

    #[test]
    fn heard_never_moves_last_heard_backwards() {
        let mut r = MobilityRecord::unassigned(Dbm(-40), Timestamp(100), A1);
        r.heard(Dbm(-50), Timestamp(50));
        assert_eq!(r.signal_strength, Dbm(-50));
        assert_eq!(r.last_heard, Timestamp(100));
    }

    #[test]
    fn offer_scan_accepts_equal_or_better() {
        let mut r = MobilityRecord::unassigned(Dbm(-40), Timestamp(0), A1);
        assert!(!r.offer_scan(ScanResult::new(A2, Dbm(-41))));
        assert!(r.offer_scan(ScanResult::new(A2, Dbm(-40))));
        assert_eq!(r.best_scan.agent, A2);
        assert!(r.offer_scan(ScanResult::new(A3, Dbm(-10))));
        assert_eq!(r.best_scan, ScanResult::new(A3, Dbm(-10)));
    }

    #[test]
    fn assign_keeps_assignment_at_or_before_last_heard() {
        let mut r = MobilityRecord::unassigned(Dbm(-40), Timestamp(0), A1);
        r.assign(A1, Dbm(-40), Timestamp(1_000));
        assert_eq!(r.state(), ClientState::Associated(A1));
        assert_eq!(r.assignment_timestamp, Timestamp(1_000));
        assert_eq!(r.last_heard, Timestamp(1_000));

        // A late event cannot drag last_heard below the assignment.
        r.heard(Dbm(-41), Timestamp(2_000));
        r.assign(A2, Dbm(-41), Timestamp(1_500));
        assert!(r.assignment_timestamp <= r.last_heard);
        assert_eq!(r.last_heard, Timestamp(2_000));
        assert!(r.is_served_by(A2));
    }
}

// ── MobilityStateStore ────────────────────────────────────────────────────────

#[cfg(test)]
mod mobility_store {
    use super::*;

    #[test]
    fn get_or_create_returns_existing_record() {
        let store = MobilityStateStore::new();
        let (first, created) = store.get_or_create(C, Dbm(-40), Timestamp(0), A1);
        assert!(created);
        let (second, created) = store.get_or_create(C, Dbm(-99), Timestamp(9), A2);
        assert!(!created);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn snapshot_reflects_updates() {
        let store = MobilityStateStore::new();
        assert!(store.snapshot(C).await.is_none());

        store.get_or_create(C, Dbm(-40), Timestamp(0), A1);
        store
            .update(C, |r| r.assign(A1, Dbm(-40), Timestamp(0)))
            .await
            .unwrap();

        let snap = store.snapshot(C).await.unwrap();
        assert_eq!(snap.serving_agent, Some(A1));
    }

    #[tokio::test]
    async fn update_of_unknown_client_errors() {
        let store = MobilityStateStore::new();
        let err   = store.update(C, |r| r.last_heard).await.unwrap_err();
        assert!(matches!(err, crate::MobilityError::ClientNotTracked(c) if c == C));
        assert!(store.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_get_or_create_creates_exactly_once() {
        let store = Arc::new(MobilityStateStore::new());
        let handles: Vec<_> = (0..64)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.get_or_create(C, Dbm(-40 - i), Timestamp(i as u64), A1).1
                })
            })
            .collect();

        let mut created = 0;
        for h in handles {
            if h.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_are_not_lost() {
        let store = Arc::new(MobilityStateStore::new());
        store.get_or_create(C, Dbm(0), Timestamp(0), A1);

        let handles: Vec<_> = (1..=100u64)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .update(C, |r| r.heard(Dbm(r.signal_strength.0 + 1), Timestamp(r.last_heard.0 + 1)))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }

        let snap = store.snapshot(C).await.unwrap();
        assert_eq!(snap.signal_strength, Dbm(100));
        assert_eq!(snap.last_heard, Timestamp(100));
    }

    #[test]
    fn clients_are_sorted() {
        let store = MobilityStateStore::new();
        let c2 = ClientMac::new([0x02, 0, 0, 0, 0, 0x02]);
        store.get_or_create(c2, Dbm(0), Timestamp(0), A1);
        store.get_or_create(C, Dbm(0), Timestamp(0), A1);
        assert_eq!(store.clients(), vec![C, c2]);
    }
}

// ── Candidate selection ───────────────────────────────────────────────────────

#[cfg(test)]
mod select_best {
    use super::*;
    use crate::select_best;

    #[test]
    fn strongest_wins() {
        let results = [
            ScanResult::new(A1, Dbm(-60)),
            ScanResult::new(A2, Dbm(-30)),
            ScanResult::new(A3, Dbm(-45)),
        ];
        assert_eq!(select_best(results, None), Some(results[1]));
    }

    #[test]
    fn tie_prefers_serving_agent() {
        let results = [
            ScanResult::new(A1, Dbm(-30)),
            ScanResult::new(A2, Dbm(-30)),
            ScanResult::new(A3, Dbm(-30)),
        ];
        assert_eq!(select_best(results, Some(A2)).unwrap().agent, A2);
    }

    #[test]
    fn tie_without_serving_prefers_lowest_address() {
        let results = [
            ScanResult::new(A3, Dbm(-30)),
            ScanResult::new(A2, Dbm(-30)),
            ScanResult::new(A1, Dbm(-50)),
        ];
        assert_eq!(select_best(results, None).unwrap().agent, A2);
        // Serving agent outside the tied set does not matter.
        assert_eq!(select_best(results, Some(A1)).unwrap().agent, A2);
    }

    #[test]
    fn empty_has_no_candidate() {
        assert_eq!(select_best(Vec::new(), Some(A1)), None);
    }
}

// ── ScanAggregator ────────────────────────────────────────────────────────────

#[cfg(test)]
mod scan_aggregator {
    use super::*;

    #[tokio::test]
    async fn excludes_reporting_agent() {
        let net = three_agents();
        net.set_signal(A1, C, Dbm(-10)); // reporting agent; must not be probed
        net.set_signal(A2, C, Dbm(-50));
        net.set_signal(A3, C, Dbm(-40));

        let report = aggregator(&net).scan(C, A1, Some(A1)).await;
        assert_eq!(report.probed(), 2);
        assert_eq!(report.best, Some(ScanResult::new(A3, Dbm(-40))));
        assert_eq!(net.scan_count(), 2);
    }

    #[tokio::test]
    async fn failed_probes_are_excluded_not_zero() {
        let net = three_agents();
        net.set_signal(A2, C, Dbm(-80));
        net.set_signal(A3, C, Dbm(-20));
        net.set_reachable(A3, false);

        let report = aggregator(&net).scan(C, A1, Some(A1)).await;
        assert_eq!(report.best, Some(ScanResult::new(A2, Dbm(-80))));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, A3);
    }

    #[tokio::test]
    async fn all_probes_failing_yields_no_candidate() {
        let net = three_agents(); // nobody hears the client
        let report = aggregator(&net).scan(C, A1, None).await;
        assert!(report.best.is_none());
        assert_eq!(report.failures.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_agents_are_cut_off_at_probe_timeout() {
        let net = three_agents();
        net.set_signal(A2, C, Dbm(-10));
        net.set_signal(A3, C, Dbm(-50));
        net.set_probe_latency(A2, Duration::from_secs(5));
        net.set_probe_latency(A3, Duration::from_millis(20));

        let started = tokio::time::Instant::now();
        let report  = aggregator(&net).scan(C, A1, Some(A1)).await;
        let elapsed = started.elapsed();

        assert!(elapsed <= PROBE_TIMEOUT + Duration::from_millis(5), "took {elapsed:?}");
        assert_eq!(report.best, Some(ScanResult::new(A3, Dbm(-50))));
        assert!(matches!(
            report.failures.as_slice(),
            [(a, wm_agent::AgentError::Timeout { .. })] if *a == A2
        ));
    }
}
