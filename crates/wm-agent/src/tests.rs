//! Unit tests for wm-agent.

use std::io::Cursor;
use std::time::Duration;

use wm_core::{AgentAddr, Channel, ClientMac, Dbm, SignalEvent, Timestamp};

use crate::{
    AgentControl, AgentError, ChannelPlan, ClientPattern, ClientRegistry, HandoffExecutor,
    InMemoryNetwork, Relation, Subscription, TelemetrySource,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const A1: AgentAddr = AgentAddr::v4(192, 168, 1, 7);
const A2: AgentAddr = AgentAddr::v4(192, 168, 1, 8);
const C:  ClientMac = ClientMac::new([0x40, 0xa5, 0xef, 0xe5, 0x93, 0xdf]);

fn event(value: i32) -> SignalEvent {
    SignalEvent::new(C, A1, Dbm(value), Timestamp(0))
}

fn two_agents() -> InMemoryNetwork {
    let net = InMemoryNetwork::new();
    net.add_agent(A1, Channel(1));
    net.add_agent(A2, Channel(6));
    net
}

// ── Subscription ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod subscription {
    use super::*;

    #[test]
    fn all_clients_signal_is_star_greater_than_zero() {
        let sub = Subscription::all_clients_signal();
        assert_eq!(sub.pattern, ClientPattern::Any);
        assert_eq!(sub.metric, "signal");
        assert_eq!(sub.relation, Relation::GreaterThan);
        assert_eq!(sub.threshold, 0);
        assert_eq!(sub.to_string(), "* signal > 0");
    }

    #[test]
    fn relation_threshold_is_applied() {
        let sub = Subscription::all_clients_signal();
        assert!(sub.matches(&event(42)));
        assert!(!sub.matches(&event(0)));
        assert!(!sub.matches(&event(-40)));
    }

    #[test]
    fn exact_pattern_filters_other_clients() {
        let other = ClientMac::new([0, 1, 2, 3, 4, 5]);
        let sub   = Subscription::new(ClientPattern::Exact(other), Relation::LessThan, 0);
        assert!(!sub.matches(&event(-40)));

        let sub = Subscription::new(ClientPattern::Exact(C), Relation::LessThan, 0);
        assert!(sub.matches(&event(-40)));
    }
}

// ── ChannelPlan ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod channel_plan {
    use super::*;

    #[test]
    fn parses_csv() {
        let csv  = "agent,channel\n192.168.1.7,4\n192.168.1.8,10\n";
        let plan = ChannelPlan::from_reader(Cursor::new(csv)).unwrap();
        assert_eq!(plan, ChannelPlan::lab_default());
        assert_eq!(plan.get(A1), Some(Channel(4)));
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn bad_address_is_an_error() {
        let csv = "agent,channel\nnot-an-ip,4\n";
        assert!(ChannelPlan::from_reader(Cursor::new(csv)).is_err());
    }

    #[test]
    fn bad_row_is_a_plan_error() {
        let csv = "agent,channel\n192.168.1.7,four\n";
        let err = ChannelPlan::from_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, AgentError::Plan(_)));
    }

    #[tokio::test]
    async fn apply_retunes_listed_agents_only() {
        let net  = two_agents();
        let plan = ChannelPlan::new()
            .with(A1, Channel(4))
            .with(AgentAddr::v4(10, 0, 0, 1), Channel(11)); // not in the network

        let applied = plan.apply(&net).await;
        assert_eq!(applied, 1);
        assert_eq!(net.channel_of(A1), Some(Channel(4)));
        assert_eq!(net.channel_of(A2), Some(Channel(6)));
    }

    #[tokio::test]
    async fn apply_skips_unreachable_agents() {
        let net = two_agents();
        net.set_reachable(A2, false);

        let applied = ChannelPlan::lab_default().apply(&net).await;
        assert_eq!(applied, 1);
        assert_eq!(net.channel_of(A2), Some(Channel(6)));
    }
}

// ── InMemoryNetwork ───────────────────────────────────────────────────────────

#[cfg(test)]
mod in_memory_network {
    use super::*;

    #[tokio::test]
    async fn scan_reports_configured_signal() {
        let net = two_agents();
        net.set_signal(A2, C, Dbm(-30));

        let v = net.scan_client(A2, C, Channel(6), Duration::from_millis(100)).await.unwrap();
        assert_eq!(v, Dbm(-30));
        assert_eq!(net.scan_count(), 1);
    }

    #[tokio::test]
    async fn scan_failures() {
        let net = two_agents();
        let t   = Duration::from_millis(100);

        let err = net.scan_client(A2, C, Channel(6), t).await.unwrap_err();
        assert!(matches!(err, AgentError::ClientNotVisible { .. }));

        net.set_signal(A2, C, Dbm(-30));
        net.set_reachable(A2, false);
        let err = net.scan_client(A2, C, Channel(6), t).await.unwrap_err();
        assert!(matches!(err, AgentError::Unreachable { .. }));

        let ghost = AgentAddr::v4(10, 9, 9, 9);
        let err   = net.scan_client(ghost, C, Channel(6), t).await.unwrap_err();
        assert!(matches!(err, AgentError::UnknownAgent(_)));
    }

    #[tokio::test]
    async fn registry_tracks_bindings() {
        let net = two_agents();
        assert!(net.lookup_client(C).await.is_none());

        net.register_client(C);
        let handle = net.lookup_client(C).await.unwrap();
        assert_eq!(handle.agent, None);

        net.handoff(C, A2).await.unwrap();
        assert_eq!(net.lookup_client(C).await.unwrap().agent, Some(A2));
        assert_eq!(net.handoffs(), vec![(C, A2)]);
    }

    #[tokio::test]
    async fn injected_handoff_failures_are_consumed() {
        let net = two_agents();
        net.register_client(C);
        net.fail_next_handoffs(C, 2);

        assert!(net.handoff(C, A1).await.is_err());
        assert!(net.handoff(C, A1).await.is_err());
        assert!(net.handoff(C, A1).await.is_ok());
        assert_eq!(net.handoff_attempts(), 3);
        assert_eq!(net.bound_agent(C), Some(A1));
    }

    #[tokio::test]
    async fn handoff_of_unregistered_client_is_rejected() {
        let net = two_agents();
        let err = net.handoff(C, A1).await.unwrap_err();
        assert!(matches!(err, AgentError::HandoffRejected { .. }));
    }

    #[tokio::test]
    async fn publish_respects_subscription() {
        let net    = two_agents();
        let mut rx = net.subscribe(Subscription::all_clients_signal()).await.unwrap();

        assert_eq!(net.publish(event(-40)).await, 0);
        assert_eq!(net.publish(event(40)).await, 1);
        assert_eq!(rx.recv().await.unwrap().value, Dbm(40));
    }

    #[tokio::test]
    async fn unsupported_metric_rejected() {
        let net = two_agents();
        let mut sub = Subscription::all_clients_signal();
        sub.metric = "rate".into();
        assert!(net.subscribe(sub).await.is_err());
    }
}
