//! Unit tests for wm-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentAddr, Channel, ClientMac};

    #[test]
    fn mac_parse_and_display() {
        let mac: ClientMac = "40:A5:EF:E5:93:DF".parse().unwrap();
        assert_eq!(mac.octets(), [0x40, 0xa5, 0xef, 0xe5, 0x93, 0xdf]);
        assert_eq!(mac.to_string(), "40:a5:ef:e5:93:df");
    }

    #[test]
    fn mac_accepts_dashes() {
        let mac: ClientMac = "00-11-22-33-44-55".parse().unwrap();
        assert_eq!(mac, ClientMac([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]));
    }

    #[test]
    fn mac_rejects_malformed() {
        assert!("00:11:22:33:44".parse::<ClientMac>().is_err());
        assert!("00:11:22:33:44:55:66".parse::<ClientMac>().is_err());
        assert!("00:11:22:33:44:zz".parse::<ClientMac>().is_err());
        assert!("0:11:22:33:44:55".parse::<ClientMac>().is_err());
    }

    #[test]
    fn agent_ordering_follows_address() {
        let a = AgentAddr::v4(192, 168, 1, 7);
        let b = AgentAddr::v4(192, 168, 1, 8);
        assert!(a < b);
        assert_eq!("192.168.1.7".parse::<AgentAddr>().unwrap(), a);
        assert_eq!(a.to_string(), "192.168.1.7");
    }

    #[test]
    fn agent_rejects_garbage() {
        assert!("not-an-ip".parse::<AgentAddr>().is_err());
    }

    #[test]
    fn channel_display() {
        assert_eq!(Channel(11).to_string(), "ch11");
    }
}

#[cfg(test)]
mod time {
    use crate::Timestamp;

    #[test]
    fn since_is_saturating() {
        assert_eq!(Timestamp(40_000).since(Timestamp(10_000)), 30_000);
        assert_eq!(Timestamp(10).since(Timestamp(20)), 0);
    }

    #[test]
    fn since_far_future_does_not_overflow() {
        assert_eq!(Timestamp(u64::MAX).since(Timestamp::ZERO), u64::MAX);
        assert_eq!(Timestamp::ZERO.since(Timestamp(u64::MAX)), 0);
    }
}

#[cfg(test)]
mod signal {
    use crate::Dbm;

    #[test]
    fn ordering_larger_is_stronger() {
        assert!(Dbm(-30) > Dbm(-45));
    }

    #[test]
    fn plus_saturates() {
        assert_eq!(Dbm(-45).plus(5), Dbm(-40));
        assert_eq!(Dbm(i32::MAX).plus(1), Dbm(i32::MAX));
    }
}

#[cfg(test)]
mod config {
    use crate::{CoreError, PolicyConfig};

    #[test]
    fn defaults_are_valid() {
        let cfg = PolicyConfig::default();
        assert_eq!(cfg.hysteresis_ms, 30_000);
        assert_eq!(cfg.idle_client_ms, 180_000);
        assert_eq!(cfg.signal_margin, 0);
        assert_eq!(cfg.probe_timeout_ms, 100);
        assert_eq!(cfg.controller_timeout(), std::time::Duration::from_secs(1));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn idle_must_exceed_hysteresis() {
        let cfg = PolicyConfig { idle_client_ms: 30_000, ..PolicyConfig::default() };
        assert!(matches!(cfg.validate(), Err(CoreError::Config(_))));

        let cfg = PolicyConfig { idle_client_ms: 10_000, ..PolicyConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_margin_rejected() {
        let cfg = PolicyConfig { signal_margin: -1, ..PolicyConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_probe_timeout_rejected() {
        let cfg = PolicyConfig { probe_timeout_ms: 0, ..PolicyConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_controller_timeout_rejected() {
        let cfg = PolicyConfig { controller_timeout_ms: 0, ..PolicyConfig::default() };
        assert!(matches!(cfg.validate(), Err(CoreError::Config(m)) if m.contains("controller_timeout_ms")));
    }
}
