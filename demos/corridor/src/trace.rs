//! CSV telemetry traces.
//!
//! ```text
//! client,agent,value,timestamp_ms
//! 40:a5:ef:e5:93:df,192.168.1.7,-38,0
//! ```

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use wm_core::{AgentAddr, ClientMac, Dbm, SignalEvent, Timestamp};

#[derive(Deserialize)]
struct TraceRecord {
    client:       String,
    agent:        String,
    value:        i32,
    timestamp_ms: u64,
}

pub fn load_trace(path: &Path) -> Result<Vec<SignalEvent>> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    load_trace_reader(file)
}

pub fn load_trace_reader<R: Read>(reader: R) -> Result<Vec<SignalEvent>> {
    let mut rdr    = csv::Reader::from_reader(reader);
    let mut events = Vec::new();
    for (line, result) in rdr.deserialize::<TraceRecord>().enumerate() {
        let row    = result.with_context(|| format!("trace row {}", line + 1))?;
        let client = row.client.parse::<ClientMac>()?;
        let agent  = row.agent.parse::<AgentAddr>()?;
        events.push(SignalEvent::new(client, agent, Dbm(row.value), Timestamp(row.timestamp_ms)));
    }
    Ok(events)
}
