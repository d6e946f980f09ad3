use anyhow::Context;
use caseroll_core::{Event, Inbound, Request};
use serde_json::Value;

/// Decodes one `{"type": .., "data": ..}` envelope from the host.
pub fn decode_inbound(raw: &str) -> anyhow::Result<Inbound> {
    let value: Value = serde_json::from_str(raw).context("parse inbound envelope")?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string)
        .context("inbound envelope has no type")?;
    serde_json::from_value(value).with_context(|| format!("decode inbound {kind}"))
}

/// Decodes a newline-separated stream of envelopes, skipping blank lines.
pub fn decode_inbound_lines(raw: &str) -> anyhow::Result<Vec<Inbound>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| decode_inbound(line).with_context(|| format!("line {}", idx + 1)))
        .collect()
}

/// Encodes an outbound request as a `{"name": .., "data": ..}` envelope.
pub fn encode_request(request: &Request) -> anyhow::Result<String> {
    serde_json::to_string(request).context("encode request")
}

pub fn encode_event(event: &Event) -> anyhow::Result<String> {
    serde_json::to_string(event).context("encode event")
}
