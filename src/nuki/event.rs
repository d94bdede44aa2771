//! Decoder for `lockActionEvent` payloads.
//!
//! The payload is a comma-separated line `action,trigger,auth_id,code_id,...`.
//! Only the first two fields are rendered; the rest are ignored.

use std::borrow::Cow;

const ACTIONS: &[(u16, &str)] = &[
    (1, "Unlock"),
    (2, "Lock"),
    (3, "Unlatch"),
    (4, "Lock 'n' Go"),
    (240, "Door Open"),
    (241, "Door Closed"),
];

const TRIGGERS: &[(u16, &str)] = &[
    (0, "Manual/App"),
    (1, "System"),
    (2, "Button"),
    (3, "Automatic"),
    (6, "Auto Lock"),
    (172, "MQTT"),
];

/// Render an event line as `"<action> via <trigger>"`.
///
/// Returns `None` when the line has fewer than two fields. Codes missing from
/// the tables, or not written in plain decimal (`01`, `+1`), render as
/// `Unknown(<code>)`.
pub fn decode_event(payload: &str) -> Option<String> {
    let mut parts = payload.split(',').map(str::trim);
    let action = parts.next()?;
    let trigger = parts.next()?;

    Some(format!(
        "{} via {}",
        lookup(ACTIONS, action),
        lookup(TRIGGERS, trigger)
    ))
}

fn lookup(table: &[(u16, &'static str)], code: &str) -> Cow<'static, str> {
    table
        .iter()
        .find(|(k, _)| k.to_string() == code)
        .map(|(_, label)| Cow::Borrowed(*label))
        .unwrap_or_else(|| Cow::Owned(format!("Unknown({code})")))
}
