//! Line-oriented control channel read from stdin.
//!
//! ```text
//! lock | unlock | unlatch
//! set <Field> <value>            e.g. `set LockAction 2`
//! configure <base_topic> <device_id>
//! inject <json>                  e.g. `inject {"Topic":"nuki/X/lockState","Payload":"1"}`
//! status
//! ```

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Lock,
    Unlock,
    Unlatch,
    Set { field: String, value: String },
    Configure { base_topic: String, device_id: String },
    Inject(String),
    Status,
}

/// Parse one control line. Blank or unrecognised lines give `None`.
pub fn parse_line(line: &str) -> Option<ControlCommand> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match (verb, rest) {
        ("lock", "") => ControlCommand::Lock,
        ("unlock", "") => ControlCommand::Unlock,
        ("unlatch", "") => ControlCommand::Unlatch,
        ("status", "") => ControlCommand::Status,
        ("set", args) => {
            let (field, value) = split_pair(args)?;
            ControlCommand::Set { field, value }
        }
        ("configure", args) => {
            let (base_topic, device_id) = split_pair(args)?;
            ControlCommand::Configure {
                base_topic,
                device_id,
            }
        }
        ("inject", json) if !json.is_empty() => ControlCommand::Inject(json.to_string()),
        _ => return None,
    };
    Some(command)
}

fn split_pair(args: &str) -> Option<(String, String)> {
    let mut parts = args.split_whitespace();
    let first = parts.next()?;
    let second = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((first.to_string(), second.to_string()))
}
