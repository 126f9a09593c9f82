use crate::application::switch::Switch;
use crate::domain::message::SwitchRequest;
use crate::domain::peer::PeerInfo;
use crate::error::{Result, SwitchError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::BufRead;

/// One line of a switch script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ScriptCommand {
    AddPeer {
        peer: PeerInfo,
    },
    RemovePeer {
        id: String,
    },
    SetAddress {
        address: String,
    },
    /// A request arriving from peer `from`.
    Message {
        from: String,
        method: String,
        path: String,
        #[serde(default)]
        headers: BTreeMap<String, String>,
        #[serde(default)]
        body: Option<serde_json::Value>,
    },
}

impl ScriptCommand {
    /// Applies the command to `switch`. Messages are decoded here, at the
    /// boundary, and handed to the sending peer's endpoint.
    pub async fn apply(self, switch: &Switch) -> Result<()> {
        match self {
            ScriptCommand::AddPeer { peer } => switch.add_peer(peer, None).await,
            ScriptCommand::RemovePeer { id } => switch.remove_peer(&id).await,
            ScriptCommand::SetAddress { address } => {
                switch.set_own_address(&address).await;
                Ok(())
            }
            ScriptCommand::Message {
                from,
                method,
                path,
                headers,
                body,
            } => {
                let request = SwitchRequest::decode(&method, &path, headers, body)?;
                let reply = switch.receive(&from, request).await?;
                if !reply.is_success() {
                    return Err(SwitchError::Transport {
                        peer: from,
                        reason: format!("rejected with status {}", reply.status),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Reads script commands, one JSON object per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub struct ScriptReader<R: BufRead> {
    source: R,
}

impl<R: BufRead> ScriptReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Returns an iterator that lazily reads and parses commands.
    ///
    /// A read error is yielded once and ends the iteration.
    pub fn commands(self) -> impl Iterator<Item = Result<ScriptCommand>> {
        self.source
            .lines()
            .scan(false, |failed, line| {
                if *failed {
                    return None;
                }
                *failed = line.is_err();
                Some(line)
            })
            .enumerate()
            .filter(|(_, line)| {
                line.as_ref()
                    .map(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
                    .unwrap_or(true)
            })
            .map(|(index, line)| -> Result<ScriptCommand> {
                let line = line?;
                serde_json::from_str(&line).map_err(|e| {
                    SwitchError::InvalidMessage(format!("line {}: {e}", index + 1))
                })
            })
    }
}
