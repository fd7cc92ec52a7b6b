//! JSON payloads exchanged on the bus.

use serde::{Deserialize, Serialize};

use crate::engine::models::{CharacterId, DecisionKind, Outbound, RemoteDecision, Role};

pub const REMOTE_BAN_DECISION: &str = "remote-ban-decision";
pub const REMOTE_PICK_DECISION: &str = "remote-pick-decision";
pub const REMOTE_DISCONNECTED: &str = "remote-disconnected";
pub const MATCH_STARTING: &str = "match-starting";

pub const INBOUND_TOPICS: [&str; 4] = [
    REMOTE_BAN_DECISION,
    REMOTE_PICK_DECISION,
    REMOTE_DISCONNECTED,
    MATCH_STARTING,
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    pub character_id: CharacterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MatchStartingPayload {
    #[serde(default)]
    pub countdown: u32,
    #[serde(default)]
    pub player1_character_id: Option<CharacterId>,
    #[serde(default)]
    pub player2_character_id: Option<CharacterId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BothReadyPayload {
    pub local_pick_id: CharacterId,
    pub remote_pick_id: CharacterId,
    pub role: Role,
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Decision(RemoteDecision),
    RemoteDisconnected,
    MatchStarting(MatchStartingPayload),
}

/// Decode a bus message. Anything malformed comes back as `Err` for the caller to log and drop.
pub fn decode(topic: &str, payload: &str) -> Result<Inbound, String> {
    match topic {
        REMOTE_BAN_DECISION | REMOTE_PICK_DECISION => {
            let p: DecisionPayload = serde_json::from_str(payload)
                .map_err(|e| format!("invalid {} payload: {}", topic, e))?;
            if p.character_id.trim().is_empty() {
                return Err(format!("empty characterId in {}", topic));
            }
            let kind = if topic == REMOTE_BAN_DECISION {
                DecisionKind::Ban
            } else {
                DecisionKind::Pick
            };
            Ok(Inbound::Decision(RemoteDecision {
                kind,
                character_id: p.character_id,
                role: p.role,
            }))
        }
        REMOTE_DISCONNECTED => Ok(Inbound::RemoteDisconnected),
        MATCH_STARTING => {
            // Some hosts send no body at all.
            if payload.trim().is_empty() {
                return Ok(Inbound::MatchStarting(MatchStartingPayload::default()));
            }
            serde_json::from_str(payload)
                .map(Inbound::MatchStarting)
                .map_err(|e| format!("invalid {} payload: {}", topic, e))
        }
        other => Err(format!("unexpected topic: {}", other)),
    }
}

/// Inbound topic and payload for a decision, as a transport or bot publishes it.
pub fn encode_decision(decision: &RemoteDecision) -> (&'static str, String) {
    let topic = match decision.kind {
        DecisionKind::Ban => REMOTE_BAN_DECISION,
        DecisionKind::Pick => REMOTE_PICK_DECISION,
    };
    let payload = DecisionPayload {
        character_id: decision.character_id.clone(),
        role: decision.role,
    };
    (topic, serde_json::to_string(&payload).unwrap_or_default())
}

/// Outbound topic and payload for network-bound events, stamped with the sender role.
pub fn encode_outbound(event: &Outbound, sender: Role) -> Option<(&'static str, String)> {
    let topic = event.network_topic()?;
    let payload = match event {
        Outbound::BanSelected { character_id }
        | Outbound::BanConfirmed { character_id }
        | Outbound::PickSelected { character_id }
        | Outbound::PickConfirmed { character_id } => serde_json::to_string(&DecisionPayload {
            character_id: character_id.clone(),
            role: Some(sender),
        }),
        Outbound::BothReady {
            local_pick_id,
            remote_pick_id,
        } => serde_json::to_string(&BothReadyPayload {
            local_pick_id: local_pick_id.clone(),
            remote_pick_id: remote_pick_id.clone(),
            role: sender,
        }),
        _ => return None,
    };
    payload.ok().map(|p| (topic, p))
}
