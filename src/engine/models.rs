//! Core selection data types shared by the coordinators, the controller and the runtimes.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub type CharacterId = String;

/// Seat in the match. Player 1 hosts, player 2 joins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player1,
    Player2,
}

impl Role {
    pub fn opponent(self) -> Role {
        match self {
            Role::Player1 => Role::Player2,
            Role::Player2 => Role::Player1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Player1 => "player1",
            Role::Player2 => "player2",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "player1" => Some(Role::Player1),
            "player2" => Some(Role::Player2),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Negotiation phase. Declaration order is the only legal direction of travel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionPhase {
    Banning,
    Transition,
    Picking,
    Reveal,
}

impl SelectionPhase {
    pub fn next(self) -> Option<SelectionPhase> {
        match self {
            SelectionPhase::Banning => Some(SelectionPhase::Transition),
            SelectionPhase::Transition => Some(SelectionPhase::Picking),
            SelectionPhase::Picking => Some(SelectionPhase::Reveal),
            SelectionPhase::Reveal => None,
        }
    }

    /// Phases in which the local player owes a decision.
    pub fn accepts_decisions(self) -> bool {
        matches!(self, SelectionPhase::Banning | SelectionPhase::Picking)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPhase::Banning => "BANNING",
            SelectionPhase::Transition => "TRANSITION",
            SelectionPhase::Picking => "PICKING",
            SelectionPhase::Reveal => "REVEAL",
        }
    }
}

impl fmt::Display for SelectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Ban,
    Pick,
}

/// A decision attributed to the other seat, from the network or from a bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDecision {
    pub kind: DecisionKind,
    pub character_id: CharacterId,
    /// Sender seat when the transport reports it.
    #[serde(default)]
    pub role: Option<Role>,
}

impl RemoteDecision {
    pub fn ban(character_id: impl Into<CharacterId>, role: Role) -> Self {
        Self {
            kind: DecisionKind::Ban,
            character_id: character_id.into(),
            role: Some(role),
        }
    }

    pub fn pick(character_id: impl Into<CharacterId>, role: Option<Role>) -> Self {
        Self {
            kind: DecisionKind::Pick,
            character_id: character_id.into(),
            role,
        }
    }
}

/// Result of asking a coordinator to record a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// Same decision already on file.
    Duplicate,
    /// A different decision is already on file for that side.
    Conflict,
    /// The sender is the local seat.
    SelfEcho,
    /// Target is banned.
    Banned,
}

/// Why a local action was refused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    WrongPhase,
    AlreadyConfirmed,
    CharacterBanned,
    NotOwned,
    UnknownCharacter,
}

/// Everything the negotiation tells the outside world.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Outbound {
    #[serde(rename_all = "camelCase")]
    BanSelected { character_id: CharacterId },
    #[serde(rename_all = "camelCase")]
    BanConfirmed { character_id: CharacterId },
    #[serde(rename_all = "camelCase")]
    PickSelected { character_id: CharacterId },
    #[serde(rename_all = "camelCase")]
    PickConfirmed { character_id: CharacterId },
    #[serde(rename_all = "camelCase")]
    BothReady {
        local_pick_id: CharacterId,
        remote_pick_id: CharacterId,
    },
    PhaseChanged { phase: SelectionPhase },
    #[serde(rename_all = "camelCase")]
    OpponentBanned { character_id: CharacterId },
    /// The opponent has locked a pick. Carries no identity.
    OpponentLocked,
    #[serde(rename_all = "camelCase")]
    PicksRevealed {
        local_pick_id: CharacterId,
        remote_pick_id: CharacterId,
    },
    #[serde(rename_all = "camelCase")]
    AutoSelected {
        kind: DecisionKind,
        character_id: CharacterId,
    },
    #[serde(rename_all = "camelCase")]
    DeadlineArmed { phase: SelectionPhase, timeout_ms: u64 },
    #[serde(rename_all = "camelCase")]
    Rejected {
        reason: Rejection,
        #[serde(default)]
        character_id: Option<CharacterId>,
    },
    OpponentDisconnected,
    MatchStarting { countdown: u32 },
}

impl Outbound {
    /// Bus topic for events that leave through the network transport.
    pub fn network_topic(&self) -> Option<&'static str> {
        match self {
            Outbound::BanSelected { .. } => Some("ban-selected"),
            Outbound::BanConfirmed { .. } => Some("ban-confirmed"),
            Outbound::PickSelected { .. } => Some("pick-selected"),
            Outbound::PickConfirmed { .. } => Some("pick-confirmed"),
            Outbound::BothReady { .. } => Some("both-ready"),
            _ => None,
        }
    }
}

/// Cosmetic pauses. Firing one never decides correctness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CosmeticCue {
    /// TRANSITION -> PICKING.
    OpenPicking,
    /// REVEAL -> both-ready.
    Reveal,
}

/// Timer requests for whichever runtime hosts the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Cosmetic { cue: CosmeticCue, after: Duration },
    Deadline { phase: SelectionPhase, after: Duration },
    CancelDeadline,
    CancelAll,
}

/// Output of one controller step.
#[derive(Debug, Clone, Default)]
pub struct Transition {
    pub events: Vec<Outbound>,
    pub schedules: Vec<Schedule>,
}

impl Transition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: Outbound) {
        self.events.push(event);
    }

    pub fn schedule(&mut self, schedule: Schedule) {
        self.schedules.push(schedule);
    }

    pub fn merge(&mut self, other: Transition) {
        self.events.extend(other.events);
        self.schedules.extend(other.schedules);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.schedules.is_empty()
    }

    pub fn phase_changes(&self) -> impl Iterator<Item = SelectionPhase> + '_ {
        self.events.iter().filter_map(|e| match e {
            Outbound::PhaseChanged { phase } => Some(*phase),
            _ => None,
        })
    }

    pub fn rejection(&self) -> Option<Rejection> {
        self.events.iter().find_map(|e| match e {
            Outbound::Rejected { reason, .. } => Some(*reason),
            _ => None,
        })
    }
}
