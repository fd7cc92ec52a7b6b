//! Tokio runtime for one selection session.
//!
//! A single task owns the [`PhaseController`] and drains one inbox: local
//! input from the handle, bus messages, timer expiries and bot playbacks all
//! arrive there in order. Every [`Transition`] the controller returns is
//! executed here: network events go out on the bus, everything goes to the
//! presentation stream, and schedules become tokio timers.

pub mod bus;
pub mod timers;
pub mod wire;

use std::collections::BTreeSet;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::engine::bot::{DecisionSource, Playback};
use crate::engine::config::SelectionConfig;
use crate::engine::controller::PhaseController;
use crate::engine::models::*;
use crate::engine::session::MatchSetup;
use crate::roster::CharacterCatalog;

use bus::{BusMessage, EventBus, Subscriptions};
use timers::{CosmeticTimers, DeadlineTimer};
use wire::{decode, encode_decision, encode_outbound, Inbound, INBOUND_TOPICS};

#[derive(Debug, Clone)]
pub enum DriverEvent {
    Select(CharacterId),
    Confirm(CharacterId),
    Bus(BusMessage),
    Cosmetic(CosmeticCue),
    Deadline(SelectionPhase),
    /// Scripted opponent decision, published on the inbound topic when due.
    Publish { topic: &'static str, payload: String },
    Shutdown,
}

/// Final state reported when the session task ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub match_id: String,
    pub local_role: Role,
    pub phase: SelectionPhase,
    pub banned: BTreeSet<CharacterId>,
    pub local_pick: Option<CharacterId>,
    pub opponent_pick: Option<CharacterId>,
    pub both_ready: bool,
    pub auto_selections: usize,
}

pub struct SelectionDriver {
    controller: PhaseController,
    bus: EventBus,
    subscriptions: Subscriptions,
    cosmetic: CosmeticTimers,
    deadline: DeadlineTimer,
    source: Box<dyn DecisionSource>,
    presentation: UnboundedSender<Outbound>,
    auto_selections: usize,
}

impl SelectionDriver {
    /// Start the session on the current tokio runtime.
    ///
    /// `time_scale` compresses cosmetic pauses and bot delays; decision
    /// deadlines are never scaled.
    pub fn spawn(
        setup: MatchSetup,
        config: &SelectionConfig,
        catalog: &CharacterCatalog,
        bus: EventBus,
        source: Box<dyn DecisionSource>,
        time_scale: f64,
    ) -> Result<SelectionHandle, String> {
        let (controller, initial) =
            PhaseController::start(setup, catalog, config.timing.clone(), config.random_seed)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (presentation, events) = mpsc::unbounded_channel();

        let mut subscriptions = Subscriptions::new(bus.clone());
        for topic in INBOUND_TOPICS {
            let inbox = tx.clone();
            subscriptions.subscribe(topic, move |message| {
                let _ = inbox.send(DriverEvent::Bus(message.clone()));
            });
        }

        let driver = SelectionDriver {
            controller,
            bus,
            subscriptions,
            cosmetic: CosmeticTimers::new(tx.clone(), time_scale),
            deadline: DeadlineTimer::new(tx.clone()),
            source,
            presentation,
            auto_selections: 0,
        };
        let task = tokio::spawn(driver.run(initial, rx));

        Ok(SelectionHandle {
            tx,
            events: Some(events),
            task,
        })
    }

    async fn run(mut self, initial: Transition, mut rx: UnboundedReceiver<DriverEvent>) -> SessionSummary {
        self.execute(initial);
        let playbacks = self.source.on_session_start(&self.controller.view());
        self.play(playbacks);

        while !self.controller.both_ready_sent() {
            let Some(event) = rx.recv().await else { break };
            let t = match event {
                DriverEvent::Select(id) => self.controller.select_local(&id),
                DriverEvent::Confirm(id) => self.controller.submit_local_decision(&id),
                DriverEvent::Bus(message) => self.ingest(&message),
                DriverEvent::Cosmetic(cue) => self.controller.on_cosmetic(cue),
                DriverEvent::Deadline(phase) => self.controller.on_deadline(phase),
                DriverEvent::Publish { topic, payload } => {
                    self.bus.publish(topic, payload);
                    continue;
                }
                DriverEvent::Shutdown => break,
            };
            self.execute(t);
        }

        self.teardown()
    }

    fn ingest(&mut self, message: &BusMessage) -> Transition {
        match decode(&message.topic, &message.payload) {
            Ok(Inbound::Decision(decision)) => self.controller.on_remote_decision(&decision),
            Ok(Inbound::RemoteDisconnected) => self.controller.on_remote_disconnected(),
            Ok(Inbound::MatchStarting(p)) => self.controller.on_match_starting(
                p.countdown,
                p.player1_character_id.as_deref(),
                p.player2_character_id.as_deref(),
            ),
            Err(e) => {
                warn!(match_id = %self.controller.session().match_id(), topic = %message.topic, error = %e, "dropping inbound message");
                Transition::new()
            }
        }
    }

    fn execute(&mut self, t: Transition) {
        for schedule in &t.schedules {
            match schedule {
                Schedule::Cosmetic { cue, after } => self.cosmetic.schedule(*cue, *after),
                Schedule::Deadline { phase, after } => self.deadline.arm(*phase, *after),
                Schedule::CancelDeadline => self.deadline.disarm(),
                Schedule::CancelAll => {
                    self.cosmetic.cancel_all();
                    self.deadline.disarm();
                }
            }
        }

        let role = self.controller.session().local_role();
        for event in &t.events {
            if matches!(event, Outbound::AutoSelected { .. }) {
                self.auto_selections += 1;
            }
            if let Some((topic, payload)) = encode_outbound(event, role) {
                debug!(topic, "publishing");
                self.bus.publish(topic, payload);
            }
            // The presentation may have dropped its stream.
            let _ = self.presentation.send(event.clone());
        }

        if t.phase_changes().next().is_some() {
            let playbacks = self.source.on_phase_changed(&self.controller.view());
            self.play(playbacks);
        }
    }

    fn play(&mut self, playbacks: Vec<Playback>) {
        for Playback { after, decision } in playbacks {
            let (topic, payload) = encode_decision(&decision);
            self.cosmetic
                .schedule_event(DriverEvent::Publish { topic, payload }, after);
        }
    }

    fn teardown(mut self) -> SessionSummary {
        let t = self.controller.close();
        self.execute(t);
        self.subscriptions.clear();

        let session = self.controller.session();
        let summary = SessionSummary {
            match_id: session.match_id().to_string(),
            local_role: session.local_role(),
            phase: session.phase(),
            banned: session.banned_character_ids().clone(),
            local_pick: session.local_pick().map(str::to_string),
            opponent_pick: session.revealed_opponent_pick().map(str::to_string),
            both_ready: self.controller.both_ready_sent(),
            auto_selections: self.auto_selections,
        };
        info!(
            match_id = %summary.match_id,
            phase = %summary.phase,
            both_ready = summary.both_ready,
            "selection session ended"
        );
        summary
    }
}

/// Caller side of a running session.
pub struct SelectionHandle {
    tx: UnboundedSender<DriverEvent>,
    events: Option<UnboundedReceiver<Outbound>>,
    task: JoinHandle<SessionSummary>,
}

impl SelectionHandle {
    pub fn select(&self, character_id: impl Into<CharacterId>) -> Result<(), String> {
        self.send(DriverEvent::Select(character_id.into()))
    }

    pub fn confirm(&self, character_id: impl Into<CharacterId>) -> Result<(), String> {
        self.send(DriverEvent::Confirm(character_id.into()))
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(DriverEvent::Shutdown);
    }

    /// Presentation events. Can be taken once.
    pub fn events(&mut self) -> Option<UnboundedReceiverStream<Outbound>> {
        self.events.take().map(UnboundedReceiverStream::new)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> Result<SessionSummary, String> {
        self.task
            .await
            .map_err(|e| format!("selection task failed: {}", e))
    }

    fn send(&self, event: DriverEvent) -> Result<(), String> {
        if self.task.is_finished() {
            return Err("selection session has ended".into());
        }
        self.tx
            .send(event)
            .map_err(|_| "selection session has ended".to_string())
    }
}
