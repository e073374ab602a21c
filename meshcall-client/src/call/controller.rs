use crate::call::{CallCommand, NegotiationState, PeerLink};
use crate::media::{LocalMedia, LocalMediaManager, MediaDevices, TrackKind};
use crate::render::Renderer;
use crate::signaling::SignalingSink;
use crate::transport::{PeerTransportFactory, TransportEvent};
use meshcall_core::{ClientMessage, PeerId, ServerMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;

/// Caps on the early-candidate buffer: a sender whose link never gets
/// built must not grow the controller's memory for the life of the call.
const MAX_BUFFERED_CANDIDATES: usize = 32;
const MAX_BUFFERED_PEERS: usize = 64;

/// Owns the mesh: one peer link per remote participant, the local media
/// set, and the reactions that keep the two consistent. Single task; every
/// piece of work is a reaction to a signaling message, a transport event,
/// or a UI command.
pub struct CallController {
    media: LocalMediaManager,
    links: HashMap<PeerId, PeerLink>,
    /// Candidates that arrived before the link for their sender existed.
    pending_candidates: HashMap<PeerId, Vec<String>>,
    factory: Arc<dyn PeerTransportFactory>,
    signaling: Arc<dyn SignalingSink>,
    renderer: Arc<dyn Renderer>,
    command_rx: mpsc::Receiver<CallCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
}

impl CallController {
    pub fn new(
        devices: Arc<dyn MediaDevices>,
        factory: Arc<dyn PeerTransportFactory>,
        signaling: Arc<dyn SignalingSink>,
        renderer: Arc<dyn Renderer>,
    ) -> (Self, mpsc::Sender<CallCommand>) {
        let (command_tx, command_rx) = mpsc::channel(100);
        let (transport_tx, transport_rx) = mpsc::channel(256);

        let controller = Self {
            media: LocalMediaManager::new(devices),
            links: HashMap::new(),
            pending_candidates: HashMap::new(),
            factory,
            signaling,
            renderer,
            command_rx,
            transport_rx,
            transport_tx,
        };

        (controller, command_tx)
    }

    /// Capture local media, publish the preview and announce presence.
    /// A failed capture is logged and the call is joined without media.
    pub async fn start(&mut self) {
        match self.media.start_capture().await {
            Ok(()) => self.renderer.show_local_preview(self.media.media()),
            Err(e) => error!("Local capture failed, joining without media: {}", e),
        }

        self.signaling.send(ClientMessage::StartInCall).await;
    }

    pub async fn run(mut self) {
        self.start().await;

        info!("Call event loop started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Leaving the call.");
                            break;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!("Transport channel closed unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        info!("Call event loop finished");
    }

    pub async fn handle_command(&mut self, cmd: CallCommand) {
        match cmd {
            CallCommand::Signal(msg) => self.handle_signal(msg).await,
            CallCommand::DeviceChange => self.on_device_change().await,
            CallCommand::ToggleMute(kind) => self.on_toggle_mute(kind),
        }
    }

    async fn handle_signal(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::NewUser { id } => {
                info!("New participant {}, initiating offer", id);
                if let Err(e) = self.initiate_offer(&id).await {
                    error!("Failed to start negotiation with {}: {:#}", id, e);
                }
            }

            ServerMessage::CallMade { offer, id } => {
                info!("Incoming offer from {}", id);
                if let Err(e) = self.answer_offer(&id, offer).await {
                    error!("Failed to answer offer from {}: {:#}", id, e);
                }
            }

            ServerMessage::AnswerMade { answer, id } => self.on_answer(&id, answer).await,

            ServerMessage::AddIceCandidate { candidate, id } => {
                self.on_remote_candidate(&id, candidate).await;
            }
        }
    }

    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateGenerated(id, candidate) => {
                self.signaling
                    .send(ClientMessage::IceCandidate { candidate, to: id })
                    .await;
            }

            TransportEvent::RemoteTrackStarted(id) => {
                self.renderer.attach_remote(&id);
            }

            TransportEvent::ConnectivityChanged(id, state) => match state {
                RTCIceConnectionState::Closed
                | RTCIceConnectionState::Failed
                | RTCIceConnectionState::Disconnected => {
                    info!("Removing link to {}: ICE state {:?}", id, state);
                    self.remove_link(&id).await;
                }
                other => debug!("Ignoring ICE state {:?} for {}", other, id),
            },
        }
    }

    /// Build (or rebuild) the link for `id`: fresh transport, current
    /// local tracks attached, buffered candidates flushed.
    async fn create_link(&mut self, id: &PeerId) -> anyhow::Result<()> {
        if let Some(old) = self.links.remove(id) {
            info!("Replacing existing link for {}", id);
            old.transport.close().await;
            self.renderer.remove_remote(id);
        }

        let transport = match self
            .factory
            .create(id.clone(), self.transport_tx.clone())
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                // A link that failed to build will never consume its
                // buffered candidates; drop them with it.
                self.pending_candidates.remove(id);
                return Err(e);
            }
        };

        let mut link = PeerLink::new(transport.clone());
        for track in self.media.media().tracks() {
            match link.transport.add_track(track.clone()).await {
                Ok(()) => link.tracks_attached = true,
                Err(e) => warn!("Failed to attach {} track for {}: {}", track.kind(), id, e),
            }
        }
        self.links.insert(id.clone(), link);

        if let Some(pending) = self.pending_candidates.remove(id) {
            debug!("Flushing {} buffered candidate(s) for {}", pending.len(), id);
            for candidate in pending {
                if let Err(e) = transport.add_ice_candidate(candidate).await {
                    warn!("Failed to apply buffered candidate for {}: {}", id, e);
                }
            }
        }

        Ok(())
    }

    async fn initiate_offer(&mut self, id: &PeerId) -> anyhow::Result<()> {
        self.create_link(id).await?;

        let Some(link) = self.links.get_mut(id) else {
            return Ok(());
        };
        let offer = link.transport.create_offer().await?;
        link.state = NegotiationState::HaveLocalOffer;

        self.signaling
            .send(ClientMessage::Call {
                offer,
                to: id.clone(),
            })
            .await;
        Ok(())
    }

    async fn answer_offer(&mut self, id: &PeerId, offer: String) -> anyhow::Result<()> {
        self.create_link(id).await?;

        let Some(link) = self.links.get_mut(id) else {
            return Ok(());
        };
        link.transport.set_remote_offer(offer).await?;
        link.state = NegotiationState::HaveRemoteOffer;

        let answer = link.transport.create_answer().await?;
        link.state = NegotiationState::Answered;

        self.signaling
            .send(ClientMessage::MakeAnswer {
                answer,
                to: id.clone(),
            })
            .await;

        // The local answer is installed and handed to the relay; the
        // description exchange is over on this side.
        link.state = NegotiationState::Stable;
        info!("Negotiation with {} is stable", id);
        Ok(())
    }

    async fn on_answer(&mut self, id: &PeerId, answer: String) {
        let Some(link) = self.links.get_mut(id) else {
            warn!("Answer from unknown participant {}", id);
            return;
        };
        if link.state != NegotiationState::HaveLocalOffer {
            warn!("Unexpected answer from {} in state {:?}", id, link.state);
            return;
        }

        match link.transport.set_remote_answer(answer).await {
            Ok(()) => {
                link.state = NegotiationState::Stable;
                info!("Negotiation with {} is stable", id);
            }
            Err(e) => error!("Failed to apply answer from {}: {}", id, e),
        }
    }

    /// Candidates may overtake the description exchange; an unknown sender
    /// means the link is not built yet, so the candidate waits for it.
    async fn on_remote_candidate(&mut self, id: &PeerId, candidate: String) {
        match self.links.get(id) {
            Some(link) => {
                if let Err(e) = link.transport.add_ice_candidate(candidate).await {
                    warn!("Failed to add ICE candidate for {}: {}", id, e);
                }
            }
            None => {
                if self.pending_candidates.len() >= MAX_BUFFERED_PEERS
                    && !self.pending_candidates.contains_key(id)
                {
                    warn!("Candidate buffer is tracking too many senders, dropping {}", id);
                    return;
                }

                let queue = self.pending_candidates.entry(id.clone()).or_default();
                if queue.len() >= MAX_BUFFERED_CANDIDATES {
                    warn!("Candidate buffer for {} is full, dropping", id);
                    return;
                }

                debug!("Buffering early candidate from {}", id);
                queue.push(candidate);
            }
        }
    }

    /// Re-acquire local media and swap the outgoing source on every live
    /// link, kind by kind. Kinds absent from the new capture are left
    /// alone: remote peers keep receiving the last-known track.
    async fn on_device_change(&mut self) {
        info!("Device topology changed, recapturing local media");

        if let Err(e) = self.media.start_capture().await {
            error!("Recapture after device change failed: {}", e);
            return;
        }

        let media = self.media.media().clone();
        for (id, link) in &self.links {
            for track in media.tracks() {
                if let Err(e) = link.transport.replace_track(track.clone()).await {
                    warn!("Failed to swap {} track for {}: {}", track.kind(), id, e);
                }
            }
        }

        self.renderer.show_local_preview(self.media.media());
    }

    fn on_toggle_mute(&mut self, kind: TrackKind) {
        match self.media.toggle(kind) {
            Some(enabled) => self.renderer.set_mute_indicator(kind, enabled),
            None => debug!("No live {} track to toggle", kind),
        }
    }

    async fn remove_link(&mut self, id: &PeerId) {
        self.pending_candidates.remove(id);

        let Some(link) = self.links.remove(id) else {
            return;
        };
        link.transport.close().await;

        self.renderer.remove_remote(id);
    }

    pub fn negotiation_state(&self, id: &PeerId) -> Option<NegotiationState> {
        self.links.get(id).map(|link| link.state)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn local_media(&self) -> &LocalMedia {
        self.media.media()
    }
}
