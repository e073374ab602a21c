use crate::error::NegotiationError;
use crate::media::{LocalTrack, TrackKind};
use crate::transport::{CallConfig, PeerTransport, PeerTransportFactory, TransportEvent};
use anyhow::Result;
use async_trait::async_trait;
use meshcall_core::PeerId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;

pub struct WebrtcTransport {
    pub peer_id: PeerId,
    peer_connection: Arc<RTCPeerConnection>,
    // Сендеры по виду трека: смена устройства меняет источник через
    // replace_track, без повторного negotiation.
    senders: Mutex<HashMap<TrackKind, Arc<RTCRtpSender>>>,
}

impl WebrtcTransport {
    /// Инициализация нового WebRTC соединения.
    /// event_tx — канал, в который транспорт "выплевывает" события для
    /// цикла контроллера.
    pub async fn new(
        peer_id: PeerId,
        config: CallConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        // 1. Настройка MediaEngine (регистрация кодеков)
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        // 2. Регистрация интерцепторов (метрики, RTCP отчеты)
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        // 3. Создание API объекта
        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        // 4. Конфигурация ICE серверов (STUN/TURN)
        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|s| RTCIceServer {
                    urls: s.urls.clone(),
                    username: s.username.clone().unwrap_or_default(),
                    credential: s.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        // 5. Создание PeerConnection
        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        // Обе стороны всегда готовы принимать аудио и видео, независимо
        // от того, что захвачено локально.
        for kind in [RTPCodecType::Audio, RTPCodecType::Video] {
            let init = RTCRtpTransceiverInit {
                direction: RTCRtpTransceiverDirection::Recvonly,
                send_encodings: vec![],
            };
            peer_connection
                .add_transceiver_from_kind(kind, Some(init))
                .await?;
        }

        // A. Мониторинг ICE состояния; решение о сносе линка принимает
        // контроллер, транспорт только репортит.
        let state_tx = event_tx.clone();
        let uid_state = peer_id.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let tx = state_tx.clone();
                let uid = uid_state.clone();

                Box::pin(async move {
                    info!("ICE connection state for peer {}: {:?}", uid, s);
                    let _ = tx.send(TransportEvent::ConnectivityChanged(uid, s)).await;
                })
            },
        ));

        // B. Trickle ICE: отправка локальных кандидатов наружу
        let ice_tx = event_tx.clone();
        let uid_ice = peer_id.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let uid = uid_ice.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(json_candidate) = candidate.to_json() else {
                    return;
                };
                let Ok(str_candidate) = serde_json::to_string(&json_candidate) else {
                    return;
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(uid, str_candidate))
                    .await;
            })
        }));

        // C. Входящий медиапоток. Вернуться надо сразу: on_track держит
        // мьютекс обработчика, пока future не завершится.
        let track_tx = event_tx.clone();
        let uid_track = peer_id.clone();
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            let uid = uid_track.clone();

            Box::pin(async move {
                debug!(
                    "Remote track started for peer {}: kind={:?}, id={}",
                    uid,
                    track.kind(),
                    track.id()
                );
                let _ = tx.send(TransportEvent::RemoteTrackStarted(uid)).await;
            })
        }));

        Ok(Self {
            peer_id,
            peer_connection,
            senders: Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait]
impl PeerTransport for WebrtcTransport {
    async fn create_offer(&self) -> Result<String, NegotiationError> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String, NegotiationError> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn set_remote_offer(&self, sdp: String) -> Result<(), NegotiationError> {
        let desc = RTCSessionDescription::offer(sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn set_remote_answer(&self, sdp: String) -> Result<(), NegotiationError> {
        let desc = RTCSessionDescription::answer(sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: String) -> Result<(), NegotiationError> {
        let candidate: RTCIceCandidateInit = serde_json::from_str(&candidate)?;
        self.peer_connection.add_ice_candidate(candidate).await?;
        Ok(())
    }

    async fn add_track(&self, track: Arc<LocalTrack>) -> Result<(), NegotiationError> {
        let rtp_sender = self.peer_connection.add_track(track.rtc()).await?;

        // RTCP для этого сендера надо вычитывать, иначе интерцепторы
        // копят буфер.
        let drain_sender = rtp_sender.clone();
        tokio::spawn(async move {
            let mut rtcp_buf = vec![0u8; 1500];
            while drain_sender.read(&mut rtcp_buf).await.is_ok() {}
        });

        self.senders.lock().await.insert(track.kind(), rtp_sender);
        Ok(())
    }

    async fn replace_track(&self, track: Arc<LocalTrack>) -> Result<(), NegotiationError> {
        let senders = self.senders.lock().await;
        match senders.get(&track.kind()) {
            Some(sender) => {
                sender.replace_track(Some(track.rtc())).await?;
                Ok(())
            }
            None => {
                // Этот вид трека никогда не отправлялся — добавить его
                // сейчас значило бы полный renegotiation.
                debug!(
                    "No {} sender on link to {}, skipping swap",
                    track.kind(),
                    self.peer_id
                );
                Ok(())
            }
        }
    }

    async fn close(&self) {
        if let Err(e) = self.peer_connection.close().await {
            error!("Failed to close connection to {}: {:?}", self.peer_id, e);
        }
    }
}

/// Фабрика транспортов с общей ICE конфигурацией.
pub struct WebrtcTransportFactory {
    config: CallConfig,
}

impl WebrtcTransportFactory {
    pub fn new(config: CallConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PeerTransportFactory for WebrtcTransportFactory {
    async fn create(
        &self,
        peer_id: PeerId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        let transport = WebrtcTransport::new(peer_id, self.config.clone(), events).await?;
        Ok(Arc::new(transport))
    }
}
