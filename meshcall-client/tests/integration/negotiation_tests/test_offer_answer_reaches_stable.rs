use meshcall_client::{CallCommand, NegotiationState};
use meshcall_core::{PeerId, ServerMessage};

use crate::integration::init_tracing;
use crate::utils::{MockMediaDevices, TransportCall, create_test_controller};

#[tokio::test]
async fn test_inbound_offer_is_answered() {
    init_tracing();

    let mut harness = create_test_controller(MockMediaDevices::with(true, false));
    harness.controller.start().await;

    let caller_id = PeerId::new();
    harness
        .controller
        .handle_command(CallCommand::Signal(ServerMessage::CallMade {
            offer: "remote-offer".into(),
            id: caller_id.clone(),
        }))
        .await;

    // Once its answer is out the answerer has nothing left to wait for
    // in the description exchange.
    assert_eq!(
        harness.controller.negotiation_state(&caller_id),
        Some(NegotiationState::Stable)
    );

    let answers = harness.signaling.answers_to(&caller_id).await;
    assert_eq!(answers.len(), 1);

    let transport = harness.factory.transport(&caller_id).await.unwrap();
    let calls = transport.calls().await;
    let remote_offer_pos = calls
        .iter()
        .position(|c| *c == TransportCall::SetRemoteOffer("remote-offer".into()))
        .expect("remote offer applied");
    let answer_pos = calls
        .iter()
        .position(|c| *c == TransportCall::CreateAnswer)
        .expect("answer constructed");
    assert!(remote_offer_pos < answer_pos);
}

#[tokio::test]
async fn test_answer_moves_offerer_to_stable() {
    init_tracing();

    let mut harness = create_test_controller(MockMediaDevices::with(true, true));
    harness.controller.start().await;

    let remote_id = PeerId::new();
    harness
        .controller
        .handle_command(CallCommand::Signal(ServerMessage::NewUser {
            id: remote_id.clone(),
        }))
        .await;
    harness
        .controller
        .handle_command(CallCommand::Signal(ServerMessage::AnswerMade {
            answer: "remote-answer".into(),
            id: remote_id.clone(),
        }))
        .await;

    assert_eq!(
        harness.controller.negotiation_state(&remote_id),
        Some(NegotiationState::Stable)
    );
}

#[tokio::test]
async fn test_answer_from_unknown_peer_is_ignored() {
    init_tracing();

    let mut harness = create_test_controller(MockMediaDevices::with(true, true));
    harness.controller.start().await;

    let stranger_id = PeerId::new();
    harness
        .controller
        .handle_command(CallCommand::Signal(ServerMessage::AnswerMade {
            answer: "stray-answer".into(),
            id: stranger_id.clone(),
        }))
        .await;

    assert_eq!(harness.controller.negotiation_state(&stranger_id), None);
    assert_eq!(harness.controller.link_count(), 0);
}

#[tokio::test]
async fn test_unexpected_answer_does_not_regress_state() {
    init_tracing();

    let mut harness = create_test_controller(MockMediaDevices::with(true, true));
    harness.controller.start().await;

    // The link exists because we answered this peer's offer; a stray
    // answer from them must not be applied on top.
    let caller_id = PeerId::new();
    harness
        .controller
        .handle_command(CallCommand::Signal(ServerMessage::CallMade {
            offer: "remote-offer".into(),
            id: caller_id.clone(),
        }))
        .await;
    harness
        .controller
        .handle_command(CallCommand::Signal(ServerMessage::AnswerMade {
            answer: "stray-answer".into(),
            id: caller_id.clone(),
        }))
        .await;

    assert_eq!(
        harness.controller.negotiation_state(&caller_id),
        Some(NegotiationState::Stable)
    );

    let transport = harness.factory.transport(&caller_id).await.unwrap();
    assert!(
        !transport
            .calls()
            .await
            .contains(&TransportCall::SetRemoteAnswer("stray-answer".into()))
    );
}
