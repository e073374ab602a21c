use meshcall_client::{CallCommand, NegotiationState, TransportEvent};
use meshcall_core::{ClientMessage, PeerId, ServerMessage};
use meshcall_server::SessionRegistry;
use tokio::sync::mpsc;

use crate::integration::init_tracing;
use crate::utils::{MockMediaDevices, TestHarness, TransportCall, create_test_controller, drain};

struct Party {
    id: PeerId,
    harness: TestHarness,
    inbox: mpsc::UnboundedReceiver<ServerMessage>,
}

fn join_relay(registry: &SessionRegistry, harness: TestHarness) -> Party {
    let id = PeerId::new();
    let (tx, inbox) = mpsc::unbounded_channel();
    registry.register(id.clone(), tx);
    Party { id, harness, inbox }
}

/// Shuttle messages between the controllers and the relay until the whole
/// mesh goes quiet.
async fn settle(registry: &SessionRegistry, parties: &mut [Party]) {
    loop {
        let mut moved = false;

        for party in parties.iter_mut() {
            for msg in drain(&mut party.harness.signal_rx) {
                registry.dispatch(&party.id, msg);
                moved = true;
            }
        }

        for party in parties.iter_mut() {
            for msg in drain(&mut party.inbox) {
                party
                    .harness
                    .controller
                    .handle_command(CallCommand::Signal(msg))
                    .await;
                moved = true;
            }
        }

        if !moved {
            break;
        }
    }
}

/// Two participants meet through a real relay, negotiate, and trickle
/// one candidate each way.
#[tokio::test]
async fn test_both_sides_negotiate_through_relay() {
    init_tracing();

    let registry = SessionRegistry::new();

    let mut p1 = join_relay(&registry, {
        let mut h = create_test_controller(MockMediaDevices::with(true, true));
        h.controller.start().await;
        h
    });
    settle(&registry, std::slice::from_mut(&mut p1)).await;

    let mut p2 = join_relay(&registry, {
        let mut h = create_test_controller(MockMediaDevices::with(true, true));
        h.controller.start().await;
        h
    });

    let mut parties = [p1, p2];
    settle(&registry, &mut parties).await;
    let [p1, p2] = &mut parties;

    // P1 reacted to the new-user notice with an offer, P2 answered it;
    // both links settle into the stable state.
    assert_eq!(
        p1.harness.controller.negotiation_state(&p2.id),
        Some(NegotiationState::Stable)
    );
    assert_eq!(
        p2.harness.controller.negotiation_state(&p1.id),
        Some(NegotiationState::Stable)
    );

    // Each side discovers one local candidate; the relay carries it over.
    p1.harness
        .controller
        .handle_transport_event(TransportEvent::CandidateGenerated(
            p2.id.clone(),
            "candidate-from-p1".into(),
        ))
        .await;
    p2.harness
        .controller
        .handle_transport_event(TransportEvent::CandidateGenerated(
            p1.id.clone(),
            "candidate-from-p2".into(),
        ))
        .await;
    settle(&registry, &mut parties).await;
    let [p1, p2] = &mut parties;

    let p1_transport = p1.harness.factory.transport(&p2.id).await.unwrap();
    assert!(
        p1_transport
            .calls()
            .await
            .contains(&TransportCall::AddIceCandidate("candidate-from-p2".into()))
    );

    let p2_transport = p2.harness.factory.transport(&p1.id).await.unwrap();
    assert!(
        p2_transport
            .calls()
            .await
            .contains(&TransportCall::AddIceCandidate("candidate-from-p1".into()))
    );

    // Candidate traffic does not disturb either side's settled state.
    assert_eq!(
        p1.harness.controller.negotiation_state(&p2.id),
        Some(NegotiationState::Stable)
    );
    assert_eq!(
        p2.harness.controller.negotiation_state(&p1.id),
        Some(NegotiationState::Stable)
    );
}

/// A third participant joins an established call: both existing
/// participants offer to it, nobody re-offers to each other.
#[tokio::test]
async fn test_third_participant_joins_mesh() {
    init_tracing();

    let registry = SessionRegistry::new();

    let mut parties: Vec<Party> = Vec::new();
    for _ in 0..3 {
        let mut h = create_test_controller(MockMediaDevices::with(true, false));
        h.controller.start().await;
        parties.push(join_relay(&registry, h));
        settle(&registry, &mut parties).await;
    }

    let third_id = parties[2].id.clone();
    for party in &parties[..2] {
        assert_eq!(
            party.harness.controller.negotiation_state(&third_id),
            Some(NegotiationState::Stable)
        );
        assert_eq!(party.harness.controller.link_count(), 2);
    }

    let third = &parties[2];
    assert_eq!(third.harness.controller.link_count(), 2);
    for party in &parties[..2] {
        assert_eq!(
            third.harness.controller.negotiation_state(&party.id),
            Some(NegotiationState::Stable)
        );
    }
}
