// ABOUTME: Pure SMPP v3.4 session state machine shared by both peer roles
// ABOUTME: Maps (state, session type, command id, direction) to the follow-up state

use crate::datatypes::CommandId;
use crate::session::{SessionState, SessionType};

/// Direction a PDU moves through the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Send,
    Receive,
}

/// Result of a legal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// The PDU is legal and leaves the state unchanged.
    Stay,
    /// The PDU is legal and moves the session to a new state.
    Enter(SessionState),
}

/// Decide whether processing `id` in `state` is legal for this session type
/// and direction, and which state follows. `None` means the PDU is not
/// permitted; the caller reports a temporary error and the session state is
/// untouched.
///
/// The table is symmetric: sending from an ESME obeys the same rules as
/// receiving on an SMSC, and vice versa.
pub(crate) fn transition(
    state: SessionState,
    session_type: SessionType,
    id: CommandId,
    direction: Direction,
) -> Option<Transition> {
    use CommandId::*;
    use SessionState::*;

    let esme_originated = (session_type == SessionType::Esme && direction == Direction::Send)
        || (session_type == SessionType::Smsc && direction == Direction::Receive);

    if esme_originated {
        match state {
            Open => match id {
                BindTransmitter | BindReceiver | BindTransceiver => {
                    Some(Transition::Enter(Binding))
                }
                _ => None,
            },
            Binding => match id {
                GenericNack => Some(Transition::Enter(Open)),
                _ => None,
            },
            BoundTx => match id {
                Unbind => Some(Transition::Enter(Unbinding)),
                SubmitSm | SubmitMulti | DataSm | DataSmResp | QuerySm | CancelSm | ReplaceSm
                | EnquireLink | EnquireLinkResp | DeliverSmResp | UnbindResp | GenericNack => {
                    Some(Transition::Stay)
                }
                _ => None,
            },
            BoundRx => match id {
                Unbind => Some(Transition::Enter(Unbinding)),
                DeliverSmResp | DataSm | DataSmResp | EnquireLink | EnquireLinkResp
                | UnbindResp | GenericNack => Some(Transition::Stay),
                _ => None,
            },
            BoundTRx => match id {
                Unbind => Some(Transition::Enter(Unbinding)),
                SubmitSm | SubmitMulti | DataSm | DataSmResp | QuerySm | CancelSm | ReplaceSm
                | EnquireLink | EnquireLinkResp | DeliverSmResp | UnbindResp | GenericNack => {
                    Some(Transition::Stay)
                }
                _ => None,
            },
            Unbinding => match id {
                UnbindResp => Some(Transition::Stay),
                _ => None,
            },
            Closing | Closed => None,
        }
    } else {
        // SMSC-originated: sending from an SMSC or receiving on an ESME.
        match state {
            Open => match id {
                Outbind => Some(Transition::Stay),
                _ => None,
            },
            Binding => match id {
                BindTransmitterResp => Some(Transition::Enter(BoundTx)),
                BindReceiverResp => Some(Transition::Enter(BoundRx)),
                BindTransceiverResp => Some(Transition::Enter(BoundTRx)),
                GenericNack => Some(Transition::Enter(Open)),
                _ => None,
            },
            BoundTx => match id {
                Unbind => Some(Transition::Enter(Unbinding)),
                SubmitSmResp | SubmitMultiResp | DataSm | DataSmResp | QuerySmResp
                | CancelSmResp | ReplaceSmResp | EnquireLink | EnquireLinkResp | UnbindResp
                | GenericNack => Some(Transition::Stay),
                _ => None,
            },
            BoundRx => match id {
                Unbind => Some(Transition::Enter(Unbinding)),
                DeliverSm | DataSm | DataSmResp | EnquireLink | EnquireLinkResp
                | AlertNotification | UnbindResp | GenericNack => Some(Transition::Stay),
                _ => None,
            },
            BoundTRx => match id {
                Unbind => Some(Transition::Enter(Unbinding)),
                SubmitSmResp | SubmitMultiResp | DataSm | DataSmResp | DeliverSm | QuerySmResp
                | CancelSmResp | ReplaceSmResp | AlertNotification | EnquireLink
                | EnquireLinkResp | UnbindResp | GenericNack => Some(Transition::Stay),
                _ => None,
            },
            Unbinding => match id {
                UnbindResp => Some(Transition::Stay),
                _ => None,
            },
            Closing | Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CommandId::*;
    use SessionState::*;
    use SessionType::*;

    fn esme_sends(state: SessionState, id: CommandId) -> Option<Transition> {
        transition(state, Esme, id, Direction::Send)
    }

    fn esme_receives(state: SessionState, id: CommandId) -> Option<Transition> {
        transition(state, Esme, id, Direction::Receive)
    }

    #[test]
    fn open_accepts_only_binds_from_esme() {
        assert_eq!(
            esme_sends(Open, BindTransmitter),
            Some(Transition::Enter(Binding))
        );
        assert_eq!(
            esme_sends(Open, BindTransceiver),
            Some(Transition::Enter(Binding))
        );
        assert_eq!(esme_sends(Open, SubmitSm), None);
        assert_eq!(esme_sends(Open, EnquireLink), None);
    }

    #[test]
    fn outbind_keeps_session_open() {
        assert_eq!(esme_receives(Open, Outbind), Some(Transition::Stay));
        assert_eq!(
            transition(Open, Smsc, Outbind, Direction::Send),
            Some(Transition::Stay)
        );
    }

    #[test]
    fn bind_responses_select_bound_state() {
        assert_eq!(
            esme_receives(Binding, BindTransmitterResp),
            Some(Transition::Enter(BoundTx))
        );
        assert_eq!(
            esme_receives(Binding, BindReceiverResp),
            Some(Transition::Enter(BoundRx))
        );
        assert_eq!(
            esme_receives(Binding, BindTransceiverResp),
            Some(Transition::Enter(BoundTRx))
        );
        assert_eq!(
            esme_receives(Binding, GenericNack),
            Some(Transition::Enter(Open))
        );
    }

    #[test]
    fn bound_tx_traffic() {
        for id in [SubmitSm, SubmitMulti, DataSm, QuerySm, CancelSm, ReplaceSm, EnquireLink] {
            assert_eq!(esme_sends(BoundTx, id), Some(Transition::Stay), "{id:?}");
        }
        // A transmitter cannot originate deliveries.
        assert_eq!(esme_sends(BoundTx, DeliverSm), None);
        assert_eq!(esme_sends(BoundTx, Unbind), Some(Transition::Enter(Unbinding)));
    }

    #[test]
    fn bound_rx_traffic() {
        assert_eq!(esme_receives(BoundRx, DeliverSm), Some(Transition::Stay));
        assert_eq!(
            esme_receives(BoundRx, AlertNotification),
            Some(Transition::Stay)
        );
        assert_eq!(esme_sends(BoundRx, DeliverSmResp), Some(Transition::Stay));
        assert_eq!(esme_sends(BoundRx, SubmitSm), None);
    }

    #[test]
    fn bound_trx_combines_both_sets() {
        assert_eq!(esme_sends(BoundTRx, SubmitSm), Some(Transition::Stay));
        assert_eq!(esme_sends(BoundTRx, DeliverSmResp), Some(Transition::Stay));
        assert_eq!(esme_receives(BoundTRx, DeliverSm), Some(Transition::Stay));
        assert_eq!(esme_receives(BoundTRx, SubmitSmResp), Some(Transition::Stay));
    }

    #[test]
    fn symmetry_between_roles() {
        let states = [Open, Binding, BoundTx, BoundRx, BoundTRx, Unbinding, Closing, Closed];
        let ids = [
            BindTransmitter,
            BindTransmitterResp,
            SubmitSm,
            SubmitSmResp,
            DeliverSm,
            DeliverSmResp,
            Unbind,
            UnbindResp,
            EnquireLink,
            GenericNack,
            Outbind,
            AlertNotification,
        ];
        for state in states {
            for id in ids {
                assert_eq!(
                    transition(state, Esme, id, Direction::Send),
                    transition(state, Smsc, id, Direction::Receive),
                    "ESME send / SMSC receive diverge for {state:?} {id:?}"
                );
                assert_eq!(
                    transition(state, Esme, id, Direction::Receive),
                    transition(state, Smsc, id, Direction::Send),
                    "ESME receive / SMSC send diverge for {state:?} {id:?}"
                );
            }
        }
    }

    #[test]
    fn unbinding_admits_only_unbind_resp() {
        assert_eq!(esme_sends(Unbinding, UnbindResp), Some(Transition::Stay));
        assert_eq!(esme_receives(Unbinding, UnbindResp), Some(Transition::Stay));
        assert_eq!(esme_sends(Unbinding, SubmitSm), None);
    }

    #[test]
    fn closing_and_closed_reject_everything() {
        for id in [BindTransmitter, SubmitSm, EnquireLink, Unbind, GenericNack] {
            assert_eq!(esme_sends(Closing, id), None);
            assert_eq!(esme_sends(Closed, id), None);
            assert_eq!(esme_receives(Closing, id), None);
        }
    }
}
