use crate::macros::impl_body_less_pdu;
use crate::datatypes::CommandId;

/// Session teardown request (Section 4.2.1).
///
/// Either peer may initiate unbinding; the initiator must wait for the
/// unbind_resp before closing the connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unbind;

/// Response to unbind (Section 4.2.2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnbindResp;

impl Unbind {
    /// The response PDU acknowledging this request.
    pub fn response(&self) -> UnbindResp {
        UnbindResp
    }
}

impl_body_less_pdu!(Unbind, CommandId::Unbind);
impl_body_less_pdu!(UnbindResp, CommandId::UnbindResp);
