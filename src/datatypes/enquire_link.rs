use crate::macros::impl_body_less_pdu;
use crate::datatypes::CommandId;

/// Link verification request (Section 4.11.1).
///
/// Either peer may issue enquire_link at any time while bound to confirm the
/// session is still alive. The PDU has no body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnquireLink;

/// Response to enquire_link (Section 4.11.2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnquireLinkResp;

impl EnquireLink {
    /// The response PDU acknowledging this request.
    pub fn response(&self) -> EnquireLinkResp {
        EnquireLinkResp
    }
}

impl_body_less_pdu!(EnquireLink, CommandId::EnquireLink);
impl_body_less_pdu!(EnquireLinkResp, CommandId::EnquireLinkResp);
