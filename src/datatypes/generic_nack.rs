use crate::macros::impl_body_less_pdu;
use crate::datatypes::CommandId;

/// GenericNack is used to acknowledge the receipt of a PDU when the
/// receiving entity cannot process it, e.g. because of an invalid command_id
/// or because the request window is exhausted (Section 4.3.1).
///
/// The generic_nack PDU has no body; the reason travels in the header's
/// command_status and the offending PDU's sequence_number is echoed back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenericNack;

impl_body_less_pdu!(GenericNack, CommandId::GenericNack);
