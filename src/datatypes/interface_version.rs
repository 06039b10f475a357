use num_enum::TryFromPrimitive;

/// SMPP interface version negotiated at bind time (Section 5.2.4).
///
/// Only version 3.4 is spoken by this crate; earlier values are accepted on
/// the wire for peers that advertise a legacy version.
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InterfaceVersion {
    SmppV33 = 0x33,
    #[default]
    SmppV34 = 0x34,
}
