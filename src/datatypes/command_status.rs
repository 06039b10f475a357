use thiserror::Error;

/// One table drives the enum, the wire-value conversions and the
/// descriptions, so a code can never be listed in one place and missed in
/// another.
macro_rules! command_statuses {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $code:literal, $desc:literal;
        )*
    ) => {
        /// The command_status field of an SMPP message response indicates the
        /// success or failure of an SMPP request. It is relevant only in the
        /// SMPP response message and should be set to NULL in SMPP request
        /// messages. The SMPP error status codes are returned by the SMSC in
        /// the command_status field of the SMPP message header and in the
        /// error_status_code field of a submit_multi_resp message.
        ///
        /// Values outside the codes defined by the specification (reserved
        /// gaps, SMPP extension range 0x00000100-0x000003FF, SMSC vendor
        /// range 0x00000400-0x000004FF) are carried as
        /// [`CommandStatus::Unrecognized`] with the wire value preserved;
        /// [`CommandStatus::from_code`] is total and never fails.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum CommandStatus {
            $(
                $(#[$doc])*
                $name,
            )*
            /// A status outside the codes defined by the specification,
            /// preserving the raw wire value.
            Unrecognized(u32),
        }

        impl CommandStatus {
            /// Numeric wire value of the status.
            pub fn code(&self) -> u32 {
                match self {
                    $(CommandStatus::$name => $code,)*
                    CommandStatus::Unrecognized(code) => *code,
                }
            }

            /// Interpret a wire value. Total: codes outside the defined set
            /// map to [`CommandStatus::Unrecognized`].
            pub fn from_code(code: u32) -> CommandStatus {
                match code {
                    $($code => CommandStatus::$name,)*
                    other => CommandStatus::Unrecognized(other),
                }
            }

            /// Human-readable description as worded by the SMPP v3.4
            /// specification.
            pub fn description(&self) -> &'static str {
                match self {
                    $(CommandStatus::$name => $desc,)*
                    CommandStatus::Unrecognized(_) => "Unknown Status",
                }
            }
        }
    };
}

command_statuses! {
    /// No Error
    Ok = 0x00000000, "No Error";

    /// Message Length is invalid
    InvalidMsgLength = 0x00000001, "Message Length is invalid";

    /// Command Length is invalid
    InvalidCommandLength = 0x00000002, "Command Length is invalid";

    /// Invalid Command ID
    InvalidCommandId = 0x00000003, "Invalid Command ID";

    /// Incorrect BIND Status for given command
    IncorrectBindStatus = 0x00000004, "Incorrect BIND Status for given command";

    /// ESME Already in Bound State
    AlreadyBoundState = 0x00000005, "ESME Already in Bound State";

    /// Invalid Priority Flag
    InvalidPriorityFlag = 0x00000006, "Invalid Priority Flag";

    /// Invalid Registered Delivery Flag
    InvalidRegisteredDeliveryFlag = 0x00000007, "Invalid Registered Delivery Flag";

    /// System Error
    SystemError = 0x00000008, "System Error";

    // Reserved 0x00000009
    /// Invalid Source Address
    InvalidSourceAddress = 0x0000000A, "Invalid Source Address";

    /// Invalid Dest Addr
    InvalidDestinationAddress = 0x0000000B, "Invalid Destination Address";

    /// Message ID is invalid
    InvalidMessageId = 0x0000000C, "Message ID is invalid";

    /// Bind Failed
    BindFailed = 0x0000000D, "Bind Failed";

    /// Invalid Password
    InvalidPassword = 0x0000000E, "Invalid Password";

    /// Invalid System ID
    InvalidSystemId = 0x0000000F, "Invalid System ID";

    // Reserved 0x00000010
    /// Cancel SM Failed
    CancelSmFailed = 0x00000011, "Cancel SM Failed";

    // Reserved 0x00000012
    /// Replace SM Failed
    ReplaceSmFailed = 0x00000013, "Replace SM Failed";

    /// Message Queue Full
    MessageQueueFull = 0x00000014, "Message Queue Full";

    /// Invalid Service Type
    InvalidServiceType = 0x00000015, "Invalid Service Type";

    // Reserved 0x00000016 - 0x00000032
    /// Invalid number of destinations
    InvalidNumberOfDestinations = 0x00000033, "Invalid number of destinations";

    /// Invalid Distribution List name
    InvalidDistributionListName = 0x00000034, "Invalid Distribution List name";

    // Reserved 0x00000035 - 0x0000003F
    /// Destination flag is invalid (submit_multi)
    InvalidDestinationFlag = 0x00000040, "Destination flag is invalid (submit_multi)";

    // Reserved 0x00000041
    /// Invalid 'submit with replace' request
    /// (i.e. submit_sm with replace_if_present_flag set)
    InvalidSubmitWithReplaceRequest = 0x00000042, "Invalid 'submit with replace' request";

    /// Invalid esm_class field data
    InvalidEsmClassFieldData = 0x00000043, "Invalid esm_class field data";

    /// Cannot Submit to Distribution List
    CannotSubmitToDistributionList = 0x00000044, "Cannot Submit to Distribution List";

    /// submit_sm or submit_multi failed
    SubmitFailed = 0x00000045, "submit_sm or submit_multi failed";

    // Reserved 0x00000046 - 0x00000047
    /// Invalid Source address TON
    InvalidSourceAddressTon = 0x00000048, "Invalid Source address TON";

    /// Invalid Source address NPI
    InvalidSourceAddressNpi = 0x00000049, "Invalid Source address NPI";

    /// Invalid Destination address TON
    InvalidDestinationAddressTon = 0x00000050, "Invalid Destination address TON";

    /// Invalid Destination address NPI
    InvalidDestinationAddressNpi = 0x00000051, "Invalid Destination address NPI";

    // Reserved 0x00000052
    /// Invalid system_type field
    InvalidSystemTypeField = 0x00000053, "Invalid system_type field";

    /// Invalid replace_if_present flag
    InvalidReplaceIfPresentFlag = 0x00000054, "Invalid replace_if_present flag";

    /// Invalid number of messages
    InvalidNumberOfMessages = 0x00000055, "Invalid number of messages";

    // Reserved 0x00000056 - 0x00000057
    /// Throttling error (ESME has exceeded allowed message limits)
    ThrottlingError = 0x00000058, "Throttling error (ESME has exceeded allowed message limits)";

    // Reserved 0x00000059 - 0x00000060
    /// Invalid Scheduled Delivery Time
    InvalidScheduledDeliveryTime = 0x00000061, "Invalid Scheduled Delivery Time";

    /// Invalid message validity period (Expiry time)
    InvalidExpiryTime = 0x00000062, "Invalid message Expiry time";

    /// Predefined Message Invalid or Not Found
    InvalidPredefinedMessageId = 0x00000063, "Predefined Message Invalid or Not Found";

    /// ESME Receiver Temporary App Error Code
    ReceiverTemporaryAppError = 0x00000064, "ESME Receiver Temporary App Error Code";

    /// ESME Receiver Permanent App Error Code
    ReceiverPermanentAppError = 0x00000065, "ESME Receiver Permanent App Error Code";

    /// ESME Receiver Reject Message Error Code
    ReceiverRejectMessageError = 0x00000066, "ESME Receiver Reject Message Error Code";

    /// query_sm request failed
    QuerySmRequestFailed = 0x00000067, "query_sm request failed";

    // Reserved 0x00000068 - 0x000000BF
    /// Error in the optional part of the PDU Body.
    ErrorInOptionalPartOfPduBody = 0x000000C0, "Error in the optional part of the PDU Body";

    /// Optional Parameter not allowed
    OptionalParameterNotAllowed = 0x000000C1, "Optional Parameter not allowed";

    /// Invalid Parameter Length.
    InvalidParameterLength = 0x000000C2, "Invalid Parameter Length";

    /// Expected Optional Parameter missing
    ExpectedOptionalParameterMissing = 0x000000C3, "Expected Optional Parameter missing";

    /// Invalid Optional Parameter Value
    InvalidOptionalParameterValue = 0x000000C4, "Invalid Optional Parameter Value";

    // Reserved 0x000000C5 - 0x000000FD
    /// Delivery Failure (used for data_sm_resp)
    DeliveryFailed = 0x000000FE, "Delivery Failure";

    /// Unknown Error
    UnknownError = 0x000000FF, "Unknown Error";
    // Reserved for SMPP extension 0x00000100 - 0x000003FF
    // Reserved for SMSC vendor specific errors 0x00000400 - 0x000004FF
    // Reserved 0x00000500 - 0xFFFFFFFF
}

impl CommandStatus {
    /// Translate a received response status into a result, preserving the
    /// numeric status for non-zero codes.
    pub fn into_result(self) -> Result<(), StatusError> {
        if self == CommandStatus::Ok {
            Ok(())
        } else {
            Err(StatusError { status: self })
        }
    }
}

/// A non-zero SMPP status received in a response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{} '{:#010X}'", .status.description(), .status.code())]
pub struct StatusError {
    pub status: CommandStatus,
}

impl StatusError {
    /// Numeric status code of the error.
    pub fn status(&self) -> CommandStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_into_result() {
        assert!(CommandStatus::Ok.into_result().is_ok());

        let err = CommandStatus::ThrottlingError.into_result().unwrap_err();
        assert_eq!(err.status(), CommandStatus::ThrottlingError);
        assert_eq!(
            err.to_string(),
            "Throttling error (ESME has exceeded allowed message limits) '0x00000058'"
        );
    }

    #[test]
    fn throttled_code_value() {
        assert_eq!(CommandStatus::ThrottlingError.code(), 0x0000_0058);
        assert_eq!(
            CommandStatus::from_code(0x0000_0058),
            CommandStatus::ThrottlingError
        );
    }

    #[test]
    fn unrecognized_codes_are_preserved() {
        // A reserved gap, the extension range and the vendor range all map
        // to the fallback without losing the wire value.
        for code in [0x0000_0009, 0x0000_0150, 0x0000_0400] {
            let status = CommandStatus::from_code(code);
            assert_eq!(status, CommandStatus::Unrecognized(code));
            assert_eq!(status.code(), code);
            assert_eq!(status.description(), "Unknown Status");

            let err = status.into_result().unwrap_err();
            assert_eq!(err.status().code(), code);
        }
        assert_eq!(
            CommandStatus::Unrecognized(0x0000_0400).into_result().unwrap_err().to_string(),
            "Unknown Status '0x00000400'"
        );
    }

    #[test]
    fn from_code_roundtrips_defined_codes() {
        for status in [
            CommandStatus::Ok,
            CommandStatus::SystemError,
            CommandStatus::BindFailed,
            CommandStatus::ThrottlingError,
            CommandStatus::DeliveryFailed,
            CommandStatus::UnknownError,
        ] {
            assert_eq!(CommandStatus::from_code(status.code()), status);
        }
    }
}
