/* ------------------------------------------------------------------------- */
/*  Error enums                                                              */
/* ------------------------------------------------------------------------- */

/// Transport failures. These end the current polling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Host closed the port or the USB bus went away.
    Disconnected,
    /// A received packet did not fit the transport buffer.
    Overflow,
}

/// Reasons a partially framed packet was thrown away. Never reported to the
/// host; the reader just resumes scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// High-bit byte that is neither SET nor GET.
    UnknownCommand(u8),
    /// Link went quiet before `[start][count]` arrived.
    HeaderTimeout,
    /// Link went quiet after `received` of `expected` payload values.
    PayloadTimeout { received: u8, expected: u8 },
    /// A command byte showed up mid-packet; it starts the next packet.
    Interrupted(u8),
}

/// Failures while executing a framed packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// The addressed span runs past the channel table.
    OutOfRange { start: u8, count: u8 },
    Link(LinkError),
}

impl From<LinkError> for DispatchError {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}
