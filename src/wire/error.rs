use core::fmt;

/// The error type for packet representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An incoming packet was shorter than its headers claim.
    ///
    /// The buffer may be shorter than a fixed minimum header length, or
    /// shorter than a length derived from one of its own fields. Both mean
    /// that some field of interest lies outside the received data.
    Truncated,

    /// An incoming packet had an incorrect checksum.
    ///
    /// On the receive path this always resolves to dropping the packet; the
    /// distinct variant exists so diagnostics can tell a bit-flipped frame
    /// from a structurally bad one.
    WrongChecksum,

    /// An incoming packet could not be recognized.
    ///
    /// E.g. an Ethernet frame with an unknown ethertype. Usually not fatal:
    /// well-crafted standards explicitly allow ignoring unknown extensions.
    Unrecognized,

    /// An incoming packet was recognized but is self-contradictory.
    ///
    /// Examples: an IPv4 total length smaller than its header length; a UDP
    /// packet claiming to contain less than 8 bytes of data.
    Malformed,

    /// Handling the packet depends on a feature that is not implemented.
    ///
    /// In contrast to `Unrecognized` we know exactly what the data means,
    /// and that this implementation deliberately does not deal with it. A
    /// fragmented datagram is the prime example in this crate.
    Unsupported,
}

/// The result type for packet representation.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated     => write!(f, "truncated packet"),
            Error::WrongChecksum => write!(f, "checksum error"),
            Error::Unrecognized  => write!(f, "unrecognized packet"),
            Error::Malformed     => write!(f, "malformed packet"),
            Error::Unsupported   => write!(f, "unsupported packet"),
        }
    }
}
