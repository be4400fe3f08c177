//! Admission control for received frames.
//!
//! Everything a frame must survive between the link-layer driver and the
//! upper protocol layers happens here, in a fixed order:
//!
//! 1. Structural and addressing checks — not fragmented, plausible header,
//!    actually addressed to this node (or broadcast, or multicast, or the
//!    node has no address yet), no spoofed broadcast/multicast senders.
//! 2. Integrity checks — either full software checksum verification, or a
//!    consistency pass over the declared size fields when the hardware has
//!    already verified checksums.
//! 3. Option handling — headers longer than 20 octets are either rejected or
//!    compacted in place so upper layers only ever see minimal headers.
//!
//! Each step is a short-circuiting gate: the first failure yields
//! [`Verdict::Discard`] and nothing later runs or touches the buffer. Which
//! steps apply is decided once at startup through [`Config`], never by
//! conditional compilation: a driver that filters in hardware is a runtime
//! fact of the deployment, not of the build.
//!
//! The caller owns the buffer lifecycle. On [`Verdict::Process`] it hands
//! the (possibly compacted) buffer to protocol dispatch; on
//! [`Verdict::Discard`] it returns the buffer to its pool. Nothing is ever
//! retried.

mod buffer;
mod endpoint;
mod filter;
mod options;
mod rate;

pub use self::buffer::Buffer;
pub use self::endpoint::{Endpoint, Endpoints};
pub use self::filter::Filter;
pub use self::options::strip_options;
pub use self::rate::RateLimit;

use crate::wire::Checksum;

/// The outcome of running a received frame through the ingress pipeline.
///
/// There is deliberately no third state: every malformed, mis-addressed,
/// corrupted or unwanted frame collapses into `Discard`, and the caller's
/// only obligations are to forward on `Process` and to recycle the buffer on
/// `Discard`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Hand the frame to upper-layer protocol processing.
    Process,

    /// Return the buffer to its pool; the frame is gone.
    Discard,
}

/// Who performs the structural and addressing checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Filtering {
    /// This crate runs the full check sequence.
    Stack,

    /// The link-layer driver already filters by address and fragmentation,
    /// so the stack side skips those checks entirely.
    Driver,
}

/// Policy for UDP datagrams whose checksum field is zero.
///
/// Only consulted when checksums are hardware-validated: offload engines
/// pass zero-checksum datagrams through unjudged, so the stack has to hold
/// an opinion of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZeroChecksum {
    /// Reject such datagrams.
    Discard,

    /// Accept them; the checksum is optional for UDP over IPv4.
    Accept,
}

/// Policy for IPv4 headers that carry options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionsPolicy {
    /// Reject any packet with options. The simplest, safest default.
    Discard,

    /// Remove the options in place and pass on a minimal header.
    Strip,
}

/// Startup-time configuration of the ingress pipeline.
///
/// A plain value held by the [`Filter`]; all selection happens through
/// ordinary conditionals. The default is the most conservative posture: no
/// hardware assistance assumed, zero-checksum UDP and IP options rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Where addressing and fragmentation are checked.
    pub filtering: Filtering,

    /// Who verifies receive checksums.
    ///
    /// `Manual` runs full software verification of the header and transport
    /// checksums. `Ignored` trusts the hardware and replaces the checksum
    /// pass with a consistency check of the declared size fields.
    pub checksums: Checksum,

    /// What to do with zero-checksum UDP in hardware-assisted mode.
    pub zero_udp_checksum: ZeroChecksum,

    /// What to do with option-bearing headers.
    pub options: OptionsPolicy,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            filtering: Filtering::Stack,
            checksums: Checksum::Manual,
            zero_udp_checksum: ZeroChecksum::Discard,
            options: OptionsPolicy::Discard,
        }
    }
}
