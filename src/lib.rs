//! Ingress admission control for embedded IPv4 network stacks.
//!
//! This library is the gatekeeper between a link-layer driver and the upper
//! protocol layers of a small IPv4 stack. For every received frame it decides
//! exactly one thing: whether the frame is well-formed, addressed to this
//! node, and safe to hand to TCP/UDP/ICMP processing — or whether the buffer
//! goes straight back to its pool. There is no third outcome, no retry and no
//! partial success; see [`layer::ingress::Verdict`].
//!
//! ## Structure
//!
//! The crate is split the same way a full stack would be:
//!
//! * [`wire`] holds the packet *representation*: field accessors over raw
//!   byte slices for Ethernet, IPv4, UDP and ICMPv4 headers, plus the
//!   internet checksum primitives. Nothing in `wire` decides anything.
//! * [`layer::ingress`] holds the *processing*: the admission filter with its
//!   ordered check sequence, the in-place removal of IP options, and the
//!   endpoint table that answers "is this address mine".
//! * [`managed`] provides non-owning storage so the endpoint table can live
//!   in borrowed memory on allocation-free targets.
//!
//! ## Design
//!
//! Nothing here ever allocates and no call blocks or suspends: one invocation
//! inspects one exclusively owned buffer to a terminal verdict. The only
//! mutation the pipeline may perform is the in-place compaction that strips
//! IP options, and that happens strictly after the frame has been admitted.
//! All input is treated as hostile; every field access is preceded by a
//! length check, so a malformed frame can cost at most itself.
//!
//! Deployments differ in how much work the hardware already did. Whether the
//! driver pre-filters addresses, whether receive checksums are offloaded, and
//! what to do with zero-checksum UDP or option-bearing headers are all
//! runtime configuration on the filter, never compile-time switches; see
//! [`layer::ingress::Config`].
#![warn(missing_docs)]
#![warn(unreachable_pub)]

// tests should be able to use `std`
#![cfg_attr(all(
    not(feature = "std"),
    not(test)),
no_std)]

#[macro_use] mod macros;
pub mod layer;
pub mod managed;
pub mod wire;
