use crate::wire::ip::checksum;
use crate::wire::{ethernet_frame, icmpv4_packet, ipv4_packet, udp_packet};
use crate::wire::{Checksum, EthernetProtocol, IpProtocol};
use crate::wire::{Error, Result};
use crate::wire::{IPV4_MAX_HEADER_LEN, IPV4_MIN_HEADER_LEN};

use super::options::strip_options;
use super::rate::RateLimit;
use super::{Buffer, Config, Endpoints, Filtering, Verdict, ZeroChecksum};

/// Octets in an IPv6 fixed header. Used only to locate the transport header
/// of IPv6-tagged frames; no other IPv6 semantics exist in this crate.
const IPV6_HEADER_LEN: usize = 40;

/// Offset of the next-header octet within an IPv6 fixed header.
const IPV6_NEXT_HEADER: usize = 6;

/// Smallest TCP header, without options.
const TCP_HEADER_LEN: usize = 20;

/// Length of an IGMPv2 message.
const IGMP_HEADER_LEN: usize = 8;

/// The ingress admission filter.
///
/// Holds the deployment [`Config`], a shared reference to the endpoint
/// table, and the budget for discard diagnostics. One instance serves one
/// receive path; concurrent receive paths each get their own filter over the
/// same table.
#[derive(Debug)]
pub struct Filter<'e, 'data> {
    config: Config,
    endpoints: &'e Endpoints<'data>,
    limit: RateLimit,
}

impl<'e, 'data> Filter<'e, 'data> {
    /// Create a filter over the node's endpoint table.
    pub fn new(config: Config, endpoints: &'e Endpoints<'data>) -> Self {
        Filter {
            config,
            endpoints,
            limit: RateLimit::default(),
        }
    }

    /// Replace the diagnostic budget, e.g. with a larger one while testing a
    /// deployment.
    pub fn with_rate_limit(mut self, limit: RateLimit) -> Self {
        self.limit = limit;
        self
    }

    /// The configuration this filter was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full ingress pipeline on one received frame.
    ///
    /// Derives the header length, runs the admission checks and, for
    /// admitted frames whose header carries options, the option handling.
    /// On [`Verdict::Process`] the buffer holds the possibly compacted frame
    /// ready for protocol dispatch; on [`Verdict::Discard`] it was not
    /// modified and goes back to the pool.
    pub fn process(&mut self, buffer: &mut Buffer<'_>) -> Verdict {
        let (ipv4_framed, header_len) = {
            let eth = match ethernet_frame::new_checked(buffer.frame()) {
                Ok(eth) => eth,
                Err(_) => return self.discard("runt frame"),
            };
            match eth.ethertype() {
                // IPv6-tagged frames carry no IPv4 header and no IPv4
                // options; admission decides everything about them.
                EthernetProtocol::Ipv6 => (false, 0),
                _ => {
                    let ip = match ipv4_packet::new_checked(eth.payload_slice()) {
                        Ok(ip) => ip,
                        Err(err) => return self.discard_error(err),
                    };
                    (true, usize::from(ip.header_len()))
                }
            }
        };

        if ipv4_framed && !(IPV4_MIN_HEADER_LEN..=IPV4_MAX_HEADER_LEN).contains(&header_len) {
            return self.discard("header length out of range");
        }

        match self.filter(buffer, header_len) {
            Verdict::Discard => Verdict::Discard,
            Verdict::Process if ipv4_framed && header_len > IPV4_MIN_HEADER_LEN => {
                strip_options(self.config.options, buffer, header_len)
            }
            Verdict::Process => Verdict::Process,
        }
    }

    /// Decide whether one received frame may reach protocol processing.
    ///
    /// `header_len` is the IPv4 header length in octets as derived from the
    /// version/IHL octet; the filter re-validates it against the frame, so
    /// an inconsistent value yields [`Verdict::Discard`], never an
    /// out-of-bounds access. Option handling is *not* part of this call —
    /// use [`process`] for the composed pipeline.
    ///
    /// [`process`]: #method.process
    pub fn filter(&mut self, buffer: &Buffer<'_>, header_len: usize) -> Verdict {
        let eth = match ethernet_frame::new_checked(buffer.frame()) {
            Ok(eth) => eth,
            Err(_) => return self.discard("runt frame"),
        };

        if eth.ethertype() == EthernetProtocol::Ipv6 {
            // None of the IPv4 fields below exist in this frame. With any
            // IPv4-side check active it cannot pass; in a fully offloaded
            // deployment only the zero-checksum policy is left to apply.
            return match (self.config.filtering, self.config.checksums) {
                (Filtering::Driver, Checksum::Ignored) => self.zero_checksum_udp(eth),
                _ => self.discard("ipv6 frame on the ipv4 path"),
            };
        }

        // Structural pre-condition for everything below: the fixed header
        // fields exist and the declared lengths fit the received data.
        let ip = match ipv4_packet::new_checked(eth.payload_slice()) {
            Ok(ip) => ip,
            Err(err) => return self.discard_error(err),
        };
        if header_len != usize::from(ip.header_len()) {
            return self.discard("header length mismatch");
        }

        if let Filtering::Stack = self.config.filtering {
            if let Verdict::Discard = self.addressing(buffer, eth, ip) {
                return Verdict::Discard;
            }
        }

        match self.config.checksums {
            Checksum::Manual => self.verify_checksums(eth, ip, header_len),
            Checksum::Ignored => self.verify_sizes(eth),
        }
    }

    /// The structural and addressing gates, in their fixed order.
    fn addressing(
        &mut self,
        buffer: &Buffer<'_>,
        eth: &ethernet_frame,
        ip: &ipv4_packet,
    ) -> Verdict {
        // Nothing below this stage reassembles, so every fragment is
        // rejected: all but the last carry "more fragments", the last
        // carries a non-zero offset.
        if ip.more_frags() || ip.frag_offset() != 0 {
            return self.discard("fragmented frame");
        }

        // The header must be 20 to 60 octets and the version must be 4.
        let header_len = usize::from(ip.header_len());
        if ip.version() != 4
            || header_len < IPV4_MIN_HEADER_LEN
            || header_len > IPV4_MAX_HEADER_LEN
        {
            return self.discard("bad version or header length");
        }

        let src_addr = ip.src_addr();
        let dst_addr = ip.dst_addr();

        // Accept only frames addressed to us, to broadcast or to a
        // multicast group — unless we have no identity yet, as during
        // address negotiation, in which case everything may pass.
        if buffer.endpoint().is_none()
            && self.endpoints.by_addr(dst_addr).is_none()
            && !dst_addr.is_subnet_broadcast()
            && !dst_addr.is_multicast()
            && self.endpoints.any_configured()
        {
            return self.discard("frame for another node");
        }

        // A broadcast source invites reply storms.
        if src_addr.is_subnet_broadcast() {
            return self.discard("broadcast source address");
        }

        // A link-level broadcast must mean a network-level broadcast.
        if eth.dst_addr().is_broadcast() && !dst_addr.is_subnet_broadcast() {
            return self.discard("link broadcast without ip broadcast");
        }

        // Nothing legitimately sends from the broadcast MAC.
        if eth.src_addr().is_broadcast() {
            return self.discard("broadcast source mac");
        }

        // RFC 1112 section 7.2: a multicast address is never a source.
        if src_addr.is_multicast() {
            return self.discard("multicast source address");
        }

        Verdict::Process
    }

    /// Software integrity: header and transport checksums.
    fn verify_checksums(
        &mut self,
        eth: &ethernet_frame,
        ip: &ipv4_packet,
        header_len: usize,
    ) -> Verdict {
        // Frames looped back from one of our own interfaces carry checksums
        // we wrote ourselves; do not verify those again.
        if self.endpoints.by_mac(eth.src_addr()).is_some() {
            return Verdict::Process;
        }

        // The sum over the header including its checksum field must be the
        // fixed no-error sentinel, not zero.
        if checksum::data(&eth.payload_slice()[..header_len]) != !0 {
            return self.discard("wrong ip header checksum");
        }

        if !transport_checksum_ok(ip) {
            return self.discard("wrong transport checksum");
        }

        Verdict::Process
    }

    /// Hardware-assisted integrity: checksums are already judged, so check
    /// that the declared size fields agree with the received data, then
    /// apply the zero-checksum UDP policy.
    fn verify_sizes(&mut self, eth: &ethernet_frame) -> Verdict {
        if check_size_fields(eth).is_err() {
            return self.discard("inconsistent size fields");
        }

        self.zero_checksum_udp(eth)
    }

    /// Reject UDP frames whose carried checksum field is zero, when so
    /// configured. The transport header is found at a frame-type dependent
    /// offset: 40 fixed octets for IPv6-tagged frames, the actual header
    /// length otherwise. Only this offset selection is shared with IPv6.
    fn zero_checksum_udp(&mut self, eth: &ethernet_frame) -> Verdict {
        if let ZeroChecksum::Accept = self.config.zero_udp_checksum {
            return Verdict::Process;
        }

        let payload = eth.payload_slice();
        let (protocol, transport) = if eth.ethertype() == EthernetProtocol::Ipv6 {
            if payload.len() < IPV6_HEADER_LEN {
                return self.discard("truncated ipv6 header");
            }
            (
                IpProtocol::from(payload[IPV6_NEXT_HEADER]),
                &payload[IPV6_HEADER_LEN..],
            )
        } else {
            let ip = match ipv4_packet::new_checked(payload) {
                Ok(ip) => ip,
                Err(err) => return self.discard_error(err),
            };
            (ip.protocol(), &payload[usize::from(ip.header_len())..])
        };

        if protocol != IpProtocol::Udp {
            return Verdict::Process;
        }
        let udp = match udp_packet::new_checked(transport) {
            Ok(udp) => udp,
            Err(err) => return self.discard_error(err),
        };
        if udp.checksum() == 0 {
            if self.limit.check() {
                net_debug!("ingress: udp frame without checksum dropped");
            }
            return Verdict::Discard;
        }

        Verdict::Process
    }

    fn discard(&mut self, reason: &str) -> Verdict {
        if self.limit.check() {
            net_debug!("ingress: {}, frame dropped", reason);
        }
        Verdict::Discard
    }

    fn discard_error(&mut self, error: Error) -> Verdict {
        if self.limit.check() {
            net_debug!("ingress: {}, frame dropped", error);
        }
        Verdict::Discard
    }
}

/// Verify the transport checksum of the encapsulated segment.
///
/// UDP and TCP sums include the pseudo header, ICMP does not. A protocol we
/// cannot verify does not pass: what upper layers cannot handle anyway is
/// not worth admitting unchecked.
fn transport_checksum_ok(ip: &ipv4_packet) -> bool {
    let segment = ip.payload_slice();
    match ip.protocol() {
        IpProtocol::Udp => match udp_packet::new_checked(segment) {
            // A zero checksum means the sender did not compute one, which
            // UDP over IPv4 permits.
            Ok(udp) if udp.checksum() == 0 => true,
            Ok(udp) => udp.verify_checksum(ip.src_addr(), ip.dst_addr()),
            Err(_) => false,
        },
        IpProtocol::Tcp => {
            segment.len() >= TCP_HEADER_LEN
                && checksum::transport(&ip.src_addr(), &ip.dst_addr(), IpProtocol::Tcp, segment)
                    == !0
        }
        IpProtocol::Icmp => match icmpv4_packet::new_checked(segment) {
            Ok(icmp) => icmp.verify_checksum(),
            Err(_) => false,
        },
        // IGMP carries the same plain sum over the whole message.
        IpProtocol::Igmp => segment.len() >= IGMP_HEADER_LEN && checksum::data(segment) == !0,
        _ => false,
    }
}

/// Check that the declared sizes are consistent with the received data.
///
/// The Ethernet and IPv4 length relations are covered by the `check_len`
/// contracts; on top of that the header length has to be a valid IPv4 one
/// and the transport header must fit the space the network layer declares
/// for it. For UDP the datagram's own length field must match that space
/// exactly.
fn check_size_fields(eth: &ethernet_frame) -> Result<()> {
    let ip = ipv4_packet::new_checked(eth.payload_slice())?;
    let header_len = usize::from(ip.header_len());
    if ip.version() != 4 || header_len < IPV4_MIN_HEADER_LEN || header_len > IPV4_MAX_HEADER_LEN {
        return Err(Error::Malformed);
    }

    let segment = ip.payload_slice();
    match ip.protocol() {
        IpProtocol::Udp => {
            let udp = udp_packet::new_checked(segment)?;
            if usize::from(udp.len()) != segment.len() {
                return Err(Error::Malformed);
            }
        }
        IpProtocol::Tcp => {
            if segment.len() < TCP_HEADER_LEN {
                return Err(Error::Truncated);
            }
        }
        IpProtocol::Icmp => {
            if segment.len() < crate::wire::ICMPV4_HEADER_LEN {
                return Err(Error::Truncated);
            }
        }
        IpProtocol::Igmp => {
            if segment.len() < IGMP_HEADER_LEN {
                return Err(Error::Truncated);
            }
        }
        _ => (),
    }

    Ok(())
}
