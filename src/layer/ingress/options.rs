use crate::wire::{ethernet_frame, ipv4_packet, IPV4_MIN_HEADER_LEN};

use super::{Buffer, OptionsPolicy, Verdict};

/// Resolve an option-bearing header according to policy.
///
/// Invoked for admitted frames whose header length exceeds the 20-octet
/// minimum, i.e. the extra space holds IP options. Depending on `policy` the
/// packet is either discarded outright, or the options are cut out in place
/// so that upper layers only ever see a minimal header.
///
/// `header_len` is the full header length in octets, already validated as a
/// multiple of four within 20..=60. Inconsistent live lengths resolve to
/// [`Verdict::Discard`]; no byte is moved unless the whole move region is
/// proven to lie inside the valid frame.
pub fn strip_options(policy: OptionsPolicy, buffer: &mut Buffer<'_>, header_len: usize) -> Verdict {
    match policy {
        OptionsPolicy::Discard => Verdict::Discard,
        OptionsPolicy::Strip => compact(buffer, header_len),
    }
}

/// Cut the options out of the header by moving the transport data down.
///
/// The move shifts toward lower addresses only, so overlapping source and
/// destination ranges are fine with a forward copy; `copy_within` provides
/// exactly that. All region bounds come from the live length fields, never
/// from assumptions about the pool buffer size.
fn compact(buffer: &mut Buffer<'_>, header_len: usize) -> Verdict {
    let option_len = match header_len.checked_sub(IPV4_MIN_HEADER_LEN) {
        Some(0) | None => return Verdict::Process,
        Some(len) => len,
    };
    let header_end = ethernet_frame::header_len() + header_len;
    // Everything past the options-bearing header moves down by option_len.
    let move_len = match buffer.len().checked_sub(header_end) {
        Some(len) => len,
        None => return Verdict::Discard,
    };

    {
        let eth = ethernet_frame::new_unchecked(buffer.frame());
        let ip = ipv4_packet::new_unchecked(eth.payload_slice());
        if usize::from(ip.total_len()) < header_len {
            return Verdict::Discard;
        }
    }

    let frame = buffer.frame_mut();
    frame.copy_within(header_end..header_end + move_len, header_end - option_len);
    buffer.shrink(option_len);
    net_trace!("ingress: stripped {} option bytes", option_len);

    let eth = ethernet_frame::new_unchecked_mut(buffer.frame_mut());
    let ip = ipv4_packet::new_unchecked_mut(eth.payload_mut_slice());
    let total_len = ip.total_len() - option_len as u16;
    ip.set_total_len(total_len);
    ip.set_header_len(IPV4_MIN_HEADER_LEN as u8);
    Verdict::Process
}
