use byteorder::{ByteOrder, NetworkEndian};

use super::ip::checksum;
use super::{Error, Result};

/// Length of the fixed part of an ICMPv4 message in octets.
///
/// All message kinds this crate may be asked to checksum carry at least the
/// type/code/checksum words plus one four-octet rest-of-header field.
pub const HEADER_LEN: usize = 8;

enum_with_unknown! {
    /// Internet protocol control message type.
    pub enum Message(u8) {
        EchoReply = 0,
        DstUnreachable = 3,
        EchoRequest = 8,
        TimeExceeded = 11,
    }
}

byte_wrapper! {
    /// A byte sequence representing an ICMPv4 message.
    #[derive(Debug, PartialEq, Eq)]
    pub struct icmpv4([u8]);
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const TYPE:     usize = 0;
    pub(crate) const CODE:     usize = 1;
    pub(crate) const CHECKSUM: Field = 2..4;
}

impl icmpv4 {
    /// Imbue a raw octet buffer with ICMPv4 message structure.
    pub fn new_unchecked(data: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(data)
    }

    /// Imbue a mutable octet buffer with ICMPv4 message structure.
    pub fn new_unchecked_mut(data: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(data)
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        Self::new_unchecked(data).check_len()?;
        Ok(Self::new_unchecked(data))
    }

    /// Unwrap the message as a raw byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Unwrap the message as a mutable raw byte slice.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }

    /// Ensure that no accessor method will panic if called.
    /// Returns `Err(Error::Truncated)` if the buffer is too short.
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() < HEADER_LEN {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the message type field.
    #[inline]
    pub fn msg_type(&self) -> Message {
        Message::from(self.0[field::TYPE])
    }

    /// Return the message code field.
    #[inline]
    pub fn msg_code(&self) -> u8 {
        self.0[field::CODE]
    }

    /// Return the checksum field.
    #[inline]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::CHECKSUM])
    }

    /// Set the message type field.
    #[inline]
    pub fn set_msg_type(&mut self, value: Message) {
        self.0[field::TYPE] = value.into()
    }

    /// Set the message code field.
    #[inline]
    pub fn set_msg_code(&mut self, value: u8) {
        self.0[field::CODE] = value
    }

    /// Set the checksum field.
    #[inline]
    pub fn set_checksum(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], value)
    }

    /// Validate the message checksum.
    ///
    /// The sum covers the whole message and, unlike the transport protocols,
    /// no pseudo header takes part.
    pub fn verify_checksum(&self) -> bool {
        checksum::data(&self.0[..]) == !0
    }

    /// Compute and fill in the message checksum.
    pub fn fill_checksum(&mut self) {
        self.set_checksum(0);
        let checksum = !checksum::data(&self.0[..]);
        self.set_checksum(checksum)
    }
}

impl AsRef<[u8]> for icmpv4 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsMut<[u8]> for icmpv4 {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}
