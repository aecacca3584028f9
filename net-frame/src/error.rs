/// Error returned by the decoders/encoders in this crate.
///
/// The codec never mutates global state and always returns errors by value;
/// see spec §7 for the propagation contract the endpoint loop relies on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// The buffer was too short, or a length field claimed more bytes than
    /// the buffer actually holds.
    MalformedFrame,
    /// The frame decoded but this implementation does not handle it (e.g.
    /// IPv6, fragmented IPv4, ARP with non-standard `hlen`/`plen`).
    Unsupported,
    /// A checksum did not verify. Decoders default to accepting on ingress
    /// (spec §7); this variant exists for callers that opt into strict
    /// verification.
    ChecksumMismatch,
}
