use crate::bit_buffer::BitBuffer;
use crate::segment_mode::EncodingMode;
use crate::version::Version;
use crate::ALPHANUMERIC_CHARSET;

/// A segment of character/binary/control data in a QR Code symbol.
///
/// Instances of this struct are immutable.
///
/// The mid-level way to create a segment is to take the payload data
/// and call a static factory function such as `Segment::make_numeric()`.
/// The low-level way to create a segment is to custom-make the bit buffer
/// and call the `Segment::new()` constructor with appropriate values.
///
/// This segment struct imposes no length restrictions, but QR Codes have restrictions.
/// Even in the most favorable conditions, a QR Code can only hold 7089 characters of data.
/// Any segment longer than this is meaningless for the purpose of generating QR Codes.
#[derive(Clone, PartialEq, Eq)]
pub struct Segment {
    // The mode indicator of this segment. Accessed through mode().
    pub mode: EncodingMode,

    // The length of this segment's unencoded data. Measured in characters for
    // numeric/alphanumeric mode, bytes for byte mode, and 0 for ECI mode.
    // Not the same as the data's bit length. Accessed through num_chars().
    pub numchars: usize,

    // The data bits of this segment. Accessed through data().
    pub data: Vec<bool>,
}

impl Segment {
    /*---- Static factory functions (mid level) ----*/

    /// Returns a segment representing the given binary data encoded in byte mode.
    ///
    /// All input byte slices are acceptable.
    pub fn make_bytes(data: &[u8]) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(data.len() * 8));
        for &b in data {
            bb.append_bits(u32::from(b), 8);
        }
        Segment::new(EncodingMode::Byte, data.len(), bb.0)
    }

    /// Returns a segment representing the given ASCII digit bytes encoded in numeric mode.
    ///
    /// Panics if a byte is outside the ASCII digit range.
    pub fn make_numeric(digits: &[u8]) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(digits.len() * 3 + (digits.len() + 2) / 3));
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for &b in digits {
            assert!((b'0'..=b'9').contains(&b), "byte is not an ASCII digit");
            accumdata = accumdata * 10 + u32::from(b - b'0');
            accumcount += 1;
            if accumcount == 3 {
                bb.append_bits(accumdata, 10);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            // 1 or 2 digits remaining
            bb.append_bits(accumdata, accumcount * 3 + 1);
        }
        Segment::new(EncodingMode::Numeric, digits.len(), bb.0)
    }

    /// Returns a segment representing the given bytes encoded in alphanumeric mode.
    ///
    /// The characters allowed are: 0 to 9, A to Z (uppercase only), space,
    /// dollar, percent, asterisk, plus, hyphen, period, slash, colon.
    ///
    /// Panics if a byte is outside that set.
    pub fn make_alphanumeric(text: &[u8]) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(text.len() * 5 + (text.len() + 1) / 2));
        let mut accumdata: u32 = 0;
        let mut accumcount: u32 = 0;
        for &b in text {
            let i = alphanumeric_index(b).expect("byte is not in the alphanumeric charset");
            accumdata = accumdata * 45 + u32::from(i);
            accumcount += 1;
            if accumcount == 2 {
                bb.append_bits(accumdata, 11);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            // 1 character remaining
            bb.append_bits(accumdata, 6);
        }
        Segment::new(EncodingMode::Alphanumeric, text.len(), bb.0)
    }

    /// Returns a list of zero or more segments to represent the given byte
    /// payload, per the mode selection rule: Numeric if every byte is an
    /// ASCII digit, else Alphanumeric if every byte is in the alphanumeric
    /// charset, else Byte.
    pub fn make_segments(data: &[u8]) -> Vec<Self> {
        if data.is_empty() {
            vec![]
        } else {
            vec![if Segment::is_numeric(data) {
                Segment::make_numeric(data)
            } else if Segment::is_alphanumeric(data) {
                Segment::make_alphanumeric(data)
            } else {
                Segment::make_bytes(data)
            }]
        }
    }

    /// Returns a segment representing an Extended Channel Interpretation
    /// (ECI) designator with the given assignment value.
    pub fn make_eci(assignval: u32) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(24));
        if assignval < (1 << 7) {
            bb.append_bits(assignval, 8);
        } else if assignval < (1 << 14) {
            bb.append_bits(0b10, 2);
            bb.append_bits(assignval, 14);
        } else if assignval < 1_000_000 {
            bb.append_bits(0b110, 3);
            bb.append_bits(assignval, 21);
        } else {
            panic!("ECI assignment value out of range");
        }
        Segment::new(EncodingMode::Eci, 0, bb.0)
    }

    /*---- Constructor (low level) ----*/

    /// Creates a new QR Code segment with the given attributes and data.
    ///
    /// The character count (numchars) must agree with the mode and
    /// the bit buffer length, but the constraint isn't checked.
    pub fn new(mode: EncodingMode, numchars: usize, data: Vec<bool>) -> Self {
        Self {
            mode,
            numchars,
            data,
        }
    }

    /*---- Instance field getters ----*/

    /// Returns the mode indicator of this segment.
    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Returns the character count field of this segment.
    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    /// Returns the data bits of this segment.
    pub fn data(&self) -> &Vec<bool> {
        &self.data
    }

    /*---- Other static functions ----*/

    // Calculates and returns the number of bits needed to encode the given
    // segments at the given version. The result is None if a segment has too many
    // characters to fit its length field, or the total bits exceeds usize::MAX.
    pub fn get_total_bits(segs: &[Self], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits: u8 = seg.mode.num_char_count_bits(version);
            // ccbits can be as large as 16, but usize can be as small as 16
            if let Some(limit) = 1usize.checked_shl(ccbits.into()) {
                if seg.numchars >= limit {
                    return None; // The segment's length doesn't fit the field's bit width
                }
            }
            result = result.checked_add(4 + usize::from(ccbits))?;
            result = result.checked_add(seg.data.len())?;
        }
        Some(result)
    }

    /// Tests whether the given bytes can be encoded as a segment in numeric mode.
    ///
    /// Encodable iff every byte is an ASCII digit.
    pub fn is_numeric(data: &[u8]) -> bool {
        data.iter().all(|&b| b.is_ascii_digit())
    }

    /// Tests whether the given bytes can be encoded as a segment in alphanumeric mode.
    ///
    /// Encodable iff every byte is in the following set: 0 to 9, A to Z
    /// (uppercase only), space, dollar, percent, asterisk, plus, hyphen,
    /// period, slash, colon.
    pub fn is_alphanumeric(data: &[u8]) -> bool {
        data.iter().all(|&b| alphanumeric_index(b).is_some())
    }
}

// Byte-oriented lookup into ALPHANUMERIC_CHARSET, avoiding the UTF-8 `str`
// indexing a text-based version would rely on (payloads here are
// arbitrary bytes, not necessarily valid text).
fn alphanumeric_index(b: u8) -> Option<u8> {
    if b >= 0x80 {
        return None;
    }
    ALPHANUMERIC_CHARSET
        .as_bytes()
        .iter()
        .position(|&c| c == b)
        .map(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_selection_prefers_numeric() {
        assert!(Segment::is_numeric(b"0123456789"));
        assert!(Segment::is_alphanumeric(b"0123456789"));
    }

    #[test]
    fn mode_selection_falls_back_to_byte() {
        assert!(!Segment::is_numeric(b"HELLO WORLD"));
        assert!(Segment::is_alphanumeric(b"HELLO WORLD"));
        assert!(!Segment::is_alphanumeric(b"hello world"));
    }

    #[test]
    fn numeric_encodes_3_digits_per_10_bits() {
        let seg = Segment::make_numeric(b"0123456789");
        // 3 groups of 3 digits (30 bits) + 1 trailing digit (4 bits) = 34 bits
        assert_eq!(seg.data.len(), 34);
    }

    #[test]
    fn alphanumeric_charset_excludes_lowercase() {
        assert_eq!(alphanumeric_index(b'a'), None);
        assert_eq!(alphanumeric_index(b'A'), Some(10));
        assert_eq!(alphanumeric_index(b'0'), Some(0));
    }
}
