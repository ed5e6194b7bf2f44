/// The error correction level in a QR Code symbol.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum ErrorCorrectionLevel {
    /// The QR Code can tolerate about  7% erroneous codewords.
    Low,
    /// The QR Code can tolerate about 15% erroneous codewords.
    Medium,
    /// The QR Code can tolerate about 25% erroneous codewords.
    Quartile,
    /// The QR Code can tolerate about 30% erroneous codewords.
    High,
}

impl ErrorCorrectionLevel {
    // Returns an unsigned 2-bit integer (in the range 0 to 3), used to index
    // the ECC_CODEWORDS_PER_BLOCK / NUM_ERROR_CORRECTION_BLOCKS tables.
    pub fn ordinal(self) -> usize {
        use ErrorCorrectionLevel::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    // Returns an unsigned 2-bit integer (in the range 0 to 3). The standard's
    // format-info encoding swaps L and M relative to declaration order; this
    // XOR-1 convention must be applied consistently on both encode and decode.
    pub fn format_bits(self) -> u8 {
        use ErrorCorrectionLevel::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }

    // Inverse of format_bits: recovers the level from the 2-bit field read
    // out of a decoded format-info word.
    pub fn from_format_bits(bits: u8) -> Self {
        use ErrorCorrectionLevel::*;
        match bits & 0b11 {
            1 => Low,
            0 => Medium,
            3 => Quartile,
            2 => High,
            _ => unreachable!("bits & 0b11 is always in 0..=3"),
        }
    }

    /// Nominal codeword recovery percentage, used as the FixedModuleMismatch
    /// tolerance in the decoder's matrix extraction stage.
    pub fn recovery_percent(self) -> u32 {
        use ErrorCorrectionLevel::*;
        match self {
            Low => 7,
            Medium => 15,
            Quartile => 25,
            High => 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bits_round_trip() {
        for lvl in [
            ErrorCorrectionLevel::Low,
            ErrorCorrectionLevel::Medium,
            ErrorCorrectionLevel::Quartile,
            ErrorCorrectionLevel::High,
        ] {
            assert_eq!(ErrorCorrectionLevel::from_format_bits(lvl.format_bits()), lvl);
        }
    }
}
