use thiserror::Error;

/// Failure modes when turning segments/bytes into a symbol.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum QrEncodeError {
    #[error("no version in [{min}, {max}] can hold a segment whose length field overflows")]
    SegmentTooLong { min: u8, max: u8 },

    #[error("data length = {data_bits} bits, max capacity = {max_bits} bits")]
    CapacityExceeded { data_bits: usize, max_bits: usize },

    #[error("byte 0x{byte:02x} is not valid for {mode} mode")]
    InvalidCharForMode { byte: u8, mode: &'static str },

    #[error("version number {0} is out of range [1, 40]")]
    InvalidVersion(u8),
}

/// Failure modes when turning a pixel source into decoded payloads.
///
/// These are per-candidate: the outer search catches every variant here
/// as a `CandidateOutcome::Skip` and tries the next finder triple/transform/
/// alignment guess, so a single bad guess never aborts the whole decode.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum QrDecodeError {
    #[error("pixel source dimensions or format are unusable: {0}")]
    InvalidInputFormat(String),

    #[error("image has no detectable light/dark contrast")]
    UniformImage,

    #[error("fewer than 3 finder patterns were located")]
    NoFinders,

    #[error("no finder triple forms a plausible symbol corner")]
    NoCorner,

    #[error("the perspective transform's linear system is singular or ill-conditioned")]
    LinearSolveFailure,

    #[error("{mismatched}/{total} fixed modules disagree with the expected pattern (tolerance {tolerance_percent}%)")]
    FixedModuleMismatch {
        mismatched: usize,
        total: usize,
        tolerance_percent: u32,
    },

    #[error("block is uncorrectable: more than {ec_len}/2 of its {ec_len} EC codewords worth of errors")]
    UncorrectableBlock { ec_len: usize },

    #[error("neither format-info copy is within correction distance of a legal codeword")]
    FormatInfoUnrecoverable,

    #[error("version info recovered as {recovered} disagrees with the candidate geometry's {assumed}")]
    VersionMismatch { assumed: u8, recovered: u8 },

    #[error("bitstream ended before a terminator or required field was fully read")]
    PrematureEndOfData,

    #[error("mode indicator 0x{0:x} is not supported (Kanji/Structured Append/FNC1)")]
    UnsupportedMode(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_errors_display_without_panicking() {
        let e = QrEncodeError::CapacityExceeded { data_bits: 100, max_bits: 80 };
        assert!(e.to_string().contains("100"));
    }

    #[test]
    fn decode_errors_display_without_panicking() {
        let e = QrDecodeError::UncorrectableBlock { ec_len: 10 };
        assert!(e.to_string().contains("10"));
    }
}
