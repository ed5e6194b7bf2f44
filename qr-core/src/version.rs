/// A QR Code version number, between 1 and 40 (inclusive).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// The first version that carries a version-info reserve.
    pub const FIRST_WITH_VERSION_INFO: Version = Version(7);

    /// Creates a version object from the given number.
    ///
    /// Panics if the number is outside the range [1, 40].
    pub fn new(ver: u8) -> Self {
        assert!(
            (Version::MIN.value()..=Version::MAX.value()).contains(&ver),
            "version number out of range"
        );
        Self(ver)
    }

    /// Creates a version object, clamping to the legal range instead of panicking.
    ///
    /// Used by the decoder's geometry stage, which estimates a version from
    /// noisy pixel measurements and must not panic on a bad photo.
    pub fn clamped(ver: i32) -> Self {
        Self(ver.clamp(i32::from(Self::MIN.value()), i32::from(Self::MAX.value())) as u8)
    }

    /// Returns the value, which is in the range [1, 40].
    pub fn value(self) -> u8 {
        self.0
    }

    /// The module dimension D = 17 + 4v of a symbol at this version.
    pub fn dimension(self) -> i32 {
        17 + 4 * i32::from(self.0)
    }

    /// Whether this version carries a separate alignment pattern (absent for v=1).
    pub fn has_alignment_patterns(self) -> bool {
        self.0 > 1
    }

    /// Whether this version carries a version-info reserve (v >= 7).
    pub fn has_version_info(self) -> bool {
        self.0 >= Self::FIRST_WITH_VERSION_INFO.0
    }

    // Selects one of three buckets (v<10, 10<=v<27, 27<=v<=40) used throughout
    // the standard for character-count widths.
    pub(crate) fn bucket(self) -> usize {
        usize::from((self.0 + 7) / 17)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_matches_standard() {
        assert_eq!(Version::new(1).dimension(), 21);
        assert_eq!(Version::new(40).dimension(), 177);
    }

    #[test]
    fn alignment_absent_only_at_v1() {
        assert!(!Version::new(1).has_alignment_patterns());
        assert!(Version::new(2).has_alignment_patterns());
    }

    #[test]
    fn version_info_onset_at_v7() {
        assert!(!Version::new(6).has_version_info());
        assert!(Version::new(7).has_version_info());
    }

    #[test]
    fn bucket_breakpoints_at_10_and_27() {
        assert_eq!(Version::new(9).bucket(), 0);
        assert_eq!(Version::new(10).bucket(), 1);
        assert_eq!(Version::new(26).bucket(), 1);
        assert_eq!(Version::new(27).bucket(), 2);
        assert_eq!(Version::new(40).bucket(), 2);
    }

    #[test]
    fn clamped_never_panics() {
        assert_eq!(Version::clamped(-5).value(), 1);
        assert_eq!(Version::clamped(999).value(), 40);
        assert_eq!(Version::clamped(12).value(), 12);
    }
}
