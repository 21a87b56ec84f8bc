use std::fmt;

/// A NUL-padded, fixed-capacity byte string with a deterministic binary
/// layout, used wherever the domain layer needs a key or field whose size
/// is baked into a page's `size_of` budget (usernames, train IDs, station
/// names).
///
/// ASCII content, right-padded with zero bytes, compared byte-for-byte
/// (which agrees with lexicographic string order for the ASCII domain
/// names this engine stores).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FixedString<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FixedString<N> {
    pub fn new(s: &str) -> crate::error::Result<Self> {
        let src = s.as_bytes();
        if src.len() > N {
            return Err(crate::error::Error::InvalidArgument(format!(
                "{:?} exceeds fixed capacity {}",
                s, N
            )));
        }
        let mut bytes = [0u8; N];
        bytes[..src.len()].copy_from_slice(src);
        Ok(Self { bytes })
    }

    pub fn empty() -> Self {
        Self { bytes: [0u8; N] }
    }

    /// Builds a `FixedString` directly from already NUL-padded bytes, e.g.
    /// when decoding one back out of a page. Skips the length check `new`
    /// performs since the caller is the codec, not a user.
    pub fn from_raw(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    pub fn as_str(&self) -> &str {
        let end = self.bytes.iter().position(|&b| b == 0).unwrap_or(N);
        std::str::from_utf8(&self.bytes[..end]).unwrap_or("")
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> fmt::Display for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FixedString({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_short_strings() {
        let s: FixedString<20> = FixedString::new("G1234").unwrap();
        assert_eq!(s.as_str(), "G1234");
    }

    #[test]
    fn rejects_overlong_strings() {
        let res: crate::error::Result<FixedString<4>> = FixedString::new("toolong");
        assert!(res.is_err());
    }

    #[test]
    fn orders_like_the_underlying_bytes() {
        let a: FixedString<8> = FixedString::new("alice").unwrap();
        let b: FixedString<8> = FixedString::new("bob").unwrap();
        assert!(a < b);
    }
}
