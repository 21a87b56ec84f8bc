//! Fixed-width binary encoding for values that live directly inside a page
//! or block: B+-tree keys/values and record-heap payloads need a
//! `size_of`-style constant so page fan-out can be computed, which a
//! variable-length stream codec cannot give us.

/// A value with a fixed, deterministic on-disk width.
pub trait Codec: Sized + Clone {
    /// Encoded width in bytes. Must match `encode`'s output length exactly.
    const SIZE: usize;

    fn encode(&self, buf: &mut [u8]);
    fn decode(buf: &[u8]) -> Self;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::SIZE];
        self.encode(&mut buf);
        buf
    }
}

macro_rules! impl_codec_for_int {
    ($($t:ty),+) => {
        $(
            impl Codec for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn encode(&self, buf: &mut [u8]) {
                    buf[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                fn decode(buf: &[u8]) -> Self {
                    let mut arr = [0u8; std::mem::size_of::<$t>()];
                    arr.copy_from_slice(&buf[..Self::SIZE]);
                    <$t>::from_le_bytes(arr)
                }
            }
        )*
    };
}

impl_codec_for_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl<const N: usize> Codec for crate::types::fixed_string::FixedString<N> {
    const SIZE: usize = N;

    fn encode(&self, buf: &mut [u8]) {
        buf[..N].copy_from_slice(self.as_bytes());
    }

    fn decode(buf: &[u8]) -> Self {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&buf[..N]);
        // Safety-free construction: FixedString's invariant (NUL padding
        // after the first NUL) is already guaranteed by whatever produced
        // these bytes, so we rebuild it field-by-field rather than through
        // the validating `new` constructor.
        Self::from_raw(bytes)
    }
}

impl Codec for crate::types::datetime::DateTime {
    const SIZE: usize = 4;

    fn encode(&self, buf: &mut [u8]) {
        self.minutes().encode(buf);
    }

    fn decode(buf: &[u8]) -> Self {
        Self::from_minutes(i32::decode(buf))
    }
}

impl<A: Codec, B: Codec> Codec for (A, B) {
    const SIZE: usize = A::SIZE + B::SIZE;

    fn encode(&self, buf: &mut [u8]) {
        self.0.encode(&mut buf[..A::SIZE]);
        self.1.encode(&mut buf[A::SIZE..A::SIZE + B::SIZE]);
    }

    fn decode(buf: &[u8]) -> Self {
        (A::decode(&buf[..A::SIZE]), B::decode(&buf[A::SIZE..A::SIZE + B::SIZE]))
    }
}

impl<A: Codec, B: Codec, C: Codec> Codec for (A, B, C) {
    const SIZE: usize = A::SIZE + B::SIZE + C::SIZE;

    fn encode(&self, buf: &mut [u8]) {
        self.0.encode(&mut buf[..A::SIZE]);
        self.1.encode(&mut buf[A::SIZE..A::SIZE + B::SIZE]);
        self.2.encode(&mut buf[A::SIZE + B::SIZE..Self::SIZE]);
    }

    fn decode(buf: &[u8]) -> Self {
        (
            A::decode(&buf[..A::SIZE]),
            B::decode(&buf[A::SIZE..A::SIZE + B::SIZE]),
            C::decode(&buf[A::SIZE + B::SIZE..Self::SIZE]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_primitive_ints() {
        let mut buf = [0u8; 4];
        42u32.encode(&mut buf);
        assert_eq!(u32::decode(&buf), 42);
    }

    #[test]
    fn round_trips_composite_tuples() {
        let value: (u64, u32, i32) = (7, 2, -5);
        let mut buf = vec![0u8; <(u64, u32, i32)>::SIZE];
        value.encode(&mut buf);
        assert_eq!(<(u64, u32, i32)>::decode(&buf), value);
    }
}
