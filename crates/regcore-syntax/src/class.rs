//! Byte sets and POSIX character classes.
//!
//! Patterns are matched byte-by-byte, so every literal, bracket expression
//! and class escape lowers to a [`ByteSet`]: a 256-bit membership table.

use std::fmt;

/// A set of byte values.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteSet {
    bits: [u64; 4],
}

impl ByteSet {
    /// The empty set.
    pub const EMPTY: Self = Self { bits: [0; 4] };

    /// The set of every byte.
    pub const FULL: Self = Self {
        bits: [u64::MAX; 4],
    };

    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Create a set containing a single byte.
    #[must_use]
    pub const fn single(byte: u8) -> Self {
        let mut set = Self::EMPTY;
        set.bits[(byte >> 6) as usize] |= 1 << (byte & 63);
        set
    }

    /// Create a set containing the inclusive range `lo..=hi`.
    #[must_use]
    pub fn range(lo: u8, hi: u8) -> Self {
        let mut set = Self::EMPTY;
        set.insert_range(lo, hi);
        set
    }

    /// Add a byte.
    pub fn insert(&mut self, byte: u8) {
        self.bits[(byte >> 6) as usize] |= 1 << (byte & 63);
    }

    /// Add every byte in `lo..=hi`. An empty range adds nothing.
    pub fn insert_range(&mut self, lo: u8, hi: u8) {
        for b in lo..=hi {
            self.insert(b);
        }
    }

    /// Remove a byte.
    pub fn remove(&mut self, byte: u8) {
        self.bits[(byte >> 6) as usize] &= !(1 << (byte & 63));
    }

    /// Test membership.
    #[inline]
    #[must_use]
    pub const fn contains(&self, byte: u8) -> bool {
        self.bits[(byte >> 6) as usize] & (1 << (byte & 63)) != 0
    }

    /// Add every member of `other`.
    pub fn union(&mut self, other: &Self) {
        for (a, b) in self.bits.iter_mut().zip(other.bits) {
            *a |= b;
        }
    }

    /// Replace the set with its complement.
    pub fn negate(&mut self) {
        for word in &mut self.bits {
            *word = !*word;
        }
    }

    /// The complement of this set.
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate();
        self
    }

    /// Close the set under ASCII case conversion.
    pub fn fold_ascii_case(&mut self) {
        for b in b'a'..=b'z' {
            let upper = b.to_ascii_uppercase();
            if self.contains(b) || self.contains(upper) {
                self.insert(b);
                self.insert(upper);
            }
        }
    }

    /// Number of bytes in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        (self.bits[0].count_ones()
            + self.bits[1].count_ones()
            + self.bits[2].count_ones()
            + self.bits[3].count_ones()) as usize
    }

    /// Check if the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits[0] == 0 && self.bits[1] == 0 && self.bits[2] == 0 && self.bits[3] == 0
    }

    /// The only member, if the set has exactly one.
    #[must_use]
    pub fn as_single(&self) -> Option<u8> {
        if self.len() == 1 { self.iter().next() } else { None }
    }

    /// Iterate the members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=255u8).filter(move |&b| self.contains(b))
    }

    /// Iterate the members as maximal inclusive ranges.
    #[must_use]
    pub fn ranges(&self) -> Vec<(u8, u8)> {
        let mut out: Vec<(u8, u8)> = Vec::new();
        for b in self.iter() {
            match out.last_mut() {
                Some((_, hi)) if u16::from(*hi) + 1 == u16::from(b) => *hi = b,
                _ => out.push((b, b)),
            }
        }
        out
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSet({self})")
    }
}

/// Renders as a bracket expression, e.g. `[0-9a-f]`, or a bare byte for
/// singletons.
impl fmt::Display for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn byte(f: &mut fmt::Formatter<'_>, b: u8) -> fmt::Result {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)
            } else {
                write!(f, "\\x{b:02x}")
            }
        }

        if *self == Self::FULL {
            return f.write_str("<any>");
        }
        if let Some(b) = self.as_single() {
            return byte(f, b);
        }
        f.write_str("[")?;
        for (lo, hi) in self.ranges() {
            byte(f, lo)?;
            if hi != lo {
                f.write_str("-")?;
                byte(f, hi)?;
            }
        }
        f.write_str("]")
    }
}

impl FromIterator<u8> for ByteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for b in iter {
            set.insert(b);
        }
        set
    }
}

/// The twelve POSIX named classes usable as `[:name:]` inside brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosixClass {
    /// `[:alnum:]`
    Alnum,
    /// `[:alpha:]`
    Alpha,
    /// `[:blank:]`
    Blank,
    /// `[:cntrl:]`
    Cntrl,
    /// `[:digit:]`
    Digit,
    /// `[:graph:]`
    Graph,
    /// `[:lower:]`
    Lower,
    /// `[:print:]`
    Print,
    /// `[:punct:]`
    Punct,
    /// `[:space:]`
    Space,
    /// `[:upper:]`
    Upper,
    /// `[:xdigit:]`
    Xdigit,
}

impl PosixClass {
    /// Look up a class by its name (without the `[: :]` delimiters).
    #[must_use]
    pub fn from_name(name: &[u8]) -> Option<Self> {
        Some(match name {
            b"alnum" => Self::Alnum,
            b"alpha" => Self::Alpha,
            b"blank" => Self::Blank,
            b"cntrl" => Self::Cntrl,
            b"digit" => Self::Digit,
            b"graph" => Self::Graph,
            b"lower" => Self::Lower,
            b"print" => Self::Print,
            b"punct" => Self::Punct,
            b"space" => Self::Space,
            b"upper" => Self::Upper,
            b"xdigit" => Self::Xdigit,
            _ => return None,
        })
    }

    /// Test whether a byte belongs to the class in the C locale.
    #[must_use]
    pub const fn matches(self, b: u8) -> bool {
        match self {
            Self::Alnum => b.is_ascii_alphanumeric(),
            Self::Alpha => b.is_ascii_alphabetic(),
            Self::Blank => b == b' ' || b == b'\t',
            Self::Cntrl => b.is_ascii_control(),
            Self::Digit => b.is_ascii_digit(),
            Self::Graph => b.is_ascii_graphic(),
            Self::Lower => b.is_ascii_lowercase(),
            Self::Print => b.is_ascii_graphic() || b == b' ',
            Self::Punct => b.is_ascii_punctuation(),
            Self::Space => matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c),
            Self::Upper => b.is_ascii_uppercase(),
            Self::Xdigit => b.is_ascii_hexdigit(),
        }
    }

    /// The class as a byte set.
    #[must_use]
    pub fn to_set(self) -> ByteSet {
        (0..=255u8).filter(|&b| self.matches(b)).collect()
    }
}

/// Class escapes shared by both dialects: `\d`, `\w`, `\s` and their
/// upper-case complements.
#[must_use]
pub fn escape_class(letter: u8) -> Option<ByteSet> {
    let set = match letter.to_ascii_lowercase() {
        b'd' => PosixClass::Digit.to_set(),
        b's' => PosixClass::Space.to_set(),
        b'w' => {
            let mut set = PosixClass::Alnum.to_set();
            set.insert(b'_');
            set
        }
        _ => return None,
    };
    Some(if letter.is_ascii_uppercase() {
        set.negated()
    } else {
        set
    })
}
