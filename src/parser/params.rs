//! CSI parameter list
//!
//! A fixed-capacity list of small integers. Values saturate instead of
//! overflowing, and a sequence with more than [`MAX_PARAMS`] parameters is
//! flagged so the caller can drop it.

/// Maximum number of parameters kept for one sequence
pub const MAX_PARAMS: usize = 16;

/// Bounded parameter list
#[derive(Debug, Clone, Copy, Default)]
pub struct Params {
    values: [u16; MAX_PARAMS],
    len: usize,
    overflowed: bool,
}

impl Params {
    pub const fn new() -> Self {
        Self {
            values: [0; MAX_PARAMS],
            len: 0,
            overflowed: false,
        }
    }

    /// Build a list from a slice; extra values mark the list overflowed
    pub fn from_slice(values: &[u16]) -> Self {
        let mut params = Self::new();
        for &v in values {
            params.push(v);
        }
        params
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.overflowed = false;
    }

    /// Append a value. Past capacity the value is dropped and the list is
    /// marked overflowed.
    pub fn push(&mut self, value: u16) {
        match self.values.get_mut(self.len) {
            Some(slot) => {
                *slot = value;
                self.len += 1;
            }
            None => self.overflowed = true,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether more than [`MAX_PARAMS`] values were pushed
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.values[..self.len]
    }

    /// Get parameter at index, or default value if not present
    pub fn get(&self, index: usize, default: u16) -> u16 {
        self.as_slice().get(index).copied().unwrap_or(default)
    }

    /// Get parameter at index, treating 0 as default
    pub fn get_or_default(&self, index: usize, default: u16) -> u16 {
        match self.as_slice().get(index) {
            Some(&0) | None => default,
            Some(&v) => v,
        }
    }
}

// Slots past `len` may hold values from an earlier sequence
impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice() && self.overflowed == other.overflowed
    }
}

impl Eq for Params {}

/// Accumulate one decimal digit into a numeral, saturating at `u16::MAX`
pub(crate) fn accumulate(numeral: Option<u16>, digit: u8) -> u16 {
    numeral
        .unwrap_or(0)
        .saturating_mul(10)
        .saturating_add(u16::from(digit - b'0'))
}
