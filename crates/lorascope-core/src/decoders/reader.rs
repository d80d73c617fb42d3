use super::charset;
use super::error::DecodeError;

pub struct PayloadReader<'a> {
    payload: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.payload.len() < needed {
            return Err(DecodeError::InputTooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, DecodeError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(DecodeError::InputTooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.payload
            .get(range.clone())
            .ok_or(DecodeError::InputTooShort {
                needed: range.end,
                actual: self.payload.len(),
            })
    }

    /// Everything from `start` to the end of the payload (may be empty).
    pub fn read_tail(&self, start: usize) -> Result<&'a [u8], DecodeError> {
        self.payload.get(start..).ok_or(DecodeError::InputTooShort {
            needed: start,
            actual: self.payload.len(),
        })
    }

    pub fn read_latin1(&self, range: std::ops::Range<usize>) -> Result<String, DecodeError> {
        let bytes = self.read_slice(range)?;
        Ok(bytes.iter().copied().map(charset::latin1_char).collect())
    }
}
