//! Byte positions shared by the uplink payload layouts.

pub const TEXT_RANGE: std::ops::Range<usize> = 0..4;
pub const COUNT_OFFSET: usize = 4;
pub const COUNT_SEQUENCE_START: usize = 4;

pub const HELTEC_MIN_LEN: usize = COUNT_OFFSET + 1;
pub const SODAQ_MIN_LEN: usize = TEXT_RANGE.end;
