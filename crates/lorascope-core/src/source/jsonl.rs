use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::webhook::parse_record;
use super::{SourceError, UplinkEvent, UplinkSource};

/// Reads one TTN webhook body per line.
///
/// Blank lines are skipped. A malformed line, including one that is not
/// valid UTF-8, yields `SourceError::Record` and the source keeps reading
/// from the next line.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use lorascope_core::{JsonLinesSource, UplinkSource};
///
/// let data = "{\"end_device_ids\":{\"dev_eui\":\"01\"}}\n\n";
/// let mut source = JsonLinesSource::from_reader(Cursor::new(data));
/// let event = source.next_uplink()?.expect("one record");
/// assert_eq!(event.dev_eui, "01");
/// assert!(source.next_uplink()?.is_none());
/// # Ok::<(), lorascope_core::SourceError>(())
/// ```
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> UplinkSource for JsonLinesSource<R> {
    fn next_uplink(&mut self) -> Result<Option<UplinkEvent>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let record = std::str::from_utf8(&self.buf).map_err(|err| SourceError::Record {
                line: self.line,
                message: format!("invalid UTF-8: {err}"),
            })?;
            let record = record.trim();
            if record.is_empty() {
                continue;
            }
            return parse_record(self.line, record).map(Some);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::JsonLinesSource;
    use crate::source::{SourceError, UplinkSource};

    #[test]
    fn malformed_line_does_not_stop_reading() {
        let data = "{\"uplink_message\":{\"f_cnt\":1}}\nnot json\n\n{\"uplink_message\":{\"f_cnt\":2}}\n";
        let mut source = JsonLinesSource::from_reader(Cursor::new(data));

        let first = source.next_uplink().unwrap().unwrap();
        assert_eq!(first.f_cnt, Some(1));
        assert_eq!(first.line, 1);

        let err = source.next_uplink().unwrap_err();
        assert!(matches!(err, SourceError::Record { line: 2, .. }));

        let second = source.next_uplink().unwrap().unwrap();
        assert_eq!(second.f_cnt, Some(2));
        assert_eq!(second.line, 4);

        assert!(source.next_uplink().unwrap().is_none());
    }

    #[test]
    fn invalid_utf8_line_is_a_record_error() {
        let mut data = b"{\"uplink_message\":{\"f_cnt\":1}}\n".to_vec();
        data.extend_from_slice(b"\xff\xfe garbage\n");
        data.extend_from_slice(b"{\"uplink_message\":{\"f_cnt\":2}}\n");
        let mut source = JsonLinesSource::from_reader(Cursor::new(data));

        assert_eq!(source.next_uplink().unwrap().unwrap().f_cnt, Some(1));

        match source.next_uplink().unwrap_err() {
            SourceError::Record { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("invalid UTF-8"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let second = source.next_uplink().unwrap().unwrap();
        assert_eq!(second.f_cnt, Some(2));
        assert_eq!(second.line, 3);
        assert!(source.next_uplink().unwrap().is_none());
    }

    #[test]
    fn missing_trailing_newline_is_read() {
        let data = "{\"uplink_message\":{\"f_cnt\":5}}";
        let mut source = JsonLinesSource::from_reader(Cursor::new(data));
        assert_eq!(source.next_uplink().unwrap().unwrap().f_cnt, Some(5));
        assert!(source.next_uplink().unwrap().is_none());
    }
}
