//! Line-oriented access to text catalogs, plain or gzip-compressed.

use crate::error::{CatalogError, CatalogResult};
use crate::fixed_width::{FixedWidthLine, ParsePolicy};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Opens `path` for buffered reading, decompressing on the fly when the file
/// name ends in `.gz`.
pub fn open_text(path: &Path) -> CatalogResult<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| CatalogError::resource(path, e))?;
    if is_gzip(path) {
        log::debug!("Reading {:?} through gzip decoder", path);
        let decoder = GzDecoder::new(BufReader::new(file));
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parses every line after the first `header_lines` lines of `path`.
///
/// Line numbers handed to `parse` are 1-based positions in the file. Header
/// lines are skipped without being decoded. Record order follows file order.
pub fn read_records<T, F>(
    path: &Path,
    header_lines: usize,
    policy: ParsePolicy,
    parse: F,
) -> CatalogResult<Vec<T>>
where
    F: FnMut(&FixedWidthLine<'_>) -> CatalogResult<T>,
{
    let reader = open_text(path)?;
    parse_lines(reader, path, header_lines, policy, parse)
}

pub(crate) fn parse_lines<R, T, F>(
    reader: R,
    path: &Path,
    header_lines: usize,
    policy: ParsePolicy,
    mut parse: F,
) -> CatalogResult<Vec<T>>
where
    R: BufRead,
    F: FnMut(&FixedWidthLine<'_>) -> CatalogResult<T>,
{
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (index, chunk) in reader.split(b'\n').enumerate() {
        let mut bytes = chunk.map_err(|e| CatalogError::resource(path, e))?;
        if index < header_lines {
            continue;
        }
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }

        let line_number = index + 1;
        let result = match std::str::from_utf8(&bytes) {
            Ok(text) => parse(&FixedWidthLine::new(text, line_number)),
            Err(e) => Err(CatalogError::malformed(
                line_number,
                "line",
                String::from_utf8_lossy(&bytes),
                e.to_string(),
            )),
        };

        match result {
            Ok(record) => records.push(record),
            Err(err) if err.is_malformed_record() && policy == ParsePolicy::SkipRecord => {
                log::warn!("{:?}: skipping record: {}", path, err);
                skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    if skipped > 0 {
        log::warn!("{:?}: skipped {} malformed records", path, skipped);
    }
    log::debug!("{:?}: parsed {} records", path, records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_width::FieldSpec;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    const VALUE: FieldSpec = FieldSpec::new("value", 0, 4);

    fn parse_values(text: &str, header_lines: usize, policy: ParsePolicy) -> CatalogResult<Vec<i32>> {
        parse_lines(
            Cursor::new(text.as_bytes().to_vec()),
            Path::new("inline.txt"),
            header_lines,
            policy,
            |line| line.parse::<i32>(&VALUE),
        )
    }

    #[test]
    fn skips_header_lines() {
        let values = parse_values("head\nhead\n   1\n  22\n", 2, ParsePolicy::Abort).unwrap();
        assert_eq!(values, vec![1, 22]);
    }

    #[test]
    fn header_longer_than_file_yields_nothing() {
        let values = parse_values("head\n   1\n", 84, ParsePolicy::Abort).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn strips_carriage_returns() {
        let values = parse_values("h\r\n  7\r\n", 1, ParsePolicy::Abort).unwrap();
        assert_eq!(values, vec![7]);
    }

    #[test]
    fn abort_reports_file_line_number() {
        let err = parse_values("h\n   1\n  x2\n   3\n", 1, ParsePolicy::Abort).unwrap_err();
        match err {
            CatalogError::MalformedRecord { line, field, .. } => {
                assert_eq!(line, 3);
                assert_eq!(field, "value");
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn skip_record_drops_only_bad_lines() {
        let values = parse_values("h\n   1\n  x2\n   3\n", 1, ParsePolicy::SkipRecord).unwrap();
        assert_eq!(values, vec![1, 3]);
    }

    #[test]
    fn invalid_utf8_is_a_malformed_record() {
        let bytes = b"h\n\xff\xfe 1\n".to_vec();
        let err = parse_lines(
            Cursor::new(bytes),
            Path::new("binary.txt"),
            1,
            ParsePolicy::Abort,
            |line| line.parse::<i32>(&VALUE),
        )
        .unwrap_err();
        assert!(err.is_malformed_record());
    }

    #[test]
    fn missing_file_is_resource_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_records(&dir.path().join("absent.txt"), 0, ParsePolicy::Abort, |line| {
            line.parse::<i32>(&VALUE)
        });
        assert!(matches!(result, Err(CatalogError::ResourceUnavailable { .. })));
    }

    #[test]
    fn reads_gzip_compressed_catalogs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"header\n  10\n  20\n").unwrap();
        encoder.finish().unwrap();

        let values =
            read_records(&path, 1, ParsePolicy::Abort, |line| line.parse::<i32>(&VALUE)).unwrap();
        assert_eq!(values, vec![10, 20]);
    }
}
