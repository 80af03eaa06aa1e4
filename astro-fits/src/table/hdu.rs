use super::{Column, ColumnData, ColumnFormat, ColumnType, Table};
use crate::header::Header;
use crate::io::reader::HduInfo;
use crate::{FitsError, Result};
use byteorder::{BigEndian, ByteOrder};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Largest `TFIELDS` the FITS standard allows.
const MAX_FIELDS: usize = 999;

/// Values reserved per column up front; larger tables grow as rows are read.
const MAX_PREALLOCATED_VALUES: usize = 1 << 20;

#[derive(Debug, Clone)]
struct ColumnLayout {
    name: String,
    format: ColumnFormat,
    offset: usize,
    width: usize,
    unit: Option<String>,
    scale: f64,
    zero: f64,
}

#[derive(Debug)]
pub struct BinaryTableHdu {
    header: Header,
    info: HduInfo,
    layout: Vec<ColumnLayout>,
    row_size: usize,
    rows: usize,
}

impl BinaryTableHdu {
    pub fn new(header: Header, info: HduInfo) -> Result<Self> {
        let row_size = header.require_size("NAXIS1")?;
        let rows = header.require_size("NAXIS2")?;
        let fields = header.require_size("TFIELDS")?;
        if fields > MAX_FIELDS {
            return Err(FitsError::InvalidFormat(format!(
                "TFIELDS = {} exceeds {}",
                fields, MAX_FIELDS
            )));
        }

        let mut layout = Vec::with_capacity(fields);
        let mut offset = 0usize;
        for index in 1..=fields {
            let column = Self::column_layout(&header, index, offset)?;
            offset = offset.checked_add(column.width).ok_or_else(|| {
                FitsError::InvalidFormat(format!(
                    "Row width overflows at column {} ({})",
                    column.name, column.format
                ))
            })?;
            layout.push(column);
        }

        if offset > row_size {
            return Err(FitsError::InvalidFormat(format!(
                "Columns span {} bytes but NAXIS1 = {}",
                offset, row_size
            )));
        }

        Ok(Self {
            header,
            info,
            layout,
            row_size,
            rows,
        })
    }

    fn column_layout(header: &Header, index: usize, offset: usize) -> Result<ColumnLayout> {
        let tform_key = format!("TFORM{}", index);
        let tform = header
            .string(&tform_key)
            .ok_or(FitsError::KeywordNotFound { keyword: tform_key })?;
        let name = header
            .string(&format!("TTYPE{}", index))
            .map(str::to_string)
            .unwrap_or_else(|| format!("COL{}", index));
        let format = ColumnFormat::parse(tform).ok_or_else(|| FitsError::UnsupportedFormat {
            column: name.clone(),
            tform: tform.to_string(),
        })?;
        let width = format.byte_width().ok_or_else(|| {
            FitsError::InvalidFormat(format!("Column {} is too wide: TFORM = {}", name, tform))
        })?;
        let real = |key: String| header.get_keyword_value(&key).and_then(|v| v.as_real());

        Ok(ColumnLayout {
            format,
            offset,
            width,
            unit: header
                .string(&format!("TUNIT{}", index))
                .map(str::to_string),
            scale: real(format!("TSCAL{}", index)).unwrap_or(1.0),
            zero: real(format!("TZERO{}", index)).unwrap_or(0.0),
            name,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn info(&self) -> &HduInfo {
        &self.info
    }

    pub fn number_of_fields(&self) -> usize {
        self.layout.len()
    }

    pub fn number_of_rows(&self) -> usize {
        self.rows
    }

    pub fn row_size(&self) -> usize {
        self.row_size
    }

    pub fn extension_name(&self) -> Option<&str> {
        self.header.string("EXTNAME")
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.layout.iter().map(|c| c.name.as_str())
    }

    /// Decodes every row of the main data table. The heap (`PCOUNT` bytes
    /// after the rows) is never touched.
    pub fn read_table<R: Read + Seek>(&self, reader: &mut R) -> Result<Table> {
        reader.seek(SeekFrom::Start(self.info.data_start))?;

        let mut builders: Vec<ColumnBuilder> = self
            .layout
            .iter()
            .map(|c| ColumnBuilder::with_capacity(c.format, self.rows))
            .collect();

        let mut row = vec![0u8; self.row_size];
        for _ in 0..self.rows {
            reader.read_exact(&mut row).map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => FitsError::UnexpectedEof,
                _ => FitsError::Io(e),
            })?;
            for (column, builder) in self.layout.iter().zip(builders.iter_mut()) {
                builder.push(&row[column.offset..column.offset + column.width]);
            }
        }

        let mut table = Table::new(self.extension_name().map(str::to_string), self.rows);
        for (layout, builder) in self.layout.iter().zip(builders) {
            let mut column = Column::new(layout.name.clone(), layout.format, builder.finish())
                .with_scaling(layout.scale, layout.zero);
            if let Some(unit) = &layout.unit {
                column = column.with_unit(unit.clone());
            }
            table.push_column(column)?;
        }

        log::debug!(
            "Read binary table {:?}: {} rows x {} columns",
            table.name(),
            table.num_rows(),
            table.num_columns()
        );
        Ok(table)
    }
}

enum ColumnBuilder {
    Logical(Vec<bool>),
    Byte(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnBuilder {
    fn with_capacity(format: ColumnFormat, rows: usize) -> Self {
        let n = rows
            .saturating_mul(format.values_per_row())
            .min(MAX_PREALLOCATED_VALUES);
        match format.kind {
            ColumnType::Logical => ColumnBuilder::Logical(Vec::with_capacity(n)),
            ColumnType::Bit | ColumnType::Byte => ColumnBuilder::Byte(Vec::with_capacity(n)),
            ColumnType::Short => ColumnBuilder::Short(Vec::with_capacity(n)),
            ColumnType::Int => ColumnBuilder::Int(Vec::with_capacity(n)),
            ColumnType::Long => ColumnBuilder::Long(Vec::with_capacity(n)),
            ColumnType::Float => ColumnBuilder::Float(Vec::with_capacity(n)),
            ColumnType::Double => ColumnBuilder::Double(Vec::with_capacity(n)),
            ColumnType::Text => ColumnBuilder::Text(Vec::with_capacity(n)),
        }
    }

    fn push(&mut self, bytes: &[u8]) {
        match self {
            ColumnBuilder::Logical(v) => v.extend(bytes.iter().map(|&b| b == b'T')),
            ColumnBuilder::Byte(v) => v.extend_from_slice(bytes),
            ColumnBuilder::Short(v) => v.extend(bytes.chunks_exact(2).map(BigEndian::read_i16)),
            ColumnBuilder::Int(v) => v.extend(bytes.chunks_exact(4).map(BigEndian::read_i32)),
            ColumnBuilder::Long(v) => v.extend(bytes.chunks_exact(8).map(BigEndian::read_i64)),
            ColumnBuilder::Float(v) => v.extend(bytes.chunks_exact(4).map(BigEndian::read_f32)),
            ColumnBuilder::Double(v) => v.extend(bytes.chunks_exact(8).map(BigEndian::read_f64)),
            ColumnBuilder::Text(v) => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                let text = String::from_utf8_lossy(&bytes[..end]);
                v.push(text.trim_end().to_string());
            }
        }
    }

    fn finish(self) -> ColumnData {
        match self {
            ColumnBuilder::Logical(v) => ColumnData::Logical(v),
            ColumnBuilder::Byte(v) => ColumnData::Byte(v),
            ColumnBuilder::Short(v) => ColumnData::Short(v),
            ColumnBuilder::Int(v) => ColumnData::Int(v),
            ColumnBuilder::Long(v) => ColumnData::Long(v),
            ColumnBuilder::Float(v) => ColumnData::Float(v),
            ColumnBuilder::Double(v) => ColumnData::Double(v),
            ColumnBuilder::Text(v) => ColumnData::Text(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{Keyword, KeywordValue};
    use crate::test_utils::{MockFitsBuilder, MockTable};
    use crate::FitsFile;
    use std::io::Cursor;

    fn info() -> HduInfo {
        HduInfo {
            index: 1,
            header_start: 2880,
            header_size: 2880,
            data_start: 5760,
            data_size: 0,
        }
    }

    fn header(cards: &[(&str, KeywordValue)]) -> Header {
        let mut header = Header::new();
        for (name, value) in cards {
            header.add_keyword(Keyword::new(name.to_string()).with_value(value.clone()));
        }
        header
    }

    #[test]
    fn decodes_text_logical_and_short_columns() {
        let data = MockFitsBuilder::new()
            .binary_table(
                MockTable::new("XREF")
                    .text("PhotoObjID", 18, &["587722981742084144", "58772"])
                    .logical("has_spec", &[true, false])
                    .short("nchild", &[-3, 7]),
            )
            .build_memory();
        let mut fits = FitsFile::new(Cursor::new(data)).unwrap();

        let hdu = fits.binary_table_hdu(1).unwrap();
        assert_eq!(hdu.number_of_fields(), 3);
        assert_eq!(hdu.number_of_rows(), 2);
        assert_eq!(hdu.row_size(), 21);
        assert_eq!(hdu.extension_name(), Some("XREF"));

        let table = fits.read_table(1).unwrap();
        assert_eq!(
            table.column("PhotoObjID").unwrap().as_text().unwrap(),
            &["587722981742084144".to_string(), "58772".to_string()]
        );
        assert_eq!(
            table.column("has_spec").unwrap().data(),
            &ColumnData::Logical(vec![true, false])
        );
        assert_eq!(
            table.column("nchild").unwrap().as_i64().unwrap(),
            vec![-3, 7]
        );
    }

    #[test]
    fn reads_scaling_and_units_from_header() {
        let header = header(&[
            ("XTENSION", KeywordValue::String("BINTABLE".into())),
            ("NAXIS1", KeywordValue::Integer(2)),
            ("NAXIS2", KeywordValue::Integer(0)),
            ("TFIELDS", KeywordValue::Integer(1)),
            ("TTYPE1", KeywordValue::String("Vhelio".into())),
            ("TFORM1", KeywordValue::String("I".into())),
            ("TUNIT1", KeywordValue::String("km/s".into())),
            ("TZERO1", KeywordValue::Integer(32768)),
        ]);
        let hdu = BinaryTableHdu::new(header, info()).unwrap();
        let table = hdu.read_table(&mut Cursor::new(vec![0u8; 5760])).unwrap();
        let column = table.column("Vhelio").unwrap();
        assert_eq!(column.unit(), Some("km/s"));
        assert!(column.as_i64().unwrap().is_empty());
    }

    #[test]
    fn rejects_columns_wider_than_row() {
        let header = header(&[
            ("NAXIS1", KeywordValue::Integer(4)),
            ("NAXIS2", KeywordValue::Integer(1)),
            ("TFIELDS", KeywordValue::Integer(1)),
            ("TFORM1", KeywordValue::String("D".into())),
        ]);
        assert!(matches!(
            BinaryTableHdu::new(header, info()),
            Err(FitsError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_repeat_count_that_overflows_row_width() {
        let header = header(&[
            ("NAXIS1", KeywordValue::Integer(8)),
            ("NAXIS2", KeywordValue::Integer(1)),
            ("TFIELDS", KeywordValue::Integer(1)),
            ("TTYPE1", KeywordValue::String("spectrum".into())),
            ("TFORM1", KeywordValue::String("2305843009213693952D".into())),
        ]);
        match BinaryTableHdu::new(header, info()) {
            Err(FitsError::InvalidFormat(message)) => assert!(message.contains("spectrum")),
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn rejects_offsets_that_overflow() {
        let header = header(&[
            ("NAXIS1", KeywordValue::Integer(8)),
            ("NAXIS2", KeywordValue::Integer(1)),
            ("TFIELDS", KeywordValue::Integer(2)),
            ("TFORM1", KeywordValue::String("2305843009213693951D".into())),
            ("TFORM2", KeywordValue::String("2305843009213693951D".into())),
        ]);
        assert!(matches!(
            BinaryTableHdu::new(header, info()),
            Err(FitsError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_too_many_fields() {
        let header = header(&[
            ("NAXIS1", KeywordValue::Integer(8)),
            ("NAXIS2", KeywordValue::Integer(1)),
            ("TFIELDS", KeywordValue::Integer(1_000_000_000_000)),
        ]);
        assert!(matches!(
            BinaryTableHdu::new(header, info()),
            Err(FitsError::InvalidFormat(_))
        ));
    }

    #[test]
    fn unnamed_columns_get_positional_names() {
        let header = header(&[
            ("NAXIS1", KeywordValue::Integer(4)),
            ("NAXIS2", KeywordValue::Integer(0)),
            ("TFIELDS", KeywordValue::Integer(1)),
            ("TFORM1", KeywordValue::String("E".into())),
        ]);
        let hdu = BinaryTableHdu::new(header, info()).unwrap();
        assert_eq!(hdu.column_names().collect::<Vec<_>>(), vec!["COL1"]);
    }

    #[test]
    fn unsupported_tform_names_the_column() {
        let header = header(&[
            ("NAXIS1", KeywordValue::Integer(8)),
            ("NAXIS2", KeywordValue::Integer(0)),
            ("TFIELDS", KeywordValue::Integer(1)),
            ("TTYPE1", KeywordValue::String("profile".into())),
            ("TFORM1", KeywordValue::String("1PE(40)".into())),
        ]);
        match BinaryTableHdu::new(header, info()) {
            Err(FitsError::UnsupportedFormat { column, tform }) => {
                assert_eq!(column, "profile");
                assert_eq!(tform, "1PE(40)");
            }
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }
}
