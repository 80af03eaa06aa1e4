//! In-memory FITS fixtures with binary table extensions.
//!
//! Enabled for this crate's own tests and, through the `test-utils` feature,
//! for downstream test suites that need small FITS files on disk.

use std::fs::File;
use std::io::Write;
use std::path::Path;

const CARD_SIZE: usize = 80;
const BLOCK_SIZE: usize = 2880;

enum MockValues {
    Logical(Vec<bool>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Text(usize, Vec<String>),
}

impl MockValues {
    fn len(&self) -> usize {
        match self {
            MockValues::Logical(v) => v.len(),
            MockValues::Short(v) => v.len(),
            MockValues::Int(v) => v.len(),
            MockValues::Long(v) => v.len(),
            MockValues::Float(v) => v.len(),
            MockValues::Double(v) => v.len(),
            MockValues::Text(_, v) => v.len(),
        }
    }

    fn tform(&self) -> String {
        match self {
            MockValues::Logical(_) => "1L".to_string(),
            MockValues::Short(_) => "1I".to_string(),
            MockValues::Int(_) => "1J".to_string(),
            MockValues::Long(_) => "1K".to_string(),
            MockValues::Float(_) => "1E".to_string(),
            MockValues::Double(_) => "1D".to_string(),
            MockValues::Text(width, _) => format!("{}A", width),
        }
    }

    fn byte_width(&self) -> usize {
        match self {
            MockValues::Logical(_) => 1,
            MockValues::Short(_) => 2,
            MockValues::Int(_) | MockValues::Float(_) => 4,
            MockValues::Long(_) | MockValues::Double(_) => 8,
            MockValues::Text(width, _) => *width,
        }
    }

    fn write_row(&self, row: usize, out: &mut Vec<u8>) {
        match self {
            MockValues::Logical(v) => out.push(if v[row] { b'T' } else { b'F' }),
            MockValues::Short(v) => out.extend_from_slice(&v[row].to_be_bytes()),
            MockValues::Int(v) => out.extend_from_slice(&v[row].to_be_bytes()),
            MockValues::Long(v) => out.extend_from_slice(&v[row].to_be_bytes()),
            MockValues::Float(v) => out.extend_from_slice(&v[row].to_be_bytes()),
            MockValues::Double(v) => out.extend_from_slice(&v[row].to_be_bytes()),
            MockValues::Text(width, v) => {
                let mut bytes = v[row].as_bytes().to_vec();
                bytes.resize(*width, b' ');
                out.extend_from_slice(&bytes);
            }
        }
    }
}

/// One `BINTABLE` extension. Every column must have the same length.
pub struct MockTable {
    name: String,
    columns: Vec<(String, MockValues)>,
}

impl MockTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    fn with(mut self, name: &str, values: MockValues) -> Self {
        self.columns.push((name.to_string(), values));
        self
    }

    pub fn logical(self, name: &str, values: &[bool]) -> Self {
        self.with(name, MockValues::Logical(values.to_vec()))
    }

    pub fn short(self, name: &str, values: &[i16]) -> Self {
        self.with(name, MockValues::Short(values.to_vec()))
    }

    pub fn int(self, name: &str, values: &[i32]) -> Self {
        self.with(name, MockValues::Int(values.to_vec()))
    }

    pub fn long(self, name: &str, values: &[i64]) -> Self {
        self.with(name, MockValues::Long(values.to_vec()))
    }

    pub fn float(self, name: &str, values: &[f32]) -> Self {
        self.with(name, MockValues::Float(values.to_vec()))
    }

    pub fn double(self, name: &str, values: &[f64]) -> Self {
        self.with(name, MockValues::Double(values.to_vec()))
    }

    pub fn text(self, name: &str, width: usize, values: &[&str]) -> Self {
        let values = values.iter().map(|s| s.to_string()).collect();
        self.with(name, MockValues::Text(width, values))
    }

    fn rows(&self) -> usize {
        let rows = self.columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        for (name, values) in &self.columns {
            assert_eq!(values.len(), rows, "column {} has a different length", name);
        }
        rows
    }

    fn encode(&self) -> Vec<u8> {
        let rows = self.rows();
        let row_size: usize = self.columns.iter().map(|(_, v)| v.byte_width()).sum();

        let mut cards = vec![
            card("XTENSION", "'BINTABLE'"),
            card("BITPIX", "8"),
            card("NAXIS", "2"),
            card("NAXIS1", &row_size.to_string()),
            card("NAXIS2", &rows.to_string()),
            card("PCOUNT", "0"),
            card("GCOUNT", "1"),
            card("TFIELDS", &self.columns.len().to_string()),
        ];
        for (i, (name, values)) in self.columns.iter().enumerate() {
            cards.push(card(&format!("TTYPE{}", i + 1), &format!("'{}'", name)));
            cards.push(card(&format!("TFORM{}", i + 1), &format!("'{}'", values.tform())));
        }
        cards.push(card("EXTNAME", &format!("'{}'", self.name)));

        let mut data = Vec::with_capacity(rows * row_size);
        for row in 0..rows {
            for (_, values) in &self.columns {
                values.write_row(row, &mut data);
            }
        }

        hdu_bytes(&cards, &data)
    }
}

/// Builds a FITS file: an empty primary HDU followed by binary tables in
/// the order they were added (the first table is HDU 1).
pub struct MockFitsBuilder {
    tables: Vec<MockTable>,
}

impl Default for MockFitsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFitsBuilder {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn binary_table(mut self, table: MockTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn build_memory(self) -> Vec<u8> {
        let primary = [
            card("SIMPLE", "T"),
            card("BITPIX", "8"),
            card("NAXIS", "0"),
            card("EXTEND", "T"),
        ];
        let mut fits_data = hdu_bytes(&primary, &[]);
        for table in &self.tables {
            fits_data.extend(table.encode());
        }
        fits_data
    }

    pub fn write_to(self, path: &Path) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(&self.build_memory())?;
        file.flush()
    }

    #[cfg(test)]
    pub fn build_temp_file(self) -> std::io::Result<tempfile::NamedTempFile> {
        let mut temp_file = tempfile::NamedTempFile::new()?;
        temp_file.write_all(&self.build_memory())?;
        temp_file.flush()?;
        Ok(temp_file)
    }
}

fn card(keyword: &str, value: &str) -> String {
    let mut card = format!("{:<8}= {:>20}", keyword, value);
    card.truncate(CARD_SIZE);
    card
}

fn hdu_bytes(cards: &[String], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for card in cards.iter().map(String::as_str).chain(std::iter::once("END")) {
        let mut card_bytes = card.as_bytes().to_vec();
        card_bytes.resize(CARD_SIZE, b' ');
        out.extend_from_slice(&card_bytes);
    }
    out.resize(out.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE, b' ');

    if !data.is_empty() {
        out.extend_from_slice(data);
        out.resize(out.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE, 0);
    }
    out
}
