use crate::header::parser::HEADER_BLOCK_SIZE;
use crate::header::{Header, HeaderParser};
use crate::table::{BinaryTableHdu, Table};
use crate::{FitsError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

const FITS_BLOCK_SIZE: u64 = HEADER_BLOCK_SIZE as u64;
const MAX_HEADER_BLOCKS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HduInfo {
    pub index: usize,
    pub header_start: u64,
    pub header_size: usize,
    pub data_start: u64,
    pub data_size: usize,
}

#[derive(Debug)]
pub struct FitsFile<R> {
    reader: R,
    hdus: Vec<HduInfo>,
    headers: HashMap<usize, Header>,
}

impl FitsFile<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> FitsFile<R> {
    pub fn new(reader: R) -> Result<Self> {
        let mut fits = FitsFile {
            reader,
            hdus: Vec::new(),
            headers: HashMap::new(),
        };
        fits.scan_hdus()?;
        Ok(fits)
    }

    pub fn num_hdus(&self) -> usize {
        self.hdus.len()
    }

    pub fn hdu_info(&self, index: usize) -> Option<&HduInfo> {
        self.hdus.get(index)
    }

    pub fn header(&self, index: usize) -> Result<&Header> {
        self.headers
            .get(&index)
            .ok_or(FitsError::HduNotFound(index))
    }

    /// Header-only view of a binary table extension.
    pub fn binary_table_hdu(&self, index: usize) -> Result<BinaryTableHdu> {
        let info = self
            .hdus
            .get(index)
            .ok_or(FitsError::HduNotFound(index))?
            .clone();
        let header = self.header(index)?;
        match header.xtension() {
            Some("BINTABLE") => BinaryTableHdu::new(header.clone(), info),
            other => Err(FitsError::NotATable {
                index,
                xtension: other.unwrap_or("none").to_string(),
            }),
        }
    }

    /// Reads HDU `index` (0 is the primary HDU) as a column-addressable table.
    pub fn read_table(&mut self, index: usize) -> Result<Table> {
        let hdu = self.binary_table_hdu(index)?;
        hdu.read_table(&mut self.reader)
    }

    fn scan_hdus(&mut self) -> Result<()> {
        let stream_len = self.reader.seek(SeekFrom::End(0))?;
        let mut position = 0u64;

        loop {
            let Some((header, header_size)) = self.read_header_at(position)? else {
                break;
            };

            let index = self.hdus.len();
            if index == 0 && !header.is_primary() {
                return Err(FitsError::InvalidFormat(
                    "First HDU must be a primary HDU".to_string(),
                ));
            }
            if index > 0 && !header.is_extension() {
                return Err(FitsError::InvalidFormat(format!(
                    "HDU {} is not an extension",
                    index
                )));
            }

            let data_start = position + header_size as u64;
            let data_size = Self::calculate_data_size(&header)?;
            let data_end = data_start
                .checked_add(data_size as u64)
                .ok_or_else(|| FitsError::InvalidFormat("Data dimensions too large".to_string()))?;
            if data_end > stream_len {
                log::debug!(
                    "HDU {} declares {} data bytes, stream ends {} bytes after its header",
                    index,
                    data_size,
                    stream_len - data_start.min(stream_len)
                );
                return Err(FitsError::UnexpectedEof);
            }
            self.hdus.push(HduInfo {
                index,
                header_start: position,
                header_size,
                data_start,
                data_size,
            });
            self.headers.insert(index, header);

            position = align_to_block(data_end);
        }

        if self.hdus.is_empty() {
            return Err(FitsError::InvalidFormat(
                "File contains no HDUs".to_string(),
            ));
        }
        Ok(())
    }

    /// `None` when `position` is at end of file or the remainder is zero
    /// padding.
    fn read_header_at(&mut self, position: u64) -> Result<Option<(Header, usize)>> {
        self.reader.seek(SeekFrom::Start(position))?;

        let mut header_bytes = Vec::new();
        let mut block = vec![0u8; HEADER_BLOCK_SIZE];

        for blocks_read in 0..MAX_HEADER_BLOCKS {
            match self.reader.read_exact(&mut block) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    if blocks_read == 0 {
                        return Ok(None);
                    }
                    return Err(FitsError::UnexpectedEof);
                }
                Err(e) => return Err(e.into()),
            }

            if blocks_read == 0 && block.iter().all(|&b| b == 0) {
                return Ok(None);
            }

            header_bytes.extend_from_slice(&block);
            if HeaderParser::block_has_end(&block)? {
                let header = HeaderParser::parse_header(&header_bytes)?;
                return Ok(Some((header, header_bytes.len())));
            }
        }

        Err(FitsError::InvalidFormat(format!(
            "Header exceeds maximum size of {} blocks",
            MAX_HEADER_BLOCKS
        )))
    }

    /// `|BITPIX| / 8 * GCOUNT * (PCOUNT + NAXIS1 * ... * NAXISn)`, unpadded.
    fn calculate_data_size(header: &Header) -> Result<usize> {
        let naxis = header.integer("NAXIS").unwrap_or(0);
        if naxis <= 0 {
            return Ok(0);
        }

        let bitpix = header.require_integer("BITPIX")?;
        let bytes_per_value = (bitpix.unsigned_abs() / 8) as usize;

        let mut elements = 1usize;
        for axis in 1..=naxis {
            let size = header.require_size(&format!("NAXIS{}", axis))?;
            elements = elements
                .checked_mul(size)
                .ok_or_else(|| FitsError::InvalidFormat("Data dimensions too large".to_string()))?;
        }

        let pcount = header.integer("PCOUNT").unwrap_or(0).max(0) as usize;
        let gcount = header.integer("GCOUNT").unwrap_or(1).max(1) as usize;

        elements
            .checked_add(pcount)
            .and_then(|n| n.checked_mul(gcount))
            .and_then(|n| n.checked_mul(bytes_per_value))
            .ok_or_else(|| FitsError::InvalidFormat("Data dimensions too large".to_string()))
    }
}

fn align_to_block(size: u64) -> u64 {
    size.div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockFitsBuilder, MockTable};
    use crate::ColumnData;
    use std::io::Cursor;

    fn two_table_file() -> Vec<u8> {
        MockFitsBuilder::new()
            .binary_table(
                MockTable::new("MODELS")
                    .double("m_tot", &[17.1, 18.2, 19.3])
                    .int("finalflag", &[2, 16, 0]),
            )
            .binary_table(MockTable::new("NONPARAM").float("kcorr", &[0.1, 0.2, 0.3]))
            .build_memory()
    }

    #[test]
    fn scans_primary_and_extensions() {
        let fits = FitsFile::new(Cursor::new(two_table_file())).unwrap();
        assert_eq!(fits.num_hdus(), 3);
        assert!(fits.header(0).unwrap().is_primary());
        assert_eq!(fits.header(2).unwrap().string("EXTNAME"), Some("NONPARAM"));

        let info = fits.hdu_info(1).unwrap();
        assert_eq!(info.header_start % FITS_BLOCK_SIZE, 0);
        assert_eq!(info.data_start % FITS_BLOCK_SIZE, 0);
        assert_eq!(info.data_size, 3 * 12);
    }

    #[test]
    fn reads_requested_table() {
        let mut fits = FitsFile::new(Cursor::new(two_table_file())).unwrap();
        let table = fits.read_table(1).unwrap();
        assert_eq!(table.name(), Some("MODELS"));
        assert_eq!(table.num_rows(), 3);
        assert_eq!(
            table.column("m_tot").unwrap().as_f64().unwrap(),
            vec![17.1, 18.2, 19.3]
        );
        assert_eq!(
            table.column("finalflag").unwrap().data(),
            &ColumnData::Int(vec![2, 16, 0])
        );

        let second = fits.read_table(2).unwrap();
        let kcorr = second.column("kcorr").unwrap().as_f64().unwrap();
        assert!((kcorr[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn primary_hdu_is_not_a_table() {
        let mut fits = FitsFile::new(Cursor::new(two_table_file())).unwrap();
        assert!(matches!(
            fits.read_table(0),
            Err(FitsError::NotATable { index: 0, .. })
        ));
    }

    #[test]
    fn missing_hdu_is_reported() {
        let mut fits = FitsFile::new(Cursor::new(two_table_file())).unwrap();
        assert!(matches!(fits.read_table(7), Err(FitsError::HduNotFound(7))));
    }

    #[test]
    fn rejects_file_without_primary() {
        let data = vec![b' '; HEADER_BLOCK_SIZE];
        assert!(FitsFile::new(Cursor::new(data)).is_err());
    }

    #[test]
    fn rejects_empty_file() {
        assert!(matches!(
            FitsFile::new(Cursor::new(Vec::new())),
            Err(FitsError::InvalidFormat(_))
        ));
    }

    #[test]
    fn truncated_data_is_unexpected_eof() {
        let mut data = two_table_file();
        let fits = FitsFile::new(Cursor::new(data.clone())).unwrap();
        let data_start = fits.hdu_info(1).unwrap().data_start as usize;
        data.truncate(data_start + 10);
        assert!(matches!(
            FitsFile::new(Cursor::new(data)),
            Err(FitsError::UnexpectedEof)
        ));
    }

    #[test]
    fn row_count_beyond_end_of_file_is_unexpected_eof() {
        let mut data = two_table_file();
        let declared = format!("{:<8}= {:>20}", "NAXIS2", 3);
        let inflated = format!("{:<8}= {:>20}", "NAXIS2", 100_000_000_000u64);
        let at = data
            .windows(declared.len())
            .position(|w| w == declared.as_bytes())
            .expect("NAXIS2 card");
        data[at..at + inflated.len()].copy_from_slice(inflated.as_bytes());

        assert!(matches!(
            FitsFile::new(Cursor::new(data)),
            Err(FitsError::UnexpectedEof)
        ));
    }

    #[test]
    fn open_reads_from_disk() {
        let file = MockFitsBuilder::new()
            .binary_table(MockTable::new("CAST").long("objid", &[587722981742084144]))
            .build_temp_file()
            .unwrap();
        let mut fits = FitsFile::open(file.path()).unwrap();
        let table = fits.read_table(1).unwrap();
        assert_eq!(
            table.column("objid").unwrap().as_i64().unwrap(),
            vec![587722981742084144]
        );
    }
}
