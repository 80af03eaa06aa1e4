use crate::header::{Keyword, KeywordValue};
use crate::{FitsError, Result};
use std::collections::HashMap;
use std::str;

pub(crate) const CARD_SIZE: usize = 80;
pub(crate) const HEADER_BLOCK_SIZE: usize = 2880;

#[derive(Debug, Clone, Default)]
pub struct Header {
    keywords: Vec<Keyword>,
    keyword_index: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct HeaderCard {
    pub keyword: String,
    pub value: Option<String>,
    pub comment: Option<String>,
}

pub struct HeaderParser;

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repeated keywords (`COMMENT`, `HISTORY`) keep every card; lookups
    /// resolve to the last occurrence.
    pub fn add_keyword(&mut self, keyword: Keyword) {
        let index = self.keywords.len();
        self.keyword_index.insert(keyword.name.clone(), index);
        self.keywords.push(keyword);
    }

    pub fn get_keyword(&self, name: &str) -> Option<&Keyword> {
        self.keyword_index
            .get(name)
            .and_then(|&index| self.keywords.get(index))
    }

    pub fn get_keyword_value(&self, name: &str) -> Option<&KeywordValue> {
        self.get_keyword(name)?.value.as_ref()
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    pub fn is_primary(&self) -> bool {
        self.get_keyword_value("SIMPLE")
            .and_then(|v| v.as_logical())
            .unwrap_or(false)
    }

    pub fn is_extension(&self) -> bool {
        self.get_keyword("XTENSION").is_some()
    }

    pub fn xtension(&self) -> Option<&str> {
        self.get_keyword_value("XTENSION")
            .and_then(|v| v.as_string())
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get_keyword_value(name).and_then(|v| v.as_integer())
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get_keyword_value(name).and_then(|v| v.as_string())
    }

    pub fn require_integer(&self, name: &str) -> Result<i64> {
        match self.get_keyword_value(name) {
            Some(KeywordValue::Integer(v)) => Ok(*v),
            Some(other) => Err(FitsError::InvalidKeywordValue {
                keyword: name.to_string(),
                value: other.to_string(),
            }),
            None => Err(FitsError::KeywordNotFound {
                keyword: name.to_string(),
            }),
        }
    }

    /// Non-negative size keyword (`NAXISn`, `PCOUNT`, ...) as a `usize`.
    pub fn require_size(&self, name: &str) -> Result<usize> {
        let value = self.require_integer(name)?;
        usize::try_from(value).map_err(|_| FitsError::InvalidKeywordValue {
            keyword: name.to_string(),
            value: value.to_string(),
        })
    }
}

impl HeaderCard {
    pub fn parse(data: &[u8; CARD_SIZE]) -> Result<Self> {
        if !data.is_ascii() {
            return Err(FitsError::InvalidFormat(
                "Non-ASCII byte in header card".to_string(),
            ));
        }
        let card_str = str::from_utf8(data)
            .map_err(|_| FitsError::InvalidFormat("Invalid UTF-8 in header card".to_string()))?;

        let mut card = HeaderCard {
            keyword: card_str[0..8].trim().to_string(),
            value: None,
            comment: None,
        };

        if &card_str[8..10] == "= " {
            Self::parse_value_and_comment(&card_str[10..], &mut card);
        } else {
            let comment = card_str[8..].trim();
            if !comment.is_empty() {
                card.comment = Some(comment.to_string());
            }
        }

        Ok(card)
    }

    fn parse_value_and_comment(rest: &str, card: &mut HeaderCard) {
        let trimmed = rest.trim_start();
        let (value_part, comment_part) = if trimmed.starts_with('\'') {
            let close = Self::closing_quote(trimmed);
            let (value, tail) = trimmed.split_at(close);
            (value, tail.find('/').map(|pos| &tail[pos + 1..]))
        } else {
            match trimmed.find('/') {
                Some(pos) => (&trimmed[..pos], Some(&trimmed[pos + 1..])),
                None => (trimmed, None),
            }
        };

        let value_part = value_part.trim();
        if !value_part.is_empty() {
            card.value = Some(value_part.to_string());
        }
        if let Some(comment) = comment_part.map(str::trim).filter(|c| !c.is_empty()) {
            card.comment = Some(comment.to_string());
        }
    }

    /// Byte position just past the closing quote of a string value, with
    /// `''` treated as an escaped quote. Unterminated strings run to the end.
    fn closing_quote(value: &str) -> usize {
        let bytes = value.as_bytes();
        let mut i = 1;
        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if bytes.get(i + 1) == Some(&b'\'') {
                    i += 2;
                    continue;
                }
                return i + 1;
            }
            i += 1;
        }
        bytes.len()
    }

    pub fn to_keyword(&self) -> Keyword {
        let mut keyword = Keyword::new(self.keyword.clone());

        if let Some(comment) = &self.comment {
            keyword = keyword.with_comment(comment.clone());
        }

        if let Some(value_str) = &self.value {
            keyword = keyword.with_value(Self::parse_value(value_str));
        }

        keyword
    }

    fn parse_value(value_str: &str) -> KeywordValue {
        let trimmed = value_str.trim();

        if trimmed == "T" {
            return KeywordValue::Logical(true);
        }
        if trimmed == "F" {
            return KeywordValue::Logical(false);
        }

        if trimmed.starts_with('\'') && trimmed.ends_with('\'') && trimmed.len() >= 2 {
            let content = trimmed[1..trimmed.len() - 1].replace("''", "'");
            return KeywordValue::String(content.trim_end().to_string());
        }

        if let Ok(int_val) = trimmed.parse::<i64>() {
            return KeywordValue::Integer(int_val);
        }

        if let Ok(float_val) = trimmed.replace('D', "E").parse::<f64>() {
            return KeywordValue::Real(float_val);
        }

        KeywordValue::String(trimmed.to_string())
    }
}

impl HeaderParser {
    pub fn parse_header(data: &[u8]) -> Result<Header> {
        if !data.len().is_multiple_of(HEADER_BLOCK_SIZE) {
            return Err(FitsError::InvalidFormat(
                "Header size must be multiple of 2880 bytes".to_string(),
            ));
        }

        let mut header = Header::new();

        for chunk in data.chunks_exact(CARD_SIZE) {
            let mut card_data = [0u8; CARD_SIZE];
            card_data.copy_from_slice(chunk);

            let card = HeaderCard::parse(&card_data)?;
            if card.keyword == "END" {
                return Ok(header);
            }
            if card.keyword.is_empty() && card.value.is_none() && card.comment.is_none() {
                continue;
            }
            header.add_keyword(card.to_keyword());
        }

        Err(FitsError::InvalidFormat("Missing END keyword".to_string()))
    }

    /// Size in bytes of the header blocks up to and including the one that
    /// holds the `END` card.
    pub fn header_size_bytes(data: &[u8]) -> Result<usize> {
        for (block_index, block) in data.chunks(HEADER_BLOCK_SIZE).enumerate() {
            if Self::block_has_end(block)? {
                return Ok((block_index + 1) * HEADER_BLOCK_SIZE);
            }
        }

        Err(FitsError::InvalidFormat("Missing END keyword".to_string()))
    }

    pub(crate) fn block_has_end(block: &[u8]) -> Result<bool> {
        for chunk in block.chunks_exact(CARD_SIZE) {
            let keyword_part = str::from_utf8(&chunk[0..8])
                .map_err(|_| FitsError::InvalidFormat("Invalid UTF-8 in header".to_string()))?;
            if keyword_part.trim_end() == "END" {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(text: &str) -> [u8; CARD_SIZE] {
        let mut card = [b' '; CARD_SIZE];
        card[..text.len()].copy_from_slice(text.as_bytes());
        card
    }

    fn header_block(cards: &[&str]) -> Vec<u8> {
        let mut data = Vec::new();
        for text in cards {
            data.extend_from_slice(&card(text));
        }
        data.resize(HEADER_BLOCK_SIZE, b' ');
        data
    }

    #[test]
    fn header_card_parse_keyword() {
        let parsed = HeaderCard::parse(&card(
            "SIMPLE  =                    T / Standard FITS format",
        ))
        .unwrap();
        assert_eq!(parsed.keyword, "SIMPLE");
        assert_eq!(parsed.value.as_deref(), Some("T"));
        assert_eq!(parsed.comment.as_deref(), Some("Standard FITS format"));
    }

    #[test]
    fn header_card_parse_numeric_value() {
        let parsed = HeaderCard::parse(&card("NAXIS2  =               670722 / number of rows"))
            .unwrap();
        assert_eq!(parsed.value.as_deref(), Some("670722"));
        assert_eq!(
            HeaderCard::parse_value(parsed.value.as_deref().unwrap()),
            KeywordValue::Integer(670722)
        );
    }

    #[test]
    fn header_card_string_with_slash_inside_quotes() {
        let parsed = HeaderCard::parse(&card("TUNIT3  = 'km / s   '           / velocity unit"))
            .unwrap();
        assert_eq!(parsed.value.as_deref(), Some("'km / s   '"));
        assert_eq!(parsed.comment.as_deref(), Some("velocity unit"));
        assert_eq!(
            parsed.to_keyword().value,
            Some(KeywordValue::String("km / s".to_string()))
        );
    }

    #[test]
    fn header_card_escaped_quote() {
        let parsed = HeaderCard::parse(&card("OBJECT  = 'O''Brien'")).unwrap();
        assert_eq!(
            parsed.to_keyword().value,
            Some(KeywordValue::String("O'Brien".to_string()))
        );
    }

    #[test]
    fn header_card_parse_comment_only() {
        let parsed = HeaderCard::parse(&card("HISTORY produced by the UPenn pipeline")).unwrap();
        assert_eq!(parsed.keyword, "HISTORY");
        assert!(parsed.value.is_none());
        assert_eq!(
            parsed.comment.as_deref(),
            Some("produced by the UPenn pipeline")
        );
    }

    #[test]
    fn parse_value_real_with_fortran_exponent() {
        assert_eq!(HeaderCard::parse_value("1.5D2"), KeywordValue::Real(150.0));
    }

    #[test]
    fn validate_card_rejects_invalid_utf8() {
        let mut data = card("SIMPLE  = T");
        data[20] = 0xFF;
        assert!(matches!(
            HeaderCard::parse(&data),
            Err(FitsError::InvalidFormat(_))
        ));
    }

    #[test]
    fn parse_header_reads_keywords_until_end() {
        let data = header_block(&[
            "XTENSION= 'BINTABLE'           / binary table extension",
            "BITPIX  =                    8",
            "NAXIS   =                    2",
            "NAXIS1  =                   12",
            "NAXIS2  =                    3",
            "",
            "END",
        ]);
        let header = HeaderParser::parse_header(&data).unwrap();
        assert!(header.is_extension());
        assert!(!header.is_primary());
        assert_eq!(header.xtension(), Some("BINTABLE"));
        assert_eq!(header.require_size("NAXIS2").unwrap(), 3);
        assert_eq!(header.keywords().len(), 5);
    }

    #[test]
    fn parse_header_missing_end_keyword() {
        let data = header_block(&["SIMPLE  =                    T"]);
        assert!(matches!(
            HeaderParser::parse_header(&data),
            Err(FitsError::InvalidFormat(msg)) if msg.contains("END")
        ));
    }

    #[test]
    fn parse_header_invalid_size() {
        assert!(HeaderParser::parse_header(&[b' '; 100]).is_err());
    }

    #[test]
    fn require_integer_reports_missing_and_wrong_type() {
        let data = header_block(&["EXTNAME = 'MODELS'", "END"]);
        let header = HeaderParser::parse_header(&data).unwrap();
        assert!(matches!(
            header.require_integer("NAXIS2"),
            Err(FitsError::KeywordNotFound { .. })
        ));
        assert!(matches!(
            header.require_integer("EXTNAME"),
            Err(FitsError::InvalidKeywordValue { .. })
        ));
    }

    #[test]
    fn header_size_spans_multiple_blocks() {
        let mut data = vec![b' '; HEADER_BLOCK_SIZE];
        data[..8].copy_from_slice(b"COMMENT ");
        data.extend(header_block(&["END"]));
        assert_eq!(
            HeaderParser::header_size_bytes(&data).unwrap(),
            2 * HEADER_BLOCK_SIZE
        );
    }
}
