use crate::error::LoadError;
use csv::ReaderBuilder;
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info};

/// Structured parse of a delimited text file: one header row plus raw
/// string cells. Cell typing happens later, in the schema/enrichment
/// stages.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Character encodings tried by the loader, in sweep order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
    Windows1252,
}

const ENCODINGS: [Encoding; 3] = [Encoding::Utf8, Encoding::Latin1, Encoding::Windows1252];
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

// Windows-1252 maps 0x80..=0x9F onto printable characters; five slots in
// that range are unassigned and make the decode fail.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20ac}'), // 0x80
    None,             // 0x81
    Some('\u{201a}'),
    Some('\u{0192}'),
    Some('\u{201e}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02c6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None, // 0x8D
    Some('\u{017d}'),
    None, // 0x8F
    None, // 0x90
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201c}'),
    Some('\u{201d}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02dc}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203a}'),
    Some('\u{0153}'),
    None, // 0x9D
    Some('\u{017e}'),
    Some('\u{0178}'),
];

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
            Encoding::Windows1252 => "windows-1252",
        }
    }

    /// Decode `bytes` under this encoding, or `None` if the bytes are not
    /// valid for it. Latin-1 maps every byte and cannot fail, so
    /// Windows-1252 is only reached when every Latin-1 delimiter attempt
    /// fails to tokenize.
    fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Encoding::Latin1 => Some(Cow::Owned(
                bytes.iter().map(|&b| b as char).collect::<String>(),
            )),
            Encoding::Windows1252 => {
                let mut out = String::with_capacity(bytes.len());
                for &b in bytes {
                    match b {
                        0x80..=0x9f => out.push(CP1252_HIGH[(b - 0x80) as usize]?),
                        _ => out.push(b as char),
                    }
                }
                Some(Cow::Owned(out))
            }
        }
    }
}

/// Resolve a byte source of unknown encoding/delimiter into a `RawTable`.
///
/// Every encoding in `ENCODINGS` is crossed with every delimiter in
/// `DELIMITERS`; the encoding is the outer loop and the first combination
/// that decodes and tokenizes without error wins. The sweep checks
/// syntactic success only: a wrong delimiter that happens to tokenize
/// (e.g. the whole line as one column) is accepted, and sorting that out
/// is the caller's problem, not the loader's.
pub fn load_bytes(bytes: &[u8]) -> Result<RawTable, LoadError> {
    for enc in ENCODINGS {
        let Some(text) = enc.decode(bytes) else {
            debug!(encoding = enc.name(), "decode failed, skipping encoding");
            continue;
        };
        for delim in DELIMITERS {
            let shown = delim as char;
            match parse_with(&text, delim) {
                Ok(table) => {
                    info!(
                        encoding = enc.name(),
                        delimiter = %shown,
                        columns = table.headers.len(),
                        rows = table.rows.len(),
                        "table parsed"
                    );
                    return Ok(table);
                }
                Err(err) => {
                    debug!(
                        encoding = enc.name(),
                        delimiter = %shown,
                        %err,
                        "tokenization failed"
                    );
                }
            }
        }
    }
    Err(LoadError::NoEncodingDelimiterMatch)
}

pub fn load_path<P: AsRef<Path>>(path: P) -> Result<RawTable, LoadError> {
    let bytes = std::fs::read(path)?;
    load_bytes(&bytes)
}

fn parse_with(text: &str, delimiter: u8) -> Result<RawTable, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    // Non-flexible reader: a row whose field count differs from the header
    // is a tokenization error and fails this combination.
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }
    Ok(RawTable { headers, rows })
}
