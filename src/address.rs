use crate::config::Geometry;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};

/// `LogicalAddress` is a type that represents the components of a logical memory address in a
/// single structure: the raw value as presented by the simulated process together with the page
/// number and offset extracted from it.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct LogicalAddress {
    pub raw: u32,
    pub page_number: u32,
    pub offset: u32,
}

impl LogicalAddress {
    /// Split a raw address into page number and offset using the bit layout of `geometry`. Bits
    /// outside the page mask are dropped rather than rejected.
    ///
    /// # Arguments
    ///
    /// * `raw` - 32-bit unsigned integer representing a logical address
    /// * `geometry` - the address layout supplying `page_shift` and `page_mask`
    ///
    /// # Examples
    ///
    /// ```
    /// use translation_sim::address::LogicalAddress;
    /// use translation_sim::config::Geometry;
    /// let address = LogicalAddress::decode(257, &Geometry::STANDARD);
    /// assert_eq!(address.page_number, 1);
    /// assert_eq!(address.offset, 1);
    /// ```
    pub fn decode(raw: u32, geometry: &Geometry) -> Self {
        Self {
            raw,
            page_number: (raw >> geometry.page_shift) & geometry.page_mask,
            offset: raw & geometry.page_mask,
        }
    }

    /// The address as the simulated process wrote it, which may have been negative.
    pub fn signed(&self) -> i32 {
        self.raw as i32
    }
}

/// Parse a line the way C's `atoi` does: skip leading whitespace, accept one sign, then consume
/// digits until the first non-digit. A line with no leading digits yields 0. Values wrap to 32 bits.
pub fn parse_permissive(line: &str) -> u32 {
    let trimmed = line.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, digit| {
            acc.wrapping_mul(10).wrapping_add(u32::from(digit - b'0'))
        });
    if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    }
}

/// `AddressReader` is a utility type responsible for sequentially obtaining raw address numbers
/// from a text source, one per line, and decoding them against a fixed geometry.
pub struct AddressReader<R> {
    reader: R,
    geometry: Geometry,
    pub line_number: u64,
}

impl AddressReader<BufReader<File>> {
    /// Open the address file at `filename`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputSourceUnavailable` if the file cannot be opened.
    pub fn open(filename: &str, geometry: Geometry) -> Result<Self> {
        let file = File::open(filename).map_err(|source| Error::InputSourceUnavailable {
            path: String::from(filename),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), geometry))
    }
}

impl<R: BufRead> AddressReader<R> {
    pub fn new(reader: R, geometry: Geometry) -> Self {
        Self {
            reader,
            geometry,
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for AddressReader<R> {
    type Item = Result<LogicalAddress>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buffer = Vec::new();
        match self.reader.read_until(b'\n', &mut buffer) {
            Err(err) => Some(Err(Error::Input(err))),
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                let raw = parse_permissive(&String::from_utf8_lossy(&buffer));
                Some(Ok(LogicalAddress::decode(raw, &self.geometry)))
            }
        }
    }
}
