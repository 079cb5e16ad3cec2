use crate::engine::AccessResult;
use crate::error::{Error, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
};

/// One line of a reference trace: `Virtual address: L Physical address: P Value: V`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedAccess {
    pub logical_address: i32,
    pub physical_address: u32,
    pub value: i8,
}

impl ExpectedAccess {
    fn parse(line: &str) -> Option<Self> {
        let values = line.split_whitespace().collect::<Vec<&str>>();
        if values.len() != 8 {
            return None;
        }
        Some(Self {
            logical_address: values[2].parse().ok()?,
            physical_address: values[5].parse().ok()?,
            value: values[7].parse().ok()?,
        })
    }
}

/// Frame assignment differs between replacement policies, so only the logical address and the
/// value read are compared.
impl PartialEq<ExpectedAccess> for AccessResult {
    fn eq(&self, other: &ExpectedAccess) -> bool {
        self.logical_address.signed() == other.logical_address && self.value == other.value
    }
}

// Similar to `address::AddressReader`, `ValidationReader` is used to read a text file line by line.
// Where the former is used to read the raw address, the latter is used to validate whether the
// engine accessed and returned data from the correct segment of virtual memory.
pub struct ValidationReader<R> {
    reader: R,
    pub line_number: u64,
}

impl ValidationReader<BufReader<File>> {
    /// Open the reference trace at `filename`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ValidationSourceUnavailable` if the file cannot be opened.
    pub fn open(filename: &str) -> Result<Self> {
        let file = File::open(filename).map_err(|source| Error::ValidationSourceUnavailable {
            path: String::from(filename),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ValidationReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for ValidationReader<R> {
    type Item = Result<ExpectedAccess>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buffer = String::new();
        match self.reader.read_line(&mut buffer) {
            Err(err) => Some(Err(Error::Input(err))),
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                Some(
                    ExpectedAccess::parse(&buffer).ok_or_else(|| Error::MalformedValidation {
                        line_number: self.line_number,
                        line: String::from(buffer.trim_end()),
                    }),
                )
            }
        }
    }
}
