use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

/// Any random-access byte source can serve as a backing store.
pub trait PageSource: Read + Seek {}

impl<T: Read + Seek> PageSource for T {}

/// The `BackingStore` struct is a simple utility wrapper around a seekable reader. Instances of the
/// structure are used to perform random reads of whole pages on a backing store binary file.
/// Conceptually, this can be anything along the lines of actual file data, swap space, or program
/// instructions that have yet to be paged in. The store is never written to.
pub struct BackingStore {
    reader: Box<dyn PageSource>,
    page_size: usize,
}

impl BackingStore {
    /// Open the backing store file at `filename`.
    ///
    /// # Errors
    ///
    /// Returns `Error::BackingStoreUnavailable` if the file cannot be opened.
    pub fn open(filename: &str, page_size: usize) -> Result<Self> {
        let file = File::open(filename).map_err(|source| Error::BackingStoreUnavailable {
            path: String::from(filename),
            source,
        })?;
        log::debug!("opened backing store '{}'", filename);
        Ok(Self::new(BufReader::new(file), page_size))
    }

    pub fn new(reader: impl PageSource + 'static, page_size: usize) -> Self {
        Self {
            reader: Box::new(reader),
            page_size,
        }
    }

    /// Seeks to `page_number * page_size` in the backing store and reads exactly one page into the
    /// front of `buffer`.
    ///
    /// # Arguments
    ///
    /// * `page_number` - the page to load; also the multiplier for the seek position.
    /// * `buffer` - a mutable reference to a frame at least `page_size` bytes long.
    ///
    /// # Errors
    ///
    /// `Error::BackingStoreSeekFailed` if the seek fails and `Error::BackingStoreReadShort` if the
    /// store ends before a full page could be read. Typically the latter is the result of a page
    /// number that lies past the end of the file provided as the backing store.
    pub fn read_page(&mut self, page_number: u32, buffer: &mut [u8]) -> Result<()> {
        let position = u64::from(page_number) * self.page_size as u64;
        self.reader
            .seek(SeekFrom::Start(position))
            .map_err(|source| Error::BackingStoreSeekFailed {
                page_number,
                source,
            })?;
        self.reader
            .read_exact(&mut buffer[..self.page_size])
            .map_err(|source| Error::BackingStoreReadShort {
                page_number,
                source,
            })
    }
}
