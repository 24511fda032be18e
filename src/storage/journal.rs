//! Append-only commit journal
//!
//! Record format:
//!
//! ```text
//! +------------------+
//! | Body Length      | (u32 LE)
//! +------------------+
//! | Body             | (JSON encoded Batch)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32 of body)
//! +------------------+
//! ```
//!
//! One record per committed transition. Replay applies records in file
//! order; any checksum, framing or decode failure halts the open.
//!
//! A failed append is cut back off the file before the error returns. If
//! that cut fails too, the journal refuses every later append.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{StorageError, StorageResult};
use super::kv::{Batch, KvStore};

const JOURNAL_DIR: &str = "data";
const JOURNAL_FILE: &str = "journal.dat";

/// Path of the journal file inside a data directory
pub fn journal_path(data_dir: &Path) -> PathBuf {
    data_dir.join(JOURNAL_DIR).join(JOURNAL_FILE)
}

/// Journal writer. Every append is synced before returning when `fsync` is on.
pub struct Journal {
    path: PathBuf,
    file: File,
    fsync: bool,
    current_offset: u64,
    records: u64,
    /// Torn bytes past `current_offset` could not be removed
    poisoned: bool,
}

impl Journal {
    /// Opens or creates `<data_dir>/data/journal.dat`
    pub fn open(data_dir: &Path, fsync: bool) -> StorageResult<Self> {
        let dir = data_dir.join(JOURNAL_DIR);
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                StorageError::io_error(
                    format!("Failed to create journal directory: {}", dir.display()),
                    e,
                )
            })?;
        }

        let path = journal_path(data_dir);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                StorageError::io_error(format!("Failed to open journal: {}", path.display()), e)
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read journal metadata", e))?
            .len();

        Ok(Self {
            path,
            file,
            fsync,
            current_offset,
            records: 0,
            poisoned: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Records appended through this handle
    pub fn records_appended(&self) -> u64 {
        self.records
    }

    /// Append one batch as a single record. Empty batches are skipped.
    pub fn append(&mut self, batch: &Batch) -> StorageResult<u64> {
        let offset = self.current_offset;
        if batch.is_empty() {
            return Ok(offset);
        }

        if self.poisoned {
            return Err(StorageError::io_error(
                "Journal refuses appends after an unrecoverable write failure",
                io::Error::new(io::ErrorKind::Other, "torn journal tail"),
            ));
        }

        let serialized = encode_record(batch)?;
        if let Err(e) = self.write_record(&serialized) {
            self.discard_torn_tail();
            return Err(e);
        }

        self.current_offset += serialized.len() as u64;
        self.records += 1;
        Ok(offset)
    }

    fn write_record(&mut self, serialized: &[u8]) -> StorageResult<()> {
        self.file
            .write_all(serialized)
            .map_err(|e| StorageError::io_error("Failed to append journal record", e))?;
        if self.fsync {
            self.file
                .sync_all()
                .map_err(|e| StorageError::io_error("fsync failed after journal append", e))?;
        }
        Ok(())
    }

    /// Cut the file back to the last complete record
    fn discard_torn_tail(&mut self) {
        let truncated = self
            .file
            .set_len(self.current_offset)
            .and_then(|_| self.file.sync_all());
        if truncated.is_err() {
            self.poisoned = true;
        }
    }
}

fn encode_record(batch: &Batch) -> StorageResult<Vec<u8>> {
    let body = serde_json::to_vec(batch)
        .map_err(|e| StorageError::data_corruption(format!("Failed to encode batch: {}", e)))?;
    let len = u32::try_from(body.len())
        .map_err(|_| StorageError::data_corruption("Batch exceeds 4GiB record limit"))?;

    let mut buf = Vec::with_capacity(body.len() + 8);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(&body);
    buf.extend_from_slice(&compute_checksum(&body).to_le_bytes());
    Ok(buf)
}

/// Sequential journal reader with checksum validation
pub struct JournalReader {
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl JournalReader {
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = File::open(path).map_err(|e| {
            StorageError::io_error(format!("Failed to open journal: {}", path.display()), e)
        })?;
        let file_size = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read journal metadata", e))?
            .len();

        Ok(Self {
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Read the next batch; `Ok(None)` at a clean end of file
    pub fn read_next(&mut self) -> StorageResult<Option<Batch>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }
        let offset = self.current_offset;

        let mut len_bytes = [0u8; 4];
        self.read_exact_at(offset, &mut len_bytes, "truncated record length")?;
        let len = u32::from_le_bytes(len_bytes) as u64;

        if offset + 8 + len > self.file_size {
            return Err(StorageError::corruption_at_offset(
                offset,
                format!("record length {} runs past end of journal", len),
            ));
        }

        let mut body = vec![0u8; len as usize];
        self.read_exact_at(offset, &mut body, "truncated record body")?;

        let mut crc_bytes = [0u8; 4];
        self.read_exact_at(offset, &mut crc_bytes, "truncated checksum")?;
        if !verify_checksum(&body, u32::from_le_bytes(crc_bytes)) {
            return Err(StorageError::corruption_at_offset(offset, "checksum mismatch"));
        }

        let batch: Batch = serde_json::from_slice(&body).map_err(|e| {
            StorageError::corruption_at_offset(offset, format!("undecodable batch: {}", e))
        })?;

        self.current_offset = offset + 8 + len;
        Ok(Some(batch))
    }

    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8], what: &str) -> StorageResult<()> {
        self.reader
            .read_exact(buf)
            .map_err(|_| StorageError::corruption_at_offset(offset, what.to_string()))
    }
}

/// Replay every journal record into `store`; returns the number applied.
///
/// A missing journal is an empty ledger.
pub fn replay(data_dir: &Path, store: &mut dyn KvStore) -> StorageResult<u64> {
    let path = journal_path(data_dir);
    if !path.exists() {
        return Ok(0);
    }

    let mut reader = JournalReader::open(&path)?;
    let mut applied = 0;
    while let Some(batch) = reader.read_next()? {
        batch.apply(store);
        applied += 1;
    }
    Ok(applied)
}
