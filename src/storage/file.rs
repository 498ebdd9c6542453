//! Single-file storage.
//!
//! The index is one file, `{dir}/{name}_index.vdb`, holding a sequence of
//! little-endian records:
//!
//! ```text
//! [u32 key_len][key bytes][u32 value_len][value bytes]
//! ```
//!
//! The file is memory mapped (or read whole when mapping is disabled) and
//! the record offsets are indexed once at open time.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use log::debug;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VersicleError};
use crate::storage::{Records, Storage};

const FILE_SUFFIX: &str = "_index.vdb";

/// Configuration for [`FileStorage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStorageConfig {
    /// Directory holding the index file.
    pub dir: PathBuf,
    /// Index name, usually the name of the text module it was built from.
    pub name: String,
    /// Memory map the file instead of reading it into memory.
    pub use_mmap: bool,
}

impl FileStorageConfig {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        FileStorageConfig {
            dir: dir.as_ref().to_path_buf(),
            name: "KJV".to_string(),
            use_mmap: true,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Full path of the index file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}{}", self.name, FILE_SUFFIX))
    }
}

#[derive(Debug)]
enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for Backing {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Backing::Mapped(mmap) => mmap,
            Backing::Owned(bytes) => bytes,
        }
    }
}

/// Read-only storage over a single index file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    data: Backing,
    /// Key -> (value offset, value length).
    offsets: AHashMap<String, (usize, usize)>,
}

impl FileStorage {
    /// Open an existing index file and index its records.
    pub fn open(config: &FileStorageConfig) -> Result<Self> {
        let path = config.path();
        let file = File::open(&path)?;
        let size = file.metadata()?.len();

        let data = if config.use_mmap && size > 0 {
            let mmap = unsafe { Mmap::map(&file)? };
            Backing::Mapped(mmap)
        } else {
            Backing::Owned(fs::read(&path)?)
        };

        let offsets = index_records(&data)?;
        debug!("Opened {} with {} records", path.display(), offsets.len());

        Ok(FileStorage {
            path,
            data,
            offsets,
        })
    }

    /// Write `records` as a new index file, replacing any existing one.
    pub fn write(config: &FileStorageConfig, records: &Records) -> Result<()> {
        fs::create_dir_all(&config.dir)?;
        let path = config.path();
        let tmp_path = path.with_extension("vdb.tmp");

        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            for (key, value) in records {
                write_chunk(&mut writer, key.as_bytes())?;
                write_chunk(&mut writer, value)?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp_path, &path)?;
        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .offsets
            .get(key)
            .map(|&(start, len)| self.data[start..start + len].to_vec()))
    }

    fn contains(&self, key: &str) -> bool {
        self.offsets.contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        self.offsets.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.offsets.len()
    }
}

fn write_chunk<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| VersicleError::invalid_argument("record larger than 4 GiB"))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(bytes)?;
    Ok(())
}

/// Read one length-prefixed chunk at `pos`, returning its span.
fn read_chunk(data: &[u8], pos: usize) -> Result<(usize, usize)> {
    let header = data
        .get(pos..pos + 4)
        .ok_or_else(|| VersicleError::index(format!("truncated length at offset {pos}")))?;
    let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let start = pos + 4;
    if start + len > data.len() {
        return Err(VersicleError::index(format!(
            "record at offset {pos} runs past end of file"
        )));
    }
    Ok((start, len))
}

fn index_records(data: &[u8]) -> Result<AHashMap<String, (usize, usize)>> {
    let mut offsets = AHashMap::new();
    let mut pos = 0;

    while pos < data.len() {
        let (key_start, key_len) = read_chunk(data, pos)?;
        let key = std::str::from_utf8(&data[key_start..key_start + key_len])
            .map_err(|e| VersicleError::index(format!("invalid key at offset {pos}: {e}")))?
            .to_string();
        let (value_start, value_len) = read_chunk(data, key_start + key_len)?;
        offsets.insert(key, (value_start, value_len));
        pos = value_start + value_len;
    }

    Ok(offsets)
}
