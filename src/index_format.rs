use crate::error::{Result, SeqminiError};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use liblzma::read::XzDecoder;
use liblzma::write::XzEncoder;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use zstd::stream::read::Decoder as ZstdDecoder;
use zstd::stream::write::Encoder as ZstdEncoder;

const OUTPUT_BUFFER_SIZE: usize = 1024 * 1024;

const GZIP_LEVEL: u32 = 6;
const ZSTD_LEVEL: i32 = 3;
const XZ_LEVEL: u32 = 6;

/// Record encoding of an index file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexFormat {
    #[default]
    Text,
    Binary,
}

impl IndexFormat {
    pub fn from_binary_flag(binary: bool) -> Self {
        if binary {
            IndexFormat::Binary
        } else {
            IndexFormat::Text
        }
    }
}

impl std::fmt::Display for IndexFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexFormat::Text => f.write_str("text"),
            IndexFormat::Binary => f.write_str("binary"),
        }
    }
}

/// Compression of an index file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
    Xz,
}

impl Compression {
    /// `.gz`, `.zst` and `.xz` are compressed; anything else is plain
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => Compression::Gzip,
            Some("zst") => Compression::Zstd,
            Some("xz") => Compression::Xz,
            _ => Compression::None,
        }
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

enum Encoder {
    Plain(Box<dyn Write + Send>),
    Gzip(GzEncoder<BufWriter<File>>),
    Zstd(ZstdEncoder<'static, BufWriter<File>>),
    Xz(XzEncoder<BufWriter<File>>),
}

/// Temporary file that replaces the destination once output is complete
struct Staged {
    temp: TempPath,
    path: PathBuf,
}

/// Index output, possibly wrapped in a compressor chosen by extension
///
/// File output is staged in a temporary file next to the destination and
/// only renamed over it by [`IndexWriter::finish`]. A writer dropped without
/// finishing removes its temporary file and leaves the destination untouched.
pub struct IndexWriter {
    encoder: Encoder,
    staged: Option<Staged>,
}

impl IndexWriter {
    /// Open `path` for writing; `None` or `-` is stdout
    pub fn create(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) if !is_stdio(p) => p,
            _ => {
                return Ok(IndexWriter {
                    encoder: Encoder::Plain(Box::new(BufWriter::with_capacity(
                        OUTPUT_BUFFER_SIZE,
                        io::stdout(),
                    ))),
                    staged: None,
                });
            }
        };

        let (file, temp) = open_destination(path).map_err(|e| SeqminiError::sink_open(path, e))?;
        let buffered = BufWriter::with_capacity(OUTPUT_BUFFER_SIZE, file);

        let encoder = match Compression::from_path(path) {
            Compression::Gzip => {
                Encoder::Gzip(GzEncoder::new(buffered, flate2::Compression::new(GZIP_LEVEL)))
            }
            Compression::Zstd => Encoder::Zstd(
                ZstdEncoder::new(buffered, ZSTD_LEVEL).map_err(|e| SeqminiError::sink_open(path, e))?,
            ),
            Compression::Xz => Encoder::Xz(XzEncoder::new(buffered, XZ_LEVEL)),
            Compression::None => Encoder::Plain(Box::new(buffered)),
        };
        Ok(IndexWriter {
            encoder,
            staged: temp.map(|temp| Staged {
                temp,
                path: path.to_path_buf(),
            }),
        })
    }

    /// Write any compression trailer, flush, and move the output into place
    pub fn finish(self) -> Result<()> {
        match self.encoder {
            Encoder::Plain(mut w) => w.flush()?,
            Encoder::Gzip(w) => w.finish()?.flush()?,
            Encoder::Zstd(w) => w.finish()?.flush()?,
            Encoder::Xz(w) => w.finish()?.flush()?,
        }
        if let Some(Staged { temp, path }) = self.staged {
            temp.persist(&path)
                .map_err(|e| SeqminiError::sink_open(path, e.error))?;
        }
        Ok(())
    }
}

/// Create a temporary file in the destination's directory
///
/// Fails when the directory is missing or unwritable, or when the
/// destination is a directory. An existing destination lends its
/// permissions to the replacement. Devices and pipes (`/dev/null`, a FIFO)
/// are opened directly, with nothing to stage.
fn open_destination(path: &Path) -> io::Result<(File, Option<TempPath>)> {
    let existing = fs::metadata(path).ok();
    if let Some(metadata) = &existing {
        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                "destination is a directory",
            ));
        }
        if !metadata.is_file() {
            return Ok((OpenOptions::new().write(true).open(path)?, None));
        }
    }
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let (file, temp) = tempfile::Builder::new()
        .prefix(".seqmini-")
        .suffix(".tmp")
        .tempfile_in(dir)?
        .into_parts();
    if let Some(metadata) = existing {
        file.set_permissions(metadata.permissions())?;
    }
    Ok((file, Some(temp)))
}

impl Write for IndexWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.encoder {
            Encoder::Plain(w) => w.write(buf),
            Encoder::Gzip(w) => w.write(buf),
            Encoder::Zstd(w) => w.write(buf),
            Encoder::Xz(w) => w.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match &mut self.encoder {
            Encoder::Plain(w) => w.write_all(buf),
            Encoder::Gzip(w) => w.write_all(buf),
            Encoder::Zstd(w) => w.write_all(buf),
            Encoder::Xz(w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.encoder {
            Encoder::Plain(w) => w.flush(),
            Encoder::Gzip(w) => w.flush(),
            Encoder::Zstd(w) => w.flush(),
            Encoder::Xz(w) => w.flush(),
        }
    }
}

/// Open an index file; `-` is stdin
///
/// Compression follows the extension, as for [`IndexWriter::create`]. The
/// content is never sniffed: a binary index has no header, so its first hash
/// may look like any compression magic.
pub fn open_index_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if is_stdio(path) {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path)?;
    let reader: Box<dyn Read + Send> = match Compression::from_path(path) {
        Compression::None => Box::new(file),
        Compression::Gzip => Box::new(MultiGzDecoder::new(file)),
        Compression::Zstd => Box::new(ZstdDecoder::new(file)?),
        Compression::Xz => Box::new(XzDecoder::new(file)),
    };
    Ok(Box::new(BufReader::with_capacity(OUTPUT_BUFFER_SIZE, reader)))
}

/// Open a plain or compressed sequence file; `-` is stdin, compression is sniffed
pub fn open_sequence_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let reader: Box<dyn Read + Send> = if is_stdio(path) {
        let (reader, _format) =
            niffler::send::get_reader(Box::new(io::stdin())).map_err(niffler_error)?;
        reader
    } else if fs::metadata(path)?.len() == 0 {
        // Nothing to sniff
        Box::new(File::open(path)?)
    } else {
        let (reader, _format) = niffler::send::from_path(path).map_err(niffler_error)?;
        reader
    };
    Ok(Box::new(BufReader::new(reader)))
}

fn niffler_error(err: niffler::Error) -> SeqminiError {
    SeqminiError::Io(io::Error::other(err.to_string()))
}
