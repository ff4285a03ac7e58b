use std::{
    fmt::Debug,
    fs::{File, Metadata, OpenOptions},
    io::{self, Read, Write},
    path::Path,
    time::SystemTime,
};

use assert2::debug_assert;
use chrono::{Local, NaiveDateTime, TimeZone};
use tracing::{debug, info};

use crate::{
    counting_writer::CountingWriter,
    crc_reader::CrcReader,
    dos_time::{system_time_in_timezone, DosDatetime},
    structs::{self, PackedStructExt},
    Error,
};

type TimeConverter = Box<dyn Fn(SystemTime) -> NaiveDateTime>;

/// Central directory data of an entry that was already written to the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEntry {
    name: Vec<u8>,
    datetime: DosDatetime,
    crc32: u32,
    size: u32,
    external_attributes: u32,
    /// Offset of the entry's local header in the archive
    local_header_offset: u32,
}

impl PendingEntry {
    /// Entry name, exactly the bytes of the path that was added.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn datetime(&self) -> DosDatetime {
        self.datetime
    }

    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    /// Both compressed and uncompressed size, entries are stored.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn external_attributes(&self) -> u32 {
        self.external_attributes
    }

    pub fn local_header_offset(&self) -> u32 {
        self.local_header_offset
    }

    fn file_name_len(&self) -> u16 {
        self.name
            .len()
            .try_into()
            .unwrap_or_else(|_| unreachable!("Checked when constructing entries."))
    }

    fn local_header(&self) -> structs::LocalFileHeader {
        structs::LocalFileHeader {
            signature: structs::LocalFileHeader::SIGNATURE,
            version_to_extract: structs::VERSION_TO_EXTRACT,
            flags: structs::GpBitFlag::default(),
            compression: structs::Compression::Store,
            last_mod_time: self.datetime.time,
            last_mod_date: self.datetime.date,
            crc32: self.crc32,
            compressed_size: self.size,
            uncompressed_size: self.size,
            file_name_len: self.file_name_len(),
            extra_field_len: 0,
        }
    }

    fn central_directory_header(&self) -> structs::CentralDirectoryHeader {
        structs::CentralDirectoryHeader {
            signature: structs::CentralDirectoryHeader::SIGNATURE,
            version_made_by: structs::VersionMadeBy::UNIX,
            version_to_extract: structs::VERSION_TO_EXTRACT,
            flags: structs::GpBitFlag::default(),
            compression: structs::Compression::Store,
            last_mod_time: self.datetime.time,
            last_mod_date: self.datetime.date,
            crc32: self.crc32,
            compressed_size: self.size,
            uncompressed_size: self.size,
            file_name_len: self.file_name_len(),
            extra_field_len: 0,
            file_comment_length: 0,
            disk_number_start: 0,
            internal_attributes: 0,
            external_attributes: self.external_attributes,
            local_header_offset: self.local_header_offset,
        }
    }

    fn central_directory_record_size(&self) -> u64 {
        structs::CentralDirectoryHeader::packed_size() + self.name.len() as u64
    }
}

/// A stored (uncompressed) zip archive, written append-only.
///
/// Files are written as soon as they are added, their central directory data is kept
/// until [`finalize`](Self::finalize()) writes the central directory and the end record.
/// Dropping the archive without finalizing leaves an incomplete zip file behind.
pub struct Archive<W: Write> {
    sink: CountingWriter<W>,
    entries: Vec<PendingEntry>,
    time_converter: TimeConverter,
}

impl<W: Write + Debug> Debug for Archive<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("sink", &self.sink)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl Archive<File> {
    /// Creates (or truncates) the file at `path` and starts an empty archive in it.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| Error::ArchiveOpen {
                path: path.to_owned(),
                source,
            })?;

        debug!(path = %path.display(), "created archive");
        Ok(Archive::new(file))
    }
}

impl<W: Write> Archive<W> {
    /// Starts an empty archive at the current position of `sink`.
    /// Offsets in the archive count from this position.
    pub fn new(sink: W) -> Self {
        Archive {
            sink: CountingWriter::new(sink),
            entries: Vec::new(),
            time_converter: Box::new(system_timezone_converter(Local)),
        }
    }

    /// Sets the timezone used to convert modification times to DOS date and time.
    /// Default is the local timezone.
    pub fn system_time_timezone<Tz>(&mut self, tz: Tz) -> &mut Self
    where
        Tz: TimeZone + 'static,
    {
        self.time_converter = Box::new(system_timezone_converter(tz));
        self
    }

    /// Entries added so far, in the order they will appear in the central directory.
    pub fn entries(&self) -> &[PendingEntry] {
        &self.entries
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of bytes written to the sink so far.
    pub fn written_bytes(&self) -> u64 {
        self.sink.written_bytes_count()
    }

    /// Stores a regular file in the archive.
    ///
    /// The path is used verbatim as the entry name.
    /// The whole file is read before anything is written, so errors opening or reading it
    /// leave the archive untouched. If writing to the archive fails, the bytes written so
    /// far stay in the output, but no entry is recorded for them.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let name = path.as_os_str().as_encoded_bytes();
        let entry_name = || path.to_string_lossy().into_owned();

        if u16::try_from(name.len()).is_err() {
            return Err(Error::TooLongEntryName {
                entry_name: entry_name(),
            });
        }

        let source_open = |source: io::Error| Error::SourceOpen {
            path: path.to_owned(),
            source,
        };
        let file = File::open(path).map_err(source_open)?;
        let metadata = file.metadata().map_err(source_open)?;

        let size = u32::try_from(metadata.len()).map_err(|_| Error::EntryTooLarge {
            entry_name: entry_name(),
            size: metadata.len(),
        })?;

        if self.entries.len() >= u16::MAX as usize {
            return Err(Error::TooManyEntries {
                count: self.entries.len(),
            });
        }
        let offset = self.sink.written_bytes_count();
        let local_header_offset =
            u32::try_from(offset).map_err(|_| Error::ArchiveTooLarge { offset })?;
        self.entries
            .try_reserve(1)
            .map_err(|source| Error::AllocationFailed { source })?;

        let (payload, crc32) = read_payload(path, file, size)?;

        let datetime = match metadata.modified() {
            Ok(modified) => DosDatetime::from_datetime(&(self.time_converter)(modified)),
            // Platforms without modification times get the DOS epoch
            Err(_) => DosDatetime::default(),
        };

        let entry = PendingEntry {
            name: name.to_vec(),
            datetime,
            crc32,
            size,
            external_attributes: external_attributes(&metadata),
            local_header_offset,
        };

        self.write_local_record(&entry, &payload)
            .map_err(|source| Error::ArchiveWrite {
                entry_name: entry_name(),
                source,
            })?;

        debug!(
            entry = %path.display(),
            size,
            crc32 = format_args!("{crc32:08x}"),
            offset,
            "added entry"
        );
        self.entries.push(entry);

        Ok(())
    }

    fn write_local_record(&mut self, entry: &PendingEntry, payload: &[u8]) -> io::Result<()> {
        self.sink.write_all(&entry.local_header().to_bytes())?;
        self.sink.write_all(&entry.name)?;
        self.sink.write_all(payload)
    }

    /// Writes the central directory and the end of central directory record,
    /// flushes and returns the underlying writer.
    ///
    /// Stops at the first failing write; whatever was written stays in the output.
    pub fn finalize(self) -> Result<W, Error> {
        let Archive {
            mut sink, entries, ..
        } = self;

        let cd_offset = sink.written_bytes_count();
        let cd_offset_u32 =
            u32::try_from(cd_offset).map_err(|_| Error::ArchiveTooLarge { offset: cd_offset })?;
        let entry_count = u16::try_from(entries.len()).map_err(|_| Error::TooManyEntries {
            count: entries.len(),
        })?;
        let cd_size: u64 = entries
            .iter()
            .map(PendingEntry::central_directory_record_size)
            .sum();
        let cd_size_u32 = u32::try_from(cd_size).map_err(|_| Error::ArchiveTooLarge {
            offset: cd_offset + cd_size,
        })?;

        let cd_write = |source: io::Error| Error::CentralDirectoryWrite { source };

        for entry in entries {
            sink.write_all(&entry.central_directory_header().to_bytes())
                .map_err(cd_write)?;
            sink.write_all(&entry.name).map_err(cd_write)?;
        }
        debug_assert!(sink.written_bytes_count() - cd_offset == cd_size);

        let eocd = structs::EndOfCentralDirectory {
            signature: structs::EndOfCentralDirectory::SIGNATURE,
            this_disk_number: 0,
            start_of_cd_disk_number: 0,
            this_cd_entry_count: entry_count,
            total_cd_entry_count: entry_count,
            size_of_cd: cd_size_u32,
            cd_offset: cd_offset_u32,
            file_comment_length: 0,
        };
        sink.write_all(&eocd.to_bytes()).map_err(cd_write)?;
        sink.flush().map_err(cd_write)?;

        info!(
            entries = entry_count,
            cd_offset,
            cd_size,
            total_size = sink.written_bytes_count(),
            "finalized archive"
        );

        Ok(sink.into_inner())
    }
}

/// Reads the whole file, computing its CRC32 on the way.
///
/// Reads at most one byte past `size`, so that growing files and devices without
/// a length (`/dev/zero`) end up as a length mismatch.
fn read_payload(path: &Path, file: File, size: u32) -> Result<(Vec<u8>, u32), Error> {
    let mut payload = Vec::new();
    payload
        .try_reserve_exact(size as usize)
        .map_err(|source| Error::AllocationFailed { source })?;

    let mut reader = CrcReader::new(file.take(u64::from(size) + 1));
    reader
        .read_to_end(&mut payload)
        .map_err(|source| Error::SourceRead {
            path: path.to_owned(),
            source,
        })?;

    if reader.bytes_read() != size as u64 {
        return Err(Error::LengthMismatch {
            entry_name: path.to_string_lossy().into_owned(),
            expected_size: size as u64,
            actual_size: reader.bytes_read(),
        });
    }

    Ok((payload, reader.get_crc32()))
}

/// Creates a converter from system time to the calendar representation in the given timezone.
fn system_timezone_converter<Tz>(tz: Tz) -> impl Fn(SystemTime) -> NaiveDateTime + 'static
where
    Tz: TimeZone + 'static,
{
    move |system_time| system_time_in_timezone(system_time, &tz)
}

/// Unix mode of the source file in the high 16 bits.
/// Non-unix systems only get a regular file type with read-only or read-write permissions.
fn external_attributes(metadata: &Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt as _;
        metadata.mode() << 16
    }
    #[cfg(not(unix))]
    {
        let perm_bits = if metadata.permissions().readonly() {
            0o444
        } else {
            0o644
        };
        (0o100000 | perm_bits) << 16
    }
}
