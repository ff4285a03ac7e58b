use packed_struct::prelude::*;
use packed_struct::PackedStructSlice;

/// Version needed to extract a stored entry (1.0).
pub const VERSION_TO_EXTRACT: u16 = 10;
/// APPNOTE version written into the version made by field (3.0).
pub const SPEC_VERSION_MADE_BY: u8 = 30;

/// Local file header
/// Precedes every file.
/// Must be followed by file name and the file data (no extra fields are written).
#[derive(Debug, PackedStruct)]
#[packed_struct(endian = "lsb")]
pub struct LocalFileHeader {
    pub signature: u32,
    pub version_to_extract: u16,
    #[packed_field(size_bytes = "2")]
    pub flags: GpBitFlag,
    #[packed_field(size_bytes = "2", ty = "enum")]
    pub compression: Compression,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_len: u16,
    pub extra_field_len: u16,
}

impl LocalFileHeader {
    pub const SIGNATURE: u32 = 0x04034b50;
}

/// General purpose bit flags, all bits are left unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PackedStruct)]
#[packed_struct(bit_numbering = "lsb0", size_bytes = "2")]
pub struct GpBitFlag {
    #[packed_field(bits = "3")]
    pub use_data_descriptor: bool,
    #[packed_field(bits = "11")]
    pub language_encoding: bool,
}

/// Central directory header
/// One per file, placed in the central directory, followed by the file name.
#[derive(Debug, PackedStruct)]
#[packed_struct(endian = "lsb")]
pub struct CentralDirectoryHeader {
    pub signature: u32,
    #[packed_field(size_bytes = "2")]
    pub version_made_by: VersionMadeBy,
    pub version_to_extract: u16,
    #[packed_field(size_bytes = "2")]
    pub flags: GpBitFlag,
    #[packed_field(size_bytes = "2", ty = "enum")]
    pub compression: Compression,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_len: u16,
    pub extra_field_len: u16,
    pub file_comment_length: u16,
    pub disk_number_start: u16,
    pub internal_attributes: u16,
    pub external_attributes: u32,
    pub local_header_offset: u32,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: u32 = 0x02014b50;
}

/// Low byte is the APPNOTE version, high byte the host system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PackedStruct)]
#[packed_struct(endian = "lsb")]
pub struct VersionMadeBy {
    pub spec_version: u8,
    #[packed_field(size_bytes = "1", ty = "enum")]
    pub os: VersionMadeByOs,
}

impl VersionMadeBy {
    pub const UNIX: VersionMadeBy = VersionMadeBy {
        spec_version: SPEC_VERSION_MADE_BY,
        os: VersionMadeByOs::Unix,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PrimitiveEnum_u8)]
#[non_exhaustive]
pub enum VersionMadeByOs {
    Unix = 3,
}

#[derive(Debug, PackedStruct)]
#[packed_struct(endian = "lsb")]
pub struct EndOfCentralDirectory {
    pub signature: u32,
    pub this_disk_number: u16,
    pub start_of_cd_disk_number: u16,
    pub this_cd_entry_count: u16,
    pub total_cd_entry_count: u16,
    pub size_of_cd: u32,
    pub cd_offset: u32,
    pub file_comment_length: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: u32 = 0x06054b50;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PrimitiveEnum_u16)]
#[non_exhaustive]
pub enum Compression {
    Store = 0,
}

pub trait PackedStructExt {
    fn packed_size() -> u64;
    fn packed_size_usize() -> usize;
    fn to_bytes(&self) -> Vec<u8>;
}

impl<T: PackedStruct> PackedStructExt for T {
    fn packed_size() -> u64 {
        Self::packed_size_usize() as u64
    }

    fn packed_size_usize() -> usize {
        Self::packed_bytes_size(None)
            .unwrap_or_else(|_| unreachable!("All records have a fixed size"))
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = vec![0; Self::packed_size_usize()];
        self.pack_to_slice(&mut buffer).unwrap_or_else(|_| {
            unreachable!("Buffer is sized from the struct, there is no other way this could fail")
        });
        buffer
    }
}
