//! Persisted bin record format.
//!
//! Every value is little-endian:
//! ```text
//! [i32 version]
//! [i32 bin count]                 (absent before FIRST_ITEM_RECORD_VERSION)
//! bin count × [i32 tag][tag-specific fields]
//! ```
//!
//! | tag | variant        | fields                                          |
//! |-----|----------------|-------------------------------------------------|
//! | 0   | PlainStack     | id, amount                                      |
//! | 1   | SubtypedStack  | id, sub_kind, sub_value, amount                 |
//! | 2   | Single         | id                                              |
//! | 3   | Durability     | id, current, max                                |
//! | 4   | Charged        | id, level                                       |
//! | 5   | Located        | id, x, y, z, look x, look y, look z (f32)       |
//!
//! Reading is lenient: a record with broken invariants is skipped, and an
//! unknown tag or a truncated record ends the load with whatever was read so
//! far, since the remaining bytes cannot be re-synchronised.

use std::io::{self, ErrorKind, Read, Write};

use crate::common::Position;
use crate::error::{ErrorSeverity, StorageError};
use crate::inventory::BinInventory;
use crate::item::{ItemId, ItemVariant, LookVector, VariantTag};

/// Version written by this crate.
pub const CURRENT_VERSION: i32 = 4;

/// First version that stores bins in the node record. Older records carry no
/// items and load as an empty inventory.
pub const FIRST_ITEM_RECORD_VERSION: i32 = 4;

/// Errors raised while encoding or decoding a node record.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("record header is truncated")]
    TruncatedHeader,

    #[error("amount {0} does not fit the record format")]
    AmountOutOfRange(u32),
}

impl StorageError for CodecError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io(_) => ErrorSeverity::Recoverable,
            Self::TruncatedHeader | Self::AmountOutOfRange(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "CODEC_IO",
            Self::TruncatedHeader => "CODEC_TRUNCATED_HEADER",
            Self::AmountOutOfRange(_) => "CODEC_AMOUNT_OUT_OF_RANGE",
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Encodes a whole node record into a fresh buffer.
pub fn encode(inventory: &BinInventory) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(8 + inventory.num_bins() * 16);
    write_inventory(&mut bytes, inventory)?;
    Ok(bytes)
}

/// Decodes a whole node record.
pub fn decode(mut bytes: &[u8]) -> Result<Vec<ItemVariant>> {
    read_inventory(&mut bytes)
}

/// Writes the version header followed by the bins.
pub fn write_inventory<W: Write>(writer: &mut W, inventory: &BinInventory) -> Result<()> {
    write_i32(writer, CURRENT_VERSION)?;
    write_bins(writer, inventory)
}

/// Writes the bin count and one tagged record per bin, in bin order.
pub fn write_bins<W: Write>(writer: &mut W, inventory: &BinInventory) -> Result<()> {
    let count = i32::try_from(inventory.num_bins())
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "too many bins"))?;
    write_i32(writer, count)?;
    for item in inventory.items() {
        write_item(writer, item)?;
    }
    Ok(())
}

/// Reads the version header, then the bins it gates.
pub fn read_inventory<R: Read>(reader: &mut R) -> Result<Vec<ItemVariant>> {
    let version = read_header_i32(reader)?;
    read_bins(reader, version)
}

/// Reads the bins of a record whose version is already known.
pub fn read_bins<R: Read>(reader: &mut R, version: i32) -> Result<Vec<ItemVariant>> {
    if version < FIRST_ITEM_RECORD_VERSION {
        tracing::debug!(version, "record predates stored bins, loading empty");
        return Ok(Vec::new());
    }

    let count = read_header_i32(reader)?;
    if count < 0 {
        tracing::warn!(count, "negative bin count, loading empty");
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    for index in 0..count {
        match read_item(reader) {
            Ok(Some(item)) if item.is_well_formed() => items.push(item),
            Ok(Some(item)) => {
                tracing::warn!(index, %item, "dropping malformed bin record");
            }
            Ok(None) => {
                tracing::warn!(index, "dropping bin record with invalid amount");
            }
            Err(RecordError::UnknownTag(tag)) => {
                tracing::warn!(index, tag, "unknown bin tag, ignoring remaining records");
                break;
            }
            Err(RecordError::Io(err)) if err.kind() == ErrorKind::UnexpectedEof => {
                tracing::warn!(index, "bin records truncated, ignoring remaining records");
                break;
            }
            Err(RecordError::Io(err)) => return Err(err.into()),
        }
    }
    Ok(items)
}

fn write_item<W: Write>(writer: &mut W, item: &ItemVariant) -> Result<()> {
    write_i32(writer, item.tag() as i32)?;
    match item {
        ItemVariant::PlainStack { id, amount } => {
            write_i32(writer, id.0)?;
            write_amount(writer, *amount)?;
        }
        ItemVariant::SubtypedStack {
            id,
            sub_kind,
            sub_value,
            amount,
        } => {
            write_i32(writer, id.0)?;
            write_i32(writer, *sub_kind)?;
            write_i32(writer, *sub_value)?;
            write_amount(writer, *amount)?;
        }
        ItemVariant::Single { id } => write_i32(writer, id.0)?,
        ItemVariant::Durability { id, current, max } => {
            write_i32(writer, id.0)?;
            write_i32(writer, *current)?;
            write_i32(writer, *max)?;
        }
        ItemVariant::Charged { id, level } => {
            write_i32(writer, id.0)?;
            write_i32(writer, *level)?;
        }
        ItemVariant::Located { id, location, look } => {
            write_i32(writer, id.0)?;
            write_i32(writer, location.x)?;
            write_i32(writer, location.y)?;
            write_i32(writer, location.z)?;
            write_f32(writer, look.x)?;
            write_f32(writer, look.y)?;
            write_f32(writer, look.z)?;
        }
    }
    Ok(())
}

enum RecordError {
    UnknownTag(i32),
    Io(io::Error),
}

impl From<io::Error> for RecordError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Reads one tagged record. `Ok(None)` means the record was fully consumed
/// but its amount cannot be represented.
fn read_item<R: Read>(reader: &mut R) -> std::result::Result<Option<ItemVariant>, RecordError> {
    let raw_tag = read_i32(reader)?;
    let tag = VariantTag::from_repr(raw_tag).ok_or(RecordError::UnknownTag(raw_tag))?;
    let id = ItemId(read_i32(reader)?);

    let item = match tag {
        VariantTag::PlainStack => {
            let amount = read_i32(reader)?;
            u32::try_from(amount)
                .ok()
                .map(|amount| ItemVariant::plain_stack(id, amount))
        }
        VariantTag::SubtypedStack => {
            let sub_kind = read_i32(reader)?;
            let sub_value = read_i32(reader)?;
            let amount = read_i32(reader)?;
            u32::try_from(amount)
                .ok()
                .map(|amount| ItemVariant::subtyped_stack(id, sub_kind, sub_value, amount))
        }
        VariantTag::Single => Some(ItemVariant::single(id)),
        VariantTag::Durability => {
            let current = read_i32(reader)?;
            let max = read_i32(reader)?;
            Some(ItemVariant::durability(id, current, max))
        }
        VariantTag::Charged => Some(ItemVariant::charged(id, read_i32(reader)?)),
        VariantTag::Located => {
            let location = Position::new(read_i32(reader)?, read_i32(reader)?, read_i32(reader)?);
            let look = LookVector::new(read_f32(reader)?, read_f32(reader)?, read_f32(reader)?);
            Some(ItemVariant::located(id, location, look))
        }
    };
    Ok(item)
}

fn write_amount<W: Write>(writer: &mut W, amount: u32) -> Result<()> {
    let amount = i32::try_from(amount).map_err(|_| CodecError::AmountOutOfRange(amount))?;
    write_i32(writer, amount)
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f32<W: Write>(writer: &mut W, value: f32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_header_i32<R: Read>(reader: &mut R) -> Result<i32> {
    read_i32(reader).map_err(|err| match err.kind() {
        ErrorKind::UnexpectedEof => CodecError::TruncatedHeader,
        _ => CodecError::Io(err),
    })
}

fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32<R: Read>(reader: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}
