//! Offset-table body encoding
//!
//! Every record is laid out as a fixed section followed by a heap. Fixed-width
//! fields live inline in the fixed section, little-endian. Variable-width
//! fields (strings, arrays, nested records that own variable data) occupy an
//! 8-byte slot: a `u32` offset measured from the start of the body and a
//! `u32` length. Their payload is appended to the end of the buffer in the
//! order the fields are written, so a reader can locate any fixed field in
//! O(1) and any variable field with one indirection.
//!
//! Records that are signed on their own (offers) are embedded detached: the
//! segment holds the record's standalone encoding, with its inner offsets
//! measured from the start of the record. Those bytes are the exact payload
//! the signer saw, wherever the record ends up.

use crate::error::{AssetAsmError, Result};

/// Width of a segment pointer: `u32` offset + `u32` length.
pub const SEGMENT_SLOT_SIZE: usize = 8;

/// Types that occupy a slot in a parent record's fixed section.
pub trait ByteSerialize {
    /// Bytes the value takes in the parent's fixed section.
    const SIZE: usize;

    /// Write the value into the slot starting at `at`. Variable-width parts
    /// are appended to the writer's heap.
    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()>;
}

/// Growable body buffer that hands out fixed sections and heap segments.
#[derive(Debug, Default)]
pub struct SegmentWriter {
    buf: Vec<u8>,
}

impl SegmentWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Current end of the buffer, i.e. where the next heap payload starts.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Append a zeroed region of `size` bytes and return its start.
    pub fn reserve(&mut self, size: usize) -> Result<usize> {
        let start = self.buf.len();
        self.buf.try_reserve(size)?;
        self.buf.resize(start + size, 0);
        Ok(start)
    }

    fn slot(&mut self, at: usize, width: usize) -> Result<&mut [u8]> {
        let available = self.buf.len();
        self.buf.get_mut(at..at + width).ok_or_else(|| {
            AssetAsmError::EncodingError(format!(
                "slot {}..{} outside of {} byte buffer",
                at,
                at + width,
                available
            ))
        })
    }

    pub fn put_u8(&mut self, at: usize, value: u8) -> Result<()> {
        self.slot(at, 1)?[0] = value;
        Ok(())
    }

    pub fn put_u16(&mut self, at: usize, value: u16) -> Result<()> {
        self.slot(at, 2)?.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn put_u32(&mut self, at: usize, value: u32) -> Result<()> {
        self.slot(at, 4)?.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn put_u64(&mut self, at: usize, value: u64) -> Result<()> {
        self.slot(at, 8)?.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn put_bytes(&mut self, at: usize, bytes: &[u8]) -> Result<()> {
        self.slot(at, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Run `payload` against the heap and point the slot at `at` to whatever
    /// it appended.
    pub fn put_segment<F>(&mut self, at: usize, payload: F) -> Result<()>
    where
        F: FnOnce(&mut SegmentWriter) -> Result<()>,
    {
        let start = self.position();
        payload(self)?;
        let length = self.position() - start;
        self.put_u32(at, checked_u32("segment offset", start)?)?;
        self.put_u32(at + 4, checked_u32("segment length", length)?)?;
        Ok(())
    }

    /// Append a nested record: a fixed section of `fixed_size` bytes whose
    /// start is passed to `fields`, followed by the record's own heap.
    pub fn put_record<F>(&mut self, at: usize, fixed_size: usize, fields: F) -> Result<()>
    where
        F: FnOnce(&mut SegmentWriter, usize) -> Result<()>,
    {
        self.put_segment(at, |writer| {
            let base = writer.reserve(fixed_size)?;
            fields(writer, base)
        })
    }

    /// Append a record encoded on its own, offsets relative to the record.
    pub fn put_detached_record<F>(&mut self, at: usize, fixed_size: usize, fields: F) -> Result<()>
    where
        F: FnOnce(&mut SegmentWriter, usize) -> Result<()>,
    {
        let raw = encode_body(fixed_size, fields)?;
        raw.as_slice().serialize_bytes(self, at)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Convert a buffer position to its `u32` wire form.
pub fn checked_u32(what: &str, value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| AssetAsmError::EncodingError(format!("{} {} exceeds u32", what, value)))
}

/// Encode a top-level record into a fresh body buffer.
pub fn encode_body<F>(fixed_size: usize, fields: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut SegmentWriter, usize) -> Result<()>,
{
    let mut writer = SegmentWriter::new();
    let base = writer.reserve(fixed_size)?;
    fields(&mut writer, base)?;
    checked_u32("body length", writer.position())?;
    Ok(writer.into_inner())
}

impl ByteSerialize for u8 {
    const SIZE: usize = 1;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_u8(at, *self)
    }
}

impl ByteSerialize for u16 {
    const SIZE: usize = 2;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_u16(at, *self)
    }
}

impl ByteSerialize for u32 {
    const SIZE: usize = 4;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_u32(at, *self)
    }
}

impl ByteSerialize for u64 {
    const SIZE: usize = 8;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_u64(at, *self)
    }
}

impl ByteSerialize for [u8] {
    const SIZE: usize = SEGMENT_SLOT_SIZE;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        writer.put_segment(at, |heap| {
            let start = heap.reserve(self.len())?;
            heap.put_bytes(start, self)
        })
    }
}

impl ByteSerialize for str {
    const SIZE: usize = SEGMENT_SLOT_SIZE;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        self.as_bytes().serialize_bytes(writer, at)
    }
}

impl ByteSerialize for String {
    const SIZE: usize = SEGMENT_SLOT_SIZE;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        self.as_str().serialize_bytes(writer, at)
    }
}

/// Arrays are a segment holding `len * T::SIZE` bytes of packed slots. For
/// fixed records that is the records themselves; for records that own
/// variable data each slot is a pointer to the element's own segment.
impl<T: ByteSerialize> ByteSerialize for Vec<T> {
    const SIZE: usize = SEGMENT_SLOT_SIZE;

    fn serialize_bytes(&self, writer: &mut SegmentWriter, at: usize) -> Result<()> {
        let stride = T::SIZE;
        writer.put_segment(at, |heap| {
            let total = self.len().checked_mul(stride).ok_or_else(|| {
                AssetAsmError::EncodingError("array length overflow".to_string())
            })?;
            let start = heap.reserve(total)?;
            for (index, item) in self.iter().enumerate() {
                item.serialize_bytes(heap, start + index * stride)?;
            }
            Ok(())
        })
    }
}

/// Field layout helper: tracks the running offset inside a fixed section.
#[derive(Debug)]
pub struct FieldCursor {
    at: usize,
}

impl FieldCursor {
    pub fn new(base: usize) -> Self {
        Self { at: base }
    }

    /// Write `value` at the current offset and advance past its slot.
    pub fn field<T: ByteSerialize + ?Sized>(
        &mut self,
        writer: &mut SegmentWriter,
        value: &T,
    ) -> Result<()> {
        value.serialize_bytes(writer, self.at)?;
        self.at += T::SIZE;
        Ok(())
    }
}
