//! FSEQ v2 container, uncompressed only.
//!
//! Layout (little-endian):
//!
//! | offset | size | field                      |
//! |-------:|-----:|----------------------------|
//! | 0      | 4    | magic `PSEQ`               |
//! | 4      | 2    | data offset (24)           |
//! | 6      | 1    | minor version (0)          |
//! | 7      | 1    | major version (2)          |
//! | 8      | 2    | variable header offset (0) |
//! | 10     | 4    | channels per frame         |
//! | 14     | 4    | frame count                |
//! | 18     | 1    | step time in ms            |
//! | 19     | 1    | flags (0)                  |
//! | 20     | 2    | compression descriptor (0) |
//! | 22     | 1    | sparse range count (0)     |
//! | 23     | 1    | reserved (0)               |
//!
//! Frame data follows at the data offset, frames concatenated in time order.

use crate::foundation::{
    core::{DEFAULT_STEP_TIME_MS, FrameBuffer},
    error::{ShowError, ShowResult},
};

/// File magic.
pub const MAGIC: [u8; 4] = *b"PSEQ";
/// Size of the fixed header.
pub const HEADER_LEN: usize = 24;
/// Major version written and accepted.
pub const MAJOR_VERSION: u8 = 2;
/// Minor version written.
pub const MINOR_VERSION: u8 = 0;

/// Fixed header fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FseqHeader {
    /// Byte offset of the first frame.
    pub data_offset: u16,
    /// Minor version.
    pub minor_version: u8,
    /// Major version.
    pub major_version: u8,
    /// Offset of the variable header block, 0 when absent.
    pub var_header_offset: u16,
    /// Channels per frame.
    pub channel_count: u32,
    /// Number of frames.
    pub frame_count: u32,
    /// Milliseconds per frame.
    pub step_time_ms: u8,
    /// Flags byte.
    pub flags: u8,
    /// Compression type and block count; 0 for uncompressed data.
    pub compression: u16,
    /// Number of sparse ranges.
    pub sparse_range_count: u8,
    /// Reserved byte.
    pub reserved: u8,
}

impl FseqHeader {
    /// Header for an uncompressed sequence.
    pub fn uncompressed(channel_count: u32, frame_count: u32, step_time_ms: u8) -> Self {
        Self {
            data_offset: HEADER_LEN as u16,
            minor_version: MINOR_VERSION,
            major_version: MAJOR_VERSION,
            var_header_offset: 0,
            channel_count,
            frame_count,
            step_time_ms,
            flags: 0,
            compression: 0,
            sparse_range_count: 0,
            reserved: 0,
        }
    }

    /// `"major.minor"`.
    pub fn version(&self) -> String {
        format!("{}.{}", self.major_version, self.minor_version)
    }

    /// Sequence length in seconds.
    pub fn duration_secs(&self) -> f64 {
        f64::from(self.frame_count) * f64::from(self.step_time_ms) / 1000.0
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.data_offset.to_le_bytes());
        out.push(self.minor_version);
        out.push(self.major_version);
        out.extend_from_slice(&self.var_header_offset.to_le_bytes());
        out.extend_from_slice(&self.channel_count.to_le_bytes());
        out.extend_from_slice(&self.frame_count.to_le_bytes());
        out.push(self.step_time_ms);
        out.push(self.flags);
        out.extend_from_slice(&self.compression.to_le_bytes());
        out.push(self.sparse_range_count);
        out.push(self.reserved);
    }

    fn read_from(bytes: &[u8]) -> ShowResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(ShowError::format(format!(
                "fseq header needs {HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[0..4] != MAGIC {
            return Err(ShowError::format("not an fseq file (PSEQ magic missing)"));
        }
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Ok(Self {
            data_offset: u16_at(4),
            minor_version: bytes[6],
            major_version: bytes[7],
            var_header_offset: u16_at(8),
            channel_count: u32_at(10),
            frame_count: u32_at(14),
            step_time_ms: bytes[18],
            flags: bytes[19],
            compression: u16_at(20),
            sparse_range_count: bytes[22],
            reserved: bytes[23],
        })
    }
}

/// A decoded sequence: header plus frame bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FseqSequence {
    /// Header as read, with a zero step time replaced by the default.
    pub header: FseqHeader,
    data: Vec<u8>,
}

impl FseqSequence {
    /// Bytes of frame `index`, or `None` past the last frame.
    pub fn get_frame(&self, index: usize) -> Option<&[u8]> {
        if index >= self.header.frame_count as usize {
            return None;
        }
        let n = self.header.channel_count as usize;
        self.data.get(index * n..(index + 1) * n)
    }

    /// Frames in time order.
    pub fn frames(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.header.frame_count as usize).filter_map(|i| self.get_frame(i))
    }

    /// Copy every frame into a [`FrameBuffer`].
    pub fn to_frame_buffers(&self) -> Vec<FrameBuffer> {
        self.frames()
            .map(|f| FrameBuffer::from_vec(f.to_vec()))
            .collect()
    }

    /// Sequence length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.header.duration_secs()
    }
}

/// Encode frames sharing `channel_count` into an uncompressed FSEQ v2 file.
pub fn encode<F: AsRef<[u8]>>(
    frames: &[F],
    channel_count: usize,
    step_time_ms: u8,
) -> ShowResult<Vec<u8>> {
    let mut writer = FseqWriter::new(channel_count, step_time_ms)?;
    for frame in frames {
        writer.push(frame.as_ref())?;
    }
    Ok(writer.finish())
}

/// Decode an uncompressed FSEQ v2 file.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode(bytes: &[u8]) -> ShowResult<FseqSequence> {
    let mut header = FseqHeader::read_from(bytes)?;
    if header.major_version != MAJOR_VERSION {
        return Err(ShowError::format(format!(
            "unsupported fseq major version {}",
            header.major_version
        )));
    }
    if usize::from(header.data_offset) < HEADER_LEN {
        return Err(ShowError::format(format!(
            "fseq data offset {} is inside the header",
            header.data_offset
        )));
    }
    if header.compression != 0 {
        return Err(ShowError::format(format!(
            "unsupported compression type {} (descriptor {:#06x})",
            header.compression & 0x0f,
            header.compression
        )));
    }
    if header.sparse_range_count != 0 {
        return Err(ShowError::format(format!(
            "unsupported sparse ranges ({})",
            header.sparse_range_count
        )));
    }
    if header.channel_count == 0 && header.frame_count > 0 {
        return Err(ShowError::format("fseq channel count must be > 0"));
    }
    if header.step_time_ms == 0 {
        header.step_time_ms = DEFAULT_STEP_TIME_MS;
    }

    let start = usize::from(header.data_offset);
    let len = (header.frame_count as usize)
        .checked_mul(header.channel_count as usize)
        .ok_or_else(|| ShowError::format("fseq frame data size overflows"))?;
    let data = bytes
        .get(start..)
        .and_then(|rest| rest.get(..len))
        .ok_or_else(|| {
            ShowError::format(format!(
                "fseq frame data truncated: need {len} bytes at offset {start}, file has {}",
                bytes.len()
            ))
        })?;

    Ok(FseqSequence {
        header,
        data: data.to_vec(),
    })
}

/// Incremental encoder; the header is written once the frame count is known.
#[derive(Debug)]
pub struct FseqWriter {
    channel_count: usize,
    step_time_ms: u8,
    frame_count: u32,
    data: Vec<u8>,
}

impl FseqWriter {
    /// Start a sequence of `channel_count`-byte frames.
    pub fn new(channel_count: usize, step_time_ms: u8) -> ShowResult<Self> {
        if channel_count == 0 {
            return Err(ShowError::validation("fseq channel count must be > 0"));
        }
        if u32::try_from(channel_count).is_err() {
            return Err(ShowError::validation(format!(
                "fseq channel count {channel_count} does not fit in 32 bits"
            )));
        }
        if step_time_ms == 0 {
            return Err(ShowError::validation("fseq step time must be >= 1 ms"));
        }
        Ok(Self {
            channel_count,
            step_time_ms,
            frame_count: 0,
            data: Vec::new(),
        })
    }

    /// Append one frame.
    pub fn push(&mut self, frame: &[u8]) -> ShowResult<()> {
        if frame.len() != self.channel_count {
            return Err(ShowError::validation(format!(
                "frame {} has {} channels, expected {}",
                self.frame_count,
                frame.len(),
                self.channel_count
            )));
        }
        self.frame_count = self
            .frame_count
            .checked_add(1)
            .ok_or_else(|| ShowError::validation("fseq frame count overflows 32 bits"))?;
        self.data.extend_from_slice(frame);
        Ok(())
    }

    /// Frames pushed so far.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Emit the complete file.
    pub fn finish(self) -> Vec<u8> {
        let header = FseqHeader::uncompressed(
            self.channel_count as u32,
            self.frame_count,
            self.step_time_ms,
        );
        let mut out = Vec::with_capacity(HEADER_LEN + self.data.len());
        header.write_to(&mut out);
        out.extend_from_slice(&self.data);
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/fseq.rs"]
mod tests;
