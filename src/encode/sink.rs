use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    encode::{
        fseq::FseqWriter,
        xsq::{self, XsqExport, XsqMetadata},
    },
    foundation::{
        core::FrameBuffer,
        error::{ShowError, ShowResult},
    },
};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Channels per frame.
    pub channel_count: usize,
    /// Milliseconds per frame.
    pub step_time_ms: u8,
    /// Frames that will be pushed.
    pub frame_count: usize,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called in strictly increasing frame order between `begin` and `end`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ShowResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: usize, frame: &FrameBuffer) -> ShowResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> ShowResult<()>;
}

/// In-memory sink for tests and live callers.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<FrameBuffer>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames in time order.
    pub fn frames(&self) -> &[FrameBuffer] {
        &self.frames
    }

    /// Take the captured frames.
    pub fn into_frames(self) -> Vec<FrameBuffer> {
        self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ShowResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.frames.reserve(cfg.frame_count);
        Ok(())
    }

    fn push_frame(&mut self, _idx: usize, frame: &FrameBuffer) -> ShowResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> ShowResult<()> {
        Ok(())
    }
}

/// Streams frames into an FSEQ file, or keeps the bytes when no path is set.
#[derive(Debug, Default)]
pub struct FseqSink {
    out_path: Option<PathBuf>,
    writer: Option<FseqWriter>,
    bytes: Option<Vec<u8>>,
}

impl FseqSink {
    /// Sink that writes `out_path` on `end`.
    pub fn to_file(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: Some(out_path.into()),
            ..Self::default()
        }
    }

    /// Sink that keeps the encoded bytes.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Encoded file once `end` has run.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl FrameSink for FseqSink {
    fn begin(&mut self, cfg: SinkConfig) -> ShowResult<()> {
        self.writer = Some(FseqWriter::new(cfg.channel_count, cfg.step_time_ms)?);
        self.bytes = None;
        Ok(())
    }

    fn push_frame(&mut self, _idx: usize, frame: &FrameBuffer) -> ShowResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ShowError::validation("fseq sink: push_frame before begin"))?;
        writer.push(frame.as_slice())
    }

    fn end(&mut self) -> ShowResult<()> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| ShowError::validation("fseq sink: end before begin"))?;
        let bytes = writer.finish();
        if let Some(path) = &self.out_path {
            write_output(path, &bytes)?;
        }
        self.bytes = Some(bytes);
        Ok(())
    }
}

/// Collects frames and exports them as an xLights sequence on `end`.
#[derive(Debug)]
pub struct XsqSink {
    out_path: Option<PathBuf>,
    metadata: XsqMetadata,
    cfg: Option<SinkConfig>,
    frames: Vec<FrameBuffer>,
    export: Option<XsqExport>,
}

impl XsqSink {
    /// Sink that writes `out_path` on `end`; `None` keeps the document in memory.
    pub fn new(out_path: Option<PathBuf>, metadata: XsqMetadata) -> Self {
        Self {
            out_path,
            metadata,
            cfg: None,
            frames: Vec::new(),
            export: None,
        }
    }

    /// Finished export once `end` has run.
    pub fn export(&self) -> Option<&XsqExport> {
        self.export.as_ref()
    }

    /// Take the finished export.
    pub fn into_export(self) -> Option<XsqExport> {
        self.export
    }
}

impl FrameSink for XsqSink {
    fn begin(&mut self, cfg: SinkConfig) -> ShowResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.export = None;
        Ok(())
    }

    fn push_frame(&mut self, _idx: usize, frame: &FrameBuffer) -> ShowResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> ShowResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| ShowError::validation("xsq sink: end before begin"))?;
        let export = xsq::encode(
            &self.frames,
            cfg.channel_count,
            cfg.step_time_ms,
            &self.metadata,
        )?;
        if let Some(path) = &self.out_path {
            write_output(path, export.xml.as_bytes())?;
        }
        self.frames.clear();
        self.export = Some(export);
        Ok(())
    }
}

/// Write `bytes` to `path`, creating parent directories.
pub fn write_output(path: &Path, bytes: &[u8]) -> ShowResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create output directory '{}'", parent.display())
        })?;
    }
    std::fs::write(path, bytes).with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
