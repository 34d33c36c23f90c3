//! Video recording sinks.

use std::path::{Path, PathBuf};

use crate::backend::FrameImage;
use crate::error::{RenderError, RenderResult};
use crate::screenshot::save_image;

/// Consumer of recorded frames.
pub trait VideoSink {
    /// Appends one frame to the stream.
    fn push_frame(&mut self, frame: &FrameImage) -> RenderResult<()>;

    /// Flushes and closes the stream. Called once when recording stops.
    fn finish(&mut self) -> RenderResult<()> {
        Ok(())
    }

    /// Returns how many frames were accepted.
    fn frames_written(&self) -> u64;
}

/// Writes every frame as `frame_NNNNNN.png` into a directory.
///
/// All frames of one sequence must share the size of the first frame.
#[derive(Debug, Clone)]
pub struct PngSequenceWriter {
    directory: PathBuf,
    frame_size: Option<(u32, u32)>,
    frames_written: u64,
}

impl PngSequenceWriter {
    /// Creates a writer for `directory`. The directory is created on the first frame.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            frame_size: None,
            frames_written: 0,
        }
    }

    /// Returns the output directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the file the next frame is written to.
    #[must_use]
    pub fn next_frame_path(&self) -> PathBuf {
        self.directory
            .join(format!("frame_{:06}.png", self.frames_written))
    }
}

impl VideoSink for PngSequenceWriter {
    fn push_frame(&mut self, frame: &FrameImage) -> RenderResult<()> {
        match self.frame_size {
            None => {
                std::fs::create_dir_all(&self.directory)?;
                self.frame_size = Some((frame.width, frame.height));
            }
            Some((width, height)) if (width, height) != (frame.width, frame.height) => {
                return Err(RenderError::InvalidImageSize {
                    width: frame.width,
                    height: frame.height,
                });
            }
            Some(_) => {}
        }

        save_image(self.next_frame_path(), frame)?;
        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> RenderResult<()> {
        log::info!(
            "Wrote {} frames to {}",
            self.frames_written,
            self.directory.display()
        );
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cloudscope-video-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_writes_numbered_frames() {
        let dir = temp_dir("numbered");
        let mut writer = PngSequenceWriter::new(&dir);
        let frame = FrameImage::filled(4, 4, [0, 128, 255, 255]);

        writer.push_frame(&frame).unwrap();
        writer.push_frame(&frame).unwrap();
        writer.finish().unwrap();

        assert_eq!(writer.frames_written(), 2);
        assert!(dir.join("frame_000000.png").exists());
        assert!(dir.join("frame_000001.png").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rejects_size_change() {
        let dir = temp_dir("size-change");
        let mut writer = PngSequenceWriter::new(&dir);
        writer
            .push_frame(&FrameImage::filled(4, 4, [0, 0, 0, 255]))
            .unwrap();

        let err = writer
            .push_frame(&FrameImage::filled(8, 4, [0, 0, 0, 255]))
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidImageSize { width: 8, height: 4 }));
        assert_eq!(writer.frames_written(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
