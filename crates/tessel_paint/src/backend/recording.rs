//! Deferred recording
//!
//! A [`Recording`] is the target of a recorder context: every state change
//! and drawing command is appended as a [`Record`] instead of being drawn.
//! Playback and serialization are left to the owner of the recording.

use tessel_core::{Affine2D, CombineMode, GraphicsError, MatrixOrder, Path, Rect, Region, Result};

use crate::backend::HintChange;
use crate::command::DrawCommand;
use crate::state::StateToken;

/// Change to the world transform
#[derive(Clone, Debug, PartialEq)]
pub enum TransformChange {
    Reset,
    Set(Affine2D),
    Multiply { matrix: Affine2D, order: MatrixOrder },
    /// Rotation in degrees
    Rotate { angle: f32, order: MatrixOrder },
    Scale { sx: f32, sy: f32, order: MatrixOrder },
    Translate { dx: f32, dy: f32, order: MatrixOrder },
}

/// Clip geometry as the caller supplied it
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedClip {
    Rect(Rect),
    Path(Path),
    Region(Region),
}

/// Change to the clip
#[derive(Clone, Debug, PartialEq)]
pub enum ClipChange {
    Reset,
    Combine { shape: RecordedClip, mode: CombineMode },
    Translate { dx: f32, dy: f32 },
}

/// One recorded instruction
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Transform(TransformChange),
    Clip(ClipChange),
    Hint(HintChange),
    Save(StateToken),
    Restore(StateToken),
    BeginContainer(StateToken),
    EndContainer(StateToken),
    Draw(DrawCommand),
}

/// Ordered list of records with a start/stop lifecycle
#[derive(Clone, Debug, Default)]
pub struct Recording {
    frame: Rect,
    records: Vec<Record>,
    recording: bool,
}

impl Recording {
    /// Empty, stopped recording covering `frame`
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            records: Vec::new(),
            recording: false,
        }
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn start(&mut self) {
        tracing::debug!(frame = ?self.frame, "recording started");
        self.recording = true;
    }

    pub fn stop(&mut self) {
        tracing::debug!(records = self.records.len(), "recording stopped");
        self.recording = false;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn take_records(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn push(&mut self, record: Record) -> Result<()> {
        if !self.recording {
            return Err(GraphicsError::Generic);
        }
        tracing::trace!(?record, "record");
        self.records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_requires_started() {
        let mut recording = Recording::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(recording.push(Record::Clip(ClipChange::Reset)).is_err());

        recording.start();
        recording.push(Record::Clip(ClipChange::Reset)).unwrap();
        assert_eq!(recording.len(), 1);

        recording.stop();
        assert!(!recording.is_recording());
        assert_eq!(recording.take_records().len(), 1);
        assert!(recording.is_empty());
    }
}
