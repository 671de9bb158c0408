use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, SeamloopError};
use crate::video::prober::{DurationEstimator, ProbeReport};

/// Playback direction of a clip view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Reversed,
}

impl Direction {
    /// Direction of the repetition at `index` when ping-pong alternation is on.
    ///
    /// Index 0 is always forward; with `alternate` set, every odd index plays
    /// the window backwards.
    pub fn for_index(index: usize, alternate: bool) -> Self {
        if alternate && index % 2 == 1 {
            Direction::Reversed
        } else {
            Direction::Forward
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reversed,
            Direction::Reversed => Direction::Forward,
        }
    }

    pub fn is_reversed(self) -> bool {
        self == Direction::Reversed
    }
}

/// A probed input file
///
/// Holds the resolved duration alongside the full probe report so both
/// duration estimates stay visible to anyone holding a clip.
#[derive(Debug, Clone)]
pub struct MediaSource {
    path: PathBuf,
    report: ProbeReport,
    duration: f64,
    estimator: DurationEstimator,
    fps: f64,
}

impl MediaSource {
    /// Build a source from a probe report.
    ///
    /// Fails with `DurationUnknown` when neither estimator produced a usable
    /// duration, and with `InputUnreadable` when the report has no usable
    /// video stream geometry or frame rate.
    pub fn from_report<P: Into<PathBuf>>(
        path: P,
        report: ProbeReport,
        prefer: DurationEstimator,
    ) -> Result<Self> {
        let path = path.into();
        let shown = path.display().to_string();

        let (duration, estimator) =
            report
                .duration(prefer)
                .ok_or_else(|| SeamloopError::DurationUnknown {
                    path: shown.clone(),
                    reason: "neither the stream nor the container reported a duration".to_string(),
                })?;

        let fps = report
            .fps
            .ok_or_else(|| SeamloopError::input_unreadable(&shown, "video stream has no frame rate"))?;

        if report.width == 0 || report.height == 0 {
            return Err(SeamloopError::input_unreadable(
                &shown,
                format!("invalid video dimensions {}x{}", report.width, report.height),
            ));
        }

        Ok(Self {
            path,
            report,
            duration,
            estimator,
            fps,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn report(&self) -> &ProbeReport {
        &self.report
    }

    /// Authoritative duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Which estimator the authoritative duration came from
    pub fn estimator(&self) -> DurationEstimator {
        self.estimator
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.report.width, self.report.height)
    }

    pub fn has_audio(&self) -> bool {
        self.report.has_audio
    }
}

/// An immutable view onto a window of a [`MediaSource`]
///
/// `start` and `end` are in source time. Deriving a sub-range or a reversed
/// view never touches the original; all views share the same source.
#[derive(Debug, Clone)]
pub struct MediaClip {
    source: Arc<MediaSource>,
    start: f64,
    end: f64,
    direction: Direction,
}

impl MediaClip {
    /// A forward view covering the whole source
    pub fn from_source(source: Arc<MediaSource>) -> Self {
        let end = source.duration();
        Self {
            source,
            start: 0.0,
            end,
            direction: Direction::Forward,
        }
    }

    pub fn source(&self) -> &Arc<MediaSource> {
        &self.source
    }

    /// Window start in source time
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Window end in source time
    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_reversed(&self) -> bool {
        self.direction.is_reversed()
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn fps(&self) -> f64 {
        self.source.fps()
    }

    pub fn frame_count(&self) -> u64 {
        (self.duration() * self.fps()).round().max(0.0) as u64
    }

    /// View of `[from, to)` in this clip's own playback time.
    ///
    /// Bounds are not validated here; see [`crate::video::Trimmer`] for the
    /// checked entry point.
    pub fn subclip(&self, from: f64, to: f64) -> MediaClip {
        let (start, end) = match self.direction {
            Direction::Forward => (self.start + from, self.start + to),
            Direction::Reversed => (self.end - to, self.end - from),
        };

        MediaClip {
            source: Arc::clone(&self.source),
            start,
            end,
            direction: self.direction,
        }
    }

    /// The same window played backwards
    pub fn reversed(&self) -> MediaClip {
        MediaClip {
            source: Arc::clone(&self.source),
            start: self.start,
            end: self.end,
            direction: self.direction.flipped(),
        }
    }

    /// True when both views read the same source window, ignoring direction
    pub fn same_window(&self, other: &MediaClip) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
            && self.start == other.start
            && self.end == other.end
    }
}
