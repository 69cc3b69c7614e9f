use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Frame duration that maps to an animation ratio of exactly 1.0 (60 Hz).
pub const DEFAULT_REFERENCE_FRAME: Duration = Duration::from_nanos(16_666_667);

/// Per-frame time scaling published by the hosting scene.
pub trait SceneClock {
    fn animation_ratio(&self) -> f32;
}

/// Shared handle to the active scene clock; `None` when no scene is active.
pub type SceneHandle = Option<Rc<dyn SceneClock>>;

/// Clock that always reports the same ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRatio(pub f32);

impl SceneClock for FixedRatio {
    fn animation_ratio(&self) -> f32 {
        self.0
    }
}

/// Derives the animation ratio from wall-clock frame deltas.
///
/// A frame lasting exactly `reference_frame` yields 1.0, a frame twice as long
/// yields 2.0. The ratio is held until the next `begin_frame`, so textures
/// rendered within one frame all observe the same value.
#[derive(Debug)]
pub struct FrameClock {
    reference_frame: Duration,
    last_frame: Cell<Option<Instant>>,
    ratio: Cell<f32>,
}

impl FrameClock {
    pub fn new(reference_frame: Duration) -> Self {
        Self {
            reference_frame,
            last_frame: Cell::new(None),
            ratio: Cell::new(1.0),
        }
    }

    pub fn reference_frame(&self) -> Duration {
        self.reference_frame
    }

    /// Marks the start of a frame and recomputes the ratio.
    pub fn begin_frame(&self, now: Instant) -> f32 {
        let ratio = match self.last_frame.replace(Some(now)) {
            None => 1.0,
            Some(previous) => {
                let delta = now.saturating_duration_since(previous);
                delta.as_secs_f32() / self.reference_frame.as_secs_f32().max(f32::EPSILON)
            }
        };
        self.ratio.set(ratio);
        ratio
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_FRAME)
    }
}

impl SceneClock for FrameClock {
    fn animation_ratio(&self) -> f32 {
        self.ratio.get()
    }
}
