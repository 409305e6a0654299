use std::time::Duration;

use log::{debug, warn};

use super::{
  animation::WidthAnimation,
  region::{DEFAULT_CENTER, DEFAULT_ZOOM, RegionId},
  state::{InteractionState, Phase},
  surface::{CameraControl, FitBounds, FlyTo},
  timer::{Timer, TimerSlot},
};

/// Duration of the fit-bounds and fly-back camera motions.
pub const CAMERA_DURATION: Duration = Duration::from_millis(2000);
/// Pause between the panel being fully open and the camera starting to move.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);
/// The guard outlives a close sequence by this much.
pub const GUARD_GRACE: Duration = Duration::from_millis(100);
/// Screen pixels kept free around a region when fitting it.
pub const FIT_PADDING: f32 = 100.;

/// Scheduled step of an open or close sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingStep {
  FitBounds,
  FinishOpening,
  ShrinkPanel,
  ReleaseGuard,
}

/// A sequence ran to its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
  Opened(RegionId),
  Closed,
}

/// Opens and closes the region side panel.
///
/// Only one open or close sequence runs at a time. While one is in flight the guard is set
/// and further requests are dropped.
#[derive(Debug)]
pub struct SelectionMachine {
  guard: bool,
  panel_width: f32,
  width_animation: Option<WidthAnimation>,
  phase_timer: TimerSlot<PendingStep>,
}

impl Default for SelectionMachine {
  fn default() -> Self {
    Self::new()
  }
}

impl SelectionMachine {
  #[must_use]
  pub fn new() -> Self {
    Self {
      guard: false,
      panel_width: 0.,
      width_animation: None,
      phase_timer: TimerSlot::new("selection phase"),
    }
  }

  #[must_use]
  pub fn is_guarded(&self) -> bool {
    self.guard
  }

  #[must_use]
  pub fn panel_width(&self) -> f32 {
    self.panel_width
  }

  /// Starts opening the panel for `region`. Returns `false` if the request was dropped.
  ///
  /// The panel grows to half of `viewport_width`.
  pub fn open(
    &mut self,
    region: RegionId,
    now: Duration,
    viewport_width: f32,
    state: &mut InteractionState,
  ) -> bool {
    if self.guard {
      debug!("Dropping selection of {region}, {state} in progress.");
      return false;
    }
    self.guard = true;
    self.phase_timer.cancel();

    let target = (viewport_width / 2.).max(0.);
    debug!("Opening panel for {region} to {target}px.");
    *state = InteractionState::Animating(region, Phase::OpeningPanel);
    self.panel_width = 0.;
    self.width_animation = Some(WidthAnimation::new(now, 0., target));
    true
  }

  /// Flies back to the default view and then closes the panel. Returns `false` if the
  /// request was dropped.
  pub fn close(
    &mut self,
    now: Duration,
    state: &mut InteractionState,
    camera: &mut impl CameraControl,
  ) -> bool {
    if self.guard {
      debug!("Dropping close request, {state} in progress.");
      return false;
    }
    let Some(region) = state.region() else {
      debug!("Nothing selected, nothing to close.");
      return false;
    };
    self.guard = true;

    debug!("Closing panel of {region}.");
    *state = InteractionState::Animating(region, Phase::ClosingFlying);
    camera.fly_to(FlyTo {
      center: DEFAULT_CENTER,
      zoom: DEFAULT_ZOOM,
      duration: CAMERA_DURATION,
    });
    self
      .phase_timer
      .arm_with(Timer::timeout(now, CAMERA_DURATION), PendingStep::ShrinkPanel);
    true
  }

  #[must_use]
  pub fn next_deadline(&self) -> Option<Duration> {
    let animation = self
      .width_animation
      .as_ref()
      .and_then(WidthAnimation::next_deadline);
    match (animation, self.phase_timer.deadline()) {
      (Some(a), Some(b)) => Some(a.min(b)),
      (a, b) => a.or(b),
    }
  }

  /// Runs the step due at `now`, if any.
  pub fn fire(
    &mut self,
    now: Duration,
    state: &mut InteractionState,
    camera: &mut impl CameraControl,
  ) -> Option<Completion> {
    if let Some((at, step)) = self
      .width_animation
      .as_mut()
      .and_then(|animation| animation.tick(now))
    {
      self.panel_width = step.width;
      camera.resize();
      if step.finished {
        self.width_animation = None;
        self.width_reached(at, state);
      }
      return None;
    }

    let (at, step) = self.phase_timer.take_due(now)?;
    let region = state.region();
    match (step, region) {
      (PendingStep::FitBounds, Some(region)) => {
        camera.fit_bounds(FitBounds {
          bounds: super::region::region(region).bounds,
          padding: FIT_PADDING,
          duration: CAMERA_DURATION,
          max_zoom: region.max_fit_zoom(),
        });
        self
          .phase_timer
          .arm_with(Timer::timeout(at, CAMERA_DURATION), PendingStep::FinishOpening);
        None
      }
      (PendingStep::FinishOpening, Some(region)) => {
        *state = InteractionState::Selected(region);
        self.guard = false;
        debug!("Panel for {region} is open.");
        Some(Completion::Opened(region))
      }
      (PendingStep::ShrinkPanel, Some(region)) => {
        *state = InteractionState::Animating(region, Phase::ClosingPanel);
        self.width_animation = Some(WidthAnimation::new(at, self.panel_width, 0.));
        None
      }
      (PendingStep::ReleaseGuard, _) => {
        self.guard = false;
        Some(Completion::Closed)
      }
      (step, None) => {
        warn!("{step:?} without a selected region, releasing the guard.");
        self.guard = false;
        None
      }
    }
  }

  fn width_reached(&mut self, at: Duration, state: &mut InteractionState) {
    match *state {
      InteractionState::Animating(region, Phase::OpeningPanel) => {
        *state = InteractionState::Animating(region, Phase::FlyingToBounds);
        self
          .phase_timer
          .arm_with(Timer::timeout(at, SETTLE_DELAY), PendingStep::FitBounds);
      }
      InteractionState::Animating(region, Phase::ClosingPanel) => {
        debug!("Panel of {region} is closed.");
        *state = InteractionState::Idle;
        self
          .phase_timer
          .arm_with(Timer::timeout(at, GUARD_GRACE), PendingStep::ReleaseGuard);
      }
      other => warn!("Panel width animation ended in unexpected state {other}."),
    }
  }

  /// Stops any running sequence, used on teardown.
  pub fn cancel(&mut self) {
    self.width_animation = None;
    self.phase_timer.cancel();
  }
}
