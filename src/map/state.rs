use std::fmt::Display;

use super::region::RegionId;

/// Step of an open or close sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
  OpeningPanel,
  FlyingToBounds,
  Open,
  ClosingFlying,
  ClosingPanel,
}

/// What the widget is doing. Panel width and camera motion follow from this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
  #[default]
  Idle,
  Panning,
  Animating(RegionId, Phase),
  Selected(RegionId),
}

impl InteractionState {
  /// The region shown or about to be shown in the side panel.
  #[must_use]
  pub fn region(&self) -> Option<RegionId> {
    match self {
      InteractionState::Animating(region, _) | InteractionState::Selected(region) => Some(*region),
      InteractionState::Idle | InteractionState::Panning => None,
    }
  }

  /// A settled selection is in phase [`Phase::Open`].
  #[must_use]
  pub fn phase(&self) -> Option<Phase> {
    match self {
      InteractionState::Animating(_, phase) => Some(*phase),
      InteractionState::Selected(_) => Some(Phase::Open),
      InteractionState::Idle | InteractionState::Panning => None,
    }
  }

  #[must_use]
  pub fn has_selection(&self) -> bool {
    self.region().is_some()
  }

  #[must_use]
  pub fn is_panning(&self) -> bool {
    *self == InteractionState::Panning
  }
}

impl Display for InteractionState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      InteractionState::Idle => write!(f, "idle"),
      InteractionState::Panning => write!(f, "panning"),
      InteractionState::Animating(region, phase) => write!(f, "animating {region} ({phase:?})"),
      InteractionState::Selected(region) => write!(f, "selected {region}"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn selection_queries() {
    assert!(!InteractionState::Idle.has_selection());
    assert!(!InteractionState::Panning.has_selection());
    assert!(InteractionState::Panning.is_panning());

    let opening = InteractionState::Animating(RegionId::Usa, Phase::OpeningPanel);
    assert_eq!(opening.region(), Some(RegionId::Usa));
    assert_eq!(opening.phase(), Some(Phase::OpeningPanel));

    let selected = InteractionState::Selected(RegionId::Dane);
    assert!(selected.has_selection());
    assert_eq!(selected.phase(), Some(Phase::Open));
  }

  #[test]
  fn display() {
    assert_eq!(
      InteractionState::Animating(RegionId::Greco, Phase::ClosingPanel).to_string(),
      "animating GRECO (ClosingPanel)"
    );
  }
}
