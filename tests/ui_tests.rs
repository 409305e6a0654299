use eframe::App;
use egui_kittest::Harness;
use egui_kittest::kittest::Queryable;
use regionmap::{
  RegionId,
  config::Config,
  map::{map_event::LayerId, state::InteractionState},
  regionmap_ui::RegionMapApp,
};

fn test_config() -> Config {
  Config {
    config_path: None,
    access_token: Some("test-token".to_string()),
    style_url: None,
    asset_root: Some(
      std::env::temp_dir()
        .join("regionmap-missing-assets")
        .display()
        .to_string(),
    ),
  }
}

fn harness(initial_selection: Option<RegionId>) -> Harness<'static, RegionMapApp> {
  let app = RegionMapApp::new(egui::Context::default(), &test_config(), initial_selection)
    .expect("app with token");
  Harness::new_ui_state(
    |ui, app: &mut RegionMapApp| {
      let mut frame = eframe::Frame::_new_kittest();
      app.logic(ui.ctx(), &mut frame);
      app.ui(ui, &mut frame);
    },
    app,
  )
}

/// Steps frames until `done` holds, giving up after a few hundred frames.
fn step_until(
  harness: &mut Harness<'static, RegionMapApp>,
  done: impl Fn(&RegionMapApp) -> bool,
) {
  for _ in 0..400 {
    if done(harness.state()) {
      return;
    }
    harness.step();
  }
  panic!("condition not reached");
}

#[test]
fn missing_token_is_an_error() {
  let config = Config {
    access_token: None,
    ..test_config()
  };
  assert!(RegionMapApp::new(egui::Context::default(), &config, None).is_err());
}

#[tokio::test]
async fn first_frame_installs_overlays() {
  let mut harness = harness(None);
  harness.step();

  let app = harness.state();
  assert!(app.map().is_loaded());
  let surface = app.map().surface();
  assert!(
    surface
      .layer_ids()
      .contains(&LayerId::new("usa-countries"))
  );
  assert_eq!(
    surface.marker_labels(),
    vec!["USA", "GRECO", "INDO", "DANE", "ABOUT ME"]
  );
}

#[tokio::test]
async fn panel_opens_and_closes() {
  let mut harness = harness(Some(RegionId::Dane));
  step_until(&mut harness, |app| {
    app.map().state() == InteractionState::Selected(RegionId::Dane)
  });
  harness.step();

  harness.get_by_label("Dane County");
  harness.get_by_label("Story map of the project");
  harness.get_by_label("Close").click();

  step_until(&mut harness, |app| {
    app.map().state() == InteractionState::Idle && !app.map().is_guarded()
  });
  assert!(app_panel_closed(harness.state()));
}

fn app_panel_closed(app: &RegionMapApp) -> bool {
  app.map().panel_width() < f32::EPSILON
}

#[tokio::test]
async fn clicking_empty_map_restarts_the_idle_countdown() {
  let mut harness = harness(None);
  harness.step();
  harness.step();
  let before = harness
    .state()
    .map()
    .idle_pan()
    .next_deadline()
    .expect("idle countdown after load");

  let ocean = egui::pos2(50., 550.);
  harness.hover_at(ocean);
  harness.drag_at(ocean);
  harness.step();
  harness.drop_at(ocean);
  harness.step();
  harness.step();

  let app = harness.state();
  assert_eq!(app.map().state(), InteractionState::Idle);
  assert!(app.map().idle_pan().is_idle_timer_armed());
  let after = app.map().idle_pan().next_deadline().expect("idle countdown after click");
  assert!(after > before, "{after:?} <= {before:?}");
}
