use std::{
  sync::mpsc::{Receiver, Sender, channel},
  time::Duration,
};

use egui::RichText;
use log::{debug, info, warn};

use crate::{
  boundary_loader::{AssetSource, BoundaryError, BoundaryGeometry, fetch_boundary},
  config::Config,
  map::{
    regionmap_egui::EguiMapSurface,
    region::{RegionId, region, regions},
    widget::RegionMap,
  },
  panel::panel_content,
};

type BoundaryResult = (RegionId, Result<BoundaryGeometry, BoundaryError>);

/// The region map with its side panel.
pub struct RegionMapApp {
  map: RegionMap<EguiMapSurface>,
  boundaries: Receiver<BoundaryResult>,
  initial_selection: Option<RegionId>,
  help_open: bool,
}

impl RegionMapApp {
  /// Creates the app and starts fetching boundary documents.
  ///
  /// Needs a configured access token. Fetching needs a running tokio runtime, without one the
  /// boundary overlays are left out.
  pub fn new(
    ctx: egui::Context,
    config: &Config,
    initial_selection: Option<RegionId>,
  ) -> anyhow::Result<Self> {
    let access_token = config.access_token()?;
    let assets: AssetSource = config.asset_root().parse()?;
    info!("Map style {}, assets from {assets}.", config.style_url());

    let (sender, boundaries) = channel();
    spawn_boundary_fetches(&assets, &sender, &ctx);

    let surface = EguiMapSurface::new(config.style_url(), access_token);
    let width = ctx.content_rect().width();
    Ok(Self {
      map: RegionMap::new(surface, width),
      boundaries,
      initial_selection,
      help_open: false,
    })
  }

  #[must_use]
  pub fn map(&self) -> &RegionMap<EguiMapSurface> {
    &self.map
  }

  pub fn map_mut(&mut self) -> &mut RegionMap<EguiMapSurface> {
    &mut self.map
  }

  fn receive_boundaries(&mut self) {
    while let Ok((id, geometry)) = self.boundaries.try_recv() {
      self.map.provide_boundary(id, geometry);
    }
  }

  fn toggle_help(&mut self) {
    self.help_open = !self.help_open;
    self.map.set_popup_open(self.help_open);
  }

  fn show_help(&mut self, ctx: &egui::Context) {
    if !self.help_open {
      return;
    }
    let mut open = true;
    egui::Window::new("Help")
      .collapsible(false)
      .resizable(false)
      .anchor(egui::Align2::LEFT_TOP, egui::vec2(10., 10.))
      .open(&mut open)
      .show(ctx, |ui| {
        ui.label("Click a region or its label to read about it.");
        ui.label("The map starts to drift after ten quiet seconds.");
        ui.label("F1 toggles this window.");
      });
    if !open {
      self.toggle_help();
    }
  }

  fn show_panel(&mut self, ui: &mut egui::Ui) {
    let width = self.map.panel_width();
    let Some(id) = self.map.state().region() else {
      return;
    };
    if width < 1. {
      return;
    }
    let content = panel_content(id);
    let mut close = false;
    egui::Panel::right("region_panel")
      .exact_size(width)
      .resizable(false)
      .show_inside(ui, |ui| {
        ui.horizontal(|ui| {
          ui.heading(RichText::new(content.title).color(region(id).color));
          ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
            close = ui.button("Close").clicked();
          });
        });
        ui.separator();
        egui::ScrollArea::vertical().show(ui, |ui| {
          for paragraph in content.paragraphs {
            ui.label(*paragraph);
            ui.add_space(8.);
          }
          if let Some(link) = content.link {
            ui.hyperlink_to(link.text, link.url);
          }
        });
      });
    if close && !self.map.close() {
      debug!("Close ignored while the panel is moving.");
    }
  }

  fn schedule_repaint(&self, ctx: &egui::Context, now: Duration) {
    if self.map.surface().is_moving() || self.map.is_guarded() {
      ctx.request_repaint();
    } else if let Some(deadline) = self.map.next_deadline() {
      ctx.request_repaint_after(deadline.saturating_sub(now));
    }
  }
}

impl eframe::App for RegionMapApp {
  fn logic(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
    let now = Duration::from_secs_f64(ctx.input(|i| i.time).max(0.));
    self.map.surface_mut().set_clock(now);
    self.map.advance(now);
    self.receive_boundaries();
    self.map.set_viewport_width(ctx.content_rect().width());

    if ctx.input(|i| i.key_pressed(egui::Key::F1)) {
      self.toggle_help();
    }
    if self.map.is_loaded()
      && let Some(id) = self.initial_selection.take()
    {
      self.map.select(id);
    }
  }

  fn ui(&mut self, ui: &mut egui::Ui, _frame: &mut eframe::Frame) {
    self.show_panel(ui);
    egui::CentralPanel::default()
      .frame(egui::Frame::NONE)
      .show_inside(ui, |ui| {
        ui.add(self.map.surface_mut());
      });
    let ctx = ui.ctx().clone();
    self.show_help(&ctx);

    if self.map.pump() > 0 {
      ctx.request_repaint();
    }
    self.schedule_repaint(&ctx, self.map.now());
  }
}

impl Drop for RegionMapApp {
  fn drop(&mut self) {
    self.map.teardown();
  }
}

/// Fetches every region's boundary document in the background.
fn spawn_boundary_fetches(assets: &AssetSource, sender: &Sender<BoundaryResult>, ctx: &egui::Context) {
  let Ok(runtime) = tokio::runtime::Handle::try_current() else {
    warn!("No async runtime, boundary overlays are left out.");
    return;
  };
  for (id, path) in regions()
    .iter()
    .filter_map(|r| r.boundary_geometry.map(|path| (r.id, path)))
  {
    let assets = assets.clone();
    let sender = sender.clone();
    let ctx = ctx.clone();
    runtime.spawn(async move {
      let result = fetch_boundary(&assets, path).await;
      if sender.send((id, result)).is_err() {
        debug!("Map is gone, dropping boundary of {id}.");
      }
      ctx.request_repaint();
    });
  }
}
