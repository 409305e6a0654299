use anyhow::anyhow;
use clap::Parser as _;
use regionmap::{config::Config, map::region::RegionId, regionmap_ui::RegionMapApp};

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Access token of the map backend. Overrides REGIONMAP_ACCESS_TOKEN and the config file.
  #[arg(short, long)]
  token: Option<String>,

  /// Base url or directory the boundary documents are loaded from.
  #[arg(short, long)]
  asset_root: Option<String>,

  /// Opens the panel of this region once the map is ready, e.g. "dane" or "about-me".
  #[arg(short, long)]
  select: Option<RegionId>,
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();
  env_logger::init();

  let mut config = Config::new();
  config.access_token = args.token.or(config.access_token);
  config.asset_root = args.asset_root.or(config.asset_root);
  // Fail before a window opens.
  config.access_token()?;

  let rt = tokio::runtime::Runtime::new()?;
  let _enter = rt.enter();

  let options = eframe::NativeOptions {
    viewport: egui::ViewportBuilder {
      inner_size: Some(egui::vec2(1400.0, 900.0)),
      clamp_size_to_monitor_size: Some(true),
      ..Default::default()
    },
    ..Default::default()
  };

  eframe::run_native(
    "regionmap",
    options,
    Box::new(move |cc| {
      Ok(Box::new(RegionMapApp::new(
        cc.egui_ctx.clone(),
        &config,
        args.select,
      )?))
    }),
  )
  .map_err(|e| anyhow!("{e}"))
}
