use crate::map::region::RegionId;

/// A link shown below the panel text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLink {
  pub text: &'static str,
  pub url: &'static str,
}

/// Title and body of the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelContent {
  pub title: &'static str,
  pub paragraphs: &'static [&'static str],
  pub link: Option<PanelLink>,
}

const DANE: PanelContent = PanelContent {
  title: "Dane County",
  paragraphs: &[
    "Sed ut perspiciatis unde omnis iste natus error sit voluptatem accusantium doloremque \
     laudantium, totam rem aperiam, eaque ipsa quae ab illo inventore veritatis et quasi \
     architecto beatae vitae dicta sunt explicabo.",
    "Nemo enim ipsam voluptatem quia voluptas sit aspernatur aut odit aut fugit, sed quia \
     consequuntur magni dolores eos qui ratione voluptatem sequi nesciunt.",
  ],
  link: Some(PanelLink {
    text: "Story map of the project",
    url: "https://storymaps.arcgis.com/stories/359cf2306140444081c7419511c63bf9",
  }),
};

const ABOUT_ME: PanelContent = PanelContent {
  title: "About Me",
  paragraphs: &[
    "Neque porro quisquam est, qui dolorem ipsum quia dolor sit amet, consectetur, adipisci \
     velit, sed quia non numquam eius modi tempora incidunt ut labore et dolore magnam aliquam \
     quaerat voluptatem.",
    "Ut enim ad minima veniam, quis nostrum exercitationem ullam corporis suscipit laboriosam, \
     nisi ut aliquid ex ea commodi consequatur.",
  ],
  link: None,
};

const FALLBACK_PARAGRAPHS: &[&str] = &[
  "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod tempor incididunt \
   ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation \
   ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in \
   reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur.",
  "Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit \
   anim id est laborum. Sed ut perspiciatis unde omnis iste natus error sit voluptatem \
   accusantium doloremque laudantium, totam rem aperiam.",
];

/// What the side panel shows for `region`.
#[must_use]
pub fn panel_content(region: RegionId) -> PanelContent {
  match region {
    RegionId::Dane => DANE,
    RegionId::AboutMe => ABOUT_ME,
    other => PanelContent {
      title: other.name(),
      paragraphs: FALLBACK_PARAGRAPHS,
      link: None,
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[rstest]
  #[case(RegionId::Dane, "Dane County")]
  #[case(RegionId::AboutMe, "About Me")]
  #[case(RegionId::Usa, "USA")]
  #[case(RegionId::Greco, "GRECO")]
  #[case(RegionId::Indo, "INDO")]
  fn titles(#[case] region: RegionId, #[case] title: &str) {
    assert_eq!(panel_content(region).title, title);
  }

  #[test]
  fn only_dane_links_out() {
    let link = panel_content(RegionId::Dane).link.unwrap();
    assert!(link.url.starts_with("https://storymaps.arcgis.com/"));
    for region in [RegionId::Usa, RegionId::Greco, RegionId::Indo, RegionId::AboutMe] {
      assert_eq!(panel_content(region).link, None);
    }
  }

  #[test]
  fn fallback_is_shared() {
    assert_eq!(
      panel_content(RegionId::Usa).paragraphs,
      panel_content(RegionId::Indo).paragraphs
    );
    assert_eq!(panel_content(RegionId::Greco).paragraphs.len(), 2);
  }
}
