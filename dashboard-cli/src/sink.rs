use std::{collections::BTreeMap, io::Write};

use dashboard_core::{PanelId, PanelSink, PanelView};
use parking_lot::Mutex;

use crate::render::Renderer;

/// Keeps the latest view of every panel; in live mode also prints each
/// update as it arrives.
#[derive(Debug)]
pub struct TerminalSink {
    renderer: Renderer,
    live: bool,
    panels: Mutex<BTreeMap<PanelId, PanelView>>,
}

impl TerminalSink {
    pub fn new(renderer: Renderer, live: bool) -> Self {
        Self { renderer, live, panels: Mutex::new(BTreeMap::new()) }
    }

    /// All panels in dashboard order.
    pub fn render_all(&self) -> String {
        let panels = self.panels.lock();

        PanelId::all()
            .iter()
            .filter_map(|id| panels.get(id).map(|view| self.renderer.panel(*id, view)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PanelSink for TerminalSink {
    fn show(&self, panel: PanelId, view: PanelView) {
        if self.live {
            let rendered = self.renderer.panel(panel, &view);
            let stamp = chrono::Local::now().format("%H:%M:%S");
            let mut out = std::io::stdout().lock();
            let _ = write!(out, "\n[{stamp}] {rendered}");
            let _ = out.flush();
        }

        self.panels.lock().insert(panel, view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::{RenderSettings, panel::recommendations};

    #[test]
    fn latest_view_wins_and_order_is_fixed() {
        let sink = TerminalSink::new(Renderer::new(false), false);

        sink.show(PanelId::Recommendations, PanelView::failed(PanelId::Recommendations));
        sink.show(PanelId::CurrentWeather, PanelView::failed(PanelId::CurrentWeather));
        sink.show(
            PanelId::Recommendations,
            PanelView::Ready(recommendations::build(&[], &RenderSettings::default())),
        );

        let out = sink.render_all();
        let weather = out.find("Current Weather").unwrap();
        let recs = out.find("Travel Recommendations").unwrap();
        assert!(weather < recs);
        assert!(out.contains("No travel recommendations available"));
        assert!(!out.contains("Unable to load recommendations"));
    }
}
