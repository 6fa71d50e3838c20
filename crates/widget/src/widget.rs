//! The widget state machine tying dataset, navigation, colors and render
//! passes together.
//!
//! All methods are synchronous and run on the host's event loop. A render
//! fully tears down the previous pass through the adapter before building
//! the next one, so the adapter never holds overlays from two renders at
//! once.

use std::sync::Arc;

use compute::{calculate_optimal_zoom, compute_overall_bounds, metric_range};
use foundation::{LatLon, ViewportSize};
use layers::{
    LegendItem, MapAdapter, MarkerKind, RenderPass, StyleParams, build_legend, info_scale,
    resolve_colors,
};
use regions::{
    CrossFilterUpdate, NavigationState, RegionDataset, RegionRecord, ingest_rows,
    toggle_region_filter,
};
use runtime::{Diagnostic, DiagnosticsBus, ProviderLoader, global_loader};
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::WidgetConfig;

/// What a render produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The map provider is not ready; the placeholder stays up and the
    /// adapter was not touched.
    NotReady,
    /// Nothing drawable at the active navigation state.
    Empty,
    Rendered {
        regions: usize,
        center: LatLon,
        zoom: u8,
    },
}

/// State backing the region action panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: String,
    pub name: String,
    pub level: i64,
    pub has_children: bool,
    pub has_parent: bool,
    pub can_return_to_min: bool,
    pub filter_active: bool,
}

pub struct RegionMapWidget {
    config: WidgetConfig,
    dataset: RegionDataset,
    nav: NavigationState,
    selected: Vec<String>,
    viewport: ViewportSize,
    pass: Option<RenderPass>,
    diagnostics: DiagnosticsBus,
    loader: Arc<ProviderLoader>,
}

impl RegionMapWidget {
    pub fn new(config: WidgetConfig) -> Self {
        Self::with_loader(config, global_loader())
    }

    /// Widget bound to a specific loader instance (tests, multi-provider
    /// hosts).
    pub fn with_loader(config: WidgetConfig, loader: Arc<ProviderLoader>) -> Self {
        Self {
            config,
            dataset: RegionDataset::new(),
            nav: NavigationState::new(),
            selected: Vec::new(),
            viewport: ViewportSize::default(),
            pass: None,
            diagnostics: DiagnosticsBus::new(),
            loader,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Ingests a fresh query result through the declared column mapping and
    /// re-validates the navigation state against it.
    pub fn set_data(&mut self, rows: &[Map<String, Value>]) {
        let ingested = ingest_rows(rows, &self.config.columns);
        if ingested.skipped > 0 {
            self.diagnostics.emit(
                "ingest",
                format!("dropped {} unusable rows", ingested.skipped),
            );
        }
        self.set_records(ingested.records);
    }

    /// Typed ingest path.
    pub fn set_records(&mut self, records: Vec<RegionRecord>) {
        self.dataset = RegionDataset::from_records(records);
        if self.nav.revalidate(&self.dataset) {
            self.diagnostics.emit(
                "navigation",
                format!(
                    "reset to level {} after dataset change",
                    self.nav.current_level
                ),
            );
        }
    }

    pub fn dataset(&self) -> &RegionDataset {
        &self.dataset
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    pub fn visible(&self) -> Vec<&RegionRecord> {
        self.nav.visible(&self.dataset)
    }

    pub fn set_viewport(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
    }

    /// Info-card scale for the provider's current zoom, for the host to apply
    /// on viewport-change notifications.
    pub fn info_scale_at(&self, zoom: f64) -> f64 {
        info_scale(zoom, self.config.info_scale)
    }

    pub fn set_heatmap(&mut self, on: bool) {
        self.config.show_heatmap = on;
    }

    /// Rebuilds the overlay set on the adapter for the current state.
    pub fn render(&mut self, adapter: &mut dyn MapAdapter) -> RenderOutcome {
        if !self.loader.is_ready() {
            return RenderOutcome::NotReady;
        }

        self.teardown(adapter);

        let visible = self.nav.visible(&self.dataset);
        if visible.is_empty() {
            return RenderOutcome::Empty;
        }

        let bounds = compute_overall_bounds(&visible);
        let range = metric_range(&visible);
        let params = self.style_params();
        let colors = resolve_colors(
            &visible,
            self.config.show_heatmap,
            &self.config.heatmap_palette,
            range,
        );

        let (pass, skipped) =
            RenderPass::build(&visible, &colors, &params, self.config.label_position);
        for id in &skipped {
            warn!(id = %id, "region skipped: unparseable payload or unsupported geometry");
            self.diagnostics
                .emit("geometry", format!("region {id} skipped"));
        }
        if pass.is_empty() {
            return RenderOutcome::Empty;
        }

        for overlay in pass.overlays() {
            adapter.add_region(overlay);
        }
        if self.config.show_info {
            for marker in pass.markers_of_kind(MarkerKind::Info) {
                adapter.add_marker(marker);
            }
        }
        if self.config.show_labels {
            for marker in pass.markers_of_kind(MarkerKind::Label) {
                adapter.add_marker(marker);
            }
        }

        let regions = pass.len();
        self.pass = Some(pass);

        let (center, zoom) = self.view_for(bounds.as_ref());
        adapter.set_view(center, zoom, Some(500));

        RenderOutcome::Rendered {
            regions,
            center,
            zoom,
        }
    }

    /// Re-derives center/zoom for the current visible set without rebuilding
    /// overlays; the host calls this on container resize.
    pub fn refresh_view(&mut self, adapter: &mut dyn MapAdapter) {
        let visible = self.nav.visible(&self.dataset);
        if visible.is_empty() {
            return;
        }
        let bounds = compute_overall_bounds(&visible);
        let (center, zoom) = self.view_for(bounds.as_ref());
        adapter.set_view(center, zoom, Some(500));
    }

    /// Drills into a region's children. Closes any detail view implicitly by
    /// virtue of the host re-rendering.
    pub fn drill_down(&mut self, region_id: &str) -> bool {
        let Some(record) = self.dataset.find(region_id).cloned() else {
            return false;
        };
        self.nav.to_children(&record, &self.dataset)
    }

    pub fn roll_up(&mut self) -> bool {
        self.nav.to_parent(&self.dataset)
    }

    pub fn reset_to_min(&mut self) {
        self.nav.to_min_level(&self.dataset);
    }

    /// The action panel's state for one region.
    pub fn detail_view(&self, region_id: &str) -> Option<DetailView> {
        let record = self.dataset.find(region_id)?;
        let name = record
            .region_name
            .clone()
            .unwrap_or_else(|| record.id.clone());
        Some(DetailView {
            id: record.id.clone(),
            name: name.clone(),
            level: record.level,
            has_children: self.dataset.has_children(&record.id),
            has_parent: record.parent_id.is_some(),
            can_return_to_min: self.nav.can_return_to_min(&self.dataset),
            filter_active: self.selected.iter().any(|s| *s == name),
        })
    }

    /// Toggles the cross-filter for a region name.
    ///
    /// Returns `None` when cross-filtering is disabled; otherwise the update
    /// to submit through the host callback.
    pub fn toggle_filter(&mut self, region_name: &str) -> Option<CrossFilterUpdate> {
        if !self.config.emit_cross_filters {
            return None;
        }
        let update = toggle_region_filter(region_name, &self.selected);
        self.selected = update
            .display
            .selected_values
            .clone()
            .unwrap_or_default();
        Some(update)
    }

    /// Externally-selected values pushed down by the host.
    pub fn set_selected_values(&mut self, values: Vec<String>) {
        self.selected = values;
    }

    /// Legend rows for the current visible set; empty when the legend is off.
    pub fn legend(&self) -> Vec<LegendItem> {
        if !self.config.show_legend {
            return Vec::new();
        }
        let visible = self.nav.visible(&self.dataset);
        let range = metric_range(&visible);
        let colors = resolve_colors(
            &visible,
            self.config.show_heatmap,
            &self.config.heatmap_palette,
            range,
        );
        build_legend(&visible, &colors)
    }

    /// Toggles info cards without a rebuild; markers from the live pass are
    /// added or removed idempotently.
    pub fn set_show_info(&mut self, on: bool, adapter: &mut dyn MapAdapter) {
        self.config.show_info = on;
        self.toggle_markers(MarkerKind::Info, on, adapter);
    }

    /// Toggles region-name labels without a rebuild.
    pub fn set_show_labels(&mut self, on: bool, adapter: &mut dyn MapAdapter) {
        self.config.show_labels = on;
        self.toggle_markers(MarkerKind::Label, on, adapter);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.events()
    }

    pub fn drain_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.drain()
    }

    fn style_params(&self) -> StyleParams {
        StyleParams {
            heatmap: self.config.show_heatmap,
            palette: self.config.heatmap_palette.clone(),
            compact: self.config.compact,
        }
    }

    fn view_for(&self, bounds: Option<&compute::BoundsResult>) -> (LatLon, u8) {
        match bounds {
            Some(bounds) => {
                let zoom = if self.config.use_initial_zoom {
                    self.config.initial_zoom
                } else {
                    calculate_optimal_zoom(Some(bounds), self.viewport)
                };
                (bounds.center, zoom)
            }
            None => (self.config.initial_center, self.config.initial_zoom),
        }
    }

    fn teardown(&mut self, adapter: &mut dyn MapAdapter) {
        if let Some(prev) = self.pass.take() {
            for marker in prev.markers() {
                adapter.remove_marker(&marker.id);
            }
            for id in prev.overlay_ids() {
                adapter.remove_region(id);
            }
        }
    }

    fn toggle_markers(&mut self, kind: MarkerKind, on: bool, adapter: &mut dyn MapAdapter) {
        let Some(pass) = &self.pass else {
            return;
        };
        for marker in pass.markers_of_kind(kind) {
            if on {
                adapter.add_marker(marker);
            } else {
                adapter.remove_marker(&marker.id);
            }
        }
    }
}
