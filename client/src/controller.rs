use costmap_shared::{Feature, FeatureId, Granularity, RegionSelection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{
    CAMERA_STEP_DURATION_MS, DEFAULT_CENTER, DEFAULT_ZOOM, MAX_PITCH, MAX_ZOOM, MIN_PITCH,
    MIN_ZOOM, PITCH_STEP, RESET_VIEW_DURATION_MS, ZOOM_STEP,
};
use crate::feature_state::{
    CameraEase, FeatureFlag, FeatureStateSink, FeatureStates, RecordingSink, RenderCommand,
};
use crate::fetch::CostFetchOutcome;
use crate::highlight::SelectionHighlighter;
use crate::hover::HoverTracker;
use crate::resolver::SelectionResolver;
use crate::zoom::{LayerPaint, ZoomSwitch};

/// Events delivered by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MapEvent {
    ZoomChanged {
        zoom: f64,
    },
    PointerMove {
        granularity: Granularity,
        #[serde(default)]
        id: Option<FeatureId>,
    },
    PointerLeave {
        granularity: Granularity,
    },
    Click {
        granularity: Granularity,
        feature: Feature,
    },
    DataLoaded {
        granularity: Granularity,
    },
}

/// Commands from the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum HostCommand {
    SetSelectedDistrict {
        #[serde(default)]
        id: Option<FeatureId>,
    },
    ClearSelection,
    ZoomIn,
    ZoomOut,
    TiltUp,
    TiltDown,
    ResetView,
}

/// Notifications for the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    SelectionChanged { selection: Option<RegionSelection> },
    ZoomReported { zoom: f64 },
}

/// Side effects queued by the controller, in the order they were produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Render(RenderCommand),
    Host(HostEvent),
    FetchCosts(FeatureId),
}

impl FeatureStateSink for Vec<Effect> {
    fn set_feature_flag(
        &mut self,
        granularity: Granularity,
        id: FeatureId,
        flag: FeatureFlag,
        value: bool,
    ) {
        self.push(Effect::Render(RenderCommand::SetFeatureFlag {
            granularity,
            id,
            flag,
            value,
        }));
    }
}

/// Wires renderer events and host commands to the hover trackers, the
/// selection resolver and the highlighter. Synchronous: async work leaves as
/// [`Effect::FetchCosts`] and comes back through [`Self::on_costs_fetched`].
#[derive(Debug)]
pub struct MapController {
    switch: ZoomSwitch,
    zoom: f64,
    pitch: f64,
    province_hover: HoverTracker,
    district_hover: HoverTracker,
    highlighter: SelectionHighlighter,
    resolver: SelectionResolver,
    states: FeatureStates,
    province_paint: Option<LayerPaint>,
    district_paint: Option<LayerPaint>,
    districts_loaded: bool,
    selected_district: Option<FeatureId>,
    open: Option<RegionSelection>,
    outbox: Vec<Effect>,
}

impl MapController {
    pub fn new(switch: ZoomSwitch) -> Self {
        Self {
            switch,
            zoom: DEFAULT_ZOOM,
            pitch: MIN_PITCH,
            province_hover: HoverTracker::new(Granularity::Province),
            district_hover: HoverTracker::new(Granularity::District),
            highlighter: SelectionHighlighter::default(),
            resolver: SelectionResolver::new(switch),
            states: FeatureStates::default(),
            province_paint: None,
            district_paint: None,
            districts_loaded: false,
            selected_district: None,
            open: None,
            outbox: Vec::new(),
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn active_granularity(&self) -> Granularity {
        self.switch.active_granularity(self.zoom)
    }

    pub fn layer_paint(&self, granularity: Granularity) -> LayerPaint {
        self.switch.layer_paint(granularity, self.zoom)
    }

    pub fn hovered(&self, granularity: Granularity) -> Option<FeatureId> {
        self.tracker(granularity).current()
    }

    pub fn feature_states(&self) -> &FeatureStates {
        &self.states
    }

    /// Selection currently shown in the host's detail view, as far as the
    /// controller knows.
    pub fn open_selection(&self) -> Option<&RegionSelection> {
        self.open.as_ref()
    }

    pub fn resolver(&self) -> &SelectionResolver {
        &self.resolver
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.outbox)
    }

    fn tracker(&self, granularity: Granularity) -> &HoverTracker {
        match granularity {
            Granularity::Province => &self.province_hover,
            Granularity::District => &self.district_hover,
        }
    }

    fn clear_hover(&mut self, granularity: Granularity) {
        let tracker = match granularity {
            Granularity::Province => &mut self.province_hover,
            Granularity::District => &mut self.district_hover,
        };
        let mut sink = RecordingSink {
            states: &mut self.states,
            inner: &mut self.outbox,
        };
        tracker.on_pointer_leave(&mut sink);
    }

    fn sync_highlight(&mut self) {
        let mut sink = RecordingSink {
            states: &mut self.states,
            inner: &mut self.outbox,
        };
        self.highlighter
            .on_selection_change(self.selected_district, &mut sink);
    }

    /// Pushes the layer's paint for the current zoom unless the renderer
    /// already has it.
    fn sync_paint(&mut self, granularity: Granularity) {
        let paint = self.layer_paint(granularity);
        let last = match granularity {
            Granularity::Province => &mut self.province_paint,
            Granularity::District => &mut self.district_paint,
        };
        if *last == Some(paint) {
            return;
        }
        *last = Some(paint);
        self.outbox
            .push(Effect::Render(RenderCommand::SetLayerPaint { granularity, paint }));
    }

    fn emit(&mut self, event: HostEvent) {
        self.outbox.push(Effect::Host(event));
    }

    fn ease(&mut self, ease: CameraEase) {
        self.outbox.push(Effect::Render(RenderCommand::CameraEase(ease)));
    }

    pub fn handle(&mut self, event: MapEvent) {
        match event {
            MapEvent::ZoomChanged { zoom } => self.on_zoom(zoom),
            MapEvent::PointerMove { granularity, id } => self.on_pointer_move(granularity, id),
            MapEvent::PointerLeave { granularity } => self.clear_hover(granularity),
            MapEvent::Click {
                granularity,
                feature,
            } => self.on_click(granularity, &feature),
            MapEvent::DataLoaded { granularity } => self.on_data_loaded(granularity),
        }
    }

    fn on_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            warn!(zoom, "ignoring non-finite zoom");
            return;
        }
        let was = self.active_granularity();
        self.zoom = zoom;
        let active = self.active_granularity();
        if active != was {
            debug!(?active, zoom, "interactive granularity switched");
        }
        self.clear_hover(active.other());
        for granularity in Granularity::ALL {
            self.sync_paint(granularity);
        }
        self.emit(HostEvent::ZoomReported { zoom });
    }

    fn on_pointer_move(&mut self, granularity: Granularity, id: Option<FeatureId>) {
        let Some(id) = id else {
            warn!(?granularity, "pointer move without feature id dropped");
            return;
        };
        if !self.switch.is_active(granularity, self.zoom) {
            self.clear_hover(granularity);
            return;
        }
        let tracker = match granularity {
            Granularity::Province => &mut self.province_hover,
            Granularity::District => &mut self.district_hover,
        };
        let mut sink = RecordingSink {
            states: &mut self.states,
            inner: &mut self.outbox,
        };
        tracker.on_pointer_move(id, &mut sink);
    }

    fn on_click(&mut self, granularity: Granularity, feature: &Feature) {
        let Some(resolution) = self.resolver.on_click(granularity, feature, self.zoom) else {
            return;
        };
        self.open = Some(resolution.selection.clone());
        self.emit(HostEvent::SelectionChanged {
            selection: Some(resolution.selection),
        });
        if let Some(district_id) = resolution.fetch {
            self.outbox.push(Effect::FetchCosts(district_id));
        }
    }

    fn on_data_loaded(&mut self, granularity: Granularity) {
        info!(?granularity, source = granularity.source(), "map data loaded");
        // A fresh layer starts with the renderer's default paint.
        match granularity {
            Granularity::Province => self.province_paint = None,
            Granularity::District => self.district_paint = None,
        }
        self.sync_paint(granularity);
        if granularity == Granularity::District {
            self.districts_loaded = true;
            // Apply a selection that arrived before the layer existed.
            self.sync_highlight();
        }
    }

    /// Folds a finished cost fetch back in; emits the enriched selection if
    /// the detail view still shows that district.
    pub fn on_costs_fetched(&mut self, outcome: CostFetchOutcome) {
        let Some(enriched) = self.resolver.on_costs_fetched(outcome, self.open.as_ref()) else {
            return;
        };
        self.open = Some(enriched.clone());
        self.emit(HostEvent::SelectionChanged {
            selection: Some(enriched),
        });
    }

    pub fn handle_host(&mut self, command: HostCommand) {
        match command {
            HostCommand::SetSelectedDistrict { id } => {
                self.selected_district = id;
                if self.districts_loaded {
                    self.sync_highlight();
                }
            }
            HostCommand::ClearSelection => {
                self.open = None;
                self.selected_district = None;
                if self.districts_loaded {
                    self.sync_highlight();
                }
                self.emit(HostEvent::SelectionChanged { selection: None });
            }
            HostCommand::ZoomIn => self.ease(CameraEase {
                zoom: Some((self.zoom + ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM)),
                duration_ms: CAMERA_STEP_DURATION_MS,
                ..CameraEase::default()
            }),
            HostCommand::ZoomOut => self.ease(CameraEase {
                zoom: Some((self.zoom - ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM)),
                duration_ms: CAMERA_STEP_DURATION_MS,
                ..CameraEase::default()
            }),
            HostCommand::TiltUp => self.tilt(PITCH_STEP),
            HostCommand::TiltDown => self.tilt(-PITCH_STEP),
            HostCommand::ResetView => {
                self.pitch = MIN_PITCH;
                self.ease(CameraEase {
                    center: Some(DEFAULT_CENTER),
                    zoom: Some(DEFAULT_ZOOM),
                    pitch: Some(MIN_PITCH),
                    bearing: Some(0.0),
                    duration_ms: RESET_VIEW_DURATION_MS,
                });
            }
        }
    }

    fn tilt(&mut self, delta: f64) {
        self.pitch = (self.pitch + delta).clamp(MIN_PITCH, MAX_PITCH);
        self.ease(CameraEase {
            pitch: Some(self.pitch),
            duration_ms: CAMERA_STEP_DURATION_MS,
            ..CameraEase::default()
        });
    }
}
