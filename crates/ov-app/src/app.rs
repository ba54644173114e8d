//! Application state and frame loop

use std::path::{Path, PathBuf};
use std::sync::Arc;

use eframe::egui::{self, Context};
use tracing::{error, info, warn};

use ov_core::EventLog;
use ov_expander::{ExpanderConfig, Explorer, IntentOutcome, RowDetails, TreeIntent};
use ov_objects::{sample_module, JsonNode, ObjectGraph};

use crate::tree_panel::TreePanel;

/// Main application state
pub struct ObjectViewerApp {
    explorer: Explorer,

    /// Built-in types for the sample graph
    graph: ObjectGraph,

    /// Row events not yet applied to the panel
    events: Arc<EventLog>,

    panel: TreePanel,

    /// Details of the last row picked from a context menu
    details: Option<RowDetails>,

    status: String,
}

impl ObjectViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ExpanderConfig, file: Option<PathBuf>) -> Self {
        let events = Arc::new(EventLog::new());
        let mut explorer = Explorer::new(config);
        explorer.subscribe(events.clone());

        let mut app = Self {
            explorer,
            graph: ObjectGraph::new(),
            events,
            panel: TreePanel::new(),
            details: None,
            status: String::new(),
        };

        match file {
            Some(path) => app.open_json(&path),
            None => app.show_sample(),
        }
        app
    }

    /// Replace the tree with the built-in sample graph
    fn show_sample(&mut self) {
        self.explorer.clear();
        self.details = None;
        let root = sample_module(&self.graph);
        match self.explorer.add_root("__main__", root) {
            Ok(_) => self.status = "Sample object graph".to_string(),
            Err(e) => error!("Failed to add sample root: {}", e),
        }
    }

    /// Replace the tree with a JSON document
    fn open_json(&mut self, path: &Path) {
        info!("Opening JSON file: {:?}", path);
        let node = match JsonNode::load(path) {
            Ok(node) => node,
            Err(e) => {
                error!("Failed to open JSON file: {}", e);
                self.status = format!("Failed to open {}: {}", path.display(), e);
                return;
            }
        };

        self.explorer.clear();
        self.details = None;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match self.explorer.add_root(&label, node) {
            Ok(_) => self.status = path.display().to_string(),
            Err(e) => error!("Failed to add JSON root: {}", e),
        }
    }

    /// Apply pending store events to the panel
    fn sync_rows(&mut self) {
        for event in self.events.drain() {
            self.panel.apply(&event);
        }
    }

    fn dispatch(&mut self, intent: TreeIntent) {
        match self.explorer.handle(intent) {
            Ok(IntentOutcome::Expanded(report)) => {
                for diagnostic in &report.diagnostics {
                    warn!(
                        "{} at {}: {}",
                        diagnostic.capability, diagnostic.path, diagnostic.message
                    );
                }
                if !report.diagnostics.is_empty() {
                    self.status = format!(
                        "{}: {} introspection problem(s)",
                        report.path,
                        report.diagnostics.len()
                    );
                }
            }
            Ok(IntentOutcome::Context(details)) => self.details = Some(details),
            Ok(IntentOutcome::Collapsed(_)) | Ok(IntentOutcome::Ignored) => {}
            Err(e) => error!("Tree request failed: {}", e),
        }
    }

    fn handle_menu(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open JSON...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON Files", &["json"])
                            .pick_file()
                        {
                            self.open_json(&path);
                        }
                        ui.close_menu();
                    }

                    if ui.button("Sample Graph").clicked() {
                        self.show_sample();
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn show_status(&self, ctx: &Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            if let Some(details) = &self.details {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&details.label).strong());
                    ui.label(format!("at {}", details.path));
                    if let Some(type_name) = &details.type_name {
                        ui.label(format!("type {}", type_name));
                    }
                });
                if !details.summary.is_empty() {
                    ui.label(egui::RichText::new(&details.summary).monospace());
                }
                ui.separator();
            }
            ui.label(egui::RichText::new(&self.status).weak());
        });
    }
}

impl eframe::App for ObjectViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.sync_rows();

        self.handle_menu(ctx);
        self.show_status(ctx);

        let mut intents = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    if self.panel.is_empty() {
                        ui.label("Nothing to explore");
                    } else {
                        self.panel.ui(ui, &mut intents);
                    }
                });
        });

        if !intents.is_empty() {
            for intent in intents {
                self.dispatch(intent);
            }
            self.sync_rows();
            ctx.request_repaint();
        }
    }
}
