//! Tree widget mirroring the Model Store through its row events

use egui::{RichText, Ui};

use ov_core::{RowEvent, RowKind, RowPath};
use ov_expander::TreeIntent;

/// Widget-side copy of one display row
#[derive(Debug, Clone)]
struct MirrorRow {
    label: String,
    summary: String,
    is_leaf_marker: bool,
    kind: RowKind,
    children: Vec<MirrorRow>,
    /// Disclosure state in the widget
    open: bool,
}

/// Renders rows delivered as [`RowEvent`]s and turns clicks into intents
#[derive(Debug, Default)]
pub struct TreePanel {
    roots: Vec<MirrorRow>,
}

impl TreePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one store event to the mirror
    pub fn apply(&mut self, event: &RowEvent) {
        match event {
            RowEvent::RowAppended {
                parent,
                label,
                summary,
                is_leaf_marker,
                kind,
                ..
            } => {
                if let Some(children) = Self::children_mut(&mut self.roots, parent) {
                    children.push(MirrorRow {
                        label: label.clone(),
                        summary: summary.clone(),
                        is_leaf_marker: *is_leaf_marker,
                        kind: *kind,
                        children: Vec::new(),
                        open: false,
                    });
                }
            }
            RowEvent::SubtreeRemoved { path } => {
                if let Some(children) = Self::children_mut(&mut self.roots, path) {
                    children.clear();
                }
            }
            RowEvent::Cleared => self.roots.clear(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn children_mut<'a>(rows: &'a mut Vec<MirrorRow>, path: &RowPath) -> Option<&'a mut Vec<MirrorRow>> {
        let mut current = rows;
        for &index in path.indices() {
            current = &mut current.get_mut(index)?.children;
        }
        Some(current)
    }

    /// Draw the tree, collecting the intents raised by this frame's clicks
    pub fn ui(&mut self, ui: &mut Ui, intents: &mut Vec<TreeIntent>) {
        show_rows(ui, &mut self.roots, &RowPath::root(), intents);
    }
}

fn show_rows(ui: &mut Ui, rows: &mut [MirrorRow], parent: &RowPath, intents: &mut Vec<TreeIntent>) {
    for (index, row) in rows.iter_mut().enumerate() {
        if row.kind == RowKind::Placeholder {
            continue;
        }
        let path = parent.child(index);

        ui.horizontal(|ui| {
            if row.is_leaf_marker {
                ui.add_space(18.0);
            } else {
                let arrow = if row.open { "▼" } else { "▶" };
                if ui.add(egui::Button::new(arrow).frame(false).small()).clicked() {
                    row.open = !row.open;
                    // Groups are populated eagerly; only members round-trip
                    if row.kind == RowKind::Member {
                        intents.push(if row.open {
                            TreeIntent::Expand(path.clone())
                        } else {
                            TreeIntent::Collapse(path.clone())
                        });
                    }
                }
            }

            let label = match row.kind {
                RowKind::Group => RichText::new(&row.label).italics(),
                _ => RichText::new(&row.label).strong(),
            };
            let response = ui.add(egui::Label::new(label).sense(egui::Sense::click()));
            ui.label(RichText::new(&row.summary).monospace().weak());

            response.context_menu(|ui| {
                if ui.button("Copy label").clicked() {
                    ui.output_mut(|o| o.copied_text = row.label.clone());
                    ui.close_menu();
                }
                if ui.button("Copy summary").clicked() {
                    ui.output_mut(|o| o.copied_text = row.summary.clone());
                    ui.close_menu();
                }
                if ui.button("Details").clicked() {
                    intents.push(TreeIntent::ContextAction(path.clone()));
                    ui.close_menu();
                }
                if row.open && row.kind == RowKind::Member {
                    ui.separator();
                    if ui.button("Collapse").clicked() {
                        row.open = false;
                        intents.push(TreeIntent::Collapse(path.clone()));
                        ui.close_menu();
                    }
                }
            });
        });

        if row.open && !row.children.is_empty() {
            ui.indent(path.to_string(), |ui| {
                show_rows(ui, &mut row.children, &path, intents);
            });
        }
    }
}
