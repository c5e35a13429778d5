//! Control Panel Widget
//! Left side panel with file selection, cleaning summary and filters.

use crate::data::CategoricalFilter;
use egui::{Color32, RichText};
use std::path::PathBuf;

/// One multiselect filter block in the sidebar.
#[derive(Debug, Clone)]
pub struct FilterGroup {
    pub column: String,
    pub label: String,
    pub options: Vec<String>,
    pub selected: Vec<bool>,
}

impl FilterGroup {
    /// All options selected by default; `saved` (from a previous session)
    /// narrows that where it still matches the current options.
    pub fn new(
        column: impl Into<String>,
        label: impl Into<String>,
        options: Vec<String>,
        saved: Option<&[String]>,
    ) -> Self {
        let selected = match saved {
            Some(saved) => options.iter().map(|o| saved.contains(o)).collect(),
            None => vec![true; options.len()],
        };
        Self {
            column: column.into(),
            label: label.into(),
            options,
            selected,
        }
    }

    pub fn selected_values(&self) -> Vec<String> {
        self.options
            .iter()
            .zip(self.selected.iter())
            .filter(|(_, &on)| on)
            .map(|(option, _)| option.clone())
            .collect()
    }

    pub fn to_filter(&self) -> CategoricalFilter {
        CategoricalFilter::new(self.column.clone(), self.selected_values())
    }
}

/// Left side control panel.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub filter_groups: Vec<FilterGroup>,
    pub cleaning_summary: Option<String>,
    pub cleaning_steps: Vec<String>,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            filter_groups: Vec::new(),
            cleaning_summary: None,
            cleaning_steps: Vec::new(),
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the filter blocks after a dataset load.
    pub fn set_filter_groups(&mut self, groups: Vec<FilterGroup>) {
        self.filter_groups = groups;
    }

    /// Current filter selections for the data layer.
    pub fn active_filters(&self) -> Vec<CategoricalFilter> {
        self.filter_groups.iter().map(|g| g.to_filter()).collect()
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 HabitBoard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Student Habits vs Exam Performance")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        // ===== Cleaning Section =====
        if let Some(summary) = self.cleaning_summary.clone() {
            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);

            ui.label(RichText::new("🧹 Cleaning").size(14.0).strong());
            ui.add_space(5.0);
            ui.label(RichText::new(&summary).size(12.0));

            if !self.cleaning_steps.is_empty() {
                egui::CollapsingHeader::new(RichText::new("Steps").size(12.0))
                    .default_open(false)
                    .show(ui, |ui| {
                        for step in &self.cleaning_steps {
                            ui.label(RichText::new(format!("• {}", step)).size(11.0));
                        }
                    });
            }
        }

        // ===== Filters Section =====
        if !self.filter_groups.is_empty() {
            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);

            ui.label(RichText::new("🔎 Filters").size(14.0).strong());
            ui.add_space(5.0);

            for group in &mut self.filter_groups {
                ui.label(RichText::new(&group.label).size(12.0).strong());
                egui::Frame::none()
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .rounding(5.0)
                    .inner_margin(5.0)
                    .show(ui, |ui| {
                        for (i, option) in group.options.iter().enumerate() {
                            if i < group.selected.len()
                                && ui.checkbox(&mut group.selected[i], option).changed()
                            {
                                action = ControlPanelAction::FiltersChanged;
                            }
                        }
                    });

                ui.horizontal(|ui| {
                    if ui.small_button("Select All").clicked() {
                        group.selected.iter_mut().for_each(|v| *v = true);
                        action = ControlPanelAction::FiltersChanged;
                    }
                    if ui.small_button("Clear All").clicked() {
                        group.selected.iter_mut().for_each(|v| *v = false);
                        action = ControlPanelAction::FiltersChanged;
                    }
                });
                ui.add_space(8.0);
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export Charts").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("ready") || self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    FiltersChanged,
    ExportCharts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_group_defaults_to_all_selected() {
        let group = FilterGroup::new(
            "gender",
            "Gender",
            vec!["Female".into(), "Male".into()],
            None,
        );
        assert_eq!(group.selected_values(), vec!["Female", "Male"]);
    }

    #[test]
    fn filter_group_restores_saved_selection() {
        let saved = vec!["Male".to_string(), "Ghost".to_string()];
        let group = FilterGroup::new(
            "gender",
            "Gender",
            vec!["Female".into(), "Male".into()],
            Some(&saved),
        );
        // Stale saved values are dropped, valid ones restored
        assert_eq!(group.selected_values(), vec!["Male"]);
    }

    #[test]
    fn to_filter_carries_column_and_selection() {
        let mut group = FilterGroup::new(
            "part_time_job",
            "Part-Time Job",
            vec!["No".into(), "Yes".into()],
            None,
        );
        group.selected[0] = false;

        let filter = group.to_filter();
        assert_eq!(filter.column, "part_time_job");
        assert_eq!(filter.selected, vec!["Yes"]);
    }
}
