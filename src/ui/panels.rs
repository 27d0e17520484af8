use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color;
use crate::data::model::Dimension;
use crate::state::AppState;
use crate::ui::kpi::format_count;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: one multi-select per dimension.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("Filter Data").size(22.0).strong().color(color::TITLE));
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let unique = state.log.unique_values.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let Some(all_values) = unique.get(&dim) else {
                    continue;
                };

                let n_selected = state.filters.get(&dim).map_or(0, |s| s.len());
                let header_text = format!("{}  ({n_selected}/{})", dim.label(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("Semua").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("Kosongkan").clicked() {
                                state.select_none(dim);
                            }
                        });

                        for val in all_values {
                            let mut checked = state.is_selected(dim, val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                state.toggle_filter_value(dim, val);
                            }
                        }
                    });
                ui.add_space(6.0);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let source = state
            .log
            .source
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ui.label(format!(
            "{source}: {} baris dimuat, {} terlihat",
            format_count(state.log.len()),
            format_count(state.visible_indices.len())
        ));

        if state.log.dropped > 0 {
            ui.separator();
            ui.weak(format!("{} baris tidak valid dilewati", format_count(state.log.dropped)));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Static text sections
// ---------------------------------------------------------------------------

pub fn introduction(ui: &mut Ui) {
    ui.heading("Pengantar");
    ui.label(
        "Dashboard ini dibuat untuk mengeksplorasi perilaku pengguna dalam platform \
         e-commerce berdasarkan data log interaksi. Beberapa aspek penting yang dikaji meliputi:",
    );
    for point in [
        "Performa penjualan berdasarkan metode pembayaran",
        "Durasi akses dan hubungannya dengan nilai transaksi",
        "Tren penjualan harian",
        "Distribusi berdasarkan negara dan jenis keanggotaan",
    ] {
        ui.label(format!("• {point}"));
    }
    ui.label(
        "Pengguna dapat menyesuaikan filter berdasarkan gender, membership, dan metode \
         pembayaran untuk mendapatkan analisis yang lebih spesifik.",
    );
}

pub fn conclusion(ui: &mut Ui) {
    ui.separator();
    ui.heading("Kesimpulan");
    ui.label("Berdasarkan eksplorasi data:");
    for (i, point) in [
        "Metode pembayaran seperti Credit Card dan Debit Card menjadi penyumbang terbesar \
         dalam total penjualan.",
        "Durasi sesi yang lebih panjang berkorelasi dengan nilai transaksi yang lebih tinggi.",
        "Negara-negara dalam 10 besar berdasarkan akses maupun penjualan menunjukkan potensi \
         strategis untuk promosi dan ekspansi.",
        "Segmentasi berdasarkan gender dan tipe keanggotaan memberikan pemahaman lebih lanjut \
         terhadap perilaku pelanggan.",
        "Diagram lingkaran dan diagram garis membantu menggambarkan distribusi dan tren \
         dengan lebih intuitif.",
    ]
    .iter()
    .enumerate()
    {
        ui.label(format!("{}. {point}", i + 1));
    }
    ui.label(
        "Dashboard ini dapat digunakan sebagai alat bantu pengambilan keputusan berbasis data \
         dalam manajemen e-commerce.",
    );
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open access log")
        .add_filter("Supported files", &["csv", "tsv", "txt", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(log) => {
                log::info!(
                    "Loaded {} rows from {} ({} dropped)",
                    log.len(),
                    path.display(),
                    log.dropped
                );
                state.set_log(Arc::new(log));
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
