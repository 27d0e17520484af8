use std::f32::consts::{PI, TAU};
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points};

use crate::color::{self, ColorMap};
use crate::data::aggregate::DurationBucket;
use crate::data::model::Category;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Chart heading plus the empty-subset notice.
fn chart_title(ui: &mut Ui, title: &str, is_empty: bool) {
    ui.label(RichText::new(title).strong());
    if is_empty {
        ui.weak("Tidak ada data untuk filter yang dipilih.");
    }
}

/// Axis formatter that shows `labels[i]` at integer position `i`.
fn index_labels(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let rounded = mark.value.round();
        if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        labels.get(rounded as usize).cloned().unwrap_or_default()
    }
}

/// Fixed-size, non-interactive plot frame shared by every chart.
fn frozen(plot: Plot) -> Plot {
    plot.height(CHART_HEIGHT)
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
}

/// Vertical bars, one per category, coloured by position.
fn category_bars(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    rows: &[(Category, f64)],
    color_at: impl Fn(usize) -> Color32,
) {
    let labels: Vec<String> = rows.iter().map(|(c, _)| c.to_string()).collect();
    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, (cat, value))| {
            Bar::new(i as f64, *value)
                .name(cat.to_string())
                .fill(color_at(i))
                .width(0.6)
        })
        .collect();

    frozen(Plot::new(id))
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(index_labels(labels))
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(y_label));
        });
}

// ---------------------------------------------------------------------------
// Payment method
// ---------------------------------------------------------------------------

pub fn pay_method_bars(ui: &mut Ui, rows: &[(Category, f64)]) {
    chart_title(ui, "Total Penjualan per Metode Pembayaran", rows.is_empty());
    category_bars(
        ui,
        "pay_method_bars",
        "Metode Pembayaran",
        "Total Penjualan",
        rows,
        |_| color::ACCENT,
    );
}

/// Proportion chart drawn directly with the painter.
pub fn pay_method_pie(ui: &mut Ui, shares: &[(Category, f64)]) {
    chart_title(
        ui,
        "Distribusi Proporsi Penjualan per Metode Pembayaran",
        shares.is_empty(),
    );
    let color_map = ColorMap::new(shares.iter().map(|(c, _)| c));

    ui.horizontal(|ui: &mut Ui| {
        let side = CHART_HEIGHT.min(ui.available_width() * 0.6);
        let (response, painter) = ui.allocate_painter(egui::vec2(side, side), Sense::hover());
        let center = response.rect.center();
        let radius = side * 0.45;

        let mut start = -PI / 2.0;
        let mut spans: Vec<(f32, f32, &Category, f64)> = Vec::with_capacity(shares.len());
        for (cat, share) in shares {
            let sweep = *share as f32 * TAU;
            paint_slice(&painter, center, radius, start, sweep, color_map.color_for(cat));
            if *share >= 0.05 {
                let mid = start + sweep / 2.0;
                painter.text(
                    center + egui::vec2(mid.cos(), mid.sin()) * radius * 0.65,
                    Align2::CENTER_CENTER,
                    format!("{:.1}%", share * 100.0),
                    FontId::proportional(12.0),
                    Color32::WHITE,
                );
            }
            spans.push((start, start + sweep, cat, *share));
            start += sweep;
        }

        if let Some(pos) = response.hover_pos() {
            let offset = pos - center;
            if offset.length() <= radius {
                // angle measured clockwise from 12 o'clock, like the slices
                let mut angle = offset.y.atan2(offset.x);
                if angle < -PI / 2.0 {
                    angle += TAU;
                }
                if let Some((_, _, cat, share)) =
                    spans.iter().find(|(a, b, _, _)| angle >= *a && angle < *b)
                {
                    response.on_hover_text_at_pointer(format!("{cat}: {:.1}%", share * 100.0));
                }
            }
        }

        ui.vertical(|ui: &mut Ui| {
            for (cat, share) in shares {
                ui.horizontal(|ui: &mut Ui| {
                    let (swatch, _) =
                        ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, color_map.color_for(cat));
                    ui.label(format!("{cat}  {:.1}%", share * 100.0));
                });
            }
        });
    });
}

/// Fill one slice as a fan of narrow convex wedges.
fn paint_slice(
    painter: &egui::Painter,
    center: Pos2,
    radius: f32,
    start: f32,
    sweep: f32,
    fill: Color32,
) {
    let steps = ((sweep / (PI / 32.0)).ceil() as usize).max(1);
    let point = |a: f32| center + egui::vec2(a.cos(), a.sin()) * radius;
    for i in 0..steps {
        let a0 = start + sweep * i as f32 / steps as f32;
        let a1 = start + sweep * (i + 1) as f32 / steps as f32;
        painter.add(Shape::convex_polygon(
            vec![center, point(a0), point(a1)],
            fill,
            Stroke::NONE,
        ));
    }
}

// ---------------------------------------------------------------------------
// Daily trend
// ---------------------------------------------------------------------------

pub fn daily_trend(ui: &mut Ui, days: &[(NaiveDate, f64)]) {
    chart_title(ui, "Perkembangan Penjualan Harian", days.is_empty());

    let series: Vec<[f64; 2]> = days
        .iter()
        .map(|(day, sales)| [day.num_days_from_ce() as f64, *sales])
        .collect();

    frozen(Plot::new("daily_trend"))
        .x_axis_label("Tanggal")
        .y_axis_label("Penjualan")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            if mark.value.fract() != 0.0 {
                return String::new();
            }
            NaiveDate::from_num_days_from_ce_opt(mark.value as i32)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(series.clone()))
                    .name("Penjualan")
                    .color(color::SLATE)
                    .width(1.5),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(series))
                    .color(color::SLATE)
                    .radius(2.5),
            );
        });
}

// ---------------------------------------------------------------------------
// Duration buckets
// ---------------------------------------------------------------------------

/// Split bucket means into contiguous runs; empty intervals break the line.
pub fn mean_segments(buckets: &[DurationBucket]) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for (i, bucket) in buckets.iter().enumerate() {
        match bucket.mean_sales {
            Some(mean) => current.push([i as f64, mean]),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

pub fn duration_means(ui: &mut Ui, buckets: &[DurationBucket]) {
    chart_title(ui, "Rata-rata Penjualan per Interval Durasi Akses", buckets.is_empty());

    let empty = buckets.iter().filter(|b| b.observations == 0).count();
    if empty > 0 {
        ui.weak(format!("{empty} dari {} interval tanpa observasi", buckets.len()));
    }

    let labels: Vec<String> = buckets.iter().map(DurationBucket::label).collect();
    let segments = mean_segments(buckets);

    frozen(Plot::new("duration_means"))
        .x_axis_label("Interval Durasi (detik)")
        .y_axis_label("Rata-rata Penjualan")
        .x_axis_formatter(index_labels(labels))
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .show(ui, |plot_ui| {
            for segment in segments {
                plot_ui.line(
                    Line::new(PlotPoints::from(segment.clone()))
                        .name("Rata-rata Penjualan")
                        .color(color::ACCENT)
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(segment))
                        .color(color::ACCENT)
                        .radius(3.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Membership and countries
// ---------------------------------------------------------------------------

pub fn membership_bars(ui: &mut Ui, rows: &[(Category, f64)]) {
    chart_title(ui, "Total Penjualan per Tipe Membership", rows.is_empty());
    category_bars(
        ui,
        "membership_bars",
        "Membership",
        "Total Penjualan",
        rows,
        color::membership_color,
    );
}

pub fn country_access_bars(ui: &mut Ui, rows: &[(Category, usize)]) {
    chart_title(ui, "10 Negara dengan Akses Terbanyak", rows.is_empty());
    let as_f64: Vec<(Category, f64)> = rows.iter().map(|(c, n)| (c.clone(), *n as f64)).collect();
    category_bars(
        ui,
        "country_access_bars",
        "Negara",
        "Jumlah Akses",
        &as_f64,
        |_| color::ACCENT,
    );
}

pub fn country_sales_bars(ui: &mut Ui, rows: &[(Category, f64)]) {
    chart_title(ui, "10 Negara dengan Nilai Penjualan Tertinggi", rows.is_empty());
    category_bars(
        ui,
        "country_sales_bars",
        "Negara",
        "Total Penjualan",
        rows,
        |_| color::SLATE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(mean: Option<f64>) -> DurationBucket {
        DurationBucket {
            lower: 0.0,
            upper: 1.0,
            observations: usize::from(mean.is_some()),
            mean_sales: mean,
        }
    }

    #[test]
    fn empty_intervals_split_the_line() {
        let buckets = vec![
            bucket(Some(1.0)),
            bucket(Some(2.0)),
            bucket(None),
            bucket(None),
            bucket(Some(5.0)),
        ];
        assert_eq!(
            mean_segments(&buckets),
            vec![vec![[0.0, 1.0], [1.0, 2.0]], vec![[4.0, 5.0]]]
        );
    }

    #[test]
    fn all_empty_intervals_have_no_segments() {
        assert!(mean_segments(&[bucket(None), bucket(None)]).is_empty());
        assert!(mean_segments(&[]).is_empty());
    }

    #[test]
    fn index_labels_only_label_integer_marks() {
        let fmt = index_labels(vec!["Cash".into(), "Credit Card".into()]);
        let range = 0.0..=1.0;
        let mark = |value| GridMark { value, step_size: 1.0 };
        assert_eq!(fmt(mark(0.0), &range), "Cash");
        assert_eq!(fmt(mark(1.0), &range), "Credit Card");
        assert_eq!(fmt(mark(0.5), &range), "");
        assert_eq!(fmt(mark(2.0), &range), "");
        assert_eq!(fmt(mark(-1.0), &range), "");
    }
}
