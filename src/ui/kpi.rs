use eframe::egui::{self, RichText, Ui};

use crate::color;
use crate::data::aggregate::Kpis;

// ---------------------------------------------------------------------------
// Display formatting
// ---------------------------------------------------------------------------

/// Insert `,` every three digits of an unsigned digit string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `1234567` → `"1,234,567"`.
pub fn format_count(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// `5000.0` → `"$5,000.00"`; negative amounts keep the sign after `$`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "${sign}{}.{:02}",
        group_thousands(&(cents / 100).to_string()),
        cents % 100
    )
}

/// Mean session duration, or `"N/A"` for an empty subset.
pub fn format_mean_duration(mean: Option<f64>) -> String {
    match mean {
        Some(secs) => format!("{secs:.1} detik"),
        None => "N/A".to_string(),
    }
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

/// Render the three KPI cards side by side.
pub fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    ui.heading("Ringkasan Utama");
    ui.add_space(4.0);
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Total Transaksi", format_count(kpis.transactions));
        metric(&mut cols[1], "Total Penjualan", format_currency(kpis.total_sales));
        metric(
            &mut cols[2],
            "Durasi Rata-rata",
            format_mean_duration(kpis.mean_duration),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).size(26.0).strong().color(color::TITLE));
    });
}
