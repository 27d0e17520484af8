use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::Category;
use crate::ui::kpi::{format_count, format_currency};

/// Side-by-side listing of both country rankings.
pub fn country_rankings(ui: &mut Ui, access: &[(Category, usize)], sales: &[(Category, f64)]) {
    let rows = access.len().max(sales.len());
    if rows == 0 {
        return;
    }

    TableBuilder::new(ui)
        .id_salt("country_rankings")
        .striped(true)
        .vscroll(false)
        .column(Column::exact(28.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["#", "Negara", "Jumlah Akses", "Negara", "Total Penjualan"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for i in 0..rows {
                body.row(18.0, |mut row| {
                    let by_access = access.get(i);
                    let by_sales = sales.get(i);
                    row.col(|ui: &mut Ui| {
                        ui.label((i + 1).to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        if let Some((country, _)) = by_access {
                            ui.label(country.to_string());
                        }
                    });
                    row.col(|ui: &mut Ui| {
                        if let Some((_, n)) = by_access {
                            ui.label(format_count(*n));
                        }
                    });
                    row.col(|ui: &mut Ui| {
                        if let Some((country, _)) = by_sales {
                            ui.label(country.to_string());
                        }
                    });
                    row.col(|ui: &mut Ui| {
                        if let Some((_, total)) = by_sales {
                            ui.label(format_currency(*total));
                        }
                    });
                });
            }
        });
}
