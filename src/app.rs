use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{kpi, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &self.state));
        });
    }
}

/// The scrolling page, top to bottom.
fn dashboard(ui: &mut Ui, state: &AppState) {
    let view = &state.view;

    ui.heading(egui::RichText::new("E-Commerce Interactive Dashboard").size(28.0));
    ui.add_space(8.0);
    panels::introduction(ui);
    ui.add_space(12.0);

    kpi::kpi_row(ui, &view.kpis);
    ui.add_space(12.0);

    section(ui, "Penjualan berdasarkan Metode Pembayaran", |ui| {
        plot::pay_method_bars(ui, &view.sales_by_pay_method);
    });
    section(ui, "Proporsi Penjualan Berdasarkan Metode", |ui| {
        plot::pay_method_pie(ui, &view.pay_method_shares);
    });
    section(ui, "Tren Penjualan Harian", |ui| {
        plot::daily_trend(ui, &view.daily_sales);
    });
    section(ui, "Rata-rata Penjualan Berdasarkan Durasi Akses", |ui| {
        plot::duration_means(ui, &view.duration_buckets);
    });
    section(ui, "Penjualan berdasarkan Membership", |ui| {
        plot::membership_bars(ui, &view.sales_by_membership);
    });
    section(ui, "Negara dengan Akses Terbanyak", |ui| {
        plot::country_access_bars(ui, &view.access_by_country);
    });
    section(ui, "Negara dengan Penjualan Tertinggi", |ui| {
        plot::country_sales_bars(ui, &view.sales_by_country);
        ui.add_space(6.0);
        table::country_rankings(ui, &view.access_by_country, &view.sales_by_country);
    });

    panels::conclusion(ui);
}

fn section(ui: &mut Ui, heading: &str, body: impl FnOnce(&mut Ui)) {
    ui.heading(heading);
    body(ui);
    ui.add_space(16.0);
}
