use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use wheel_stab::config::StabilizerConfig;
use wheel_stab::gnc::{ManualDirection, ManualInput};
use wheel_stab::sim;
use wheel_stab::telemetry::{self, TelemetrySample};

fn main() -> eframe::Result {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => StabilizerConfig::load(&path).unwrap_or_else(|e| {
            log::error!("{}: {}, using defaults", path, e);
            StabilizerConfig::default()
        }),
        None => StabilizerConfig::default(),
    };
    let kick_at = config.sim.max_time * 0.5;
    let inputs = [ManualInput::new(kick_at, kick_at + config.sim.dt, ManualDirection::Positive)];
    let samples = match sim::simulate(&config, &inputs) {
        Ok(result) => result.samples,
        Err(e) => {
            log::error!("simulation failed: {}", e);
            Vec::new()
        }
    };

    let app = StabViz { samples, config };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Reaction Wheel Stabilizer", options, Box::new(|_| Ok(Box::new(app))))
}

struct StabViz {
    samples: Vec<TelemetrySample>,
    config: StabilizerConfig,
}

impl eframe::App for StabViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let step = (self.samples.len() / 2000).max(1);
        let sampled: Vec<&TelemetrySample> = self.samples.iter().step_by(step).collect();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            let c = &self.config.controller;
            ui.heading(format!("Kp {:.2}  Kd {:.2}  Ki {:.2}", c.kp, c.kd, c.ki));
            let last = self.samples.last();
            ui.label(format!(
                "{}  |  {}  |  Ticks: {}",
                telemetry::pid_output_text(last.map_or(0.0, |s| s.control_torque)),
                telemetry::current_rpm_text(last.map_or(0.0, |s| s.wheel_rpm)),
                self.samples.len(),
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Heading error vs Time
                ui.vertical(|ui| {
                    ui.label("Heading Error (deg)");
                    let points: PlotPoints = sampled.iter()
                        .map(|s| [s.time, s.error_deg])
                        .collect();
                    Plot::new("error")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Error", points));
                        });
                });

                // Body rate vs Time
                ui.vertical(|ui| {
                    ui.label("Body Rate (rad/s)");
                    let points: PlotPoints = sampled.iter()
                        .map(|s| [s.time, s.body_rate])
                        .collect();
                    Plot::new("rate")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Rate", points));
                        });
                });
            });

            ui.horizontal(|ui| {
                // Control torque vs Time
                ui.vertical(|ui| {
                    ui.label("PID Output (Nm)");
                    let points: PlotPoints = sampled.iter()
                        .map(|s| [s.time, s.control_torque])
                        .collect();
                    Plot::new("torque")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Torque", points));
                        });
                });

                // Wheel RPM vs Time
                ui.vertical(|ui| {
                    ui.label("Wheel Speed (RPM)");
                    let points: PlotPoints = sampled.iter()
                        .map(|s| [s.time, s.wheel_rpm])
                        .collect();
                    Plot::new("rpm")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("RPM", points));
                        });
                });
            });
        });
    }
}
