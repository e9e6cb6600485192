use std::io::{self, Write};
use std::path::Path;

use crate::config::StabilizerConfig;
use crate::gnc::Mode;
use crate::physics::InertiaModel;
use crate::sim::event::EventKind;
use crate::sim::SimResult;

/// Summary statistics computed from a stabilization run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub duration: f64,
    pub ticks: usize,
    pub initial_error_deg: f64,
    pub final_error_deg: f64,
    pub max_abs_error_deg: f64,
    pub first_deadband_time: Option<f64>,
    pub deadband_ticks: usize,
    pub peak_torque: f64,
    pub peak_wheel_rpm: f64,
    pub brake_events: usize,
    pub skipped_ticks: usize,
}

impl RunSummary {
    /// Compute summary from run output.
    pub fn from_result(result: &SimResult) -> Self {
        let samples = &result.samples;

        let max_abs_error_deg = samples.iter().map(|s| s.error_deg.abs()).fold(0.0_f64, f64::max);
        let peak_torque = samples.iter().map(|s| s.control_torque.abs()).fold(0.0_f64, f64::max);
        let peak_wheel_rpm = samples.iter().map(|s| s.wheel_rpm).fold(0.0_f64, f64::max);

        RunSummary {
            duration: result.final_state.time,
            ticks: samples.len(),
            initial_error_deg: samples.first().map_or(0.0, |s| s.error_deg),
            final_error_deg: samples.last().map_or(0.0, |s| s.error_deg),
            max_abs_error_deg,
            first_deadband_time: samples
                .iter()
                .find(|s| s.mode == Some(Mode::Deadband))
                .map(|s| s.time),
            deadband_ticks: samples.iter().filter(|s| s.mode == Some(Mode::Deadband)).count(),
            peak_torque,
            peak_wheel_rpm,
            brake_events: result
                .events
                .iter()
                .filter(|e| e.kind == EventKind::WheelBrakeStart)
                .count(),
            skipped_ticks: result.skipped_ticks,
        }
    }
}

/// Write run summary as JSON to a writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    config: &StabilizerConfig,
    summary: &RunSummary,
) -> io::Result<()> {
    let c = &config.controller;
    let inertia: InertiaModel = config.inertia.model();
    let deadband = match summary.first_deadband_time {
        Some(t) => format!("{:.3}", t),
        None => "null".to_string(),
    };

    writeln!(writer, "{{")?;
    writeln!(writer, "  \"controller\": {{")?;
    writeln!(writer, "    \"kp\": {},", c.kp)?;
    writeln!(writer, "    \"kd\": {},", c.kd)?;
    writeln!(writer, "    \"ki\": {},", c.ki)?;
    writeln!(writer, "    \"max_torque_nm\": {},", c.max_torque)?;
    writeln!(writer, "    \"max_wheel_rpm\": {}", c.max_wheel_rpm)?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"inertia\": {{")?;
    writeln!(writer, "    \"body_kgm2\": {:.6e},", inertia.body)?;
    writeln!(writer, "    \"wheel_kgm2\": {:.6e}", inertia.wheel)?;
    writeln!(writer, "  }},")?;
    writeln!(writer, "  \"performance\": {{")?;
    writeln!(writer, "    \"duration_s\": {:.3},", summary.duration)?;
    writeln!(writer, "    \"ticks\": {},", summary.ticks)?;
    writeln!(writer, "    \"initial_error_deg\": {:.3},", summary.initial_error_deg)?;
    writeln!(writer, "    \"final_error_deg\": {:.3},", summary.final_error_deg)?;
    writeln!(writer, "    \"max_abs_error_deg\": {:.3},", summary.max_abs_error_deg)?;
    writeln!(writer, "    \"first_deadband_s\": {},", deadband)?;
    writeln!(writer, "    \"deadband_ticks\": {},", summary.deadband_ticks)?;
    writeln!(writer, "    \"peak_torque_nm\": {:.2},", summary.peak_torque)?;
    writeln!(writer, "    \"peak_wheel_rpm\": {:.2},", summary.peak_wheel_rpm)?;
    writeln!(writer, "    \"brake_events\": {},", summary.brake_events)?;
    writeln!(writer, "    \"skipped_ticks\": {}", summary.skipped_ticks)?;
    writeln!(writer, "  }}")?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Write run summary JSON to a file.
pub fn write_summary_file(
    path: impl AsRef<Path>,
    config: &StabilizerConfig,
    summary: &RunSummary,
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, config, summary)
}
