use std::io::{self, Write};
use std::path::Path;

use crate::gnc::{ManualDirection, Mode};
use crate::telemetry::TelemetrySample;

/// Write per-tick telemetry in CSV format.
///
/// Columns: time, yaw_deg, error_deg, body_rate, wheel_rate, wheel_rpm,
///          control_torque, body_torque, wheel_torque, mode, braking, manual, skipped
pub fn write_telemetry<W: Write>(writer: &mut W, samples: &[TelemetrySample]) -> io::Result<()> {
    writeln!(
        writer,
        "time,yaw_deg,error_deg,body_rate,wheel_rate,wheel_rpm,\
         control_torque,body_torque,wheel_torque,mode,braking,manual,skipped"
    )?;

    for s in samples {
        let mode = match s.mode {
            Some(Mode::Active) => "active",
            Some(Mode::Deadband) => "deadband",
            None => "",
        };
        let manual = match s.manual {
            Some(ManualDirection::Negative) => "-",
            Some(ManualDirection::Positive) => "+",
            None => "",
        };
        writeln!(
            writer,
            "{:.4},{:.4},{:.4},{:.6},{:.6},{:.2},\
             {:.4},{:.4},{:.4},{},{},{},{}",
            s.time,
            s.yaw_deg,
            s.error_deg,
            s.body_rate,
            s.wheel_rate,
            s.wheel_rpm,
            s.control_torque,
            s.applied.body_torque,
            s.applied.wheel_torque,
            mode,
            s.braking as u8,
            manual,
            s.skipped as u8,
        )?;
    }

    Ok(())
}

/// Write telemetry to a CSV file at the given path.
pub fn write_telemetry_file(path: impl AsRef<Path>, samples: &[TelemetrySample]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_telemetry(&mut file, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::{BodyKinematics, TorqueCommand};
    use crate::gnc::TickReport;

    #[test]
    fn csv_output_has_header_and_rows() {
        let cmd = TorqueCommand { body_torque: -11.0, wheel_torque: 11.0 };
        let paired = Some(TickReport { mode: Mode::Active, braking: false });
        let brake = TorqueCommand { body_torque: -11.0, wheel_torque: -11.0 };
        let mut kick = TelemetrySample::record(
            0.02,
            &BodyKinematics::new(16.0, -24.0, 475.0),
            brake,
            brake,
            Some(TickReport { mode: Mode::Active, braking: true }),
        );
        kick.manual = Some(ManualDirection::Negative);
        let samples = vec![
            TelemetrySample::record(0.0, &BodyKinematics::new(30.0, 0.0, 0.0), cmd, cmd, paired),
            kick,
            TelemetrySample::skipped(0.04, &BodyKinematics::new(10.0, -20.0, 0.0), TorqueCommand::ZERO),
        ];

        let mut buf = Vec::new();
        write_telemetry(&mut buf, &samples).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("time,"));
        assert_eq!(lines.len(), 4); // header + 3 data rows
        assert!(lines[1].starts_with("0.0000,30.0000,-30.0000,"));
        assert!(lines[1].ends_with(",active,0,,0"));
        assert!(lines[2].ends_with(",active,1,-,0"));
        assert!(lines[3].ends_with(",,0,,1"));
    }
}
