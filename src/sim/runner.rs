use log::{info, warn};

use crate::config::StabilizerConfig;
use crate::dynamics::plant::PlantParams;
use crate::dynamics::state::{PlantState, TorqueCommand};
use crate::error::ControlResult;
use crate::gnc::{Controller, ManualInput, WheelPid};
use crate::telemetry::TelemetrySample;
use super::event::{DeadbandDetector, EventDetector, SimEvent, WheelBrakeDetector};
use super::integrator::{cap_angular_velocity, rk4_step};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct SimResult {
    pub samples: Vec<TelemetrySample>,
    pub events: Vec<SimEvent>,
    pub final_state: PlantState,
    pub skipped_ticks: usize,
}

// ---------------------------------------------------------------------------
// Fixed-step stabilization run
// ---------------------------------------------------------------------------

/// Drive `controller` against the single-axis plant at the configured fixed tick.
///
/// Each tick: measure, ask the controller, add any held manual override,
/// integrate. A tick the controller rejects applies no control torque.
/// `config` is validated first; a bad tick or horizon never starts the loop.
pub fn simulate_with(
    config: &StabilizerConfig,
    controller: &mut dyn Controller,
    inputs: &[ManualInput],
) -> ControlResult<SimResult> {
    config.validate()?;
    let sim = &config.sim;
    let params = PlantParams {
        inertia: config.inertia.model(),
        angular_drag: sim.angular_drag,
    };

    let mut state = PlantState::new(sim.initial_yaw_deg, sim.initial_body_rate);

    let capacity = (sim.max_time / sim.dt) as usize + 1;
    let mut samples: Vec<TelemetrySample> = Vec::with_capacity(capacity.min(200_000));
    let mut events = Vec::new();
    let mut detectors: Vec<Box<dyn EventDetector>> =
        vec![Box::new(DeadbandDetector::default()), Box::new(WheelBrakeDetector)];
    let mut skipped_ticks = 0;

    info!(
        "running {} for {:.1}s at dt={}s from yaw {:.1} deg",
        controller.name(),
        sim.max_time,
        sim.dt,
        sim.initial_yaw_deg
    );

    // Guard against accumulated time landing a hair under max_time.
    while state.time < sim.max_time - sim.dt * 1e-6 {
        let kin = state.kinematics();

        let control = controller.control(&kin, sim.dt);

        let manual = inputs.iter().find(|i| i.active_at(state.time)).map(|i| i.direction);
        let held = match manual {
            Some(direction) => controller.manual_torque(direction),
            None => TorqueCommand::ZERO,
        };

        let mut sample = match control {
            Ok(cmd) => TelemetrySample::record(
                state.time,
                &kin,
                cmd,
                cmd + held,
                controller.last_tick(),
            ),
            Err(e) => {
                warn!("t={:.3}s control tick skipped: {}", state.time, e);
                skipped_ticks += 1;
                TelemetrySample::skipped(state.time, &kin, held)
            }
        };
        sample.manual = manual;
        let applied = sample.applied;

        if let Some(prev) = samples.last() {
            for det in detectors.iter_mut() {
                if let Some(kind) = det.check(prev, &sample) {
                    events.push(SimEvent { time: sample.time, kind });
                }
            }
        }
        samples.push(sample);

        state = rk4_step(&state, &params, &applied, sim.dt);
        if let Some(cap) = sim.max_angular_velocity {
            cap_angular_velocity(&mut state.body, cap);
            cap_angular_velocity(&mut state.wheel, cap);
        }
    }

    Ok(SimResult { samples, events, final_state: state, skipped_ticks })
}

/// Run with the PID stabilizer built from `config` (convenience wrapper).
pub fn simulate(config: &StabilizerConfig, inputs: &[ManualInput]) -> ControlResult<SimResult> {
    let mut controller =
        WheelPid::new(config.controller.clone())?.with_inertia(config.inertia.model());
    simulate_with(config, &mut controller, inputs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ControllerConfig, SimConfig};
    use crate::dynamics::state::BodyKinematics;
    use crate::error::ControlError;
    use crate::gnc::{ManualDirection, Mode};
    use crate::physics::InertiaConfig;
    use crate::sim::event::EventKind;

    /// Heavy, well-damped body so the loop converges at a 100 Hz tick.
    fn gentle_config() -> StabilizerConfig {
        StabilizerConfig {
            controller: ControllerConfig { kp: 0.2, kd: 0.2, ki: 0.0, ..Default::default() },
            // J_body = 0.5 * 50 * 0.2^2 = 1.0 kg m^2
            inertia: InertiaConfig { body_mass: 50.0, body_radius: 0.2, ..Default::default() },
            sim: SimConfig {
                dt: 0.01,
                max_time: 20.0,
                initial_yaw_deg: 30.0,
                angular_drag: 0.05,
                ..Default::default()
            },
        }
    }

    #[test]
    fn one_sample_per_tick() {
        let mut cfg = gentle_config();
        cfg.sim.max_time = 1.0;
        let res = simulate(&cfg, &[]).unwrap();
        assert_eq!(res.samples.len(), 100);
        assert!((res.final_state.time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn body_turns_toward_zero_heading() {
        let mut cfg = gentle_config();
        cfg.sim.max_time = 0.5;
        let res = simulate(&cfg, &[]).unwrap();
        let yaw = res.final_state.body.yaw_deg();
        assert!(yaw < 30.0, "yaw should decrease from 30, got {}", yaw);
    }

    #[test]
    fn converges_into_deadband() {
        let res = simulate(&gentle_config(), &[]).unwrap();
        assert!(res.events.iter().any(|e| e.kind == EventKind::EnteredDeadband));
        let last = res.samples.last().unwrap();
        assert!(last.error_deg.abs() < 1.0, "final error {}", last.error_deg);
    }

    #[test]
    fn body_torque_respects_limit_throughout() {
        let mut cfg = StabilizerConfig::default();
        cfg.sim.max_time = 2.0;
        let res = simulate(&cfg, &[]).unwrap();
        for s in &res.samples {
            assert!(s.control_torque.abs() <= cfg.controller.max_torque);
        }
    }

    #[test]
    fn light_wheel_hits_speed_limit() {
        // Default inertias: the wheel spins past 4000 RPM within a few ticks.
        let mut cfg = StabilizerConfig::default();
        cfg.sim.max_time = 1.0;
        let res = simulate(&cfg, &[]).unwrap();
        assert!(res.events.iter().any(|e| e.kind == EventKind::WheelBrakeStart));
        for s in res.samples.iter().filter(|s| s.braking) {
            assert_eq!(s.applied.wheel_torque, -s.wheel_rate.signum() * 11.0);
        }
    }

    #[test]
    fn manual_input_adds_body_torque() {
        let mut cfg = gentle_config();
        cfg.sim.max_time = 0.1;
        let kick = ManualInput::new(0.0, 0.05, ManualDirection::Positive);
        let res = simulate(&cfg, &[kick]).unwrap();
        let first = &res.samples[0];
        assert_eq!(first.manual, Some(ManualDirection::Positive));
        assert!((first.applied.body_torque - (first.control_torque + 2000.0)).abs() < 1e-9);
        // wheel sees only the controller's reaction torque
        assert_eq!(first.applied.wheel_torque, -first.control_torque);
        assert!(res.samples.last().unwrap().manual.is_none());
    }

    struct Faulty;

    impl Controller for Faulty {
        fn control(&mut self, _k: &BodyKinematics, dt: f64) -> ControlResult<TorqueCommand> {
            Err(ControlError::InvalidTimestep { dt })
        }
    }

    #[test]
    fn rejected_ticks_apply_no_torque() {
        let mut cfg = gentle_config();
        cfg.sim.max_time = 0.2;
        cfg.sim.initial_body_rate = 0.0;
        let res = simulate_with(&cfg, &mut Faulty, &[]).unwrap();
        assert_eq!(res.skipped_ticks, res.samples.len());
        assert!(res.samples.iter().all(|s| s.skipped && s.applied.is_zero()));
        assert!(res.samples.iter().all(|s| s.mode.is_none() && !s.braking));
        assert!((res.final_state.body.yaw_deg() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn deadband_start_is_quiet() {
        let mut cfg = gentle_config();
        cfg.sim.initial_yaw_deg = 0.0;
        cfg.sim.max_time = 0.5;
        let res = simulate(&cfg, &[]).unwrap();
        assert!(res.samples.iter().all(|s| s.mode == Some(Mode::Deadband) && s.applied.is_zero()));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = gentle_config();
        cfg.sim.dt = -1.0;
        assert!(simulate(&cfg, &[]).is_err());
    }

    #[test]
    fn custom_controller_run_rejects_bad_tick() {
        for dt in [0.0, -0.01, f64::NAN] {
            let mut cfg = gentle_config();
            cfg.sim.dt = dt;
            cfg.sim.max_time = 0.1;
            let err = simulate_with(&cfg, &mut WheelPid::default(), &[]).unwrap_err();
            assert!(matches!(err, ControlError::InvalidConfig { .. }), "dt={dt}: {err}");
        }
    }

    /// Spins the wheel up at full torque for a few ticks, then rejects every tick.
    struct SpinThenFail {
        good_ticks: usize,
    }

    impl Controller for SpinThenFail {
        fn control(&mut self, _k: &BodyKinematics, dt: f64) -> ControlResult<TorqueCommand> {
            if self.good_ticks == 0 {
                return Err(ControlError::InvalidTimestep { dt });
            }
            self.good_ticks -= 1;
            Ok(TorqueCommand { body_torque: 0.0, wheel_torque: 11.0 })
        }
    }

    #[test]
    fn overspeed_wheel_without_brake_is_not_reported_braking() {
        let cfg = StabilizerConfig {
            sim: SimConfig { max_time: 0.5, ..Default::default() },
            ..Default::default()
        };
        let res = simulate_with(&cfg, &mut SpinThenFail { good_ticks: 5 }, &[]).unwrap();

        let limit = cfg.controller.wheel_speed_limit();
        assert!(res.samples.last().unwrap().wheel_rate > limit, "wheel should end over speed");
        assert_eq!(res.skipped_ticks, res.samples.len() - 5);
        assert!(res.samples.iter().all(|s| !s.braking));
        assert!(res.samples.iter().filter(|s| s.skipped).all(|s| s.mode.is_none()));
        assert!(!res.events.iter().any(|e| e.kind == EventKind::WheelBrakeStart));
    }

    #[test]
    fn rejected_ticks_interrupt_pid_braking() {
        // PID brakes an over-speed wheel until its ticks start failing.
        struct FlakyPid {
            pid: WheelPid,
            good_ticks: usize,
        }

        impl Controller for FlakyPid {
            fn control(&mut self, k: &BodyKinematics, dt: f64) -> ControlResult<TorqueCommand> {
                if self.good_ticks == 0 {
                    return Err(ControlError::InvalidTimestep { dt });
                }
                self.good_ticks -= 1;
                self.pid.step(k, dt)
            }

            fn last_tick(&self) -> Option<crate::gnc::TickReport> {
                self.pid.last_tick()
            }
        }

        let mut cfg = StabilizerConfig::default();
        cfg.sim.max_time = 1.0;
        let mut ctl = FlakyPid { pid: WheelPid::default(), good_ticks: 20 };
        let res = simulate_with(&cfg, &mut ctl, &[]).unwrap();

        let braked = res.samples.iter().filter(|s| s.braking).count();
        assert!(braked > 0, "wheel should reach the brake branch before the fault");
        assert!(res.samples[20..].iter().all(|s| s.skipped && !s.braking && s.mode.is_none()));
        let ends = res.events.iter().filter(|e| e.kind == EventKind::WheelBrakeEnd).count();
        let starts = res.events.iter().filter(|e| e.kind == EventKind::WheelBrakeStart).count();
        assert_eq!(starts, ends);

        let summary = crate::io::RunSummary::from_result(&res);
        assert!(summary.deadband_ticks <= 20);
        assert_eq!(summary.skipped_ticks, res.samples.len() - 20);
    }
}
