use anyhow::{bail, Context};
use log::info;

use wheel_stab::config::StabilizerConfig;
use wheel_stab::gnc::{ManualDirection, ManualInput, Mode};
use wheel_stab::io::{self as output, RunSummary};
use wheel_stab::sim;
use wheel_stab::telemetry;

struct Args {
    config: Option<String>,
    csv: Option<String>,
    json: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args { config: None, csv: None, json: None };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--csv" => args.csv = Some(it.next().context("--csv needs a path")?),
            "--json" => args.json = Some(it.next().context("--json needs a path")?),
            "-h" | "--help" => {
                println!("usage: wheel-stab [CONFIG.toml] [--csv PATH] [--json PATH]");
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("unknown option {other}"),
            other => {
                if args.config.is_some() {
                    bail!("only one config file may be given");
                }
                args.config = Some(other.to_string());
            }
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => StabilizerConfig::load(path)
            .with_context(|| format!("loading config from {path}"))?,
        None => {
            info!("no config file given, using defaults");
            StabilizerConfig::default()
        }
    };

    // A short operator kick halfway through, to show the recovery.
    let kick_at = config.sim.max_time * 0.5;
    let inputs = [ManualInput::new(kick_at, kick_at + config.sim.dt, ManualDirection::Positive)];

    let result = sim::simulate(&config, &inputs)?;
    let summary = RunSummary::from_result(&result);
    let inertia = config.inertia.model();
    let c = &config.controller;

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  REACTION WHEEL STABILIZATION");
    println!("====================================================================");
    println!();
    println!("  Controller");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Kp:            {:>8.2}       Kd:           {:>8.2}       Ki: {:>6.2}",
        c.kp, c.kd, c.ki
    );
    println!(
        "  Max torque:    {:>8.2} Nm    Max wheel:    {:>8.0} RPM",
        c.max_torque, c.max_wheel_rpm
    );
    println!(
        "  J body:        {:>8.2e} kg m^2  J wheel: {:>8.2e} kg m^2",
        inertia.body, inertia.wheel
    );
    println!();

    println!("  Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for e in result.events.iter().take(20) {
        println!("  t={:>7.3}s   {:?}", e.time, e.kind);
    }
    if result.events.len() > 20 {
        println!("  ... {} more", result.events.len() - 20);
    }
    println!();

    println!("  Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Initial error: {:>8.2} deg", summary.initial_error_deg);
    println!("  Final error:   {:>8.2} deg", summary.final_error_deg);
    match summary.first_deadband_time {
        Some(t) => println!("  Settled at:    {:>8.2} s", t),
        None => println!("  Settled at:         never"),
    }
    println!("  Peak wheel:    {:>8.0} RPM", summary.peak_wheel_rpm);
    println!("  Brake events:  {:>8}", summary.brake_events);
    println!("  Skipped ticks: {:>8}", summary.skipped_ticks);
    println!();

    // -----------------------------------------------------------------------
    // Telemetry table (sampled)
    // -----------------------------------------------------------------------
    println!("  Telemetry");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>8}  {:>9}  {:>24}  {:>28}  {:>5}",
        "t (s)", "yaw", "err (deg)", "output", "wheel", "mode"
    );
    let sample_interval = (result.samples.len() / 25).max(1);
    for (i, s) in result.samples.iter().enumerate() {
        if i % sample_interval != 0 && s.manual.is_none() && i != result.samples.len() - 1 {
            continue;
        }
        let mode = match s.mode {
            Some(Mode::Active) => "ACT",
            Some(Mode::Deadband) => "DEAD",
            None => "SKIP",
        };
        println!(
            "  {:>7.2}  {:>8.2}  {:>9.3}  {:>24}  {:>28}  {:>5}",
            s.time,
            s.yaw_deg,
            s.error_deg,
            s.pid_output_text(),
            telemetry::current_rpm_text(s.wheel_rpm),
            mode
        );
    }
    println!();
    println!("  Simulation: {} ticks, dt={} s", summary.ticks, config.sim.dt);
    println!("====================================================================");
    println!();

    if let Some(path) = &args.csv {
        output::write_telemetry_file(path, &result.samples)
            .with_context(|| format!("writing telemetry to {path}"))?;
        info!("telemetry written to {}", path);
    }
    if let Some(path) = &args.json {
        output::write_summary_file(path, &config, &summary)
            .with_context(|| format!("writing summary to {path}"))?;
        info!("summary written to {}", path);
    }

    Ok(())
}
