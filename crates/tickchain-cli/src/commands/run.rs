//! Run command - a live tick session on the system clock.
//!
//! Ticks until `max_ticks` is reached or Ctrl+C is pressed, then verifies the
//! in-memory chain and exports the records. Export failures are reported but
//! do not fail the command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tickchain::{
    EntropySource, Error, RngEntropy, STRESS_LIMIT, Session, SystemClock, TickRecord,
};
use tickchain_config::{ConfigLoader, TickchainConfig};

use crate::commands::version::VERSION;
use crate::style::banner::print_banner;
use crate::style::colors::SemanticStyle;
use crate::style::{
    print_error, print_hint, print_info_table, print_labeled, print_spacer, print_success,
    print_warn, set_no_color,
};

/// Shortest cadence accepted from `--tick-sec`.
const MIN_TICK_SEC: f64 = 0.001;

/// Longest single sleep while waiting for the next tick, so Ctrl+C is
/// noticed promptly.
const WAIT_SLICE: Duration = Duration::from_millis(50);

/// Command line overrides for a session. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub project: String,
    pub tick_sec: Option<f64>,
    pub tick_ms: Option<f64>,
    pub max_ticks: Option<u64>,
    pub stress: Option<f64>,
    pub decay: Option<f64>,
    pub weight: Option<f64>,
    pub seed: Option<u64>,
    pub out_dir: Option<PathBuf>,
    pub basename: Option<String>,
    pub manifest_id: Option<String>,
    pub no_export: bool,
}

pub fn run(opts: &RunOptions) -> Result<()> {
    let project_dir = Path::new(&opts.project);

    let mut config = ConfigLoader::new()
        .with_project_dir(project_dir)
        .load()
        .context("Failed to load configuration")?;
    apply_overrides(&mut config, opts);
    config
        .validate()
        .context("Invalid command line overrides")?;

    if !config.display.color {
        set_no_color(true);
    }

    let entropy = match opts.seed {
        Some(seed) => RngEntropy::seeded(seed),
        None => RngEntropy::from_os(),
    };
    let mut session = Session::new(config.session_config(), SystemClock::new(), entropy);

    print_banner(VERSION);
    print_manifest(&config, &session, opts.seed);
    if config.stress_out_of_range() {
        print_warn(&format!(
            "Stress {} clamped to {}",
            config.session.a_stress,
            session.stress()
        ));
    }
    print_spacer();

    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&stop))
        .context("Failed to install Ctrl+C handler")?;

    let cadence = Duration::try_from_secs_f64(session.tick_ms() / 1000.0).unwrap_or(Duration::MAX);

    while !stop.load(Ordering::Relaxed) && !session.is_finished() {
        let started = Instant::now();
        session.tick();
        print_tick(&session);

        if session.is_finished() {
            break;
        }
        wait_until(started.checked_add(cadence), &stop);
    }

    print_spacer();
    if stop.load(Ordering::Relaxed) {
        print_warn("Interrupted");
    }
    print_summary(&session);

    match session.verify() {
        Ok(count) => print_success(&format!("In-memory chain verified ({count} ticks)")),
        Err(e) => print_error(&format!("In-memory chain mismatch: {e}")),
    }

    if opts.no_export {
        print_hint("Export skipped (--no-export)");
        return Ok(());
    }

    match session.export(&config.export.directory, &config.export.basename) {
        Ok(path) => {
            print_success(&format!("Exported {} ticks", session.tick_count()));
            print_labeled("File", &path.display().to_string());
            print_hint(&format!("Check it with: tickchain verify {}", path.display()));
        }
        Err(Error::NothingToExport) => print_warn("Nothing to export"),
        Err(e) => {
            tracing::error!(error = %e, "export failed");
            print_error(&format!("Export failed: {e}"));
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut TickchainConfig, opts: &RunOptions) {
    if let Some(tick_sec) = opts.tick_sec {
        config.session.tick_ms = tick_sec.max(MIN_TICK_SEC) * 1000.0;
    }
    if let Some(tick_ms) = opts.tick_ms {
        config.session.tick_ms = tick_ms;
    }
    if let Some(max_ticks) = opts.max_ticks {
        config.session.max_ticks = max_ticks;
    }
    if let Some(stress) = opts.stress {
        config.session.a_stress = stress;
    }
    if let Some(decay) = opts.decay {
        config.kernel.decay = decay;
    }
    if let Some(weight) = opts.weight {
        config.kernel.weight = weight;
    }
    if let Some(out_dir) = &opts.out_dir {
        config.export.directory.clone_from(out_dir);
    }
    if let Some(basename) = &opts.basename {
        config.export.basename.clone_from(basename);
    }
    if let Some(manifest_id) = &opts.manifest_id {
        config.session.manifest_id.clone_from(manifest_id);
    }
}

fn print_manifest<C, E>(config: &TickchainConfig, session: &Session<C, E>, seed: Option<u64>)
where
    C: tickchain::Clock,
    E: EntropySource,
{
    let params = session.params();
    let max_ticks = match session.max_ticks() {
        0 => "until Ctrl+C".to_string(),
        n => n.to_string(),
    };

    print_info_table(&[
        ("manifest_id", config.session.manifest_id.clone()),
        ("tick_ms", format!("{:.1}", session.tick_ms())),
        ("max_ticks", max_ticks),
        ("weight", params.kernel.weight.to_string()),
        ("decay", params.kernel.decay.to_string()),
        ("baseline", params.alignment.baseline.to_string()),
        ("jitter_gain", params.alignment.jitter_gain.to_string()),
        ("freeze_mult", params.alignment.freeze_mult.to_string()),
        ("freeze_penalty", params.alignment.freeze_penalty.to_string()),
        ("noise_ampl", params.alignment.noise_ampl.to_string()),
        (
            "a_stress",
            format!("{} (limit ±{STRESS_LIMIT})", session.stress()),
        ),
        ("seed", seed.map_or_else(|| "os entropy".to_string(), |s| s.to_string())),
        ("export", config.export.directory.display().to_string()),
    ]);
}

/// `NNNN  time_utc  align=±x.xxxxxxxxx  band=B   dt_ms=   nnn.n  history:<spark>`
fn format_tick(record: &TickRecord, health: tickchain::DtHealth, spark: &str) -> String {
    format!(
        "{:04}  {}  align={}  band={}  dt_ms={}  history:{}",
        record.tick_index.as_u64(),
        record.time_utc,
        record.final_align.for_band(record.band),
        format!("{:<2}", record.band.as_str()).for_band(record.band),
        format!("{:7.1}", record.dt_ms).for_health(health),
        spark,
    )
}

fn print_tick<C, E>(session: &Session<C, E>)
where
    C: tickchain::Clock,
    E: EntropySource,
{
    if let Some(record) = session.last() {
        println!(
            "{}",
            format_tick(record, session.dt_health(), &session.sparkline())
        );
    }
}

fn print_summary<C, E>(session: &Session<C, E>)
where
    C: tickchain::Clock,
    E: EntropySource,
{
    print_labeled("Ticks", &session.tick_count().to_string());
    if let Some(last) = session.last() {
        print_labeled("Final align", &last.final_align);
        print_labeled("Final band", last.band.as_str());
        print_labeled("Chain head", &last.stamp.to_hex());
    }
}

/// Sleeps until `deadline` or until `stop` is set. `None` waits for `stop`.
fn wait_until(deadline: Option<Instant>, stop: &AtomicBool) {
    while !stop.load(Ordering::Relaxed) {
        let remaining = match deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => WAIT_SLICE,
        };
        if remaining.is_zero() {
            return;
        }
        thread::sleep(remaining.min(WAIT_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickchain::{FixedDraw, TickEngine};

    #[test]
    fn tick_seconds_are_floored() {
        let mut config = TickchainConfig::default();
        let opts = RunOptions {
            tick_sec: Some(0.0),
            ..RunOptions::default()
        };
        apply_overrides(&mut config, &opts);
        assert_eq!(config.session.tick_ms, 1.0);
    }

    #[test]
    fn tick_ms_wins_over_tick_seconds() {
        let mut config = TickchainConfig::default();
        let opts = RunOptions {
            tick_sec: Some(2.0),
            tick_ms: Some(125.0),
            ..RunOptions::default()
        };
        apply_overrides(&mut config, &opts);
        assert_eq!(config.session.tick_ms, 125.0);
    }

    #[test]
    fn unset_overrides_keep_config() {
        let mut config = TickchainConfig::default();
        apply_overrides(&mut config, &RunOptions::default());
        assert_eq!(config, TickchainConfig::default());
    }

    #[test]
    fn tick_line_layout() {
        set_no_color(true);
        let mut engine = TickEngine::default();
        let record = engine
            .step("2024-01-01T00:00:00Z", 1000.0, 1000.0, 0.0, &mut FixedDraw::new(0.0))
            .clone();

        let line = format_tick(&record, tickchain::DtHealth::Nominal, "_");
        assert_eq!(
            line,
            "0001  2024-01-01T00:00:00Z  align=+0.020000000  band=C   dt_ms= 1000.0  history:_"
        );
    }

    #[test]
    fn wait_returns_once_deadline_passed() {
        let stop = AtomicBool::new(false);
        let started = Instant::now();
        wait_until(Some(started + Duration::from_millis(5)), &stop);
        assert!(started.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn wait_returns_immediately_when_stopped() {
        let stop = AtomicBool::new(true);
        wait_until(None, &stop);
    }
}
