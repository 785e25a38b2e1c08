//! Deterministic control cycle: read → process → write.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)` — lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity` — pin to the configured CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, priority)` — RT priority.
//!
//! All four are no-ops without the `rt` feature, so the same binary
//! logic runs paced by `std::thread::sleep` on a development host.
//!
//! ## Cycle Loop
//! Absolute-time sleep on `CLOCK_MONOTONIC` for drift-free pacing: the
//! deadline grid is fixed at startup and never re-derived from wake
//! times, so jitter does not accumulate. A single overrun is fatal
//! under `rt`; on a host it is counted and logged.
//!
//! ## Cycle Body
//! Poll operator input → integrate the plant one period under the
//! outputs held from the previous tick → sample → decide → write
//! actuators, indicator and telemetry. The decision core is
//! [`ControlLoop`], which is pure state-in/state-out and drives the
//! scenario tests and benchmarks without any pacing.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use vapor_common::config::{TrackingConfig, VaporConfig};
use vapor_common::prelude::*;

use crate::control::output;
use crate::flow;
use crate::indicator::IndicatorDriver;
use crate::input::InputSampler;
use crate::safety::esd::EsdSequencer;
use crate::state::machine::ModeController;
use crate::state::safety::SafetyAssessment;
use crate::telemetry::TelemetryEmitter;

// ─── Cycle Statistics ───────────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
///
/// Updated every cycle with no allocation; read once at shutdown for
/// the timing summary.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Running sum of squares for jitter computation.
    pub sum_sq_cycle_ns: i128,
    /// Number of overruns detected.
    pub overruns: u64,
    /// Maximum wake-up latency [ns] past the deadline.
    pub max_latency_ns: i64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            sum_sq_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record one cycle. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        if duration_ns < self.min_cycle_ns {
            self.min_cycle_ns = duration_ns;
        }
        if duration_ns > self.max_cycle_ns {
            self.max_cycle_ns = duration_ns;
        }
        self.sum_cycle_ns += duration_ns;
        self.sum_sq_cycle_ns += (duration_ns as i128) * (duration_ns as i128);
        if latency_ns > self.max_latency_ns {
            self.max_latency_ns = latency_ns;
        }
    }

    /// Average cycle time [ns] (0 before the first cycle).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }

    /// Population standard deviation of the cycle time [ns].
    pub fn stddev_cycle_ns(&self) -> i64 {
        if self.cycle_count < 2 {
            return 0;
        }
        let n = self.cycle_count as i128;
        let mean = i128::from(self.sum_cycle_ns) / n;
        let var = self.sum_sq_cycle_ns / n - mean * mean;
        if var <= 0 {
            0
        } else {
            (var as f64).sqrt() as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Cycle Errors ───────────────────────────────────────────────────────

/// Errors during RT setup or cycle execution.
#[derive(Debug)]
pub enum CycleError {
    /// RT system call failed.
    RtSetup(String),
    /// Tick exceeded its period (fatal under the `rt` feature).
    Overrun {
        /// Actual cycle duration [ns].
        actual_ns: i64,
        /// Configured period [ns].
        budget_ns: i64,
    },
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RtSetup(msg) => write!(f, "RT setup error: {msg}"),
            Self::Overrun {
                actual_ns,
                budget_ns,
            } => write!(f, "cycle overrun: {actual_ns}ns > {budget_ns}ns budget"),
        }
    }
}

impl std::error::Error for CycleError {}

// ─── RT Setup ───────────────────────────────────────────────────────────

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{mlockall, MlockallFlags};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch a large stack allocation so the pages exist before the loop
/// starts.
fn prefault_stack() {
    let mut buf = [0u8; 1024 * 1024];
    for byte in buf.iter_mut() {
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

/// Pin the current thread to one CPU core.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

/// Set SCHED_FIFO with the given RT priority.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Perform the full RT setup sequence. Must run before the cycle loop.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Decision Core ──────────────────────────────────────────────────────

/// Everything one tick produces.
#[derive(Debug, Clone, Copy)]
pub struct TickOutputs {
    /// Modulating actuator command for the coming period.
    pub command: ActuatorCommand,
    /// Discrete output image for the coming period.
    pub discrete: DiscreteOutputs,
    /// Beacon command for this tick.
    pub indicator: IndicatorCommand,
    /// Flow band resolved this tick.
    pub flow: FlowState,
    /// Telemetry aggregate for this tick.
    pub snapshot: TelemetrySnapshot,
}

/// The pure per-tick decision pipeline.
///
/// Holds every piece of controller state (debouncers, ESD sequencer,
/// mode ladder, indicator animation, last-good readings) and advances
/// all of it in one `tick` call. No I/O, no clocks: scenario tests and
/// benchmarks drive it with synthetic readings.
#[derive(Debug)]
pub struct ControlLoop {
    sampler: InputSampler,
    esd: EsdSequencer,
    modes: ModeController,
    indicator: IndicatorDriver,
    tracking: TrackingConfig,
    tick: u64,
    last_good: ProcessState,
}

impl ControlLoop {
    pub fn new(config: &VaporConfig) -> Self {
        Self {
            sampler: InputSampler::new(config.control.debounce_ticks()),
            esd: EsdSequencer::new(),
            modes: ModeController::new(&config.setpoints),
            indicator: IndicatorDriver::new(),
            tracking: config.tracking,
            tick: 0,
            last_good: ProcessState {
                pressure_kpa: config.plant.initial_pressure_kpa,
                temperature_c: config.plant.initial_temperature_c,
            },
        }
    }

    /// Index of the next tick to run.
    pub const fn tick_index(&self) -> u64 {
        self.tick
    }

    /// Current system mode.
    pub const fn mode(&self) -> SystemMode {
        self.modes.mode()
    }

    /// Current operator setpoints.
    pub const fn setpoints(&self) -> Setpoints {
        self.modes.setpoints()
    }

    /// Run one tick of the decision pipeline.
    ///
    /// Stage order is fixed: debounce → safety classification → ESD
    /// sequencing → mode ladder → setpoint adjust → flow → actuator
    /// assembly → beacon → snapshot capture.
    pub fn tick(&mut self, raw: RawInputs, measurements: &Measurements) -> TickOutputs {
        let events = self.sampler.sample(raw);
        let assessment = SafetyAssessment::assess(measurements);

        let phase = self.esd.tick(measurements, &assessment, events.esd_edge);
        let directive = self.esd.directive(measurements);

        let decision = self.modes.step(phase, measurements, events.mode_toggle);
        if let Some(next) = decision.toggled {
            self.indicator.start_toggle_animation(next);
        }
        self.modes.apply_setpoint_delta(events.setpoint_detents);

        let flow = flow::classify(decision.mode, measurements);
        let setpoints = self.modes.setpoints();
        let (command, discrete) = output::assemble(
            decision.mode,
            directive.as_ref(),
            &setpoints,
            measurements,
            &self.tracking,
            flow,
            self.tick,
        );
        let indicator = self.indicator.render(decision.mode, &assessment, flow);

        // Telemetry carries the last finite readings; a dead sensor
        // freezes the reported value instead of poisoning the record.
        if let Some(p) = measurements.pressure_kpa {
            if p.is_finite() {
                self.last_good.pressure_kpa = p;
            }
        }
        if let Some(t) = measurements.temperature_c {
            if t.is_finite() {
                self.last_good.temperature_c = t;
            }
        }

        let snapshot = TelemetrySnapshot {
            tick: self.tick,
            pressure_kpa: self.last_good.pressure_kpa,
            temperature_c: self.last_good.temperature_c,
            valve_pct: command.valve_pct,
            heater_pct: command.heater_pct,
            flow,
            operating_mode: self.modes.operating_mode(),
            system_mode: decision.mode,
            esd_phase: phase,
            pressure_level: assessment.pressure,
            temperature_level: assessment.temperature,
            relief_open: discrete.contains(DiscreteOutputs::RELIEF),
            purge_open: discrete.contains(DiscreteOutputs::PURGE),
        };

        self.tick += 1;

        TickOutputs {
            command,
            discrete,
            indicator,
            flow,
            snapshot,
        }
    }
}

// ─── Ports ──────────────────────────────────────────────────────────────

/// The I/O surfaces the runner drives. All trait objects so the same
/// runner serves the simulated rig, the bench harness and the tests.
pub struct Ports {
    pub plant: Box<dyn ProcessPlant>,
    pub inputs: Box<dyn InputSource>,
    pub actuators: Box<dyn ActuatorSink>,
    pub indicator: Box<dyn IndicatorSink>,
    pub serial: Box<dyn SerialSink>,
    pub publisher: Box<dyn FeedPublisher>,
}

// ─── Cycle Runner ───────────────────────────────────────────────────────

/// Paces the decision core against the wall clock and moves data
/// between it and the ports.
pub struct CycleRunner {
    core: ControlLoop,
    ports: Ports,
    emitter: TelemetryEmitter,
    /// Outputs applied at the end of the previous tick; the plant
    /// integrates under these (zero-order hold).
    held_command: ActuatorCommand,
    held_discrete: DiscreteOutputs,
    tick_period_ns: i64,
    dt_s: f64,
    tick_limit: Option<u64>,
    /// Timing statistics, read at shutdown.
    pub stats: CycleStats,
}

impl CycleRunner {
    pub fn new(config: &VaporConfig, ports: Ports, announcement: Announcement) -> Self {
        Self {
            core: ControlLoop::new(config),
            ports,
            emitter: TelemetryEmitter::new(config.control.publish_interval_ticks, announcement),
            held_command: ActuatorCommand::NEUTRAL,
            held_discrete: DiscreteOutputs::empty(),
            tick_period_ns: config.control.tick_period_ms as i64 * 1_000_000,
            dt_s: config.control.tick_period_ms as f64 / 1_000.0,
            tick_limit: None,
            stats: CycleStats::new(),
        }
    }

    /// Stop after `limit` ticks instead of running until interrupted.
    pub fn set_tick_limit(&mut self, limit: Option<u64>) {
        self.tick_limit = limit;
    }

    /// The decision core, for inspection after a bounded run.
    pub const fn core(&self) -> &ControlLoop {
        &self.core
    }

    fn finished(&self) -> bool {
        self.tick_limit
            .is_some_and(|limit| self.core.tick_index() >= limit)
    }

    /// Execute one read → process → write cycle, un-paced.
    ///
    /// The paced loops call this once per period; scripted tests call
    /// it directly.
    pub fn step(&mut self) {
        // ═══ READ PHASE ═══
        let raw = self.ports.inputs.poll();
        self.ports
            .plant
            .advance(&self.held_command, self.held_discrete, self.dt_s);
        let measurements = self.ports.plant.sample();

        // ═══ PROCESS PHASE ═══
        let out = self.core.tick(raw, &measurements);

        // ═══ WRITE PHASE ═══
        self.ports.actuators.apply(&out.command, out.discrete);
        self.ports.indicator.set(out.indicator);
        self.emitter.emit(
            &out.snapshot,
            &mut *self.ports.serial,
            &mut *self.ports.publisher,
        );

        self.held_command = out.command;
        self.held_discrete = out.discrete;
    }

    /// Enter the paced cycle loop until `running` clears, the tick
    /// limit is reached, or (under `rt`) a deadline is missed.
    pub fn run(&mut self, running: &AtomicBool) -> Result<(), CycleError> {
        info!(
            period_ns = self.tick_period_ns,
            limit = ?self.tick_limit,
            "entering control cycle"
        );

        #[cfg(feature = "rt")]
        {
            self.run_rt_loop(running)
        }

        #[cfg(not(feature = "rt"))]
        {
            self.run_sim_loop(running)
        }
    }

    /// RT cycle loop using `clock_nanosleep(TIMER_ABSTIME)`.
    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, running: &AtomicBool) -> Result<(), CycleError> {
        use nix::time::{clock_gettime, clock_nanosleep, ClockId, ClockNanosleepFlags};

        let clock = ClockId::CLOCK_MONOTONIC;
        let mut deadline = clock_gettime(clock)
            .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;

        while running.load(Ordering::Relaxed) && !self.finished() {
            let cycle_start = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
            let wake_latency_ns = timespec_diff_ns(&cycle_start, &deadline).max(0);
            deadline = timespec_add_ns(deadline, self.tick_period_ns);

            self.step();

            let cycle_end = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
            let duration_ns = timespec_diff_ns(&cycle_end, &cycle_start);
            self.stats.record(duration_ns, wake_latency_ns);

            if duration_ns > self.tick_period_ns {
                self.stats.overruns += 1;
                return Err(CycleError::Overrun {
                    actual_ns: duration_ns,
                    budget_ns: self.tick_period_ns,
                });
            }

            // Absolute deadline: drift-free even if the body jitters.
            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &deadline);
        }
        Ok(())
    }

    /// Host cycle loop using `std::thread::sleep`. Overruns are counted
    /// but non-fatal: host schedulers hiccup.
    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self, running: &AtomicBool) -> Result<(), CycleError> {
        use std::time::{Duration, Instant};

        let period = Duration::from_nanos(self.tick_period_ns as u64);

        while running.load(Ordering::Relaxed) && !self.finished() {
            let cycle_start = Instant::now();

            self.step();

            let elapsed = cycle_start.elapsed();
            let duration_ns = elapsed.as_nanos() as i64;
            self.stats.record(duration_ns, 0);

            if duration_ns > self.tick_period_ns {
                self.stats.overruns += 1;
                warn!(
                    actual_ns = duration_ns,
                    budget_ns = self.tick_period_ns,
                    "tick overran its period"
                );
            }

            if let Some(remaining) = period.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
        Ok(())
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────────

/// Add nanoseconds to a TimeSpec.
#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    while nanos < 0 {
        secs -= 1;
        nanos += 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

/// Difference (a − b) in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────────
