//! Interactive tuning support: explicit parameter state plus a background
//! worker that keeps only the newest recompute result.

use crate::error::RecolorError;
use crate::pipeline::{recolor_region_with_report, AdjustmentParams, RegionReport};
use crate::pixels::PixelGrid;
use crate::seed::ColorRange;
use anyhow::{anyhow, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// Tunable fields in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    HueTolerance,
    SatTolerance,
    ValTolerance,
    HueShift,
    SatScale,
    ValScale,
}

impl ParamField {
    pub const ALL: [ParamField; 6] = [
        ParamField::HueTolerance,
        ParamField::SatTolerance,
        ParamField::ValTolerance,
        ParamField::HueShift,
        ParamField::SatScale,
        ParamField::ValScale,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ParamField::HueTolerance => "Hue Tolerance",
            ParamField::SatTolerance => "Sat Tolerance",
            ParamField::ValTolerance => "Val Tolerance",
            ParamField::HueShift => "Hue Shift",
            ParamField::SatScale => "Sat Scale",
            ParamField::ValScale => "Val Scale",
        }
    }

    fn is_angular(self) -> bool {
        matches!(self, ParamField::HueTolerance | ParamField::HueShift)
    }

    fn step(self, size: StepSize) -> f32 {
        match (self.is_angular(), size) {
            (true, StepSize::Small) => 1.0,
            (true, StepSize::Large) => 5.0,
            (false, StepSize::Small) => 0.01,
            (false, StepSize::Large) => 0.05,
        }
    }

    fn limits(self) -> (f32, f32) {
        match self {
            ParamField::HueTolerance | ParamField::HueShift => (0.0, 180.0),
            ParamField::SatTolerance | ParamField::ValTolerance => (0.0, 1.0),
            ParamField::SatScale | ParamField::ValScale => (0.0, 5.0),
        }
    }

    fn slot(self, params: &mut AdjustmentParams) -> &mut f32 {
        match self {
            ParamField::HueTolerance => &mut params.h_tolerance,
            ParamField::SatTolerance => &mut params.s_tolerance,
            ParamField::ValTolerance => &mut params.v_tolerance,
            ParamField::HueShift => &mut params.hue_shift,
            ParamField::SatScale => &mut params.saturation_scale,
            ParamField::ValScale => &mut params.value_scale,
        }
    }

    fn read(self, params: &AdjustmentParams) -> f32 {
        match self {
            ParamField::HueTolerance => params.h_tolerance,
            ParamField::SatTolerance => params.s_tolerance,
            ParamField::ValTolerance => params.v_tolerance,
            ParamField::HueShift => params.hue_shift,
            ParamField::SatScale => params.saturation_scale,
            ParamField::ValScale => params.value_scale,
        }
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ParamField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "h_tol" | "h_tolerance" => Ok(ParamField::HueTolerance),
            "s_tol" | "s_tolerance" => Ok(ParamField::SatTolerance),
            "v_tol" | "v_tolerance" => Ok(ParamField::ValTolerance),
            "shift" | "hue_shift" => Ok(ParamField::HueShift),
            "s_scale" | "saturation_scale" => Ok(ParamField::SatScale),
            "v_scale" | "value_scale" => Ok(ParamField::ValScale),
            other => Err(anyhow!("Unknown parameter: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSize {
    Small,
    Large,
}

/// Current parameters of a tuning session and which field the keys act on
#[derive(Debug, Clone)]
pub struct TuningState {
    params: AdjustmentParams,
    defaults: AdjustmentParams,
    active: Option<ParamField>,
}

impl TuningState {
    pub fn new(defaults: AdjustmentParams) -> Self {
        Self {
            params: defaults,
            defaults,
            active: None,
        }
    }

    pub fn params(&self) -> &AdjustmentParams {
        &self.params
    }

    pub fn active(&self) -> Option<ParamField> {
        self.active
    }

    pub fn select(&mut self, field: ParamField) {
        self.active = Some(field);
    }

    /// Step the active field and clamp it to its limits.
    ///
    /// Returns true if the parameters changed.
    pub fn adjust(&mut self, direction: Direction, size: StepSize) -> bool {
        let Some(field) = self.active else {
            return false;
        };

        let step = field.step(size);
        let (min, max) = field.limits();
        let slot = field.slot(&mut self.params);
        let before = *slot;

        let delta = match direction {
            Direction::Up => step,
            Direction::Down => -step,
        };
        *slot = (before + delta).clamp(min, max);

        *slot != before
    }

    /// Back to the session defaults; the active field is kept
    pub fn reset(&mut self) -> bool {
        let changed = self.params != self.defaults;
        self.params = self.defaults;
        changed
    }

    /// One display line per field, active field marked with `>`
    pub fn describe(&self) -> Vec<String> {
        ParamField::ALL
            .iter()
            .map(|&field| {
                let value = field.read(&self.params);
                let text = if field.is_angular() {
                    format!("{}: {:.0}°", field.label(), value)
                } else {
                    format!("{}: {:.2}", field.label(), value)
                };
                let marker = if self.active == Some(field) { ">" } else { " " };
                format!("{} {}", marker, text)
            })
            .collect()
    }
}

/// A finished recompute
#[derive(Debug, Clone)]
pub struct Rendered {
    pub generation: u64,
    pub image: PixelGrid,
    pub report: RegionReport,
}

enum Job {
    Render {
        generation: u64,
        params: AdjustmentParams,
    },
    Shutdown,
}

#[derive(Default)]
struct Slot {
    latest: Option<Rendered>,
    failure: Option<(u64, String)>,
}

struct Shared {
    slot: Mutex<Slot>,
    published: Condvar,
    submitted: AtomicU64,
}

/// Recomputes the output image on a worker thread.
///
/// Jobs queued behind a newer one are skipped, and a result whose generation
/// was superseded while it ran is dropped instead of published.
pub struct Recomputer {
    sender: Sender<Job>,
    shared: Arc<Shared>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Recomputer {
    pub fn new(source: PixelGrid, range: ColorRange) -> Result<Self> {
        let (sender, receiver) = unbounded();
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::default()),
            published: Condvar::new(),
            submitted: AtomicU64::new(0),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("recompute".to_string())
            .spawn(move || Self::worker(source, range, receiver, worker_shared))?;

        Ok(Self {
            sender,
            shared,
            worker: Some(worker),
        })
    }

    /// Queue a recompute; returns its generation
    pub fn submit(&self, params: AdjustmentParams) -> u64 {
        let generation = self.shared.submitted.fetch_add(1, Ordering::AcqRel) + 1;
        let _ = self.sender.send(Job::Render { generation, params });
        generation
    }

    /// Newest published result, if any
    pub fn latest(&self) -> Option<Rendered> {
        self.shared.slot.lock().latest.clone()
    }

    /// Block until `generation` or a newer one is published or has failed
    pub fn wait_for(&self, generation: u64) -> Result<Rendered> {
        let mut slot = self.shared.slot.lock();
        loop {
            let rendered_gen = slot.latest.as_ref().map_or(0, |r| r.generation);
            let failed_gen = slot.failure.as_ref().map_or(0, |f| f.0);

            // Whichever outcome is newer wins
            if failed_gen >= generation && failed_gen > rendered_gen {
                if let Some((failed, message)) = &slot.failure {
                    return Err(anyhow!("Recompute {} failed: {}", failed, message));
                }
            }
            if rendered_gen >= generation {
                if let Some(rendered) = &slot.latest {
                    return Ok(rendered.clone());
                }
            }
            self.shared.published.wait(&mut slot);
        }
    }

    fn worker(source: PixelGrid, range: ColorRange, receiver: Receiver<Job>, shared: Arc<Shared>) {
        while let Ok(job) = receiver.recv() {
            // Only the newest queued job matters
            let mut newest = job;
            while let Ok(next) = receiver.try_recv() {
                newest = next;
            }

            let (generation, params) = match newest {
                Job::Render { generation, params } => (generation, params),
                Job::Shutdown => break,
            };

            let result = recolor_region_with_report(&source, &range, &params);

            if shared.submitted.load(Ordering::Acquire) != generation {
                tracing::debug!(generation, "discarding stale recompute");
                continue;
            }

            let mut slot = shared.slot.lock();
            match result {
                Ok(outcome) => {
                    let report = outcome.report();
                    slot.latest = Some(Rendered {
                        generation,
                        image: outcome.image,
                        report,
                    });
                }
                Err(e) => {
                    Self::record_failure(&mut slot, generation, &e);
                }
            }
            drop(slot);
            shared.published.notify_all();
        }
    }

    fn record_failure(slot: &mut Slot, generation: u64, error: &RecolorError) {
        tracing::warn!(generation, %error, "recompute failed");
        slot.failure = Some((generation, error.to_string()));
    }
}

impl Drop for Recomputer {
    fn drop(&mut self) {
        let _ = self.sender.send(Job::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_tuning_params;

    #[test]
    fn test_adjust_without_active_field_is_noop() {
        let mut state = TuningState::new(default_tuning_params());
        assert!(!state.adjust(Direction::Up, StepSize::Small));
        assert_eq!(*state.params(), default_tuning_params());
    }

    #[test]
    fn test_steps_and_clamps() {
        let mut state = TuningState::new(default_tuning_params());

        state.select(ParamField::HueTolerance);
        assert!(state.adjust(Direction::Up, StepSize::Large));
        assert_eq!(state.params().h_tolerance, 20.0);

        state.select(ParamField::SatTolerance);
        assert!(state.adjust(Direction::Down, StepSize::Small));
        assert!((state.params().s_tolerance - 0.23).abs() < 1e-6);

        state.select(ParamField::HueShift);
        for _ in 0..40 {
            state.adjust(Direction::Up, StepSize::Large);
        }
        assert_eq!(state.params().hue_shift, 180.0);
        assert!(!state.adjust(Direction::Up, StepSize::Small));

        state.select(ParamField::ValScale);
        for _ in 0..30 {
            state.adjust(Direction::Down, StepSize::Large);
        }
        assert_eq!(state.params().value_scale, 0.0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = TuningState::new(default_tuning_params());
        state.select(ParamField::SatScale);
        state.adjust(Direction::Up, StepSize::Large);
        assert!(state.reset());
        assert_eq!(*state.params(), default_tuning_params());
        assert_eq!(state.active(), Some(ParamField::SatScale));
        assert!(!state.reset());
    }

    #[test]
    fn test_describe_marks_active_field() {
        let mut state = TuningState::new(default_tuning_params());
        state.select(ParamField::SatTolerance);
        let lines = state.describe();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "  Hue Tolerance: 15°");
        assert_eq!(lines[1], "> Sat Tolerance: 0.24");
        assert_eq!(lines[3], "  Hue Shift: 30°");
    }

    #[test]
    fn test_field_names_parse() {
        assert_eq!("h_tol".parse::<ParamField>().unwrap(), ParamField::HueTolerance);
        assert_eq!("value_scale".parse::<ParamField>().unwrap(), ParamField::ValScale);
        assert!("brightness".parse::<ParamField>().is_err());
    }

    #[test]
    fn test_recomputer_publishes_newest_generation() {
        let source = PixelGrid::filled(4, 4, [255, 0, 0]).unwrap();
        let range = ColorRange::new([250, 0, 0], [255, 10, 10]);
        let recomputer = Recomputer::new(source, range).unwrap();

        let mut params = AdjustmentParams::default();
        recomputer.submit(params);
        params.hue_shift = 120.0;
        let last = recomputer.submit(params);

        let rendered = recomputer.wait_for(last).unwrap();
        assert_eq!(rendered.generation, last);
        assert_eq!(rendered.report.region_size, 16);
        assert!(rendered.image.rgb().iter().all(|&px| px == [0, 255, 0]));
        assert_eq!(recomputer.latest().map(|r| r.generation), Some(last));
    }

    #[test]
    fn test_recomputer_reports_failures() {
        let source = PixelGrid::filled(2, 2, [255, 0, 0]).unwrap();
        let range = ColorRange::new([250, 0, 0], [255, 10, 10]);
        let recomputer = Recomputer::new(source, range).unwrap();

        let params = AdjustmentParams {
            saturation_scale: -1.0,
            ..Default::default()
        };
        let generation = recomputer.submit(params);
        let err = recomputer.wait_for(generation).unwrap_err();
        assert!(err.to_string().contains("saturation_scale"));
    }
}
