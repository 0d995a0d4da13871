use std::fs;
use std::time::{Duration, Instant};

use hp_core::{Dialect, HoneyPotError};
use hp_host::{default_candidates, pump, RhaiHost};
use hp_runtime::{EngineEvent, RootCandidate, SyncEngine, SyncOptions};

use crate::rows::attach_controls;
use crate::{map_cli_options_read, map_cli_script_read, map_cli_state_read, SessionArgs};

/// A rhai game plus the sync engine watching it, driven by one clock.
pub(crate) struct Session {
    pub(crate) engine: SyncEngine<RhaiHost>,
    game_script: Option<String>,
    clock: Instant,
}

impl Session {
    pub(crate) fn open(args: &SessionArgs) -> Result<Self, HoneyPotError> {
        let raw_state = fs::read_to_string(&args.state).map_err(map_cli_state_read)?;
        let host = RhaiHost::from_json_str(&args.var, &raw_state)?;
        let game_script = args
            .script
            .as_ref()
            .map(fs::read_to_string)
            .transpose()
            .map_err(map_cli_script_read)?;
        let options = load_options(args)?;
        let candidates = root_candidates(args);

        let clock = Instant::now();
        let mut engine = SyncEngine::new(host, options);
        engine.initialize(&candidates);
        pump(&mut engine, clock);
        attach_controls(&mut engine)?;
        Ok(Self {
            engine,
            game_script,
            clock,
        })
    }

    pub(crate) fn now(&self) -> Instant {
        self.clock
    }

    /// Delivers every outstanding evaluation.
    pub(crate) fn settle(&mut self) -> usize {
        pump(&mut self.engine, self.clock)
    }

    /// Moves the clock forward by one game tick. The game script runs
    /// first, then the poll timer gets its chance to fire. Returns whether
    /// a poll went out.
    pub(crate) fn tick(&mut self, elapsed: Duration) -> Result<bool, HoneyPotError> {
        self.clock += elapsed;
        if let Some(script) = &self.game_script {
            self.engine.boundary_mut().run_script(script)?;
        }
        let polled = self.engine.advance(self.clock) && self.engine.poll_in_flight();
        self.settle();
        Ok(polled)
    }

    /// Runs ad-hoc rhai against the game, outside any tick.
    pub(crate) fn run(&mut self, script: &str) -> Result<(), HoneyPotError> {
        self.engine.boundary_mut().run_script(script)
    }

    pub(crate) fn interval(&self) -> Duration {
        self.engine.options().interval()
    }

    pub(crate) fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.engine.drain_events()
    }

    /// The first discovery error, if the root could not be found.
    pub(crate) fn discovery_error(events: &[EngineEvent]) -> Option<HoneyPotError> {
        events.iter().find_map(|event| match event {
            EngineEvent::Error(error) if error.code == "DISCOVERY_FAILED" => Some(error.clone()),
            _ => None,
        })
    }
}

fn load_options(args: &SessionArgs) -> Result<SyncOptions, HoneyPotError> {
    let mut options = match &args.options {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(map_cli_options_read)?;
            SyncOptions::from_json_str(&raw)?
        }
        None => SyncOptions::default(),
    };
    // The only host this binary drives is rhai.
    options.dialect = Dialect::Rhai;
    if let Some(interval_ms) = args.interval_ms {
        options.interval_ms = interval_ms;
    }
    if args.manual {
        options.automatic = false;
    }
    if args.title.is_some() {
        options.title_expression = args.title.clone();
    }
    Ok(options)
}

fn root_candidates(args: &SessionArgs) -> Vec<RootCandidate> {
    if !args.roots.is_empty() {
        return args
            .roots
            .iter()
            .map(|root| RootCandidate::new(root.as_str(), root.as_str()))
            .collect();
    }
    let mut candidates = vec![RootCandidate::new(args.var.as_str(), args.var.as_str())];
    candidates.extend(
        default_candidates()
            .into_iter()
            .filter(|candidate| candidate.expression != args.var),
    );
    candidates
}
