pub mod address;
pub mod backing_store;
pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod table;
pub mod tlb;
pub mod tracker;
pub mod validator;

use address::{AddressReader, LogicalAddress};
use backing_store::BackingStore;
use config::Config;
use engine::{AccessResult, TranslationEngine};
use error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufWriter, Write};
use tracker::Tracker;
use validator::{ExpectedAccess, ValidationReader};

/// A structure which contains the core elements required to run a simulation: the engine, a
/// source of addresses and optionally a reference trace to check results against.
pub struct Simulation<A, V> {
    engine: TranslationEngine,
    address_reader: A,
    validation_reader: Option<V>,
    quiet: bool,
}

impl<A, V> Simulation<A, V>
where
    A: Iterator<Item = Result<LogicalAddress>>,
    V: Iterator<Item = Result<ExpectedAccess>>,
{
    pub fn new(
        engine: TranslationEngine,
        address_reader: A,
        validation_reader: Option<V>,
        quiet: bool,
    ) -> Self {
        Self {
            engine,
            address_reader,
            validation_reader,
            quiet,
        }
    }

    /// Translate every address until the source is exhausted, writing the per-address trace
    /// (unless quiet) and the end of run summary to `out`.
    ///
    /// # Errors
    ///
    /// The first input, backing store, validation or output error ends the run. Counters gathered
    /// up to that point are logged before the error is returned.
    pub fn run<W: Write>(self, out: &mut W) -> Result<Tracker> {
        let Simulation {
            mut engine,
            address_reader,
            mut validation_reader,
            quiet,
        } = self;

        let progress = match quiet {
            true => spinner(),
            false => ProgressBar::hidden(),
        };

        for address in address_reader {
            let step = address
                .and_then(|address| engine.access(address))
                .and_then(|access_result| {
                    record(
                        &mut engine.tracker,
                        &access_result,
                        out,
                        validation_reader.as_mut(),
                        quiet,
                    )
                });
            if let Err(err) = step {
                progress.abandon();
                let tracker = engine.tracker;
                log::warn!(
                    "run aborted after {} translations ({} faults, {} TLB hits)",
                    tracker.operations,
                    tracker.faults,
                    tracker.tlb_hits
                );
                return Err(err);
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        let tracker = engine.tracker;
        writeln!(out, "{}", tracker).map_err(Error::Output)?;
        if engine.access_time_reported() {
            let model = engine.access_time_model();
            writeln!(
                out,
                "Effective Access Time = {:.6} ns",
                tracker.effective_access_time(&model)
            )
            .map_err(Error::Output)?;
        }
        if validation_reader.is_some() {
            writeln!(out, "Correct Accesses = {}", tracker.correct_accesses)
                .map_err(Error::Output)?;
        }
        log::info!("simulation finished after {} translations", tracker.operations);
        Ok(tracker)
    }
}

/// Emit the trace line for one translation and check it against the reference trace, if any.
fn record<W, V>(
    tracker: &mut Tracker,
    access_result: &AccessResult,
    out: &mut W,
    validation_reader: Option<&mut V>,
    quiet: bool,
) -> Result<()>
where
    W: Write,
    V: Iterator<Item = Result<ExpectedAccess>>,
{
    if !quiet {
        writeln!(out, "{}", access_result).map_err(Error::Output)?;
    }

    let Some(reader) = validation_reader else {
        return Ok(());
    };
    match reader.next() {
        Some(expected) => {
            let expected = expected?;
            match *access_result == expected {
                true => tracker.correct_accesses += 1,
                false => {
                    log::warn!("expected: {:?}", expected);
                    log::warn!("received: {:?}", access_result);
                }
            }
        }
        None => log::warn!(
            "no expected result for address {}",
            access_result.logical_address.signed()
        ),
    }
    Ok(())
}

fn spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {pos} addresses translated") {
        progress.set_style(style);
    }
    progress
}

/// Acquire every resource named by `config`, run the simulation to completion and print the
/// results to standard output.
///
/// # Errors
///
/// Any configuration or I/O failure. Files opened here are closed on every exit path.
pub fn run_simulation(config: &Config) -> Result<Tracker> {
    let engine_config = config.engine_config()?;
    let geometry = engine_config.geometry;
    geometry.validate()?;

    let storage = match config.storage_path() {
        Some(path) => Some(BackingStore::open(&path, geometry.page_size)?),
        None => None,
    };
    let address_reader = AddressReader::open(&config.file_address, geometry)?;
    let validation_reader = match config.validation_path() {
        Some(path) => Some(ValidationReader::open(&path)?),
        None => None,
    };

    log::info!(
        "translating '{}' with {:?} replacement",
        config.file_address,
        engine_config.policy
    );
    let engine = TranslationEngine::build(&engine_config, storage)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let tracker =
        Simulation::new(engine, address_reader, validation_reader, config.quiet).run(&mut out)?;
    out.flush().map_err(Error::Output)?;
    Ok(tracker)
}
