use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crossbeam_channel::Sender;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::config::RippleConfig;
use crate::core::{CancelToken, FileScan, FileScanner, ImpactReport, ScanEvent, ScanRequest};
use crate::error::{AnalysisError, HistoryError};
use crate::fs::{CollectOptions, collect_source_files};
use crate::git::{HistoryResolver, LastChange};
use crate::utils::analysis::context::detect_declaring_context;
use crate::utils::analysis::impact::ImpactAggregator;
use crate::utils::analysis::lines::read_source;
use crate::utils::analysis::risk::RiskTier;
use crate::utils::rippleignore::load_rippleignore;

/// Runs one analysis and reports progress on the terminal.
///
/// The analysis runs on a scoped thread while this thread drains its events into
/// a progress bar. The bar draws to stderr and stays hidden when stderr is not a
/// terminal. Firing `cancel` (e.g. from a Ctrl+C handler) aborts the run with
/// [`AnalysisError::Cancelled`].
pub fn run(
    config: &RippleConfig,
    request: &ScanRequest,
    cancel: &CancelToken,
) -> Result<ImpactReport, AnalysisError> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let messages = config.language.messages();

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));

    let result = std::thread::scope(|s| {
        let worker = s.spawn(move || analyze(request, config, cancel, Some(tx)));

        for event in rx {
            match event {
                ScanEvent::StartScanning => progress.set_message(messages.analysis_in_progress),
                ScanEvent::FilesFound(n) => {
                    progress.set_length(n as u64);
                    progress.set_message(messages.scanning_files);
                }
                ScanEvent::FileScanned(path) => {
                    progress.inc(1);
                    if config.verbose {
                        progress.set_message(path.display().to_string());
                    }
                }
                ScanEvent::HistoryResolved => tracing::debug!("history resolved"),
                ScanEvent::Complete(n) => progress.set_message(messages.analysis_complete(n)),
            }
        }

        worker
            .join()
            .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
    });

    progress.finish_and_clear();
    result
}

/// Analyzes the blast radius of changing `request.target_file` (and, when given,
/// `request.target_symbol`) inside `request.project_root`.
///
/// Scanning runs on a rayon pool sized by `config.jobs`; results are merged in
/// discovery order by a single consumer. Version history is resolved on its own
/// thread while files are scanned. Once `cancel` fires, no report is produced.
pub fn analyze(
    request: &ScanRequest,
    config: &RippleConfig,
    cancel: &CancelToken,
    tx: Option<Sender<ScanEvent>>,
) -> Result<ImpactReport, AnalysisError> {
    let request = request.validate()?;

    let notify = |e: ScanEvent| {
        if let Some(ref tx) = tx {
            let _ = tx.send(e);
        }
    };

    notify(ScanEvent::StartScanning);

    let symbol = request.target_symbol.as_deref();
    let declaring_context = symbol
        .and_then(|_| read_source(&request.target_file))
        .and_then(|content| detect_declaring_context(&content));
    if let Some(ref ctx) = declaring_context {
        tracing::debug!(context = %ctx, "declaring context detected");
    }

    // 1. Collect
    let mut options = CollectOptions::from_config(config);
    options.excluded.extend(load_rippleignore(&request.project_root));
    let paths: Vec<PathBuf> = collect_source_files(&request.project_root, &options)
        .with_cancel(cancel.clone())
        .collect();
    if cancel.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }
    notify(ScanEvent::FilesFound(paths.len()));

    // 2. Scan in parallel, merge in order
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs.unwrap_or(0))
        .build()?;
    let scanner = FileScanner::new(&request.target_filename(), symbol);
    let resolver = HistoryResolver::from_config(config, cancel.clone());
    let mut aggregator = ImpactAggregator::new(
        &request.target_file,
        symbol.is_some(),
        declaring_context.as_deref(),
    );

    let (data_tx, data_rx) = crossbeam_channel::unbounded::<(usize, Option<FileScan>)>();
    let total_files = paths.len();

    let paths_ref = &paths;
    let scanner_ref = &scanner;
    let notify_ref = &notify;
    let pool_ref = &pool;

    let last_change = std::thread::scope(|s| {
        let history = s.spawn(|| {
            let change = resolver.last_change(&request.target_file);
            notify_ref(ScanEvent::HistoryResolved);
            change
        });

        s.spawn(move || {
            pool_ref.install(|| {
                paths_ref.par_iter().enumerate().for_each(|(index, path)| {
                    if cancel.is_cancelled() {
                        let _ = data_tx.send((index, None));
                        return;
                    }
                    let scan = scanner_ref.scan(path);
                    notify_ref(ScanEvent::FileScanned(path.clone()));
                    let _ = data_tx.send((index, Some(scan)));
                });
            });
            drop(data_tx);
        });

        // 3. Consumer
        let mut buffer: HashMap<usize, Option<FileScan>> = HashMap::new();
        let mut next_idx = 0;

        while next_idx < total_files {
            while let Some(entry) = buffer.remove(&next_idx) {
                if let Some(scan) = entry {
                    aggregator.add(scan);
                }
                next_idx += 1;
            }
            if next_idx >= total_files {
                break;
            }
            match data_rx.recv() {
                Ok((idx, data)) => {
                    buffer.insert(idx, data);
                }
                Err(_) => break,
            }
        }

        history.join().unwrap_or_else(|_| LastChange::Unavailable {
            reason: HistoryError::Unknown("history lookup panicked".to_string()),
        })
    });

    if cancel.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }

    // 4. Classify
    let aggregate = aggregator.finish();
    let risk = RiskTier::classify(aggregate.impacts.len());

    tracing::info!(
        target_file = %request.target_file.display(),
        scanned = aggregate.scanned_files,
        impacted = aggregate.impacts.len(),
        %risk,
        "analysis complete"
    );
    notify(ScanEvent::Complete(aggregate.impacts.len()));

    Ok(ImpactReport {
        requested_file: request.target_file,
        project_root: request.project_root,
        target_symbol: request.target_symbol,
        declaring_context,
        scanned_files: aggregate.scanned_files,
        impacts: aggregate.impacts,
        symbol_file_count: aggregate.symbol_file_count,
        last_change,
        risk,
    })
}
