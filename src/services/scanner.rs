//! Batch market scanning across a volume-filtered symbol universe.

use crate::config::ScanSettings;
use crate::error::{EngineError, Result};
use crate::provider::MarketDataProvider;
use crate::services::analyzer::{analyze, AnalyzerProfile};
use crate::types::{Analysis, ScanEvent, ScanResult};
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Fixed pause after every symbol; the pipeline's sole backpressure
/// toward the provider's rate limits.
const INTER_CALL_DELAY_MS: u64 = 300;

/// Candle lookback per symbol; enough history for every indicator.
const OHLCV_LIMIT: usize = 50;

/// Signals at or above this strength are surfaced at info level.
const STRONG_SIGNAL_STRENGTH: f64 = 80.0;

/// One symbol surviving the liquidity filter, in volume-ranked order.
struct UniverseEntry {
    symbol: String,
    price: f64,
    quote_volume: f64,
    change_24h: Option<f64>,
}

/// Sequential market scanner over an injected data provider.
///
/// Symbols are evaluated strictly one at a time in the volume-sorted
/// order fixed at the start of the run. A single guard flag makes scans
/// non-reentrant: a `start_scan` while one is in flight is rejected,
/// never queued.
pub struct MarketScanner {
    provider: Arc<dyn MarketDataProvider>,
    settings: RwLock<ScanSettings>,
    is_scanning: AtomicBool,
    cancel: AtomicBool,
    events: mpsc::UnboundedSender<ScanEvent>,
    last_results: RwLock<Vec<ScanResult>>,
    last_scan_time: RwLock<Option<i64>>,
    auto_scan: Mutex<Option<JoinHandle<()>>>,
}

impl MarketScanner {
    /// Create a scanner and the receiving end of its event stream.
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        settings: ScanSettings,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<ScanEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let scanner = Arc::new(Self {
            provider,
            settings: RwLock::new(settings),
            is_scanning: AtomicBool::new(false),
            cancel: AtomicBool::new(false),
            events: tx,
            last_results: RwLock::new(Vec::new()),
            last_scan_time: RwLock::new(None),
            auto_scan: Mutex::new(None),
        });

        (scanner, rx)
    }

    /// Replace the scan settings for subsequent runs.
    pub async fn update_settings(&self, settings: ScanSettings) {
        *self.settings.write().await = settings;
    }

    /// Whether a scan is currently in flight.
    pub fn is_scanning(&self) -> bool {
        self.is_scanning.load(Ordering::SeqCst)
    }

    /// Results of the most recent completed scan.
    pub async fn last_results(&self) -> Vec<ScanResult> {
        self.last_results.read().await.clone()
    }

    /// Unix timestamp (milliseconds) of the most recent completed scan.
    pub async fn last_scan_time(&self) -> Option<i64> {
        *self.last_scan_time.read().await
    }

    /// Ask an in-flight scan to stop after the current symbol. Results
    /// collected so far are still ranked and reported.
    pub fn cancel_scan(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Run one full scan and return the ranked results.
    ///
    /// Rejects with [`EngineError::ScanInProgress`] if a scan is already
    /// in flight, without touching it.
    pub async fn start_scan(&self) -> Result<Vec<ScanResult>> {
        if self
            .is_scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Scan rejected: another scan is in flight");
            return Err(EngineError::ScanInProgress);
        }

        self.cancel.store(false, Ordering::SeqCst);
        self.emit(ScanEvent::Started);

        let outcome = self.run_scan().await;
        self.is_scanning.store(false, Ordering::SeqCst);

        match outcome {
            Ok(results) => {
                let timestamp = chrono::Utc::now().timestamp_millis();
                *self.last_results.write().await = results.clone();
                *self.last_scan_time.write().await = Some(timestamp);

                info!("Scan complete, {} symbols qualified", results.len());
                self.emit(ScanEvent::Completed {
                    results: results.clone(),
                    timestamp,
                });
                Ok(results)
            }
            Err(e) => {
                warn!("Scan failed: {}", e);
                self.emit(ScanEvent::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_scan(&self) -> Result<Vec<ScanResult>> {
        let settings = self.settings.read().await.clone();

        let universe = self.build_universe(&settings).await?;
        info!(
            "Scanning {} symbols at {} (threshold {}%)",
            universe.len(),
            settings.timeframe,
            settings.signal_threshold
        );

        let profile = AnalyzerProfile::scan();
        let total = universe.len();
        let mut results = Vec::new();

        for (index, entry) in universe.iter().enumerate() {
            // Cancellation is only honored between symbols.
            if self.cancel.load(Ordering::SeqCst) {
                info!("Scan cancelled after {} of {} symbols", index, total);
                break;
            }

            self.emit(ScanEvent::Progress {
                current: index + 1,
                total,
                symbol: entry.symbol.clone(),
            });

            match self.scan_symbol(entry, &settings, &profile).await {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(e) => warn!("Skipping {}: {}", entry.symbol, e),
            }

            tokio::time::sleep(Duration::from_millis(INTER_CALL_DELAY_MS)).await;
        }

        // Stable sort keeps the volume-ranked order for equal strengths.
        results.sort_by(|a, b| {
            b.strongest_signal
                .strength
                .partial_cmp(&a.strongest_signal.strength)
                .unwrap_or(CmpOrdering::Equal)
        });

        Ok(results)
    }

    /// Fetch the symbol universe and reduce it to the liquid,
    /// volume-ranked candidates.
    async fn build_universe(&self, settings: &ScanSettings) -> Result<Vec<UniverseEntry>> {
        let markets = self.provider.fetch_markets().await?;
        let tickers = self.provider.fetch_tickers().await?;

        let mut universe: Vec<UniverseEntry> = tickers
            .into_iter()
            .filter_map(|(symbol, ticker)| {
                let market = markets.get(&symbol)?;
                if market.dark_pool || !market.active {
                    return None;
                }

                let quote_volume = ticker.quote_volume?;
                if quote_volume < settings.min_quote_volume {
                    return None;
                }

                Some(UniverseEntry {
                    symbol,
                    price: ticker.last,
                    quote_volume,
                    change_24h: ticker.percentage,
                })
            })
            .collect();

        universe.sort_by(|a, b| {
            b.quote_volume
                .partial_cmp(&a.quote_volume)
                .unwrap_or(CmpOrdering::Equal)
        });
        universe.truncate(settings.max_pairs);

        Ok(universe)
    }

    /// Analyze one symbol; `None` when it produces no qualifying signal.
    async fn scan_symbol(
        &self,
        entry: &UniverseEntry,
        settings: &ScanSettings,
        profile: &AnalyzerProfile,
    ) -> Result<Option<ScanResult>> {
        let candles = self
            .provider
            .fetch_ohlcv(&entry.symbol, &settings.timeframe, None, OHLCV_LIMIT)
            .await?;

        if candles.is_empty() {
            debug!("No candles for {}", entry.symbol);
            return Ok(None);
        }

        let weights = settings.scoring_enabled.then_some(&settings.weights);
        let analysis = analyze(&candles, profile, entry.price, weights);

        let Some(strongest) = analysis.strongest_signal().cloned() else {
            return Ok(None);
        };
        if strongest.strength < settings.signal_threshold {
            return Ok(None);
        }

        if strongest.strength >= STRONG_SIGNAL_STRENGTH {
            info!(
                "{}: {} at {:.1}% strength",
                entry.symbol,
                strongest.signal_type.label(),
                strongest.strength
            );
        }

        Ok(Some(ScanResult {
            symbol: entry.symbol.clone(),
            price: entry.price,
            quote_volume: entry.quote_volume,
            change_24h: entry.change_24h,
            analysis,
            strongest_signal: strongest,
            scanned_at: chrono::Utc::now().timestamp_millis(),
        }))
    }

    /// Single-symbol analysis with caller-chosen SMA periods.
    ///
    /// Provider failures surface to the caller here, unlike in the scan
    /// loop where they are isolated per symbol.
    pub async fn analyze_symbol(
        &self,
        symbol: &str,
        short_period: usize,
        long_period: usize,
    ) -> Result<Analysis> {
        let settings = self.settings.read().await.clone();

        let ticker = self.provider.fetch_ticker(symbol).await?;
        let candles = self
            .provider
            .fetch_ohlcv(symbol, &settings.timeframe, None, OHLCV_LIMIT)
            .await?;

        let weights = settings.scoring_enabled.then_some(&settings.weights);
        Ok(analyze(
            &candles,
            &AnalyzerProfile::chart(short_period, long_period),
            ticker.last,
            weights,
        ))
    }

    /// Re-run scans on the configured interval until stopped.
    ///
    /// The first scan starts immediately. A tick that lands while a scan
    /// is still in flight is dropped, not queued.
    pub async fn start_auto_scan(self: Arc<Self>) {
        let mut guard = self.auto_scan.lock().await;
        if guard.is_some() {
            return;
        }

        let minutes = self.settings.read().await.refresh_interval_minutes.max(1);
        let period = Duration::from_secs(minutes * 60);
        info!("Auto-scan enabled every {} minutes", minutes);

        let scanner = Arc::clone(&self);
        *guard = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match scanner.start_scan().await {
                    Ok(_) => {}
                    Err(EngineError::ScanInProgress) => {
                        debug!("Auto-scan trigger dropped: scan still in flight");
                    }
                    Err(e) => warn!("Auto-scan run failed: {}", e),
                }
            }
        }));
    }

    /// Stop the auto-scan loop, if running.
    pub async fn stop_auto_scan(&self) {
        if let Some(handle) = self.auto_scan.lock().await.take() {
            handle.abort();
            info!("Auto-scan stopped");
        }
    }

    fn emit(&self, event: ScanEvent) {
        // A dropped receiver is fine; events are best-effort.
        let _ = self.events.send(event);
    }
}
