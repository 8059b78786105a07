//! Card manifest fetching.
//!
//! The manifest is a JSON array of image file names served over HTTP. It is
//! fetched once at startup on a background thread, then polled for newly
//! published cards.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use cardfield_core::{AssetRef, AssetSource, ManifestConfig};
use color_eyre::eyre::{Result, WrapErr as _};

/// How often the worker checks whether it should stop.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Asset updates sent from the worker to the render loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetEvent {
    /// The initial asset list. Always sent exactly once.
    Resolved {
        assets: Vec<AssetRef>,
        source: AssetSource,
    },
    /// Cards that appeared in the manifest since the last check.
    Appended(Vec<AssetRef>),
}

/// Resolves the asset list in a background thread and watches the manifest for additions.
#[derive(Debug)]
pub struct ManifestMonitor {
    config: ManifestConfig,
    /// Explicit asset references. When present the manifest is never fetched.
    explicit: Vec<String>,
    /// Flag to signal thread termination.
    running: Arc<RwLock<bool>>,
}

impl ManifestMonitor {
    pub fn new(config: ManifestConfig, explicit: Vec<String>) -> Self {
        Self {
            config,
            explicit,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Start the background thread. Returns the channel asset events arrive on, or `None`
    /// if the worker is already running.
    pub fn start(&self) -> Option<Receiver<AssetEvent>> {
        if let Ok(mut running) = self.running.write() {
            if *running {
                return None;
            }
            *running = true;
        }

        let (tx, rx) = mpsc::channel();
        let config = self.config.clone();
        let explicit = self.explicit.clone();
        let running = self.running.clone();

        thread::spawn(move || watch(&config, &explicit, &running, &tx));

        Some(rx)
    }

    /// Stop the background thread.
    pub fn stop(&self) {
        if let Ok(mut running) = self.running.write() {
            *running = false;
        }
    }
}

impl Drop for ManifestMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn is_running(running: &Arc<RwLock<bool>>) -> bool {
    running.read().map(|running| *running).unwrap_or(false)
}

/// Worker thread body.
fn watch(
    config: &ManifestConfig,
    explicit: &[String],
    running: &Arc<RwLock<bool>>,
    tx: &Sender<AssetEvent>,
) {
    let mut known = HashSet::new();
    let (assets, source) = cardfield_core::resolve(explicit, config, || {
        let names = fetch_manifest(config)?;
        known.extend(names.iter().cloned());
        Ok::<_, color_eyre::Report>(names)
    });
    tracing::info!("Resolved {} card assets ({source:?})", assets.len());

    if tx.send(AssetEvent::Resolved { assets, source }).is_err() {
        return;
    }

    // Explicit lists are fixed, and placeholders mean the manifest isn't reachable.
    if source != AssetSource::Manifest || config.refresh_secs == 0 {
        return;
    }

    let refresh = Duration::from_secs(config.refresh_secs);
    let mut last_fetch = Instant::now();

    while is_running(running) {
        if last_fetch.elapsed() >= refresh {
            last_fetch = Instant::now();
            match fetch_manifest(config) {
                Ok(names) => {
                    let added = new_names(&mut known, names);
                    if !added.is_empty() {
                        tracing::debug!("Manifest has {} new card(s)", added.len());
                        let assets = added
                            .iter()
                            .map(|name| AssetRef::Image(config.image_url(name)))
                            .collect();
                        if tx.send(AssetEvent::Appended(assets)).is_err() {
                            return;
                        }
                    }
                }
                Err(error) => tracing::debug!("Manifest refresh failed: {error:?}"),
            }
        }

        thread::sleep(POLL_INTERVAL);
    }

    tracing::debug!("Leaving manifest watcher loop");
}

/// Fetch and parse the manifest.
pub fn fetch_manifest(config: &ManifestConfig) -> Result<Vec<String>> {
    let url = config.list_url();
    tracing::debug!("Fetching card manifest from {url}");

    let agent = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
        .build()
        .new_agent();

    let body = agent
        .get(&url)
        .call()
        .wrap_err_with(|| format!("Requesting {url}"))?
        .body_mut()
        .read_to_string()
        .wrap_err("Reading manifest body")?;

    parse_manifest(&body)
}

/// Parse the manifest body: a JSON array of file names.
pub fn parse_manifest(body: &str) -> Result<Vec<String>> {
    let names: Vec<String> =
        serde_json::from_str(body).wrap_err("Manifest isn't a JSON array of file names")?;
    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Names not seen before, in manifest order. Records them as seen.
fn new_names(known: &mut HashSet<String>, names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| known.insert(name.clone()))
        .collect()
}
