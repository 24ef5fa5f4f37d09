//! Descriptor construction: memoized, parallel, never failing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::audio::{fingerprint_item, AudioDecoder, FingerprintConfig};
use crate::models::MediaItem;

use super::MediaProber;

/// Per-run memo of descriptors, keyed by path.
///
/// Each path owns a slot that is filled exactly once, so concurrent
/// `describe` calls for the same path share a single probe.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    items: Mutex<HashMap<PathBuf, Arc<OnceLock<MediaItem>>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<MediaItem> {
        self.items.lock().get(path).and_then(|slot| slot.get().cloned())
    }

    pub fn insert(&self, item: MediaItem) {
        let path = item.path.clone();
        self.items.lock().insert(path, Arc::new(OnceLock::from(item)));
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, path: &Path) -> Arc<OnceLock<MediaItem>> {
        Arc::clone(self.items.lock().entry(path.to_path_buf()).or_default())
    }
}

/// Describe one file, probing it at most once per cache.
///
/// A probe failure yields an unprobed descriptor and a warning.
pub fn describe(prober: &dyn MediaProber, cache: &DescriptorCache, path: &Path) -> MediaItem {
    // The map lock is released before probing; the slot blocks other
    // callers for this path only.
    cache
        .slot(path)
        .get_or_init(|| match prober.probe(path) {
            Ok(report) => report.into_item(path),
            Err(e) => {
                tracing::warn!("Could not probe {}: {}", path.display(), e);
                MediaItem::unprobed(path)
            }
        })
        .clone()
}

/// Run `op` on a dedicated pool of `workers` threads (0 = rayon default).
///
/// Falls back to the global pool if the dedicated one cannot be built.
fn with_pool<R: Send>(workers: usize, op: impl FnOnce() -> R + Send) -> R {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|idx| format!("relqa-probe-{}", idx))
        .build()
    {
        Ok(pool) => pool.install(op),
        Err(e) => {
            tracing::warn!("Failed to build probe pool, using global pool: {}", e);
            op()
        }
    }
}

/// Describe every path in parallel, preserving input order.
///
/// Returns only after every descriptor is materialized.
pub fn describe_all(
    paths: &[PathBuf],
    prober: &dyn MediaProber,
    cache: &DescriptorCache,
    workers: usize,
) -> Vec<MediaItem> {
    tracing::info!("Describing {} files with {} worker(s)", paths.len(), worker_label(workers));

    with_pool(workers, || {
        paths
            .par_iter()
            .map(|path| describe(prober, cache, path))
            .collect()
    })
}

/// Attach fingerprints to every item with audio, in parallel.
pub fn fingerprint_all(
    items: &mut [MediaItem],
    decoder: &dyn AudioDecoder,
    config: &FingerprintConfig,
    workers: usize,
) {
    with_pool(workers, || {
        items.par_iter_mut().for_each(|item| {
            item.audio_fingerprint = fingerprint_item(decoder, item, config);
        });
    });

    let missing = items
        .iter()
        .filter(|i| i.has_audio && i.audio_fingerprint.is_none())
        .count();
    if missing > 0 {
        tracing::warn!("{} file(s) with audio have no fingerprint", missing);
    }
}

fn worker_label(workers: usize) -> String {
    if workers == 0 {
        "default".to_string()
    } else {
        workers.to_string()
    }
}
