//! The persisted collection of geometry records.
//!
//! A [`GeometryStore`] is opened once at application start and shared by
//! cloning the handle. Lookups always hand out copies, saves replace by key and
//! rewrite the whole file.

use std::{
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
};

use geom::Expanse;
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

use crate::{
    config::{PersistMode, StoreConfig},
    error::Result,
    record::GeometryRecord,
};

/// Counters describing what the writer has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Snapshots written to disk.
    pub written: u64,
    /// Snapshots whose write failed.
    pub failed: u64,
    /// Snapshots superseded by a newer one before they were written.
    pub coalesced: u64,
}

/// Shared counters behind [`WriteStats`].
#[derive(Debug, Default)]
struct Counters {
    /// Successful writes.
    written: AtomicU64,
    /// Failed writes.
    failed: AtomicU64,
    /// Superseded snapshots.
    coalesced: AtomicU64,
}

impl Counters {
    /// Point-in-time copy.
    fn snapshot(&self) -> WriteStats {
        WriteStats {
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
        }
    }
}

/// Messages for the writer thread.
enum Msg {
    /// Persist this snapshot of the full collection.
    Write(Vec<GeometryRecord>),
    /// Reply once every earlier snapshot has been attempted.
    Flush(Sender<()>),
}

/// The background writer: a channel into a single thread.
struct Writer {
    /// Sending half, taken on shutdown.
    tx: Mutex<Option<Sender<Msg>>>,
    /// Thread handle, joined on shutdown.
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// State shared between store handles.
struct Inner {
    /// File location.
    path: PathBuf,
    /// In-memory collection.
    records: Mutex<Vec<GeometryRecord>>,
    /// Reference resolution for freshly captured records.
    reference: Expanse,
    /// Present in background mode.
    writer: Option<Writer>,
    /// Write counters.
    counters: Arc<Counters>,
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read the collection from `path`. A missing file is an empty collection; an
/// unreadable or corrupt one is logged and treated the same way.
fn load(path: &Path) -> Vec<GeometryRecord> {
    if !path.exists() {
        debug!("no geometry file at {}", path.display());
        return Vec::new();
    }
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("could not read geometry file {}: {}", path.display(), e);
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<GeometryRecord>>(&content) {
        Ok(records) => {
            debug!("loaded {} records from {}", records.len(), path.display());
            records
        }
        Err(e) => {
            warn!("could not parse geometry file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Write the collection to a uniquely named temp file in the same directory,
/// then rename it into place.
fn write_file(path: &Path, records: &[GeometryRecord]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let content = serde_json::to_string_pretty(records)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write a snapshot and account for the outcome. Failures are logged and
/// dropped.
fn persist(path: &Path, records: &[GeometryRecord], counters: &Counters) {
    match write_file(path, records) {
        Ok(()) => {
            counters.written.fetch_add(1, Ordering::Relaxed);
            debug!("wrote {} records to {}", records.len(), path.display());
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            error!("could not write geometry file {}: {}", path.display(), e);
        }
    }
}

/// Writer thread body. Drains whatever is queued, writes only the newest
/// snapshot, then answers flush requests.
fn run_writer(rx: &Receiver<Msg>, path: &Path, counters: &Counters) {
    while let Ok(first) = rx.recv() {
        let mut latest = None;
        let mut waiters = Vec::new();
        let mut next = Some(first);
        while let Some(msg) = next {
            match msg {
                Msg::Write(snapshot) => {
                    if latest.replace(snapshot).is_some() {
                        counters.coalesced.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Msg::Flush(reply) => waiters.push(reply),
            }
            next = rx.try_recv().ok();
        }
        if let Some(records) = latest {
            persist(path, &records, counters);
        }
        for w in waiters {
            // The flusher may have given up waiting.
            w.send(()).ok();
        }
    }
    debug!("geometry writer for {} stopped", path.display());
}

impl Writer {
    /// Spawn the writer thread.
    fn spawn(path: PathBuf, counters: Arc<Counters>) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("xyhl-writer".into())
            .spawn(move || run_writer(&rx, &path, &counters))?;
        Ok(Self {
            tx: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Queue a message. False once the writer has shut down.
    fn send(&self, msg: Msg) -> bool {
        match lock(&self.tx).as_ref() {
            Some(tx) => tx.send(msg).is_ok(),
            None => false,
        }
    }

    /// Block until everything queued so far has been attempted.
    fn flush(&self) {
        let (reply, done) = mpsc::channel();
        if self.send(Msg::Flush(reply)) {
            done.recv().ok();
        }
    }

    /// Close the channel and wait for the thread to finish pending writes.
    fn shutdown(&self) {
        drop(lock(&self.tx).take());
        if let Some(h) = lock(&self.handle).take()
            && h.join().is_err()
        {
            error!("geometry writer thread panicked");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(w) = &self.writer {
            w.shutdown();
        }
    }
}

/// Handle to the persisted geometry collection. Clones share state.
#[derive(Clone)]
pub struct GeometryStore {
    /// Shared state.
    inner: Arc<Inner>,
}

impl fmt::Debug for GeometryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryStore")
            .field("path", &self.inner.path)
            .field("records", &self.len())
            .finish()
    }
}

impl GeometryStore {
    /// Load the collection named by `config` and start its writer.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let records = load(&config.path);
        let counters = Arc::new(Counters::default());
        let writer = match config.persist {
            PersistMode::Background => {
                Some(Writer::spawn(config.path.clone(), counters.clone())?)
            }
            PersistMode::Inline => None,
        };
        Ok(Self {
            inner: Arc::new(Inner {
                path: config.path.clone(),
                records: Mutex::new(records),
                reference: config.default_reference(),
                writer,
                counters,
            }),
        })
    }

    /// Find the record for `name`. A name that occurs once is returned
    /// whatever its form; a name shared across forms needs an exact form
    /// match. The result is a copy.
    pub fn lookup(&self, name: &str, form: Option<&str>) -> Option<GeometryRecord> {
        let records = lock(&self.inner.records);
        let matches: Vec<&GeometryRecord> = records.iter().filter(|r| r.name == name).collect();
        match matches.as_slice() {
            [] => None,
            [only] => Some((*only).clone()),
            many => many
                .iter()
                .find(|r| r.form.as_deref() == form)
                .map(|r| (*r).clone()),
        }
    }

    /// Insert `record`, replacing any record with the same name and form, then
    /// schedule a rewrite of the whole file. Returns whether the write was
    /// scheduled.
    pub fn save(&self, record: GeometryRecord) -> bool {
        debug!("save {}", record);
        let mut records = lock(&self.inner.records);
        match records.iter().position(|r| *r == record) {
            Some(i) => records[i] = record,
            None => records.push(record),
        }
        self.schedule(&records)
    }

    /// Remove the record keyed by `name` and `form`, rewriting the file when
    /// something was removed.
    pub fn remove(&self, name: &str, form: Option<&str>) -> bool {
        let mut records = lock(&self.inner.records);
        let before = records.len();
        records.retain(|r| !r.is_key(name, form));
        if records.len() == before {
            return false;
        }
        self.schedule(&records);
        true
    }

    /// Keep only records matching `keep`, rewriting the file when something
    /// was removed. Returns the number of records dropped.
    pub fn retain<F>(&self, keep: F) -> usize
    where
        F: FnMut(&GeometryRecord) -> bool,
    {
        let mut records = lock(&self.inner.records);
        let before = records.len();
        records.retain(keep);
        let removed = before - records.len();
        if removed > 0 {
            self.schedule(&records);
        }
        removed
    }

    /// Hand a snapshot to the writer, or write it here in inline mode.
    ///
    /// Callers hold the records lock, so snapshots reach the disk in the
    /// order they were taken and inline writes never overlap.
    fn schedule(&self, records: &[GeometryRecord]) -> bool {
        match &self.inner.writer {
            Some(w) => {
                let queued = w.send(Msg::Write(records.to_vec()));
                if !queued {
                    warn!("geometry store is shut down, save dropped");
                }
                queued
            }
            None => {
                persist(&self.inner.path, records, &self.inner.counters);
                true
            }
        }
    }

    /// Copy of every record.
    pub fn records(&self) -> Vec<GeometryRecord> {
        lock(&self.inner.records).clone()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        lock(&self.inner.records).len()
    }

    /// Is the collection empty?
    pub fn is_empty(&self) -> bool {
        lock(&self.inner.records).is_empty()
    }

    /// Location of the JSON file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Reference resolution given to freshly captured records.
    pub fn reference(&self) -> Expanse {
        self.inner.reference
    }

    /// Writer counters.
    pub fn stats(&self) -> WriteStats {
        self.inner.counters.snapshot()
    }

    /// Block until every scheduled write has been attempted.
    pub fn flush(&self) {
        if let Some(w) = &self.inner.writer {
            w.flush();
        }
    }

    /// Stop the writer after it finishes pending writes. Later saves still
    /// update memory but are not persisted.
    pub fn shutdown(&self) {
        if let Some(w) = &self.inner.writer {
            w.shutdown();
        }
    }
}
