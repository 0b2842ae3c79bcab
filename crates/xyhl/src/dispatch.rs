//! Marshalling geometry commands onto the UI thread.
//!
//! The controller and its host may only be touched on the UI thread. A
//! [`Dispatcher`] is created there and hands out [`UiHandle`]s, which any
//! thread may hold. Commands posted through a handle queue up until the UI
//! thread calls [`Dispatcher::pump`].

use std::{
    marker::PhantomData,
    rc::Rc,
    sync::mpsc::{self, Receiver, Sender},
    thread::{self, ThreadId},
};

use tracing::debug;

use crate::{
    controller::InteractiveGeometryController,
    error::Result,
    host::GeometryHost,
    record::GeometryRecord,
    store::GeometryStore,
};

/// Work that can be requested from any thread.
#[derive(Debug, Clone)]
pub enum Command {
    /// Apply a record already scaled for the widget's screen.
    Apply(GeometryRecord),
    /// Restore the widget's persisted geometry.
    Restore,
    /// Toggle the moving mode.
    ToggleMove,
    /// Toggle the resizing mode.
    ToggleResize,
    /// Abandon the current gesture.
    Cancel,
    /// Persist the current bounds.
    Save,
}

/// Posts commands to a [`Dispatcher`] from any thread.
#[derive(Debug, Clone)]
pub struct UiHandle {
    /// The dispatcher's thread.
    owner: ThreadId,
    /// Command queue.
    tx: Sender<Command>,
}

impl UiHandle {
    /// Queue a command for the UI thread.
    pub fn post(&self, cmd: Command) -> Result<()> {
        self.tx.send(cmd)?;
        Ok(())
    }

    /// Is the caller on the UI thread?
    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Hand `cmd` to `on_ui` when called on the UI thread, otherwise queue it
    /// for the next [`Dispatcher::pump`].
    pub fn run_or_post<F>(&self, cmd: Command, on_ui: F) -> Result<()>
    where
        F: FnOnce(Command),
    {
        if self.is_ui_thread() {
            on_ui(cmd);
            Ok(())
        } else {
            self.post(cmd)
        }
    }
}

/// The UI-thread end of the command queue.
#[derive(Debug)]
pub struct Dispatcher {
    /// Creating thread.
    owner: ThreadId,
    /// Template for handles.
    tx: Sender<Command>,
    /// Pending commands.
    rx: Receiver<Command>,
    /// Pins the dispatcher to the thread that created it.
    _ui: PhantomData<Rc<()>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Create a dispatcher owned by the current thread.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            owner: thread::current().id(),
            tx,
            rx,
            _ui: PhantomData,
        }
    }

    /// A handle other threads can post through.
    pub fn handle(&self) -> UiHandle {
        UiHandle {
            owner: self.owner,
            tx: self.tx.clone(),
        }
    }

    /// Is the caller on the thread that owns this dispatcher?
    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Run a command right away. This is the UI-thread path.
    pub fn execute(
        &self,
        cmd: Command,
        controller: &mut InteractiveGeometryController,
        host: &mut dyn GeometryHost,
        store: &GeometryStore,
    ) {
        debug!("{}: {:?}", host.name(), cmd);
        match cmd {
            Command::Apply(r) => {
                controller.apply_geometry(host, &r);
            }
            Command::Restore => {
                controller.restore(host, store);
            }
            Command::ToggleMove => {
                controller.toggle_move(host, store);
            }
            Command::ToggleResize => {
                controller.toggle_resize(host, store);
            }
            Command::Cancel => {
                controller.cancel(host);
            }
            Command::Save => {
                controller.save(host, store);
            }
        }
    }

    /// Run every queued command. Returns how many ran.
    pub fn pump(
        &self,
        controller: &mut InteractiveGeometryController,
        host: &mut dyn GeometryHost,
        store: &GeometryStore,
    ) -> usize {
        let mut n = 0;
        while let Ok(cmd) = self.rx.try_recv() {
            self.execute(cmd, controller, host, store);
            n += 1;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use geom::Rect;

    use super::*;
    use crate::{
        Error, Mode,
        config::{ControllerConfig, PersistMode, StoreConfig},
        tutils::MockHost,
    };

    fn assert_send<T: Send + Clone>() {}

    #[test]
    fn handles_cross_threads() -> Result<()> {
        assert_send::<UiHandle>();
        let dir = tempfile::tempdir()?;
        let store = GeometryStore::open(
            &StoreConfig::new(dir.path().join("g.json")).persist(PersistMode::Inline),
        )?;
        let mut host = MockHost::new("btn1", Some("Main"), Rect::new(0, 0, 10, 10));
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        let d = Dispatcher::new();
        assert!(d.is_ui_thread());

        let h = d.handle();
        let worker = thread::spawn(move || -> Result<bool> {
            h.post(Command::ToggleMove)?;
            h.post(Command::Apply(
                GeometryRecord::new("btn1", Some("Main")).with_geometry(5.0, 5.0, 20.0, 20.0)?,
            ))?;
            Ok(h.is_ui_thread())
        });
        let off_thread = worker
            .join()
            .map_err(|_| Error::Internal("worker panicked".into()))??;
        assert!(!off_thread);

        assert_eq!(host.bounds, Rect::new(0, 0, 10, 10));
        assert_eq!(d.pump(&mut c, &mut host, &store), 2);
        assert_eq!(c.mode(), Mode::Moving);
        assert_eq!(host.bounds, Rect::new(5, 5, 20, 20));
        assert_eq!(d.pump(&mut c, &mut host, &store), 0);

        d.execute(Command::Save, &mut c, &mut host, &store);
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn run_or_post_picks_thread() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = GeometryStore::open(
            &StoreConfig::new(dir.path().join("g.json")).persist(PersistMode::Inline),
        )?;
        let mut host = MockHost::new("btn1", Some("Main"), Rect::new(0, 0, 10, 10));
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        let d = Dispatcher::new();
        let h = d.handle();

        let mut ran = None;
        h.run_or_post(Command::ToggleResize, |cmd| ran = Some(cmd))?;
        let Some(cmd) = ran else {
            return Err(Error::Internal("UI-thread call did not run inline".into()));
        };
        d.execute(cmd, &mut c, &mut host, &store);
        assert_eq!(c.mode(), Mode::Resizing);
        assert_eq!(d.pump(&mut c, &mut host, &store), 0);

        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let worker = thread::spawn(move || -> Result<()> {
            h.run_or_post(Command::Cancel, |_| flag.store(true, Ordering::SeqCst))
        });
        worker
            .join()
            .map_err(|_| Error::Internal("worker panicked".into()))??;
        assert!(!called.load(Ordering::SeqCst));
        assert_eq!(d.pump(&mut c, &mut host, &store), 1);
        assert_eq!(c.mode(), Mode::Idle);
        Ok(())
    }

    #[test]
    fn post_after_drop_fails() {
        let h = Dispatcher::new().handle();
        assert!(matches!(h.post(Command::Cancel), Err(Error::Dispatch(_))));
    }
}
