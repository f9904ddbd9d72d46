//! Surface component trait and lazy-load plumbing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::core::props::SurfaceProps;

/// Renderable surface interface.
///
/// Components are opaque to the orchestration core: they receive their prop
/// bag and a width budget and produce plain text lines. A component that
/// panics during `render` is isolated by the recovery boundary wrapping its
/// mount; it never takes down other surfaces.
pub trait SurfaceComponent {
    /// Render to a list of lines at the given width.
    fn render(&mut self, props: &SurfaceProps, width: usize) -> Vec<String>;

    /// Invalidate any cached state.
    fn invalidate(&mut self) {}
}

/// Result of invoking a registry loader.
///
/// Synchronous components resolve immediately with [`ComponentLoad::ready`].
/// Code-split components return [`ComponentLoad::pending`] and fulfill the
/// returned [`LoadHandle`] once the bundle arrives.
pub enum ComponentLoad {
    Ready(Box<dyn SurfaceComponent>),
    Pending(PendingLoad),
}

impl ComponentLoad {
    pub fn ready(component: impl SurfaceComponent + 'static) -> Self {
        Self::Ready(Box::new(component))
    }

    /// Creates an unresolved load plus the handle used to resolve it.
    pub fn pending() -> (Self, LoadHandle) {
        let cell = Rc::new(RefCell::new(LoadCell {
            state: LoadState::Pending,
            waker: None,
        }));
        let handle = LoadHandle {
            cell: Rc::downgrade(&cell),
        };
        (Self::Pending(PendingLoad { cell }), handle)
    }
}

enum LoadState {
    Pending,
    Ready(Box<dyn SurfaceComponent>),
    Failed(String),
    /// The settled value was already handed to the mount point.
    Taken,
}

struct LoadCell {
    state: LoadState,
    waker: Option<Rc<dyn Fn()>>,
}

/// Consumer side of an in-flight component load, owned by the mount point.
///
/// Dropping the mount drops this value; a fulfillment arriving afterwards is
/// discarded unrendered (the accepted close-while-loading race).
pub struct PendingLoad {
    cell: Rc<RefCell<LoadCell>>,
}

/// Poll outcome for an in-flight load.
pub(crate) enum LoadPoll {
    Pending,
    Ready(Box<dyn SurfaceComponent>),
    Failed(String),
}

impl PendingLoad {
    /// Registers the callback invoked when the load settles.
    pub(crate) fn set_waker(&self, waker: Rc<dyn Fn()>) {
        self.cell.borrow_mut().waker = Some(waker);
    }

    /// Takes the settled component (or failure) out of the cell, if any.
    pub(crate) fn poll(&self) -> LoadPoll {
        let mut cell = self.cell.borrow_mut();
        match std::mem::replace(&mut cell.state, LoadState::Taken) {
            LoadState::Pending => {
                cell.state = LoadState::Pending;
                LoadPoll::Pending
            }
            LoadState::Ready(component) => LoadPoll::Ready(component),
            LoadState::Failed(message) => LoadPoll::Failed(message),
            LoadState::Taken => LoadPoll::Pending,
        }
    }
}

/// Producer side of an in-flight component load.
///
/// Held by host loading machinery; resolving is a no-op once the mount point
/// is gone or the load already settled.
pub struct LoadHandle {
    cell: Weak<RefCell<LoadCell>>,
}

impl LoadHandle {
    /// Whether a mount point still wants this load.
    pub fn is_wanted(&self) -> bool {
        self.cell.strong_count() > 0
    }

    pub fn fulfill(&self, component: impl SurfaceComponent + 'static) {
        self.settle(LoadState::Ready(Box::new(component)));
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.settle(LoadState::Failed(message.into()));
    }

    fn settle(&self, next: LoadState) {
        let Some(cell) = self.cell.upgrade() else {
            return;
        };
        let waker = {
            let mut cell = cell.borrow_mut();
            if !matches!(cell.state, LoadState::Pending) {
                return;
            }
            cell.state = next;
            cell.waker.clone()
        };
        if let Some(waker) = waker {
            waker();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ComponentLoad, LoadPoll, SurfaceComponent};
    use crate::core::props::SurfaceProps;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Probe;

    impl SurfaceComponent for Probe {
        fn render(&mut self, _props: &SurfaceProps, _width: usize) -> Vec<String> {
            vec!["probe".to_string()]
        }
    }

    #[test]
    fn fulfill_wakes_and_resolves_once() {
        let (load, handle) = ComponentLoad::pending();
        let ComponentLoad::Pending(pending) = load else {
            unreachable!()
        };

        let woken = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&woken);
        pending.set_waker(Rc::new(move || counter.set(counter.get() + 1)));

        assert!(matches!(pending.poll(), LoadPoll::Pending));
        handle.fulfill(Probe);
        assert_eq!(woken.get(), 1);
        assert!(matches!(pending.poll(), LoadPoll::Ready(_)));

        // A second settle is ignored.
        handle.fail("late");
        assert_eq!(woken.get(), 1);
    }

    #[test]
    fn dropped_mount_discards_late_fulfillment() {
        let (load, handle) = ComponentLoad::pending();
        assert!(handle.is_wanted());
        drop(load);
        assert!(!handle.is_wanted());
        handle.fulfill(Probe);
    }
}
