use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::{Mutex, MutexGuard};
use romfield_error::{RomResult, rom_bail};
use romfield_io::ByteStore;

/// Identities of every physical medium a live claim holds, across all handles.
static CLAIMED_DEVICES: LazyLock<Mutex<HashSet<PathBuf>>> = LazyLock::new(Default::default);

struct Shared<S> {
    claimed: AtomicBool,
    store: Mutex<S>,
}

/// A handle to one physical store.
///
/// Handles are cheap to clone and all clones refer to the same store. At most one
/// [`StoreClaim`] can be live for a store at any time; a session holds the claim for as long
/// as it exists. Stores that report an [`identity`](ByteStore::identity) are also guarded
/// across handles, so two handles opened over the same medium cannot both be claimed.
pub struct StoreHandle<S> {
    inner: Arc<Shared<S>>,
}

impl<S> Clone for StoreHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Debug for StoreHandle<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("claimed", &self.is_claimed())
            .finish_non_exhaustive()
    }
}

impl<S: ByteStore> StoreHandle<S> {
    /// Wrap `store` in a new handle.
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Shared {
                claimed: AtomicBool::new(false),
                store: Mutex::new(store),
            }),
        }
    }

    /// Take exclusive ownership of the store.
    ///
    /// Fails with [`RomError::StoreClaimed`](romfield_error::RomError::StoreClaimed) while
    /// another claim is live.
    pub fn claim(&self) -> RomResult<StoreClaim<S>> {
        if self
            .inner
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            rom_bail!(StoreClaimed);
        }

        let identity = self.inner.store.lock().identity().map(PathBuf::from);
        if let Some(identity) = &identity {
            if !CLAIMED_DEVICES.lock().insert(identity.clone()) {
                self.inner.claimed.store(false, Ordering::Release);
                log::warn!("{} is already claimed through another handle", identity.display());
                rom_bail!(StoreClaimed);
            }
        }

        log::trace!("store claimed");
        Ok(StoreClaim {
            inner: Arc::clone(&self.inner),
            identity,
        })
    }

    /// Run `f` against the store, whether or not it is claimed.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.store.lock())
    }
}

impl<S> StoreHandle<S> {
    /// Whether a claim on the store is live.
    pub fn is_claimed(&self) -> bool {
        self.inner.claimed.load(Ordering::Acquire)
    }
}

/// Exclusive ownership of a store.
///
/// Dropping the claim calls [`ByteStore::end`] and makes the store available to the next
/// claimant.
pub struct StoreClaim<S: ByteStore> {
    inner: Arc<Shared<S>>,
    identity: Option<PathBuf>,
}

impl<S: ByteStore> StoreClaim<S> {
    /// Lock the store for access.
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.inner.store.lock()
    }
}

impl<S: ByteStore> Debug for StoreClaim<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClaim").finish_non_exhaustive()
    }
}

impl<S: ByteStore> Drop for StoreClaim<S> {
    fn drop(&mut self) {
        self.inner.store.lock().end();
        if let Some(identity) = &self.identity {
            CLAIMED_DEVICES.lock().remove(identity);
        }
        self.inner.claimed.store(false, Ordering::Release);
        log::trace!("store released");
    }
}
