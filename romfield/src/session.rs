use romfield_dtype::{FieldData, IndexPolicy, Indexed};
use romfield_error::RomResult;
use romfield_io::ByteStore;

use crate::{FieldAt, FieldList, StoreClaim, StoreHandle, WalkReport, load_fields, save_fields};

/// Runtime options for a [`Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    start_address: usize,
    index_policy: IndexPolicy,
    commit_on_partial: bool,
}

impl SessionOptions {
    /// The offset [`Session::load`] and [`Session::save`] start at. Defaults to `0`.
    pub fn with_start_address(mut self, start_address: usize) -> Self {
        self.start_address = start_address;
        self
    }

    /// What element access does with an index past a field's arity. Defaults to
    /// [`IndexPolicy::FailFast`].
    pub fn with_index_policy(mut self, index_policy: IndexPolicy) -> Self {
        self.index_policy = index_policy;
        self
    }

    /// Whether a save that stops early still commits the fields it wrote. Defaults to `false`,
    /// in which case only complete saves are committed.
    pub fn with_commit_on_partial(mut self, commit_on_partial: bool) -> Self {
        self.commit_on_partial = commit_on_partial;
        self
    }

    /// The offset [`Session::load`] and [`Session::save`] start at.
    pub fn start_address(&self) -> usize {
        self.start_address
    }

    /// The configured index policy.
    pub fn index_policy(&self) -> IndexPolicy {
        self.index_policy
    }

    /// Whether partial saves are committed.
    pub fn commit_on_partial(&self) -> bool {
        self.commit_on_partial
    }
}

/// A field list bound to a claimed store of `CAPACITY` bytes.
///
/// Creating a session claims the store and initialises its usable region; dropping it
/// releases the claim. Fields are edited in memory through the accessors and only reach the
/// store on [`save`](Session::save).
#[derive(Debug)]
pub struct Session<S: ByteStore, L: FieldList, const CAPACITY: usize> {
    claim: StoreClaim<S>,
    fields: L,
    options: SessionOptions,
    capacity: usize,
}

impl<S: ByteStore, L: FieldList + Default, const CAPACITY: usize> Session<S, L, CAPACITY> {
    /// Claim the store behind `handle`, with every field at its default value.
    pub fn new(handle: &StoreHandle<S>) -> RomResult<Self> {
        Self::with_fields(handle, L::default())
    }
}

impl<S: ByteStore, L: FieldList, const CAPACITY: usize> Session<S, L, CAPACITY> {
    /// Claim the store behind `handle`, starting from `fields`.
    pub fn with_fields(handle: &StoreHandle<S>, fields: L) -> RomResult<Self> {
        let claim = handle.claim()?;
        let capacity = {
            let mut store = claim.lock();
            store.begin(CAPACITY);
            store.capacity()
        };
        log::debug!(
            "session opened over {} fields, capacity {capacity} of {CAPACITY} requested",
            fields.len()
        );

        Ok(Self {
            claim,
            fields,
            options: SessionOptions::default(),
            capacity,
        })
    }

    /// Replace the session options.
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// The session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The usable capacity, which is `CAPACITY` unless the device is smaller.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read every field from the configured start address.
    ///
    /// Returns whether every field was read. Errors raised by the store are logged and
    /// reported as `false`; use [`load_at`](Session::load_at) to observe them.
    pub fn load(&mut self) -> bool {
        match self.load_at(self.options.start_address) {
            Ok(report) => report.is_complete(),
            Err(e) => {
                log::warn!("load failed: {e}");
                false
            }
        }
    }

    /// Write every field from the configured start address and commit.
    ///
    /// Returns whether every field was written and the commit succeeded. Errors raised by the
    /// store are logged and reported as `false`; use [`save_at`](Session::save_at) to observe
    /// them.
    pub fn save(&mut self) -> bool {
        match self.save_at(self.options.start_address) {
            Ok(report) => report.is_complete(),
            Err(e) => {
                log::warn!("save failed: {e}");
                false
            }
        }
    }

    /// Read every field, starting at `start`.
    pub fn load_at(&mut self, start: usize) -> RomResult<WalkReport> {
        let store = self.claim.lock();
        load_fields(&mut self.fields, &*store, start)
    }

    /// Write every field starting at `start`, then commit.
    ///
    /// A save that stops early is only committed when
    /// [`commit_on_partial`](SessionOptions::with_commit_on_partial) is set.
    pub fn save_at(&mut self, start: usize) -> RomResult<WalkReport> {
        let mut store = self.claim.lock();
        let report = save_fields(&mut self.fields, &mut *store, start)?;
        if report.is_complete() || self.options.commit_on_partial {
            store.commit()?;
            log::trace!("committed {report}");
        }
        Ok(report)
    }

    /// Run `f` against the claimed store.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.claim.lock())
    }

    /// The field list.
    pub fn fields(&self) -> &L {
        &self.fields
    }

    /// The field list.
    pub fn fields_mut(&mut self) -> &mut L {
        &mut self.fields
    }

    /// The field at position `I`.
    pub fn field<const I: usize>(&self) -> &<L as FieldAt<I>>::Output
    where
        L: FieldAt<I>,
    {
        self.fields.at()
    }

    /// The field at position `I`.
    pub fn field_mut<const I: usize>(&mut self) -> &mut <L as FieldAt<I>>::Output
    where
        L: FieldAt<I>,
    {
        self.fields.at_mut()
    }

    /// The payload of the field at position `I`.
    pub fn data<const I: usize>(&self) -> &<<L as FieldAt<I>>::Output as FieldData>::Data
    where
        L: FieldAt<I>,
        <L as FieldAt<I>>::Output: FieldData,
    {
        self.fields.at().data()
    }

    /// The payload of the field at position `I`.
    pub fn data_mut<const I: usize>(
        &mut self,
    ) -> &mut <<L as FieldAt<I>>::Output as FieldData>::Data
    where
        L: FieldAt<I>,
        <L as FieldAt<I>>::Output: FieldData,
    {
        self.fields.at_mut().data_mut()
    }

    /// Element `index` of the field at position `I`, subject to the configured index policy.
    pub fn get<const I: usize>(
        &self,
        index: usize,
    ) -> RomResult<&<<L as FieldAt<I>>::Output as Indexed>::Elem>
    where
        L: FieldAt<I>,
        <L as FieldAt<I>>::Output: Indexed,
    {
        self.fields.at().element(index, self.options.index_policy)
    }

    /// Element `index` of the field at position `I`, subject to the configured index policy.
    pub fn get_mut<const I: usize>(
        &mut self,
        index: usize,
    ) -> RomResult<&mut <<L as FieldAt<I>>::Output as Indexed>::Elem>
    where
        L: FieldAt<I>,
        <L as FieldAt<I>>::Output: Indexed,
    {
        let policy = self.options.index_policy;
        self.fields.at_mut().element_mut(index, policy)
    }

    /// Element `index` of the field chosen by `select`, subject to the configured index
    /// policy. This is how named layouts index their fields.
    pub fn element<'a, F: Indexed + 'a>(
        &'a self,
        select: impl FnOnce(&L) -> &F,
        index: usize,
    ) -> RomResult<&'a F::Elem> {
        select(&self.fields).element(index, self.options.index_policy)
    }

    /// Element `index` of the field chosen by `select`, subject to the configured index
    /// policy.
    pub fn element_mut<'a, F: Indexed + 'a>(
        &'a mut self,
        select: impl FnOnce(&mut L) -> &mut F,
        index: usize,
    ) -> RomResult<&'a mut F::Elem> {
        let policy = self.options.index_policy;
        select(&mut self.fields).element_mut(index, policy)
    }
}
