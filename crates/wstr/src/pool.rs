//! Process-wide scratch buffer
//!
//! A single UTF-16 buffer shared by the whole process. Holding it is
//! exclusive and acquisition is try-only: the lock is never waited on, so its
//! locked state is the "held" flag. A caller that loses the race works with a
//! private buffer for the rest of its operation.

use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::{transcode, Result, WstrError};

/// Largest size, in code units, the shared buffer grows to before a holder
/// is moved to a private buffer.
pub const DEFAULT_SCRATCH_LIMIT: usize = 4096;

static GLOBAL: ScratchBufferPool = ScratchBufferPool::new();

/// Snapshot of pool usage counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Acquisitions served by the shared buffer
    pub shared_hits: usize,
    /// Acquisitions that found the shared buffer held and went private
    pub private_fallbacks: usize,
    /// Holders moved off the shared buffer because they outgrew the limit
    pub spills: usize,
}

/// Owner of the shared scratch buffer
pub struct ScratchBufferPool {
    slot: Mutex<Vec<u16>>,
    limit: usize,
    shared_hits: AtomicUsize,
    private_fallbacks: AtomicUsize,
    spills: AtomicUsize,
}

impl ScratchBufferPool {
    /// Create a pool with the default growth limit
    pub const fn new() -> Self {
        Self::with_limit(DEFAULT_SCRATCH_LIMIT)
    }

    /// Create a pool whose shared buffer never grows past `limit` code units
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            slot: parking_lot::const_mutex(Vec::new()),
            limit,
            shared_hits: AtomicUsize::new(0),
            private_fallbacks: AtomicUsize::new(0),
            spills: AtomicUsize::new(0),
        }
    }

    /// The process-wide pool
    pub fn global() -> &'static ScratchBufferPool {
        &GLOBAL
    }

    /// Growth limit of the shared buffer
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether some caller currently holds the shared buffer
    pub fn is_held(&self) -> bool {
        self.slot.is_locked()
    }

    /// Take the shared buffer if nobody holds it.
    ///
    /// Returns `None` immediately when it is held. The buffer is released
    /// when the returned guard is dropped.
    pub fn try_acquire(&self) -> Option<ScratchBuffer<'_>> {
        let mut guard = self.slot.try_lock()?;
        guard.clear();
        self.shared_hits.fetch_add(1, Ordering::Relaxed);
        Some(ScratchBuffer {
            pool: self,
            storage: Storage::Shared(guard),
        })
    }

    /// Take the shared buffer, or a private one of `capacity` code units if
    /// it is held. Never blocks.
    ///
    /// Requests above the limit go straight to a private buffer and count as
    /// a spill; the shared buffer is not touched.
    pub fn acquire_or_private(&self, capacity: usize) -> ScratchBuffer<'_> {
        if capacity > self.limit {
            self.spills.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(
                capacity,
                limit = self.limit,
                "oversized scratch request, using a private buffer"
            );
            return ScratchBuffer {
                pool: self,
                storage: Storage::Private(Vec::with_capacity(capacity)),
            };
        }

        let mut buffer = match self.try_acquire() {
            Some(buffer) => buffer,
            None => {
                self.private_fallbacks.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(capacity, "scratch buffer held, using a private buffer");
                ScratchBuffer {
                    pool: self,
                    storage: Storage::Private(Vec::with_capacity(capacity)),
                }
            }
        };
        buffer.ensure_capacity(capacity);
        buffer
    }

    /// Current usage counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            shared_hits: self.shared_hits.load(Ordering::Relaxed),
            private_fallbacks: self.private_fallbacks.load(Ordering::Relaxed),
            spills: self.spills.load(Ordering::Relaxed),
        }
    }
}

impl Default for ScratchBufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScratchBufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchBufferPool")
            .field("limit", &self.limit)
            .field("held", &self.is_held())
            .field("stats", &self.stats())
            .finish()
    }
}

enum Storage<'a> {
    Shared(MutexGuard<'a, Vec<u16>>),
    Private(Vec<u16>),
}

/// A held UTF-16 work buffer, shared or private.
///
/// Content only ever grows while the buffer is held; capacity is never given
/// back, so later holders of the shared buffer reuse it.
pub struct ScratchBuffer<'a> {
    pool: &'a ScratchBufferPool,
    storage: Storage<'a>,
}

impl<'a> ScratchBuffer<'a> {
    /// Whether this is the process-wide buffer
    pub fn is_shared(&self) -> bool {
        matches!(self.storage, Storage::Shared(_))
    }

    fn units(&self) -> &Vec<u16> {
        match &self.storage {
            Storage::Shared(guard) => &**guard,
            Storage::Private(units) => units,
        }
    }

    fn units_mut(&mut self) -> &mut Vec<u16> {
        match &mut self.storage {
            Storage::Shared(guard) => &mut **guard,
            Storage::Private(units) => units,
        }
    }

    /// Number of code units written so far
    pub fn len(&self) -> usize {
        self.units().len()
    }

    pub fn is_empty(&self) -> bool {
        self.units().is_empty()
    }

    /// Allocated size in code units
    pub fn capacity(&self) -> usize {
        self.units().capacity()
    }

    pub fn as_slice(&self) -> &[u16] {
        self.units()
    }

    /// Forget the content, keeping the allocation
    pub fn clear(&mut self) {
        self.units_mut().clear();
    }

    /// Grow to hold at least `n` code units, keeping the current content.
    ///
    /// A shared buffer asked to grow past the pool limit moves its content to
    /// a private allocation and releases the shared one.
    pub fn ensure_capacity(&mut self, n: usize) {
        if self.capacity() >= n {
            return;
        }

        if self.is_shared() && n > self.pool.limit {
            let mut private = Vec::with_capacity(n);
            private.extend_from_slice(self.units());
            // dropping the guard releases the shared buffer
            self.storage = Storage::Private(private);
            self.pool.spills.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(
                requested = n,
                limit = self.pool.limit,
                "scratch buffer spilled to a private buffer"
            );
            return;
        }

        let shared = self.is_shared();
        let limit = self.pool.limit;
        let units = self.units_mut();
        if shared {
            // amortized growth, capped at the pool limit
            let target = n.max(units.capacity() * 2).min(limit);
            let additional = target - units.len();
            units.reserve_exact(additional);
        } else {
            let additional = n - units.len();
            units.reserve(additional);
        }
    }

    /// Append raw code units
    pub fn push_units(&mut self, units: &[u16]) -> Range<usize> {
        let start = self.len();
        self.ensure_capacity(start + units.len());
        self.units_mut().extend_from_slice(units);
        start..self.len()
    }

    /// Append code units from an iterator, such as a decoded foreign string
    pub fn extend_units<I: IntoIterator<Item = u16>>(&mut self, units: I) -> Range<usize> {
        let units = units.into_iter();
        let start = self.len();
        self.ensure_capacity(start + units.size_hint().0);
        for unit in units {
            if self.len() == self.capacity() {
                self.ensure_capacity(self.len() + 1);
            }
            self.units_mut().push(unit);
        }
        start..self.len()
    }

    /// Append `s` as UTF-16, returning where it landed
    pub fn push_str(&mut self, s: &str) -> Range<usize> {
        let start = self.len();
        self.ensure_capacity(start + transcode::encoded_len(s));
        self.units_mut().extend(s.encode_utf16());
        start..self.len()
    }

    /// Append `s` followed by a NUL terminator.
    ///
    /// The returned range includes the terminator.
    pub fn push_str_nul(&mut self, s: &str) -> Result<Range<usize>> {
        if let Some(position) = s.encode_utf16().position(|u| u == 0) {
            return Err(WstrError::InteriorNul { position });
        }

        let start = self.len();
        self.ensure_capacity(start + transcode::encoded_len(s) + 1);
        let units = self.units_mut();
        units.extend(s.encode_utf16());
        units.push(0);
        Ok(start..self.len())
    }

    /// Decode the whole content, replacing unpaired surrogates
    pub fn to_string_lossy(&self) -> String {
        transcode::decode(self.as_slice())
    }

    /// Decode the whole content, failing on unpaired surrogates
    pub fn try_to_string(&self) -> Result<String> {
        transcode::try_decode(self.as_slice())
    }
}

impl fmt::Debug for ScratchBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchBuffer")
            .field("shared", &self.is_shared())
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
