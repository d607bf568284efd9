use std::fmt;

/// Handle returned by [`MemoryAuthority::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EvictorId(pub u32);

/// Reclaims device memory on request.
///
/// Reentrancy contract: `evict_one` may be called from inside [`MemoryAuthority::reserve`] on
/// behalf of any subsystem, including the evictor's own while it is in the middle of building
/// something. It must only touch state that is already committed (for the geometry cache:
/// records that are in the cache), never the allocation that triggered the call. An evictor
/// whose owner is busy reports `None`.
pub trait Evictor {
    /// Free exactly one resource. Returns the bytes reclaimed, or `None` when nothing was
    /// eligible.
    fn evict_one(&mut self) -> Option<u64>;
}

/// One allocation asking the authority for room.
#[derive(Clone, Copy, Debug)]
pub struct AllocationRequest<'a> {
    /// Registered evictor of the subsystem asking.
    pub requester: EvictorId,
    /// Human-readable description of the buffer.
    pub description: &'a str,
    /// Bytes the allocation needs.
    pub bytes: u64,
}

/// Process-wide memory-pressure authority gating every device allocation.
pub trait MemoryAuthority {
    /// Register a subsystem's evictor. Order of registration is the order evictors are tried
    /// under pressure, whoever is asking.
    fn register(&mut self, name: &str, evictor: Box<dyn Evictor>) -> EvictorId;

    /// Ask for room for `request`. Under pressure the authority calls registered evictors,
    /// synchronously, until the request fits. Returns `false` when it cannot be satisfied;
    /// nothing is reserved in that case.
    fn reserve(&mut self, request: &AllocationRequest<'_>) -> bool;

    /// Return `bytes` previously granted by `reserve`.
    fn release(&mut self, bytes: u64);
}

struct Registration {
    name: String,
    evictor: Box<dyn Evictor>,
}

/// Byte-budget authority.
///
/// Keeps a running total of granted bytes. When a request does not fit it walks the registered
/// evictors in order, one eviction at a time, until the request fits or every evictor reports
/// that nothing is eligible.
pub struct BudgetAuthority {
    budget: u64,
    used: u64,
    registrations: Vec<Registration>,
    evictions: u64,
}

impl fmt::Debug for BudgetAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BudgetAuthority")
            .field("budget", &self.budget)
            .field("used", &self.used)
            .field(
                "evictors",
                &self
                    .registrations
                    .iter()
                    .map(|r| r.name.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("evictions", &self.evictions)
            .finish()
    }
}

impl BudgetAuthority {
    /// Authority granting at most `budget` bytes at once.
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            used: 0,
            registrations: Vec::new(),
            evictions: 0,
        }
    }

    /// Authority that never applies pressure.
    pub fn unlimited() -> Self {
        Self::new(u64::MAX)
    }

    /// Bytes currently granted.
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Configured ceiling.
    pub fn budget(&self) -> u64 {
        self.budget
    }

    /// Successful evictions triggered by this authority.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    fn fits(&self, bytes: u64) -> bool {
        self.used
            .checked_add(bytes)
            .is_some_and(|total| total <= self.budget)
    }

    /// One eviction from the first evictor that has something to give.
    fn evict_once(&mut self) -> Option<u64> {
        self.registrations.iter_mut().find_map(|reg| {
            let bytes = reg.evictor.evict_one()?;
            tracing::debug!(evictor = %reg.name, bytes, "evicted under memory pressure");
            Some(bytes)
        })
    }
}

impl MemoryAuthority for BudgetAuthority {
    fn register(&mut self, name: &str, evictor: Box<dyn Evictor>) -> EvictorId {
        let id = EvictorId(self.registrations.len() as u32);
        self.registrations.push(Registration {
            name: name.to_string(),
            evictor,
        });
        id
    }

    fn reserve(&mut self, request: &AllocationRequest<'_>) -> bool {
        if request.bytes > self.budget {
            tracing::warn!(
                what = request.description,
                requester = request.requester.0,
                bytes = request.bytes,
                budget = self.budget,
                "allocation larger than the whole budget"
            );
            return false;
        }
        while !self.fits(request.bytes) {
            match self.evict_once() {
                Some(freed) => {
                    self.evictions += 1;
                    self.used = self.used.saturating_sub(freed);
                }
                None => {
                    tracing::warn!(
                        what = request.description,
                        requester = request.requester.0,
                        bytes = request.bytes,
                        used = self.used,
                        budget = self.budget,
                        "no evictor could make room"
                    );
                    return false;
                }
            }
        }
        self.used += request.bytes;
        true
    }

    fn release(&mut self, bytes: u64) {
        self.used = self.used.saturating_sub(bytes);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/memory/authority.rs"]
mod tests;
