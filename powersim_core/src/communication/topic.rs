//! In-process typed pub/sub topics.
//!
//! A `Topic<T>` is a named handle onto a process-wide ring buffer. Any
//! number of handles may attach to the same name; producers and consumers
//! compete for slots (point-to-point semantics, not broadcast).
//!
//! ```rust,ignore
//! let tx: Topic<CmdVel> = Topic::new("cmd_vel")?;
//! let rx: Topic<CmdVel> = Topic::new("cmd_vel")?;
//! tx.send(CmdVel::zero())?;
//! let msg = rx.recv();
//! ```
//!
//! Attaching a differently-typed handle to an existing name is a
//! communication error; the registry tracks the payload type per name.

use std::any::{Any, TypeId};
use std::cell::UnsafeCell;
use std::collections::HashMap;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::core::TopicMetadata;
use crate::error::{PowerError, PowerResult};

/// Default ring capacity (rounded up to a power of two).
pub const DEFAULT_CAPACITY: u32 = 1024;

#[repr(align(64))]
struct CachePadded<T>(T);

struct Slot<T> {
    sequence: AtomicU64,
    data: UnsafeCell<MaybeUninit<T>>,
}

/// Heap-backed MPMC ring buffer for N producers, N consumers.
///
/// Producers CAS on head, consumers CAS on tail, with per-slot sequence
/// numbers (Lamport-style) coordinating slot ownership:
/// - Producer: CAS head to claim write slot, write data, set
///   slot.sequence = head + 1
/// - Consumer: CAS tail to claim read slot, read data, set
///   slot.sequence = tail + capacity
pub(crate) struct MpmcRing<T> {
    head: CachePadded<AtomicU64>,
    tail: CachePadded<AtomicU64>,
    mask: u64,
    capacity: u64,
    slots: Box<[Slot<T>]>,
}

unsafe impl<T: Send> Send for MpmcRing<T> {}
unsafe impl<T: Send> Sync for MpmcRing<T> {}

impl<T> MpmcRing<T> {
    pub fn new(capacity: u32) -> Self {
        let cap = capacity.max(2).next_power_of_two() as usize;
        let mut slots = Vec::with_capacity(cap);
        for i in 0..cap {
            slots.push(Slot {
                sequence: AtomicU64::new(i as u64),
                data: UnsafeCell::new(MaybeUninit::uninit()),
            });
        }
        Self {
            head: CachePadded(AtomicU64::new(0)),
            tail: CachePadded(AtomicU64::new(0)),
            mask: (cap - 1) as u64,
            capacity: cap as u64,
            slots: slots.into_boxed_slice(),
        }
    }

    /// How many messages are pending in the ring.
    #[inline]
    pub fn pending_count(&self) -> u64 {
        let head = self.head.0.load(Ordering::Acquire);
        let tail = self.tail.0.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    /// Try to send (multiple producers, CAS on head). Returns the message
    /// back when the ring is full.
    pub fn try_send(&self, msg: T) -> Result<(), T> {
        let mut head = self.head.0.load(Ordering::Relaxed);
        loop {
            let index = (head & self.mask) as usize;
            let slot = &self.slots[index];
            let seq = slot.sequence.load(Ordering::Acquire);
            let diff = seq.wrapping_sub(head) as i64;

            if diff == 0 {
                match self.head.0.compare_exchange_weak(
                    head,
                    head.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the CAS claimed this slot exclusively for
                        // this producer; consumers wait on the sequence.
                        unsafe { (*slot.data.get()).write(msg) };
                        slot.sequence.store(head.wrapping_add(1), Ordering::Release);
                        return Ok(());
                    }
                    Err(current) => head = current,
                }
            } else if diff < 0 {
                // Slot not yet consumed — ring is full
                return Err(msg);
            } else {
                head = self.head.0.load(Ordering::Relaxed);
            }
        }
    }

    /// Try to receive (multiple consumers, CAS on tail).
    pub fn try_recv(&self) -> Option<T> {
        let mut tail = self.tail.0.load(Ordering::Relaxed);
        loop {
            let index = (tail & self.mask) as usize;
            let slot = &self.slots[index];
            let seq = slot.sequence.load(Ordering::Acquire);
            let diff = seq.wrapping_sub(tail.wrapping_add(1)) as i64;

            if diff == 0 {
                match self.tail.0.compare_exchange_weak(
                    tail,
                    tail.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: producer finished writing (sequence was
                        // set after the write), and the CAS claimed the slot.
                        let msg = unsafe { (*slot.data.get()).assume_init_read() };
                        slot.sequence
                            .store(tail.wrapping_add(self.capacity), Ordering::Release);
                        return Some(msg);
                    }
                    Err(current) => tail = current,
                }
            } else if diff < 0 {
                // No data available
                return None;
            } else {
                tail = self.tail.0.load(Ordering::Relaxed);
            }
        }
    }
}

impl<T> Drop for MpmcRing<T> {
    fn drop(&mut self) {
        // Drain so pending payloads run their destructors
        while self.try_recv().is_some() {}
    }
}

struct TopicEntry {
    type_id: TypeId,
    type_name: &'static str,
    ring: Arc<dyn Any + Send + Sync>,
}

static REGISTRY: OnceLock<RwLock<HashMap<String, TopicEntry>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, TopicEntry>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// A named, typed pub/sub channel.
///
/// Cheap to clone conceptually — create as many handles onto the same name
/// as needed; they all share one ring.
pub struct Topic<T: Send + 'static> {
    name: String,
    ring: Arc<MpmcRing<T>>,
}

impl<T: Send + 'static> Topic<T> {
    /// Attach to the topic `name`, creating it with the default capacity
    /// if it does not exist yet.
    pub fn new(name: &str) -> PowerResult<Self> {
        Self::with_capacity(name, DEFAULT_CAPACITY)
    }

    /// Attach to the topic `name`, creating it with `capacity` slots if it
    /// does not exist yet. Capacity is only applied on first creation.
    pub fn with_capacity(name: &str, capacity: u32) -> PowerResult<Self> {
        if name.is_empty() {
            return Err(PowerError::invalid_input("topic name must not be empty"));
        }

        let mut reg = registry().write();
        if let Some(entry) = reg.get(name) {
            if entry.type_id != TypeId::of::<T>() {
                return Err(PowerError::communication(format!(
                    "topic '{}' already registered with type {} (requested {})",
                    name,
                    entry.type_name,
                    std::any::type_name::<T>()
                )));
            }
            let ring = entry
                .ring
                .clone()
                .downcast::<MpmcRing<T>>()
                .map_err(|_| PowerError::communication(format!("topic '{}' type mismatch", name)))?;
            return Ok(Self {
                name: name.to_string(),
                ring,
            });
        }

        let ring = Arc::new(MpmcRing::<T>::new(capacity));
        reg.insert(
            name.to_string(),
            TopicEntry {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                ring: ring.clone(),
            },
        );
        Ok(Self {
            name: name.to_string(),
            ring,
        })
    }

    /// Topic name this handle is attached to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of messages currently queued.
    pub fn len(&self) -> usize {
        self.ring.pending_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Publish a message. When the ring is full the oldest queued message
    /// is dropped so telemetry producers never block.
    pub fn send(&self, msg: T) -> PowerResult<()> {
        match self.ring.try_send(msg) {
            Ok(()) => Ok(()),
            Err(msg) => {
                let _ = self.ring.try_recv();
                self.ring.try_send(msg).map_err(|_| {
                    PowerError::communication(format!("topic '{}' is full", self.name))
                })
            }
        }
    }

    /// Receive the next pending message, if any (non-blocking).
    pub fn recv(&self) -> Option<T> {
        self.ring.try_recv()
    }

    /// Metadata describing this topic for introspection.
    pub fn metadata(&self) -> TopicMetadata {
        TopicMetadata {
            topic_name: self.name.clone(),
            type_name: std::any::type_name::<T>().to_string(),
        }
    }
}
