//! Deferred pointer referents
//!
//! An embedded pointer is a 4-byte referent ID. Zero is null and has no
//! payload anywhere in the stream. A non-zero ID schedules the pointee for
//! decoding after the immediate data of the current decode unit; the walker
//! drains the queue in FIFO order and stores each payload in a slot. Once
//! everything is decoded, [`ReferentTable::link`] replaces every pending
//! pointer with the payload from its slot.
//!
//! Repeated IDs are handled by the [`ReferentAliasing`] policy in
//! [`ReferentTable::schedule`] and nowhere else.

use std::collections::{HashMap, VecDeque};
use std::mem;

use bytes::Buf;
use tracing::trace;

use crate::decode::Walker;
use crate::value::Target;
use crate::{
    DeferralOrder, Layout, NdrDecode, NdrError, Pointer, ReferentAliasing, Result, TypeDesc,
    Value,
};

/// Index of a deferred payload in the referent table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotId(usize);

/// One step of a field path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'s> {
    Field(&'s str),
    Index(usize),
}

/// Render a path as `Root.Field[3].Inner`.
pub(crate) fn render(path: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            Segment::Field(name) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            Segment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

/// A scheduled referent decode
#[derive(Debug)]
pub(crate) struct Task<'s> {
    pub slot: SlotId,
    pub referent_id: u32,
    pub layout: &'s Layout,
    /// Path of the pointer that scheduled the referent
    pub path: Vec<Segment<'s>>,
}

#[derive(Debug)]
enum SlotState {
    Pending,
    Decoded(Value),
    Linking,
    /// Kept for later occurrences of a shared referent
    Linked(Value),
    Taken,
}

#[derive(Debug)]
struct Slot {
    referent_id: u32,
    state: SlotState,
}

/// Pending referent queues, one per open decode level, plus the slots their
/// payloads are written to
#[derive(Debug)]
pub(crate) struct ReferentTable<'s> {
    levels: Vec<VecDeque<Task<'s>>>,
    slots: Vec<Slot>,
    aliasing: ReferentAliasing,
    seen: HashMap<u32, SlotId>,
}

impl<'s> ReferentTable<'s> {
    pub fn new(aliasing: ReferentAliasing) -> Self {
        Self {
            levels: Vec::new(),
            slots: Vec::new(),
            aliasing,
            seen: HashMap::new(),
        }
    }

    pub fn open_level(&mut self) {
        self.levels.push(VecDeque::new());
    }

    pub fn close_level(&mut self) {
        self.levels.pop();
    }

    /// Register a non-null referent and return the slot its payload will
    /// occupy. Under [`ReferentAliasing::Shared`] a repeated ID returns the
    /// existing slot and queues nothing.
    pub fn schedule(
        &mut self,
        referent_id: u32,
        layout: &'s Layout,
        path: Vec<Segment<'s>>,
    ) -> SlotId {
        if self.aliasing == ReferentAliasing::Shared {
            if let Some(&slot) = self.seen.get(&referent_id) {
                trace!(referent_id, "reusing shared referent");
                return slot;
            }
        }

        let slot = SlotId(self.slots.len());
        self.slots.push(Slot {
            referent_id,
            state: SlotState::Pending,
        });
        if self.aliasing == ReferentAliasing::Shared {
            self.seen.insert(referent_id, slot);
        }

        let task = Task {
            slot,
            referent_id,
            layout,
            path,
        };
        match self.levels.last_mut() {
            Some(level) => level.push_back(task),
            None => self.levels.push(VecDeque::from([task])),
        }
        slot
    }

    /// Oldest task of the innermost level
    pub fn next_task(&mut self) -> Option<Task<'s>> {
        self.levels.last_mut()?.pop_front()
    }

    pub fn fill(&mut self, slot: SlotId, value: Value) {
        if let Some(entry) = self.slots.get_mut(slot.0) {
            entry.state = SlotState::Decoded(value);
        }
    }

    /// Number of referents scheduled so far
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Replace every pending pointer inside `value` with its payload.
    pub fn link(&mut self, value: &mut Value) -> Result<()> {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.link(item)?;
                }
            }
            Value::Struct(fields) => {
                for field in fields.values_mut() {
                    self.link(field)?;
                }
            }
            Value::Pointer(pointer) => {
                if let Target::Pending(slot) = pointer.target {
                    let payload = self.resolve(slot)?;
                    pointer.target = Target::Resolved(Box::new(payload));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn resolve(&mut self, slot: SlotId) -> Result<Value> {
        let entry = self
            .slots
            .get_mut(slot.0)
            .ok_or(NdrError::DanglingReferent(0))?;
        let referent_id = entry.referent_id;

        match mem::replace(&mut entry.state, SlotState::Linking) {
            SlotState::Decoded(mut payload) => {
                self.link(&mut payload)?;
                self.slots[slot.0].state = match self.aliasing {
                    ReferentAliasing::Shared => SlotState::Linked(payload.clone()),
                    ReferentAliasing::Independent => SlotState::Taken,
                };
                Ok(payload)
            }
            SlotState::Linked(payload) => {
                let copy = payload.clone();
                self.slots[slot.0].state = SlotState::Linked(payload);
                Ok(copy)
            }
            SlotState::Linking => Err(NdrError::CyclicReferent(referent_id)),
            SlotState::Pending | SlotState::Taken => Err(NdrError::DanglingReferent(referent_id)),
        }
    }
}

impl<'r, 's, B: Buf> Walker<'r, 's, B> {
    /// Read a referent ID and schedule the pointee.
    pub(crate) fn decode_pointer(&mut self, pointee: &'s Layout) -> Result<Value> {
        let referent_id = self.reader.read_u32()?;
        if referent_id == 0 {
            return Ok(Value::Pointer(Pointer::null()));
        }

        let slot = self.table.schedule(referent_id, pointee, self.path.clone());
        trace!(
            referent_id,
            offset = self.reader.position(),
            "scheduled referent"
        );
        Ok(Value::Pointer(Pointer::pending(referent_id, slot)))
    }

    /// Decode queued referents of the innermost level until it is empty.
    pub(crate) fn drain(&mut self) -> Result<()> {
        let depth_first = self.options.deferral == DeferralOrder::DepthFirst;
        while let Some(task) = self.table.next_task() {
            trace!(
                referent_id = task.referent_id,
                offset = self.reader.position(),
                "decoding deferred referent"
            );
            self.path = task.path;

            if depth_first {
                self.table.open_level();
            }
            let payload = self.decode_unit(task.layout)?;
            self.table.fill(task.slot, payload);
            if depth_first {
                self.drain()?;
                self.table.close_level();
            }
        }
        Ok(())
    }
}

/// `Option<T>` is the Rust shape of a nullable pointer: null converts to
/// `None`. The field still needs a `pointer` annotation to be read as one.
impl<T: NdrDecode> NdrDecode for Option<T> {
    fn ndr_type() -> Result<TypeDesc> {
        T::ndr_type()
    }

    fn from_ndr(value: Value) -> Result<Self> {
        value.into_target().map(T::from_ndr).transpose()
    }
}
