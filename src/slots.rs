//! Multi-touch slot tracking
//!
//! Contact `i` is always tracked in slot `i`. Updates are buffered until
//! [`SlotTracker::commit_frame`], which hands the whole frame to a
//! [`MultiTouchSink`] and closes it with a single frame-sync.

use crate::point::TouchPoint;

/// Number of simultaneous contacts the controller reports
pub const MAX_TOUCH_POINTS: usize = 5;

/// State of one tracking slot
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    #[default]
    Empty,
    Active(TouchPoint),
}

impl Slot {
    pub fn is_active(&self) -> bool {
        matches!(self, Slot::Active(_))
    }
}

/// One slot change delivered to the sink
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotUpdate {
    pub slot: u8,
    pub x: u16,
    pub y: u16,
    /// `false` when the contact has lifted; `x` and `y` are then its last position
    pub active: bool,
    pub weight: Option<u8>,
    pub area: Option<u8>,
}

/// Consumer of the multi-touch event stream
pub trait MultiTouchSink {
    /// Called once at init with the panel bounds and slot count
    fn configure(&mut self, _x_max: u16, _y_max: u16, _slots: u8) {}

    /// Report one slot change
    fn report(&mut self, update: SlotUpdate);

    /// Close the current frame
    fn sync(&mut self);
}

/// Counts for a committed frame
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameSummary {
    /// Slots reported active
    pub active: u8,
    /// Slots released in this frame
    pub released: u8,
    /// Slots left untouched because their contact could not be read
    pub held: u8,
}

/// Fixed pool of tracking slots
#[derive(Debug)]
pub struct SlotTracker {
    slots: [Slot; MAX_TOUCH_POINTS],
    capacity: u8,
    updated: u8,
    held: u8,
}

impl SlotTracker {
    /// Create a tracker using the first `capacity` slots, all empty
    pub fn new(capacity: u8) -> Self {
        SlotTracker {
            slots: [Slot::Empty; MAX_TOUCH_POINTS],
            capacity: capacity.min(MAX_TOUCH_POINTS as u8),
            updated: 0,
            held: 0,
        }
    }

    pub fn capacity(&self) -> u8 {
        self.capacity
    }

    /// Empty every slot and drop any uncommitted updates
    pub fn reset(&mut self) {
        self.slots = [Slot::Empty; MAX_TOUCH_POINTS];
        self.updated = 0;
        self.held = 0;
    }

    pub fn slot(&self, index: u8) -> Option<&Slot> {
        self.slots[..self.capacity as usize].get(index as usize)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots[..self.capacity as usize]
    }

    pub fn active_count(&self) -> u8 {
        self.slots().iter().filter(|s| s.is_active()).count() as u8
    }

    /// Mark contact `index` active at `point` in the pending frame
    ///
    /// Returns `false` and drops the point if `index` is past capacity.
    pub fn update(&mut self, index: u8, point: TouchPoint) -> bool {
        if index >= self.capacity {
            return false;
        }
        self.slots[index as usize] = Slot::Active(point);
        self.updated |= 1 << index;
        self.held &= !(1 << index);
        true
    }

    /// Keep slot `index` as it is in the pending frame
    ///
    /// Used when a contact is present but its data could not be read, so the
    /// slot is neither refreshed nor released.
    pub fn hold(&mut self, index: u8) -> bool {
        if index >= self.capacity {
            return false;
        }
        if self.updated & (1 << index) == 0 {
            self.held |= 1 << index;
        }
        true
    }

    /// Emit the pending frame to `sink` and start a new one
    pub fn commit_frame<S: MultiTouchSink>(&mut self, sink: &mut S) -> FrameSummary {
        let mut summary = FrameSummary::default();
        for index in 0..self.capacity {
            let bit = 1 << index;
            let slot = &mut self.slots[index as usize];
            let Slot::Active(point) = *slot else {
                continue;
            };
            if self.updated & bit != 0 {
                sink.report(slot_update(index, &point, true));
                summary.active += 1;
            } else if self.held & bit != 0 {
                summary.held += 1;
            } else {
                *slot = Slot::Empty;
                sink.report(slot_update(index, &point, false));
                summary.released += 1;
            }
        }
        sink.sync();
        self.updated = 0;
        self.held = 0;
        summary
    }
}

fn slot_update(slot: u8, point: &TouchPoint, active: bool) -> SlotUpdate {
    SlotUpdate {
        slot,
        x: point.x,
        y: point.y,
        active,
        weight: point.weight,
        area: point.area,
    }
}
