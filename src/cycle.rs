//! One report cycle, run per interrupt
//!
//! A cycle reads the status register, reads and decodes the block of every
//! flagged contact, then commits the frame to the sink. A zero status ends
//! the cycle without further reads. A failed status read aborts the cycle.
//! A failed contact read only skips that contact.

use crate::config::Config;
use crate::point::{RawContactBlock, MAX_BLOCK_LEN};
use crate::slots::{FrameSummary, MultiTouchSink, SlotTracker};
use crate::status::TouchStatus;
use crate::transport::RegisterTransport;
use crate::Result;

/// Where a cycle currently is
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    /// Waiting for the next interrupt
    Idle,
    StatusCheck,
    Decoding,
    Committing,
}

/// Report cycle state machine and the slot state it owns
#[derive(Debug)]
pub struct InterruptCycle {
    config: Config,
    tracker: SlotTracker,
    state: CycleState,
}

impl InterruptCycle {
    pub fn new(config: Config) -> Self {
        InterruptCycle {
            tracker: SlotTracker::new(config.max_contacts),
            config,
            state: CycleState::Idle,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn tracker(&self) -> &SlotTracker {
        &self.tracker
    }

    /// Return every slot to empty
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.state = CycleState::Idle;
    }

    /// Run one cycle to completion
    ///
    /// Returns `Ok(None)` if there was nothing to report, or the summary of
    /// the frame committed to `sink`.
    pub fn run<T, S>(&mut self, transport: &mut T, sink: &mut S) -> Result<Option<FrameSummary>>
    where
        T: RegisterTransport,
        S: MultiTouchSink,
    {
        self.state = CycleState::StatusCheck;
        let res = self.process(transport, sink);
        self.state = CycleState::Idle;
        res
    }

    fn process<T, S>(&mut self, transport: &mut T, sink: &mut S) -> Result<Option<FrameSummary>>
    where
        T: RegisterTransport,
        S: MultiTouchSink,
    {
        let status = TouchStatus::read(transport).map_err(|e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("status read failed, cycle aborted");
            e
        })?;

        if status.is_idle() {
            // all contacts lifted since the last frame
            if self.tracker.active_count() == 0 {
                return Ok(None);
            }
            return Ok(Some(self.commit(sink)));
        }

        self.config.validate()?;
        let capacity = self.tracker.capacity();
        let overflow = status.overflow(capacity);
        if overflow > 0 {
            #[cfg(feature = "defmt")]
            defmt::debug!("{} contacts past capacity dropped", overflow);
        }

        self.state = CycleState::Decoding;
        let len = self.config.layout.len();
        let mut buf = [0u8; MAX_BLOCK_LEN];
        for index in 0..capacity {
            if !status.has_contact(index) {
                continue;
            }
            let reg = self.config.contact_register(index)?;
            match transport.read_block(reg, &mut buf[..len]) {
                Ok(()) => {
                    let block = RawContactBlock::from_slice(&buf[..len])?;
                    self.tracker.update(index, block.decode());
                }
                Err(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("contact {} unreadable, skipped", index);
                    self.tracker.hold(index);
                }
            }
        }

        Ok(Some(self.commit(sink)))
    }

    fn commit<S: MultiTouchSink>(&mut self, sink: &mut S) -> FrameSummary {
        self.state = CycleState::Committing;
        let summary = self.tracker.commit_frame(sink);
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "frame: {} active, {} released, {} held",
            summary.active,
            summary.released,
            summary.held
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::BlockLayout;
    use crate::slots::{Slot, SlotUpdate};
    use crate::{registers, Error};

    struct Registers {
        map: [u8; 256],
        broken: Vec<u8>,
        reads: Vec<u8>,
    }

    impl Registers {
        fn new() -> Self {
            Registers {
                map: [0; 256],
                broken: Vec::new(),
                reads: Vec::new(),
            }
        }

        fn set(&mut self, reg: u8, bytes: &[u8]) {
            let start = reg as usize;
            self.map[start..start + bytes.len()].copy_from_slice(bytes);
        }
    }

    impl RegisterTransport for Registers {
        fn read_byte(&mut self, reg: u8) -> Result<u8> {
            let mut buf = [0u8; 1];
            self.read_block(reg, &mut buf)?;
            Ok(buf[0])
        }

        fn read_block(&mut self, reg: u8, buf: &mut [u8]) -> Result<()> {
            self.reads.push(reg);
            if self.broken.contains(&reg) {
                return Err(Error::I2CError);
            }
            let start = reg as usize;
            buf.copy_from_slice(&self.map[start..start + buf.len()]);
            Ok(())
        }

        fn write_byte(&mut self, reg: u8, value: u8) -> Result<()> {
            self.map[reg as usize] = value;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder {
        updates: Vec<SlotUpdate>,
        syncs: usize,
    }

    impl MultiTouchSink for Recorder {
        fn report(&mut self, update: SlotUpdate) {
            self.updates.push(update);
        }

        fn sync(&mut self) {
            self.syncs += 1;
        }
    }

    fn active(slot: u8, x: u16, y: u16) -> SlotUpdate {
        SlotUpdate {
            slot,
            x,
            y,
            active: true,
            weight: None,
            area: None,
        }
    }

    fn five_contacts() -> Registers {
        let mut regs = Registers::new();
        regs.set(registers::TOUCH_STATUS, &[0x1F]);
        for i in 0..5u8 {
            regs.set(0x03 + 6 * i, &[0x00, 10 * i, 0x00, 20 * i]);
        }
        regs
    }

    #[test]
    fn two_contacts_are_read_from_their_own_blocks() {
        let mut regs = Registers::new();
        regs.set(registers::TOUCH_STATUS, &[0x03]);
        regs.set(0x03, &[0x01, 0x90, 0x00, 0x64]);
        regs.set(0x09, &[0x02, 0x10, 0x01, 0xE0]);
        let mut sink = Recorder::default();
        let mut cycle = InterruptCycle::new(Config::default());

        let summary = cycle.run(&mut regs, &mut sink).unwrap();

        assert_eq!(summary.map(|s| s.active), Some(2));
        assert_eq!(sink.updates, [active(0, 400, 100), active(1, 528, 480)]);
        assert_eq!(sink.syncs, 1);
        assert_eq!(regs.reads, [0x02, 0x03, 0x09]);
        assert_eq!(cycle.state(), CycleState::Idle);
    }

    #[test]
    fn idle_status_emits_nothing() {
        let mut regs = Registers::new();
        let mut sink = Recorder::default();
        let mut cycle = InterruptCycle::new(Config::default());

        assert_eq!(cycle.run(&mut regs, &mut sink), Ok(None));
        assert!(sink.updates.is_empty());
        assert_eq!(sink.syncs, 0);
        assert_eq!(regs.reads, [registers::TOUCH_STATUS]);
    }

    #[test]
    fn status_read_failure_aborts_cycle() {
        let mut regs = five_contacts();
        regs.broken.push(registers::TOUCH_STATUS);
        let mut sink = Recorder::default();
        let mut cycle = InterruptCycle::new(Config::default());

        assert_eq!(cycle.run(&mut regs, &mut sink), Err(Error::I2CError));
        assert_eq!(sink.syncs, 0);
        assert_eq!(regs.reads.len(), 1);
        assert_eq!(cycle.state(), CycleState::Idle);
        assert_eq!(cycle.tracker().active_count(), 0);
    }

    #[test]
    fn failed_contact_read_is_skipped() {
        let mut regs = five_contacts();
        regs.broken.push(0x03 + 6 * 2);
        let mut sink = Recorder::default();
        let mut cycle = InterruptCycle::new(Config::default());

        cycle.run(&mut regs, &mut sink).unwrap();

        let slots: Vec<u8> = sink.updates.iter().map(|u| u.slot).collect();
        assert_eq!(slots, [0, 1, 3, 4]);
        assert_eq!(sink.syncs, 1);
        assert_eq!(cycle.tracker().slot(2), Some(&Slot::Empty));
    }

    #[test]
    fn contacts_past_capacity_are_dropped() {
        let mut regs = five_contacts();
        regs.set(registers::TOUCH_STATUS, &[0xFF]);
        let mut sink = Recorder::default();
        let mut cycle = InterruptCycle::new(Config::default());

        let summary = cycle.run(&mut regs, &mut sink).unwrap().unwrap();

        assert_eq!(summary.active, 5);
        assert_eq!(cycle.tracker().active_count(), 5);
        assert_eq!(regs.reads.len(), 6);
    }

    #[test]
    fn reduced_capacity_limits_reads() {
        let mut regs = five_contacts();
        let mut sink = Recorder::default();
        let mut cycle = InterruptCycle::new(Config::default().max_contacts(2));

        cycle.run(&mut regs, &mut sink).unwrap();

        assert_eq!(sink.updates, [active(0, 0, 0), active(1, 10, 20)]);
        assert_eq!(regs.reads, [0x02, 0x03, 0x09]);
    }

    #[test]
    fn repeated_cycles_give_identical_frames() {
        let mut regs = five_contacts();
        let mut cycle = InterruptCycle::new(Config::default());
        let mut first = Recorder::default();
        let mut second = Recorder::default();

        cycle.run(&mut regs, &mut first).unwrap();
        cycle.run(&mut regs, &mut second).unwrap();

        assert_eq!(first.updates, second.updates);
        assert_eq!(first.syncs, second.syncs);
    }

    #[test]
    fn cleared_status_bit_releases_slot_once() {
        let mut regs = Registers::new();
        regs.set(registers::TOUCH_STATUS, &[0x03]);
        regs.set(0x03, &[0x01, 0x90, 0x00, 0x64]);
        regs.set(0x09, &[0x02, 0x10, 0x01, 0xE0]);
        let mut cycle = InterruptCycle::new(Config::default());
        let mut sink = Recorder::default();
        cycle.run(&mut regs, &mut sink).unwrap();

        regs.set(registers::TOUCH_STATUS, &[0x01]);
        let summary = cycle.run(&mut regs, &mut sink).unwrap().unwrap();
        assert_eq!(summary.released, 1);
        assert_eq!(
            sink.updates[2..],
            [
                active(0, 400, 100),
                SlotUpdate {
                    active: false,
                    ..active(1, 528, 480)
                },
            ]
        );

        cycle.run(&mut regs, &mut sink).unwrap();
        assert_eq!(sink.updates[4..], [active(0, 400, 100)]);
    }

    #[test]
    fn zero_status_lifts_remaining_contacts() {
        let mut regs = five_contacts();
        regs.set(registers::TOUCH_STATUS, &[0x01]);
        let mut cycle = InterruptCycle::new(Config::default());
        let mut sink = Recorder::default();
        cycle.run(&mut regs, &mut sink).unwrap();

        regs.set(registers::TOUCH_STATUS, &[0x00]);
        regs.reads.clear();
        let summary = cycle.run(&mut regs, &mut sink).unwrap().unwrap();
        assert_eq!(summary.released, 1);
        assert_eq!(regs.reads, [registers::TOUCH_STATUS]);
        assert_eq!(sink.syncs, 2);
        assert!(!sink.updates[1].active);

        assert_eq!(cycle.run(&mut regs, &mut sink), Ok(None));
        assert_eq!(sink.syncs, 2);
    }

    #[test]
    fn extended_layout_reads_six_bytes() {
        let mut regs = Registers::new();
        regs.set(registers::TOUCH_STATUS, &[0x01]);
        regs.set(0x03, &[0x01, 0x90, 0x00, 0x64, 0x33, 0xF4]);
        let mut cycle = InterruptCycle::new(Config::default().layout(BlockLayout::Extended));
        let mut sink = Recorder::default();

        cycle.run(&mut regs, &mut sink).unwrap();

        assert_eq!(
            sink.updates,
            [SlotUpdate {
                weight: Some(0x33),
                area: Some(0x04),
                ..active(0, 400, 100)
            }]
        );
    }

    #[test]
    fn inconsistent_table_is_protocol_error() {
        let mut regs = five_contacts();
        let config = Config::default()
            .layout(BlockLayout::Extended)
            .contact_table(0x03, 4);
        let mut cycle = InterruptCycle::new(config);
        let mut sink = Recorder::default();

        assert_eq!(cycle.run(&mut regs, &mut sink), Err(Error::ProtocolError));
        assert_eq!(sink.syncs, 0);
        assert_eq!(cycle.state(), CycleState::Idle);
    }
}
