// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

#[cfg(test)]
mod integration_tests {
    use crate::decoder::Decoder;
    use crate::interconnect::{Interconnect, TargetSlot};
    use crate::{
        AddressRange, BusError, BusTarget, ByteStrobes, MasterId, Response, TargetId,
        TargetTickResult, Transaction, UNMAPPED_READ_VALUE,
    };
    use std::sync::{Arc, Mutex};

    const IBUS: MasterId = MasterId(0);
    const DBUS: MasterId = MasterId(1);

    type AccessLog = Arc<Mutex<Vec<(bool, u32, u32)>>>;

    #[derive(Debug)]
    struct RecordingTarget {
        regs: [u32; 4],
        latency: u32,
        log: AccessLog,
        irq: bool,
    }

    impl RecordingTarget {
        fn new(latency: u32, log: AccessLog) -> Self {
            Self {
                regs: [0; 4],
                latency,
                log,
                irq: false,
            }
        }
    }

    impl BusTarget for RecordingTarget {
        fn read(&mut self, offset: u32) -> u32 {
            self.log.lock().unwrap().push((false, offset, 0));
            self.regs.get((offset / 4) as usize).copied().unwrap_or(0)
        }

        fn write(&mut self, offset: u32, value: u32, strobes: ByteStrobes) {
            self.log.lock().unwrap().push((true, offset, value));
            if let Some(r) = self.regs.get_mut((offset / 4) as usize) {
                *r = strobes.merge(*r, value);
            }
        }

        fn latency(&self) -> u32 {
            self.latency
        }

        fn tick(&mut self) -> TargetTickResult {
            TargetTickResult { irq: self.irq }
        }
    }

    fn fabric(latencies: &[u32]) -> (Interconnect, Vec<AccessLog>) {
        let mut decoder = Decoder::new();
        let mut targets = Vec::new();
        let mut logs = Vec::new();
        for (i, &latency) in latencies.iter().enumerate() {
            let range = AddressRange::new(0xb000_0000 + (i as u32) * 0x1000, 0x10);
            decoder
                .register(format!("t{}", i), range, TargetId(i))
                .unwrap();
            let log = AccessLog::default();
            targets.push(TargetSlot {
                name: format!("t{}", i),
                dev: Box::new(RecordingTarget::new(latency, log.clone())),
            });
            logs.push(log);
        }
        (Interconnect::new(2, decoder, targets), logs)
    }

    #[test]
    fn test_single_cycle_read_write() {
        let (mut bus, logs) = fabric(&[0]);
        let w = Transaction::write(DBUS, 0xb000_0004, 0x55AA, ByteStrobes::ALL);
        let out = bus.cycle(&[None, Some(w)]);
        assert_eq!(out.granted, Some(DBUS));
        let done = out.completed.unwrap();
        assert_eq!(done.target, Some(TargetId(0)));
        assert_eq!(done.response, Response::ack(0));

        let r = Transaction::read(DBUS, 0xb000_0004);
        let done = bus.cycle(&[None, Some(r)]).completed.unwrap();
        assert_eq!(done.response, Response::ack(0x55AA));
        assert_eq!(
            *logs[0].lock().unwrap(),
            vec![(true, 0x4, 0x55AA), (false, 0x4, 0)]
        );
    }

    #[test]
    fn test_unaligned_address_reaches_word_offset() {
        let (mut bus, logs) = fabric(&[0]);
        let w = Transaction::write(DBUS, 0xb000_0006, 0x00AB_0000, ByteStrobes::BYTE2);
        bus.cycle(&[None, Some(w)]);
        assert_eq!(logs[0].lock().unwrap()[0], (true, 0x4, 0x00AB_0000));
    }

    #[test]
    fn test_unmapped_read_returns_fixed_pattern() {
        let (mut bus, logs) = fabric(&[0]);
        let r = Transaction::read(IBUS, 0x1234_5678);
        let done = bus.cycle(&[Some(r), None]).completed.unwrap();
        assert_eq!(done.target, None);
        assert_eq!(done.response.data, UNMAPPED_READ_VALUE);
        assert!(done.response.err);
        assert_eq!(done.error, Some(BusError::UnmappedAccess(0x1234_5678)));
        assert_eq!(bus.unmapped_accesses(), 1);

        // Unmapped writes are dropped and the bus keeps working.
        let w = Transaction::write(IBUS, 0xb000_0010, 1, ByteStrobes::ALL);
        let done = bus.cycle(&[Some(w), None]).completed.unwrap();
        assert_eq!(done.response, Response::unmapped());
        assert!(logs[0].lock().unwrap().is_empty());
        assert!(!bus.is_busy());
    }

    #[test]
    fn test_wait_states_hold_transaction() {
        let (mut bus, logs) = fabric(&[3]);
        let r = Transaction::read(DBUS, 0xb000_0000);
        for _ in 0..3 {
            let out = bus.cycle(&[None, Some(r)]);
            assert_eq!(out.granted, Some(DBUS));
            assert!(out.completed.is_none());
            assert!(bus.is_busy());
        }
        let out = bus.cycle(&[None, Some(r)]);
        assert!(out.completed.is_some());
        assert_eq!(logs[0].lock().unwrap().len(), 1);
    }

    #[test]
    fn test_no_preemption_mid_transaction() {
        let (mut bus, _logs) = fabric(&[2, 0]);
        let slow = Transaction::read(DBUS, 0xb000_0000);
        let fast = Transaction::read(IBUS, 0xb000_1000);

        // dbus wins an uncontended cycle and starts a 3-cycle access.
        assert_eq!(bus.cycle(&[None, Some(slow)]).granted, Some(DBUS));
        // ibus now requests every cycle but must wait.
        assert_eq!(bus.cycle(&[Some(fast), Some(slow)]).granted, Some(DBUS));
        let out = bus.cycle(&[Some(fast), Some(slow)]);
        assert_eq!(out.granted, Some(DBUS));
        assert_eq!(out.completed.unwrap().master, DBUS);

        let out = bus.cycle(&[Some(fast), None]);
        assert_eq!(out.granted, Some(IBUS));
        assert_eq!(out.completed.unwrap().master, IBUS);
    }

    #[test]
    fn test_latched_transaction_is_stable() {
        let (mut bus, logs) = fabric(&[1]);
        let first = Transaction::write(DBUS, 0xb000_0000, 0x1111, ByteStrobes::ALL);
        let changed = Transaction::write(DBUS, 0xb000_0008, 0x2222, ByteStrobes::ALL);
        bus.cycle(&[None, Some(first)]);
        // Master changes what it presents mid-transaction; the latched one completes.
        let done = bus.cycle(&[None, Some(changed)]).completed.unwrap();
        assert_eq!(done.transaction, first);
        assert_eq!(*logs[0].lock().unwrap(), vec![(true, 0x0, 0x1111)]);
    }

    #[test]
    fn test_contention_alternates_masters() {
        let (mut bus, _logs) = fabric(&[0, 0]);
        let a = Transaction::read(IBUS, 0xb000_0000);
        let b = Transaction::read(DBUS, 0xb000_1000);
        let order: Vec<MasterId> = (0..6)
            .map(|_| bus.cycle(&[Some(a), Some(b)]).completed.unwrap().master)
            .collect();
        assert_eq!(order, vec![IBUS, DBUS, IBUS, DBUS, IBUS, DBUS]);
    }

    #[test]
    fn test_idle_cycle() {
        let (mut bus, logs) = fabric(&[0]);
        let out = bus.cycle(&[None, None]);
        assert_eq!(out.granted, None);
        assert!(out.completed.is_none());
        assert!(logs[0].lock().unwrap().is_empty());
    }
}
