mod common;

mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use myrtio_usb_light::calibration::PROBE_COUNT;
    use myrtio_usb_light::config::DISCONNECT_MS;
    use myrtio_usb_light::protocol::SET_RGB_REQUEST;
    use myrtio_usb_light::render::PWM_PERIOD;
    use myrtio_usb_light::storage::{CALIBRATION_ADDRESS, ERASED_BYTE};
    use myrtio_usb_light::{
        BusEvent, ByteStorage, Calibrator, ColorCell, DEFAULT_COLOR, DeviceConfig, DeviceParts,
        Dispatcher, Duration, LinkEvent, OutputLevels, RenderCadence, RenderEngine, Rgb,
        SetupPacket, SoftWatchdog, TickSlot, Transport, TransportBinding,
    };

    use crate::common::{
        CountingDelay, Eeprom, Recorder, ScriptedBus, SharedTrim, TrimRegister, control_data,
        report,
    };

    type TestDispatcher<'a> = Dispatcher<
        'a,
        Transport<ScriptedBus>,
        TrimRegister,
        Eeprom,
        SoftWatchdog,
        RenderEngine<'a, Recorder>,
    >;

    fn dispatcher<'a>(
        config: &DeviceConfig,
        color: &'a ColorCell,
        trim: &SharedTrim,
        storage: Eeprom,
    ) -> TestDispatcher<'a> {
        Dispatcher::new(
            config,
            color,
            Transport::new(config.binding, ScriptedBus::new(trim.clone())),
            DeviceParts {
                oscillator: TrimRegister::new(trim.clone()),
                storage,
                watchdog: SoftWatchdog::new(),
            },
            RenderEngine::new(color, Recorder::default()),
        )
    }

    fn set_color(dispatcher: &mut TestDispatcher<'_>, bytes: &[u8]) {
        let bus = dispatcher.bus_mut();
        bus.push(BusEvent::setup(&SetupPacket::vendor_out(SET_RGB_REQUEST, 3)));
        bus.push(control_data(bytes));
        assert_eq!(dispatcher.run_once(), Some(LinkEvent::CommandStarted));
        assert_eq!(
            dispatcher.run_once(),
            Some(LinkEvent::ColorApplied(bytes.len().min(3) as u8))
        );
    }

    /// Idle until the next period starts, then record one full period
    fn record_period(dispatcher: &mut TestDispatcher<'_>) -> Vec<OutputLevels> {
        while dispatcher.ticker().renderer().counter() != 0 {
            dispatcher.run_once();
        }
        dispatcher.ticker_mut().output_mut().levels.clear();
        for _ in 0..PWM_PERIOD {
            dispatcher.run_once();
        }
        dispatcher.ticker().output().levels.clone()
    }

    #[test]
    fn test_boot_reconnects_and_arms_watchdog() {
        let config = DeviceConfig::default();
        let color = ColorCell::new(Rgb::new(1, 2, 3));
        let trim = Rc::new(Cell::new(0x40));
        let mut dispatcher = dispatcher(&config, &color, &trim, Eeprom::erased());
        let mut delay = CountingDelay::default();

        dispatcher.boot(&mut delay);

        assert_eq!(color.snapshot(), DEFAULT_COLOR);
        assert!(dispatcher.watchdog().is_armed());
        assert_eq!(dispatcher.watchdog().feeds(), u32::from(DISCONNECT_MS));
        assert_eq!(delay.total_ns, u64::from(DISCONNECT_MS) * 1_000_000);
        assert_eq!(dispatcher.bus_mut().disconnects, 1);
        assert!(dispatcher.bus_mut().connected);
        // Erased EEPROM: the trim is left alone
        assert_eq!(trim.get(), 0x40);
        assert_eq!(dispatcher.last_trim(), None);
    }

    #[test]
    fn test_boot_restores_persisted_trim() {
        let config = DeviceConfig::default();
        let color = ColorCell::new(DEFAULT_COLOR);
        let trim = Rc::new(Cell::new(0x40));
        let mut storage = Eeprom::erased();
        storage.bytes[usize::from(CALIBRATION_ADDRESS)] = 0x9A;
        let mut dispatcher = dispatcher(&config, &color, &trim, storage);

        dispatcher.boot(&mut CountingDelay::default());

        assert_eq!(trim.get(), 0x9A);
        assert_eq!(dispatcher.bus_mut().probes, 0);
    }

    #[test]
    fn test_boot_skips_erased_trim() {
        let config = DeviceConfig::default();
        let color = ColorCell::new(DEFAULT_COLOR);
        let trim = Rc::new(Cell::new(7));
        let mut storage = Eeprom::erased();
        Calibrator::with_target(u16::MAX).calibrate(
            &mut TrimRegister::new(Rc::new(Cell::new(0))),
            &mut ScriptedBus::new(Rc::new(Cell::new(0))),
            &mut storage,
        );
        assert_eq!(storage.read_byte(CALIBRATION_ADDRESS), ERASED_BYTE);
        let mut dispatcher = dispatcher(&config, &color, &trim, storage);

        dispatcher.boot(&mut CountingDelay::default());

        assert_eq!(trim.get(), 7);
    }

    #[test]
    fn test_end_to_end_red() {
        let config = DeviceConfig::default();
        let color = ColorCell::new(DEFAULT_COLOR);
        let trim = Rc::new(Cell::new(0));
        let mut dispatcher = dispatcher(&config, &color, &trim, Eeprom::erased());
        dispatcher.boot(&mut CountingDelay::default());

        dispatcher.bus_mut().push(BusEvent::Reset);
        assert_eq!(dispatcher.run_once(), Some(LinkEvent::Connected));
        assert_eq!(dispatcher.bus_mut().probes, PROBE_COUNT);
        assert_eq!(dispatcher.last_trim(), Some(213));
        assert_eq!(trim.get(), 213);
        assert_eq!(dispatcher.storage_mut().read_byte(CALIBRATION_ADDRESS), 213);

        set_color(&mut dispatcher, &[0, 0, 0]);
        set_color(&mut dispatcher, &[255, 0, 0]);
        assert_eq!(color.snapshot(), Rgb::new(255, 0, 0));

        let period = record_period(&mut dispatcher);
        assert_eq!(period.len(), PWM_PERIOD);
        for (tick, levels) in period.iter().enumerate() {
            assert_eq!(levels.red, tick < 255, "tick {tick}");
            assert!(!levels.green, "tick {tick}");
            assert!(!levels.blue, "tick {tick}");
        }

        // No further calibration without a new connection event
        assert_eq!(dispatcher.bus_mut().probes, PROBE_COUNT);
    }

    #[test]
    fn test_calibrates_once_per_connection() {
        let config = DeviceConfig::default();
        let color = ColorCell::new(DEFAULT_COLOR);
        let trim = Rc::new(Cell::new(0));
        let mut dispatcher = dispatcher(&config, &color, &trim, Eeprom::erased());
        dispatcher.boot(&mut CountingDelay::default());

        for connection in 1..=3 {
            dispatcher.bus_mut().push(BusEvent::Reset);
            assert_eq!(dispatcher.run_once(), Some(LinkEvent::Connected));
            for _ in 0..10 {
                dispatcher.run_once();
            }
            assert_eq!(dispatcher.bus_mut().probes, connection * PROBE_COUNT);
        }
        assert_eq!(dispatcher.storage_mut().writes, 3);
    }

    #[test]
    fn test_partial_update_through_dispatcher() {
        let config = DeviceConfig::default();
        let color = ColorCell::new(DEFAULT_COLOR);
        let trim = Rc::new(Cell::new(0));
        let mut dispatcher = dispatcher(&config, &color, &trim, Eeprom::erased());
        dispatcher.boot(&mut CountingDelay::default());

        set_color(&mut dispatcher, &[10, 20, 30]);
        set_color(&mut dispatcher, &[99]);
        assert_eq!(color.snapshot(), Rgb::new(99, 20, 30));
    }

    #[test]
    fn test_raw_report_binding() {
        let config = DeviceConfig {
            binding: TransportBinding::RawReport,
            ..DeviceConfig::default()
        };
        let color = ColorCell::new(DEFAULT_COLOR);
        let trim = Rc::new(Cell::new(0));
        let mut dispatcher = dispatcher(&config, &color, &trim, Eeprom::erased());
        dispatcher.boot(&mut CountingDelay::default());

        dispatcher.bus_mut().push(report(&[0, 128, 255]));
        assert_eq!(dispatcher.run_once(), Some(LinkEvent::ColorApplied(3)));
        assert_eq!(color.snapshot(), Rgb::new(0, 128, 255));

        let period = record_period(&mut dispatcher);
        assert_eq!(period.iter().filter(|l| l.red).count(), 0);
        assert_eq!(period.iter().filter(|l| l.green).count(), 128);
        assert_eq!(period.iter().filter(|l| l.blue).count(), 255);
    }

    #[test]
    fn test_watchdog_restart_keeps_only_calibration() {
        let config = DeviceConfig::default();
        let color = ColorCell::new(DEFAULT_COLOR);
        let trim = Rc::new(Cell::new(0));
        let mut dispatcher = dispatcher(&config, &color, &trim, Eeprom::erased());
        let mut delay = CountingDelay::default();
        dispatcher.boot(&mut delay);

        dispatcher.bus_mut().push(BusEvent::Reset);
        dispatcher.run_once();
        set_color(&mut dispatcher, &[0, 0, 255]);
        for _ in 0..17 {
            dispatcher.run_once();
        }
        assert_ne!(dispatcher.ticker().renderer().counter(), 0);

        // Fed within the deadline
        assert!(!dispatcher.watchdog_mut().advance(Duration::from_millis(600)));
        dispatcher.run_once();
        assert!(!dispatcher.watchdog_mut().advance(Duration::from_millis(600)));

        // Stalled past the deadline
        assert!(dispatcher.watchdog_mut().advance(config.watchdog_timeout.duration()));
        assert!(dispatcher.watchdog().has_expired());

        trim.set(0);
        dispatcher.restart(&mut delay);

        assert!(!dispatcher.watchdog().has_expired());
        assert_eq!(color.snapshot(), DEFAULT_COLOR);
        assert_eq!(dispatcher.ticker().renderer().counter(), 0);
        assert_eq!(dispatcher.last_trim(), None);
        assert_eq!(dispatcher.storage_mut().read_byte(CALIBRATION_ADDRESS), 213);
        assert_eq!(trim.get(), 213);

        // A fresh calibration runs on the next connection
        let probes = dispatcher.bus_mut().probes;
        dispatcher.bus_mut().push(BusEvent::Reset);
        assert_eq!(dispatcher.run_once(), Some(LinkEvent::Connected));
        assert_eq!(dispatcher.bus_mut().probes, probes + PROBE_COUNT);
        assert_eq!(dispatcher.last_trim(), Some(213));
    }

    #[test]
    fn test_interrupt_cadence_leaves_ticks_to_timer() {
        let config = DeviceConfig {
            cadence: RenderCadence::Interrupt,
            ..DeviceConfig::default()
        };
        let color = ColorCell::new(DEFAULT_COLOR);
        let slot = TickSlot::new();
        slot.install(RenderEngine::new(&color, Recorder::default()));
        let trim = Rc::new(Cell::new(0));
        let mut dispatcher = Dispatcher::new(
            &config,
            &color,
            Transport::new(config.binding, ScriptedBus::new(trim.clone())),
            DeviceParts {
                oscillator: TrimRegister::new(trim.clone()),
                storage: Eeprom::erased(),
                watchdog: SoftWatchdog::new(),
            },
            &slot,
        );
        dispatcher.boot(&mut CountingDelay::default());

        for _ in 0..5 {
            dispatcher.run_once();
        }
        assert_eq!(slot.with(|engine| engine.renderer().counter()), Some(0));

        // Timer interrupt
        for _ in 0..3 {
            slot.on_tick();
        }
        assert_eq!(slot.with(|engine| engine.renderer().counter()), Some(3));
        assert_eq!(
            slot.with(|engine| engine.last_levels()),
            Some(OutputLevels {
                red: true,
                green: false,
                blue: false,
            })
        );
    }
}
