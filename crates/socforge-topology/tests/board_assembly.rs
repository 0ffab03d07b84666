//! End-to-end assembly of the S32K3X8EVB reference board.
//!
//! Builds the full board description from the silicon-model constants and
//! exercises the failure modes a hosting engine relies on: firmware bounds,
//! clock resolution, line ownership, realization ordering and build
//! determinism.

use socforge_s32k3::{board, clocks, irq, memmap};
use socforge_topology::{
    BoardAssembler, BoardDescription, BuildPhase, ClockDesc, ClockRate, DeviceDesc, FirmwareDesc,
    FirmwareImage, MemoryLink, PropValue, RegionDesc, RegionKind, RouteDesc, TopologyError,
};

fn device(
    id: &str,
    type_name: &str,
    properties: &[(&str, PropValue)],
    clock_bindings: &[(&str, &str)],
    memory_bindings: &[(&str, MemoryLink)],
) -> DeviceDesc {
    DeviceDesc {
        id: id.into(),
        type_name: type_name.into(),
        properties: properties
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect(),
        clocks: clock_bindings
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect(),
        memory: memory_bindings
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect(),
    }
}

fn evb_description() -> BoardDescription {
    BoardDescription {
        name: board::NAME.into(),
        regions: vec![
            RegionDesc {
                id: "flash".into(),
                base: memmap::flash::BASE,
                size: memmap::flash::SIZE,
                kind: RegionKind::Rom,
                priority: 0,
            },
            RegionDesc {
                id: "sram".into(),
                base: memmap::sram::BASE,
                size: memmap::sram::SIZE,
                kind: RegionKind::Overlay,
                priority: memmap::sram::PRIORITY,
            },
            RegionDesc {
                id: "uart0-mmio".into(),
                base: memmap::lpuart0::BASE,
                size: memmap::lpuart0::SIZE,
                kind: RegionKind::Ram,
                priority: 0,
            },
            RegionDesc {
                id: "pit0-mmio".into(),
                base: memmap::pit0::BASE,
                size: memmap::pit0::SIZE,
                kind: RegionKind::Ram,
                priority: 0,
            },
            RegionDesc {
                id: "pit1-mmio".into(),
                base: memmap::pit1::BASE,
                size: memmap::pit1::SIZE,
                kind: RegionKind::Ram,
                priority: 0,
            },
        ],
        clocks: vec![
            ClockDesc {
                id: clocks::SYSCLK.into(),
                upstream: None,
                rate: Some(ClockRate::PeriodNs(clocks::SYSCLK_PERIOD_NS)),
                ratio: None,
            },
            ClockDesc {
                id: clocks::REFCLK.into(),
                upstream: Some(clocks::SYSCLK.into()),
                rate: Some(ClockRate::Hz(clocks::REFCLK_HZ)),
                ratio: None,
            },
        ],
        devices: vec![
            device("sys", "sys-controller", &[], &[], &[]),
            device(
                "nvic",
                "interrupt-controller",
                &[
                    ("num-irq", PropValue::U32(irq::NVIC_NUM_IRQ)),
                    ("num-prio-bits", PropValue::U32(irq::NVIC_PRIO_BITS)),
                    ("enable-bitband", PropValue::Bool(true)),
                    ("cpu-type", PropValue::Str(board::CPU_TYPE.into())),
                ],
                &[("cpuclk", clocks::SYSCLK), ("refclk", clocks::REFCLK)],
                &[("memory", MemoryLink::Space)],
            ),
            device(
                "uart0",
                "uart",
                &[],
                &[],
                &[
                    ("mmio", MemoryLink::Region("uart0-mmio".into())),
                    ("intc", MemoryLink::Device("nvic".into())),
                ],
            ),
            device(
                "pit0",
                "timer",
                &[],
                &[("pclk", clocks::SYSCLK)],
                &[
                    ("mmio", MemoryLink::Region("pit0-mmio".into())),
                    ("intc", MemoryLink::Device("nvic".into())),
                ],
            ),
            device(
                "pit1",
                "timer",
                &[],
                &[("pclk", clocks::SYSCLK)],
                &[
                    ("mmio", MemoryLink::Region("pit1-mmio".into())),
                    ("intc", MemoryLink::Device("nvic".into())),
                ],
            ),
        ],
        routes: vec![
            RouteDesc { device: "uart0".into(), output: 0, line: irq::LPUART0_LINE },
            RouteDesc { device: "pit0".into(), output: 0, line: irq::PIT0_LINE },
            RouteDesc { device: "pit1".into(), output: 0, line: irq::PIT1_LINE },
        ],
        firmware: Some(FirmwareDesc { region: "flash".into(), offset: 0 }),
    }
}

fn image_of(len: usize) -> FirmwareImage {
    FirmwareImage::new(vec![0xA5u8; len], "app.bin")
}

// Scenario A — firmware bounds against the 12 MB flash region.

#[test]
fn test_oversized_firmware_rejected() {
    let desc = evb_description();
    let image = image_of(13 << 20);
    let err = BoardAssembler::build(&desc, Some(&image)).expect_err("13 MB must not fit");
    assert_eq!(err.phase(), BuildPhase::Firmware);
    assert!(matches!(err.cause(), TopologyError::OutOfBounds { .. }));
}

#[test]
fn test_fitting_firmware_records_span() {
    let desc = evb_description();
    let image = image_of(10 << 20);
    let topo = BoardAssembler::build(&desc, Some(&image)).expect("10 MB fits");
    let record = topo.firmware().expect("load record");
    assert_eq!(record.start(), 0x0);
    assert_eq!(record.end(), 0x00A0_0000);
    assert_eq!(record.region(), "flash");
}

// Scenario B — clock resolution in both rate domains.

#[test]
fn test_sysclk_resolves_near_nominal_rate() {
    let desc = evb_description();
    let topo = BoardAssembler::build(&desc, Some(&image_of(4))).unwrap();
    let sysclk = topo.clock(clocks::SYSCLK).expect("sysclk resolved");
    #[allow(clippy::cast_precision_loss)]
    let nominal = clocks::SYSCLK_NOMINAL_HZ as f64;
    assert!((sysclk.hz - nominal).abs() / nominal < 1e-3);
}

#[test]
fn test_refclk_resolves_to_microsecond_period() {
    let desc = evb_description();
    let topo = BoardAssembler::build(&desc, Some(&image_of(4))).unwrap();
    let refclk = topo.clock(clocks::REFCLK).expect("refclk resolved");
    assert!((refclk.period_ns - clocks::REFCLK_PERIOD_NS).abs() < 1e-6);
    assert!(refclk.is_consistent());
}

// Scenario C — controller input lines are uniquely owned.

#[test]
fn test_double_routed_line_rejected() {
    let mut desc = evb_description();
    desc.routes = vec![
        RouteDesc { device: "uart0".into(), output: 0, line: 0 },
        RouteDesc { device: "pit0".into(), output: 0, line: 0 },
    ];
    let err = BoardAssembler::build(&desc, Some(&image_of(4))).expect_err("line 0 contested");
    assert_eq!(err.phase(), BuildPhase::Interrupts);
    assert!(matches!(
        err.cause(),
        TopologyError::DuplicateLine { line: 0, owner } if owner == "uart0"
    ));
}

#[test]
fn test_rerouted_timer_accepted() {
    let mut desc = evb_description();
    desc.routes = vec![
        RouteDesc { device: "uart0".into(), output: 0, line: 0 },
        RouteDesc { device: "pit0".into(), output: 0, line: 8 },
    ];
    let topo = BoardAssembler::build(&desc, Some(&image_of(4))).unwrap();
    assert_eq!(topo.fabric().unwrap().edges().len(), 2);
}

// Scenario D — realization order is enforced, not assumed.

#[test]
fn test_peripheral_before_controller_rejected() {
    let mut desc = evb_description();
    // Move the UART ahead of the controller it links to.
    desc.devices.swap(1, 2);
    let err = BoardAssembler::build(&desc, Some(&image_of(4))).expect_err("uart realized too early");
    assert_eq!(err.phase(), BuildPhase::Realize);
    assert!(matches!(
        err.cause(),
        TopologyError::Ordering { device, dependency } if device == "uart0" && dependency == "nvic"
    ));
}

#[test]
fn test_controller_first_order_accepted() {
    let desc = evb_description();
    let topo = BoardAssembler::build(&desc, Some(&image_of(4))).unwrap();
    assert_eq!(topo.devices().realized_count(), board::DEVICE_COUNT);
}

// Scenario E — the full board, deterministically.

#[test]
fn test_full_board_realizes_every_component() {
    let desc = evb_description();
    let topo = BoardAssembler::build(&desc, Some(&image_of(10 << 20))).unwrap();

    assert_eq!(topo.devices().realized_count(), 5);
    assert_eq!(topo.clocks().len(), 2);
    assert_eq!(topo.fabric().unwrap().edges().len(), 3);
    assert!(topo.firmware().is_some());

    // Flash and the SRAM overlay resolve by address as wired.
    assert_eq!(topo.space().lookup(0x0).unwrap().id(), "flash");
    assert_eq!(topo.space().lookup(memmap::sram::BASE).unwrap().id(), "sram");
}

#[test]
fn test_identical_builds_have_identical_summaries() {
    let desc = evb_description();
    let first = BoardAssembler::build(&desc, Some(&image_of(10 << 20))).unwrap();
    let second = BoardAssembler::build(&desc, Some(&image_of(10 << 20))).unwrap();
    assert_eq!(first.summary(), second.summary());
    assert!(first.summary().contains(board::NAME));
}
