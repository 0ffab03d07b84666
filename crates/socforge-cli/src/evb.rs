//! Built-in description of the S32K3X8EVB reference board.

use std::collections::BTreeMap;

use socforge_s32k3::{board, clocks, irq, memmap};
use socforge_topology::{
    BoardDescription, ClockDesc, ClockRate, DeviceDesc, FirmwareDesc, MemoryLink, PropValue,
    RegionDesc, RegionKind, RouteDesc,
};

/// The reference board, as the silicon model wires it: 12 MB flash, the
/// SRAM overlay, an NVIC with 32 input lines, one UART and two periodic
/// timers, booting from flash.
pub fn description() -> BoardDescription {
    BoardDescription {
        name: board::NAME.into(),
        regions: regions(),
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
        devices: devices(),
        routes: vec![
            RouteDesc { device: "uart0".into(), output: 0, line: irq::LPUART0_LINE },
            RouteDesc { device: "pit0".into(), output: 0, line: irq::PIT0_LINE },
            RouteDesc { device: "pit1".into(), output: 0, line: irq::PIT1_LINE },
        ],
        firmware: Some(FirmwareDesc { region: "flash".into(), offset: 0 }),
    }
}

fn regions() -> Vec<RegionDesc> {
    vec![
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
    ]
}

fn devices() -> Vec<DeviceDesc> {
    vec![
        DeviceDesc {
            id: "sys".into(),
            type_name: "sys-controller".into(),
            properties: BTreeMap::new(),
            clocks: BTreeMap::new(),
            memory: BTreeMap::new(),
        },
        DeviceDesc {
            id: "nvic".into(),
            type_name: "interrupt-controller".into(),
            properties: BTreeMap::from([
                ("num-irq".into(), PropValue::U32(irq::NVIC_NUM_IRQ)),
                ("num-prio-bits".into(), PropValue::U32(irq::NVIC_PRIO_BITS)),
                ("enable-bitband".into(), PropValue::Bool(true)),
                ("cpu-type".into(), PropValue::Str(board::CPU_TYPE.into())),
            ]),
            clocks: BTreeMap::from([
                ("cpuclk".into(), clocks::SYSCLK.into()),
                ("refclk".into(), clocks::REFCLK.into()),
            ]),
            memory: BTreeMap::from([("memory".into(), MemoryLink::Space)]),
        },
        DeviceDesc {
            id: "uart0".into(),
            type_name: "uart".into(),
            properties: BTreeMap::new(),
            clocks: BTreeMap::new(),
            memory: BTreeMap::from([
                ("mmio".into(), MemoryLink::Region("uart0-mmio".into())),
                ("intc".into(), MemoryLink::Device("nvic".into())),
            ]),
        },
        timer("pit0", "pit0-mmio"),
        timer("pit1", "pit1-mmio"),
    ]
}

fn timer(id: &str, mmio: &str) -> DeviceDesc {
    DeviceDesc {
        id: id.into(),
        type_name: "timer".into(),
        properties: BTreeMap::new(),
        clocks: BTreeMap::from([("pclk".into(), clocks::SYSCLK.into())]),
        memory: BTreeMap::from([
            ("mmio".into(), MemoryLink::Region(mmio.into())),
            ("intc".into(), MemoryLink::Device("nvic".into())),
        ]),
    }
}
