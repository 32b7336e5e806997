//! Interrupt wiring on simulated hardware.
//!
//! Shows how firmware hooks the crate into its two timer interrupts. On a
//! board, `OverflowTimer::reload` would write the TMRxH/TMRxL preload
//! registers of an up-counting 16-bit timer; here it records the value.
//!
//! Run with: `cargo run --example isr_wiring`

use stepper_oscillator::motion::WALL_CLOCK_PRELOAD;
use stepper_oscillator::motor::overflow_preload;
use stepper_oscillator::sim::{MemoryStore, ScriptedInput, SimDelay, SimPin};
use stepper_oscillator::{
    A4988Builder, ActiveLevel, BoardConfig, Controller, ControllerState, MicrostepPins,
    OperatorInput, PersistedConfig, StepTimer, WallClock,
};

/// 16-bit timer that fires on overflow.
#[derive(Default)]
struct OverflowTimer {
    preload: u16,
}

impl StepTimer for OverflowTimer {
    fn reload(&mut self, ticks: u16) {
        self.preload = overflow_preload(ticks);
    }
}

static STATE: ControllerState = ControllerState::new();

fn main() -> stepper_oscillator::Result<()> {
    let mut eeprom = MemoryStore::new();
    PersistedConfig {
        travel_limit: 20,
        delay_value: 10_000,
        start_offset: 5,
    }
    .store(&mut eeprom)?;

    let mut driver = A4988Builder::new()
        .step_pin(SimPin::new())
        .dir_pin(SimPin::new())
        .reset_pin(SimPin::new())
        .microstep_pins(MicrostepPins::new(SimPin::new(), SimPin::new(), SimPin::new()))
        .delay(SimDelay::new())
        .build()?;
    let mut delay = SimDelay::new();

    let controller = Controller::new(&STATE, BoardConfig::default())?;
    let mut boot_input = OperatorInput::new(ScriptedInput::constant(false), ActiveLevel::High);
    let report = controller.boot(&mut boot_input, &mut driver, &mut delay, &mut eeprom)?;
    println!(
        "booted: travel_limit={} speed={} delay_counter={}",
        report.persisted.travel_limit, report.ramp.speed, report.ramp.delay_counter
    );

    let mut armed = controller.arm(driver, &report);
    let clock = WallClock::default();
    let mut step_timer = OverflowTimer::default();
    let mut clock_timer = OverflowTimer::default();

    // High-priority ISR body, fired here 16 times per full step.
    for _ in 0..(21 * 16) {
        armed.generator.on_timer(&STATE, &mut step_timer)?;
    }
    // Low-priority ISR body.
    clock.on_timer(&STATE, &mut clock_timer);

    println!(
        "step timer preload {:#06x}, clock preload {:#06x} (expected {:#06x})",
        step_timer.preload, clock_timer.preload, WALL_CLOCK_PRELOAD
    );
    println!("motor: {:?}, clock: {}", STATE.motor(), STATE.clock());

    // Main loop: ramp 100 ticks, then the operator pauses.
    let mut input = OperatorInput::new(
        ScriptedInput::new(&[(false, 100), (true, 1)]),
        ActiveLevel::High,
    );
    let ticks = armed.ramp.service(&mut input, &mut delay, &STATE, &mut eeprom)?;
    println!(
        "ramped {} ticks to {} steps/s, step timer now reloads {} ticks",
        ticks,
        armed.ramp.speed(),
        STATE.delay_counter()
    );

    Ok(())
}
