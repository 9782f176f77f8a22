//! State machine demo: a counter bouncing between +10 and -10.
//!
//! Run with: cargo run -p syedra-core --example counter

use syedra_core::Result;
use syedra_core::fsm::{Event, MachineBuilder, State};

fn main() -> Result<()> {
    let mut counter = MachineBuilder::named("Counter")
        .state(
            "increment",
            State::new()
                .on_ingress(|_: &mut i32| println!("-> increment"))
                .on_during(|v| *v += 1),
        )
        .state(
            "decrement",
            State::new()
                .on_ingress(|_: &mut i32| println!("-> decrement"))
                .on_during(|v| *v -= 1),
        )
        .event("upper_limit", Event::new(|v: &i32| *v == 10))
        .event("lower_limit", Event::new(|v: &i32| *v == -10))
        .transition("increment", "upper_limit", "decrement")
        .transition("decrement", "lower_limit", "increment")
        .initial("increment")
        .build(0)?;

    println!("{counter}\n");
    for _ in 0..45 {
        counter.update();
        println!(
            "{:>3} {}",
            counter.context(),
            counter.current_state().unwrap_or("-")
        );
    }
    Ok(())
}
