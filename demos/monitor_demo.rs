//! Demonstration of the pulse display pipeline without any hardware.
//!
//! This example shows how to:
//! 1. Decode raw Heart Rate Measurement frames
//! 2. Drive the workout timer and render model by hand
//! 3. Run a full session against the simulated sensor and a terminal display
//!
//! Run with: cargo run --example monitor_demo

use chrono::{Duration, Utc};
use pulse_display::{
    config::Config,
    core::{decode, format_bpm, format_elapsed, render, RenderCommand, WorkoutTimer},
    display::TerminalDisplay,
    session::Session,
    transport::{workout_script, SimulatedTransport},
};

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    println!("Pulse Display - Monitor Demo");
    println!("============================");
    println!();

    // Step through the pipeline by hand
    let t0 = Utc::now();
    let frames: [(&[u8], i64); 4] = [
        (&[0x00, 0x00], 0),
        (&[0x00, 72], 1),
        (&[0x00, 72], 131),
        (&[0x00, 0x00], 132),
    ];

    let mut timer = WorkoutTimer::new();
    for (bytes, offset) in frames {
        let reading = match decode(bytes) {
            Ok(reading) => reading,
            Err(e) => {
                eprintln!("skipping frame: {e}");
                continue;
            }
        };
        let event = timer.advance(&reading, t0 + Duration::seconds(offset));
        let shown = match render(event, &reading) {
            Some(RenderCommand::ShowReading {
                bpm,
                elapsed_seconds,
            }) => format!("{} bpm  {}", format_bpm(bpm), format_elapsed(elapsed_seconds)),
            Some(RenderCommand::Clear) => "(clear)".to_string(),
            Some(RenderCommand::ShowText { text }) => text,
            None => "(no update)".to_string(),
        };
        println!("t+{offset:>3}s  {event:?}  ->  {shown}");
    }
    println!();

    // Full session with a short simulated workout, paced in real time
    println!("Replaying a 20 second simulated workout...");
    let transport = SimulatedTransport::new(workout_script(20)).paced(true);
    let mut session = Session::new(transport, TerminalDisplay::stdout(), Config::default());

    match session.run("00:00:00:00:00:00") {
        Ok(outcome) => println!("Session finished: {outcome:?}"),
        Err(e) => eprintln!("Session failed: {e}"),
    }

    println!();
    println!("{}", session.stats().summary());
}
