//! Brew Cycle
//!
//! Drives a dispenser through one full day in the life of the machine:
//! power on, self-check, an espresso, a selection timeout and a manual
//! cleaning cycle, printing every notification as it is published.
//!
//! Key concepts:
//! - Building and spawning a machine with `MachineBuilder`
//! - Sending typed commands and raw JSON messages through a `MachineHandle`
//! - Timed processes completing on their own
//! - Rejected commands leaving the machine untouched
//!
//! Run with: cargo run --example brew_cycle

use brewstate::core::{Beverage, MachineState};
use brewstate::machine::{Command, FixedDurations};
use brewstate::notify::{ChannelSink, Notification};
use brewstate::{MachineBuilder, MachineConfig, MachineHandle};
use std::time::Duration;

/// Every timed process takes this long, so the demo finishes quickly.
const PROCESS_TIME: Duration = Duration::from_millis(200);

async fn wait_for(handle: &MachineHandle, wanted: MachineState) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if handle.status().await?.state == wanted {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Brew Cycle ===\n");

    let (sink, mut notifications) = ChannelSink::new();
    let printer = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            match notification {
                Notification::Event(event) => {
                    println!("  [event]  {:<22} {} {}", event.event, event.state, event.data)
                }
                Notification::Status(status) => println!(
                    "  [status] {} water={} coffee={} temp={}",
                    status.state,
                    status.resources.water_level,
                    status.resources.coffee_level,
                    status.resources.temperature
                ),
            }
        }
    });

    let handle = MachineBuilder::new()
        .config(MachineConfig {
            seed: Some(42),
            ..MachineConfig::default()
        })
        .durations(FixedDurations(PROCESS_TIME))
        .sink(sink)
        .spawn()?;

    println!("1. Power on and wait for the self-check");
    handle.apply(Command::TurnOn).await?;
    wait_for(&handle, MachineState::Ready).await?;

    println!("\n2. Place a cup and order an espresso (as a JSON message)");
    handle.apply(Command::PlaceCup).await?;
    handle
        .dispatch_json(
            r#"{"source": "demo", "command": "select_beverage", "payload": {"beverage": "espresso"}}"#,
        )
        .await?;
    handle.apply(Command::ConfirmSelection).await?;

    println!("\n3. Nobody orders a second cup, so the selection times out");
    wait_for(&handle, MachineState::Ready).await?;

    println!("\n4. A malformed message is rejected before reaching the machine");
    if let Err(err) = handle
        .dispatch_json(r#"{"command": "select_beverage", "payload": {"beverage": "mocha"}}"#)
        .await
    {
        println!("  rejected: {err}");
    }

    println!("\n5. An illegal command is rejected without side effects");
    if let Err(err) = handle.apply(Command::ResetError).await {
        println!("  rejected: {err}");
    }

    println!("\n6. Run a cleaning cycle");
    handle.apply(Command::StartCleaning).await?;
    wait_for(&handle, MachineState::Ready).await?;

    let instance = handle.instance().await?;
    let events = handle.events_since(0).await?;
    println!(
        "\nFinished in {} with {} events logged ({} brewed)",
        instance.state,
        events.len(),
        Beverage::Espresso
    );

    handle.shutdown().await?;
    drop(handle);
    printer.await?;
    Ok(())
}
