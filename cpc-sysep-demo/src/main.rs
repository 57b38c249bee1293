//! Interactive demo for `cpc-sysep`: drives a `SystemEndpoint` against the crate's in-memory
//! mock `Core`/`TimerService` from the command line, the same way `util`'s bin crates exercise
//! `neutronium` without a live game server behind them.

mod config;

use clap::{App, Arg, SubCommand};
use config::DemoConfig;
use cpc_support::logging;
use cpc_sysep::mock::{MockCore, MockTimerService};
use cpc_sysep::wire::{self, CommandId};
use cpc_sysep::{SystemEndpoint, SYSTEM_ENDPOINT_ID};
use std::time::Duration;

fn main() {
    let matches = App::new("CPC System Endpoint Demo")
        .version("1.0")
        .author("Bush Hammer Industries")
        .about("Issues System Endpoint commands against an in-memory mock Core and prints the resulting wire traffic.")
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .help("TOML file with retries/timeout_ms/property_id overrides (see DemoConfig::default() otherwise)"),
        )
        .subcommand(SubCommand::with_name("noop").about("Issues a NOOP liveness check"))
        .subcommand(
            SubCommand::with_name("property-get")
                .about("Issues a PROP_VALUE_GET request")
                .arg(Arg::with_name("PROPERTY_ID").help("Property id, decimal or 0x-prefixed hex")),
        )
        .subcommand(
            SubCommand::with_name("property-set")
                .about("Issues a PROP_VALUE_SET request with a little-endian u32 value")
                .arg(Arg::with_name("PROPERTY_ID").help("Property id, decimal or 0x-prefixed hex"))
                .arg(Arg::with_name("VALUE").help("u32 value to set").required(true)),
        )
        .subcommand(SubCommand::with_name("reboot").about("Issues a device reset/reboot"))
        .get_matches();

    let log = logging::init();
    let demo_config = match matches.value_of("config") {
        Some(path) => DemoConfig::load(path),
        None => DemoConfig::default(),
    };
    let retries = demo_config.retries;
    let timeout = Duration::from_millis(demo_config.timeout_ms);

    let mut sysep = SystemEndpoint::new(MockCore::new(), MockTimerService::new(), &log);

    match matches.subcommand() {
        ("noop", Some(_)) => {
            let seq = sysep.noop(
                |handle, status| println!("NOOP seq={} completed: {:?}", handle, status),
                retries,
                timeout,
            );
            acknowledge_and_reply_ok(&mut sysep, seq, CommandId::Noop, &[]);
        }
        ("property-get", Some(sub)) => {
            let property_id = sub.value_of("PROPERTY_ID").map(parse_id).unwrap_or(demo_config.property_id);
            let seq = sysep.property_get(
                |handle, property_id, value, status| {
                    println!(
                        "PROP_VALUE_GET seq={} property={:#x} value={:?} status={:?}",
                        handle, property_id, value, status
                    );
                },
                property_id,
                retries,
                timeout,
            );
            let reply_payload = wire::encode_property_payload(property_id, &0u32.to_le_bytes());
            acknowledge_and_reply_ok(&mut sysep, seq, CommandId::PropValueIs, &reply_payload);
        }
        ("property-set", Some(sub)) => {
            let property_id = sub.value_of("PROPERTY_ID").map(parse_id).unwrap_or(demo_config.property_id);
            let value: u32 = sub.value_of("VALUE").unwrap().parse().expect("VALUE must be a u32");
            let seq = sysep.property_set(
                |handle, property_id, value, status| {
                    println!(
                        "PROP_VALUE_SET seq={} property={:#x} value={:?} status={:?}",
                        handle, property_id, value, status
                    );
                },
                retries,
                timeout,
                property_id,
                &value.to_le_bytes(),
            );
            let reply_payload = wire::encode_property_payload(property_id, &value.to_le_bytes());
            acknowledge_and_reply_ok(&mut sysep, seq, CommandId::PropValueIs, &reply_payload);
        }
        ("reboot", Some(_)) => {
            let seq = sysep.reboot(
                |handle, status, reset_status| {
                    println!("RESET seq={} status={:?} reset_status={}", handle, status, reset_status)
                },
                retries,
                timeout,
            );
            acknowledge_and_reply_ok(&mut sysep, seq, CommandId::Reset, &0u32.to_le_bytes());
        }
        _ => {
            println!("{}", matches.usage());
        }
    }

    println!("Wire traffic:");
    for frame in &sysep.core().written {
        println!("  {:?} {:02x?}", frame.flags, frame.buffer);
    }
}

/// In the absence of a live secondary, the demo plays both ends: it acknowledges the poll
/// itself and crafts the reply a well-behaved secondary would send back, then feeds it straight
/// into `on_final`.
fn acknowledge_and_reply_ok(
    sysep: &mut SystemEndpoint<MockCore, MockTimerService>,
    seq: u8,
    reply_command_id: CommandId,
    reply_payload: &[u8],
) {
    #[cfg(not(feature = "legacy-unnumbered-poll"))]
    sysep.on_poll_acknowledged(seq);

    let reply = wire::encode_frame(reply_command_id, seq, reply_payload);
    sysep.on_final(SYSTEM_ENDPOINT_ID, &reply);
}

fn parse_id(raw: &str) -> u32 {
    if let Some(hex) = raw.strip_prefix("0x") {
        u32::from_str_radix(hex, 16).expect("PROPERTY_ID must be a valid hex or decimal number")
    } else {
        raw.parse().expect("PROPERTY_ID must be a valid hex or decimal number")
    }
}
