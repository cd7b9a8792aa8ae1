use log::{error, info};
use shm_channel::{now_nanos, ChannelRegistry, RegistryConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// example_publisher <name> [--var]
fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let name = args.get(1).map(|s| s.as_str()).unwrap_or("hello");
    let var = args.iter().any(|a| a == "--var");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)).expect("Set ctrl-c handler");

    let mut registry = ChannelRegistry::new(RegistryConfig::from_env());
    let channel = match var {
        true => registry.register_publisher_var(name, 1 << 16),
        false => registry.register_publisher(name, 0, 8, 1024),
    }
    .expect("Create publisher");
    info!("Publishing on {:?}", channel);

    let mut counter = 0u64;
    while running.load(Ordering::SeqCst) {
        let result = match var {
            true => {
                let message = format!("hello {}", counter);
                let timestamp = (now_nanos() / 1_000_000) as i32;
                channel.publish_msg(1, timestamp, message.as_bytes())
            }
            false => channel.publish(&counter.to_ne_bytes()),
        };
        match result {
            Ok(index) => info!("Published {} at {}", counter, index),
            Err(e) if e.is_fatal() => {
                error!("Giving up: {}", e);
                break;
            }
            Err(e) => error!("{}", e),
        }
        counter += 1;
        std::thread::sleep(Duration::from_millis(100));
    }
    info!("Published {} records", counter);
}
