use log::{error, info};
use shm_channel::{Channel, ChannelRegistry, FrameReader, RegistryConfig, SlotReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// example_subscriber <name>
fn main() {
    env_logger::init();
    let name = std::env::args().nth(1).unwrap_or_else(|| "hello".to_string());

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)).expect("Set ctrl-c handler");

    let mut registry = ChannelRegistry::new(RegistryConfig::from_env());
    let channel: &Channel = registry.register_subscriber(&name).expect("Create subscriber");
    info!("Subscribed to {:?}", channel);

    let mut slots = SlotReader::from_latest(channel);
    let mut frames = FrameReader::new();
    while running.load(Ordering::SeqCst) {
        let result = match channel.is_variable() {
            true => frames.poll_var(channel).map(|frame| match frame {
                Some(frame) => info!(
                    "{} type={} ts={} {:?}",
                    frame.seq,
                    frame.msg_type,
                    frame.timestamp,
                    String::from_utf8_lossy(&frame.payload)
                ),
                None => std::thread::sleep(Duration::from_millis(1)),
            }),
            false => slots
                .poll(channel, |index, data| info!("{} {:?}", index, data))
                .map(|n| {
                    if n == 0 {
                        std::thread::sleep(Duration::from_millis(1));
                    }
                }),
        };
        if let Err(e) = result {
            error!("{}", e);
            break;
        }
    }
}
