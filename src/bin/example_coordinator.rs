use log::info;
use shm_channel::{ChannelCoordinator, RegistryConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// example_coordinator <name>... creates a fixed and a variable tube per name
// and keeps them mapped until ctrl-c
fn main() {
    env_logger::init();
    let names: Vec<String> = std::env::args().skip(1).collect();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)).expect("Set ctrl-c handler");

    let mut coordinator = ChannelCoordinator::new(RegistryConfig::from_env());
    for name in &names {
        coordinator
            .create_channel(name, 0, 8, 1024)
            .expect("Create fixed tube");
        coordinator
            .create_channel_var(&format!("{}_var", name), 1 << 16)
            .expect("Create variable tube");
    }
    info!("Coordinating {:?}", coordinator.names());

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_secs(1));
        for name in coordinator.names() {
            if let Some(channel) = coordinator.channel(name) {
                info!("{} at {}", name, channel.index());
            }
        }
    }
}
