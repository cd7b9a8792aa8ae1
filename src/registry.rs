use crate::channel::{Channel, ChannelRole};
use crate::config::RegistryConfig;
use crate::constants::{CHANNEL_MAGIC, DATA_START};
use crate::control_block;
use crate::error::Error;
use crate::mem_map::MemMap;
use crate::segment::{acquire_with, attach};
use log::{info, warn};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

pub(crate) fn validate_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::EmptyName);
    }
    if name.contains('/') || name.contains('\0') || name == "." || name == ".." {
        return Err(Error::InvalidName(name.to_string()));
    }
    return Ok(());
}

pub(crate) fn fixed_total_size(
    total_size: u64,
    slot_size: u16,
    slot_count: u32,
) -> Result<u64, Error> {
    if slot_size == 0 || slot_count == 0 {
        return Err(Error::InvalidLayout(format!(
            "fixed slot channels need a slot size and count, got {} x {}",
            slot_count, slot_size
        )));
    }
    if total_size == 0 {
        return Ok(slot_count as u64 * slot_size as u64 + DATA_START as u64);
    }
    return Ok(total_size);
}

/// Create (or link) the segment for `name` and lay the ring out in it. A
/// segment we create is initialized before any other process can link it.
pub(crate) fn create_ring(
    config: &RegistryConfig,
    name: &str,
    total_size: u64,
    slot_size: u16,
    slot_count: u32,
) -> Result<MemMap, Error> {
    let path = config.path_for(name);
    let mut mem = acquire_with(
        &path,
        total_size,
        CHANNEL_MAGIC,
        config.session_id,
        config.segment_options(),
        |mem| {
            control_block::set_layout(mem, slot_size, slot_count);
            control_block::reset_ring(mem);
        },
    )?;

    let old_size = control_block::slot_size(&mem);
    let old_count = control_block::slot_count(&mem);
    if old_size != slot_size || old_count != slot_count {
        warn!(
            "{} relaid from {} x {} to {} x {}",
            name, old_count, old_size, slot_count, slot_size
        );
        control_block::set_layout(&mut mem, slot_size, slot_count);
    }
    return Ok(mem);
}

/// Process local set of directly registered channels. The publisher of a
/// channel resets its ring, so each name is published at most once here.
pub struct ChannelRegistry {
    config: RegistryConfig,
    channels: HashMap<String, Channel>,
}

impl ChannelRegistry {
    pub fn new(config: RegistryConfig) -> ChannelRegistry {
        return ChannelRegistry {
            config: config,
            channels: HashMap::new(),
        };
    }

    pub fn config(&self) -> &RegistryConfig {
        return &self.config;
    }

    /// `total_size` of 0 sizes the segment to exactly `slot_count` slots.
    pub fn register_publisher(
        &mut self,
        name: &str,
        total_size: u64,
        slot_size: u16,
        slot_count: u32,
    ) -> Result<&mut Channel, Error> {
        validate_name(name)?;
        let total_size = fixed_total_size(total_size, slot_size, slot_count)?;
        return self.register_producer(name, total_size, slot_size, slot_count);
    }

    /// Variable length channel with `total_data_size` bytes for frames.
    pub fn register_publisher_var(
        &mut self,
        name: &str,
        total_data_size: u64,
    ) -> Result<&mut Channel, Error> {
        validate_name(name)?;
        return self.register_producer(name, total_data_size + DATA_START as u64, 0, 0);
    }

    fn register_producer(
        &mut self,
        name: &str,
        total_size: u64,
        slot_size: u16,
        slot_count: u32,
    ) -> Result<&mut Channel, Error> {
        let entry = match self.channels.entry(name.to_string()) {
            Entry::Occupied(_) => return Err(Error::AlreadyRegistered(name.to_string())),
            Entry::Vacant(entry) => entry,
        };
        let mem = create_ring(&self.config, name, total_size, slot_size, slot_count)?;
        let channel = Channel::new(name, mem, ChannelRole::Publisher)?;
        info!("Registered publisher {}", name);
        return Ok(entry.insert(channel));
    }

    /// Link to a channel some publisher created. Registering the same name
    /// again hands back the channel we already have.
    pub fn register_subscriber(&mut self, name: &str) -> Result<&mut Channel, Error> {
        validate_name(name)?;
        match self.channels.entry(name.to_string()) {
            Entry::Occupied(entry) => return Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let mem = attach(&self.config.path_for(name), CHANNEL_MAGIC)?;
                let channel = Channel::new(name, mem, ChannelRole::Subscriber)?;
                info!("Registered subscriber {}", name);
                return Ok(entry.insert(channel));
            }
        }
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        return self.channels.get(name);
    }

    pub fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        return self.channels.get_mut(name);
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.channels.keys().map(|k| k.as_str()).collect();
        names.sort();
        return names;
    }

    pub fn len(&self) -> usize {
        return self.channels.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.channels.is_empty();
    }

    /// Unmaps the channel. The segment itself stays for other processes.
    pub fn remove(&mut self, name: &str) -> Option<Channel> {
        return self.channels.remove(name);
    }
}
