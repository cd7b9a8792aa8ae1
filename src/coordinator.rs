/*
 * Tube mode: a coordinator process creates the rings up front, and the
 * producing and consuming processes only ever link to them. Since linking
 * never resets anything, the two sides can start in any order (or restart)
 * without wiping each other's data.
 */
use crate::channel::{Channel, ChannelRole};
use crate::config::RegistryConfig;
use crate::constants::{CHANNEL_MAGIC, DATA_START};
use crate::control_block;
use crate::error::Error;
use crate::registry::{create_ring, fixed_total_size, validate_name};
use crate::segment::attach;
use log::info;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

pub struct ChannelCoordinator {
    config: RegistryConfig,
    channels: HashMap<String, Channel>,
}

impl ChannelCoordinator {
    pub fn new(config: RegistryConfig) -> ChannelCoordinator {
        return ChannelCoordinator {
            config: config,
            channels: HashMap::new(),
        };
    }

    pub fn config(&self) -> &RegistryConfig {
        return &self.config;
    }

    /// Create a fixed slot ring and initialize it. `total_size` of 0 sizes
    /// the segment to exactly `slot_count` slots.
    pub fn create_channel(
        &mut self,
        name: &str,
        total_size: u64,
        slot_size: u16,
        slot_count: u32,
    ) -> Result<&mut Channel, Error> {
        validate_name(name)?;
        let total_size = fixed_total_size(total_size, slot_size, slot_count)?;
        return self.create(name, total_size, slot_size, slot_count);
    }

    pub fn create_channel_var(
        &mut self,
        name: &str,
        total_data_size: u64,
    ) -> Result<&mut Channel, Error> {
        validate_name(name)?;
        return self.create(name, total_data_size + DATA_START as u64, 0, 0);
    }

    fn create(
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
        let mut mem = create_ring(&self.config, name, total_size, slot_size, slot_count)?;
        // the one place a tube ring is ever reset
        control_block::reset_ring(&mut mem);
        let channel = Channel::new(name, mem, ChannelRole::TuberProducer)?;
        info!("Created tube channel {}", name);
        return Ok(entry.insert(channel));
    }

    /// Link to a ring the coordinator created, as its producer or consumer.
    /// Nothing in the control block is touched.
    pub fn link_channel(
        &mut self,
        name: &str,
        is_publisher_side: bool,
    ) -> Result<&mut Channel, Error> {
        validate_name(name)?;
        match self.channels.entry(name.to_string()) {
            Entry::Occupied(entry) => return Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let role = match is_publisher_side {
                    true => ChannelRole::TuberProducer,
                    false => ChannelRole::TuberConsumer,
                };
                let mem = attach(&self.config.path_for(name), CHANNEL_MAGIC)?;
                let channel = Channel::new(name, mem, role)?;
                info!("Linked tube channel {} as {:?}", name, role);
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

    pub fn remove(&mut self, name: &str) -> Option<Channel> {
        return self.channels.remove(name);
    }
}
