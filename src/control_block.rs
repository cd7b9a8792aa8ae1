use crate::constants::{
    CB_POS_OVERWRITE, CB_POS_PUBLISH_INDEX, CB_POS_SLOT_COUNT, CB_POS_SLOT_SIZE, EMPTY_INDEX,
};
use crate::mem_map::MemMap;
use std::sync::atomic::Ordering;

// Accessors for the ring discipline stored right after the segment header.
// Only the producing side ever writes through these.

pub fn slot_size(map: &MemMap) -> u16 {
    return map.read_u16_at(CB_POS_SLOT_SIZE);
}

pub fn slot_count(map: &MemMap) -> u32 {
    return map.read_u32_at(CB_POS_SLOT_COUNT);
}

pub fn overwrite(map: &MemMap) -> bool {
    return map.read_u16_at(CB_POS_OVERWRITE) != 0;
}

pub fn set_layout(map: &mut MemMap, slot_size: u16, slot_count: u32) {
    map.write_u16_at(CB_POS_SLOT_SIZE, slot_size);
    map.write_u32_at(CB_POS_SLOT_COUNT, slot_count);
}

pub fn set_overwrite(map: &mut MemMap, overwrite: bool) {
    map.write_u16_at(CB_POS_OVERWRITE, overwrite as u16);
}

pub fn publish_index(map: &MemMap) -> i64 {
    return map
        .atomic_i64_at(CB_POS_PUBLISH_INDEX)
        .load(Ordering::Acquire);
}

/// Makes everything written before this call visible to any reader that
/// observes the new index. Returns the index assigned to the record.
pub fn commit(map: &MemMap) -> i64 {
    let prev = map
        .atomic_i64_at(CB_POS_PUBLISH_INDEX)
        .fetch_add(1, Ordering::Release);
    return prev + 1;
}

/// Empty the ring: index back to -1 and wrapping enabled.
pub fn reset_ring(map: &mut MemMap) {
    set_overwrite(map, true);
    map.atomic_i64_at(CB_POS_PUBLISH_INDEX)
        .store(EMPTY_INDEX, Ordering::Release);
}
