//! Contact categories
//!
//! Every body belongs to exactly one category bit. A pair is tested for
//! overlap only when each side's contact mask includes the other's
//! category. Nothing ever collides physically, so there is no collision mask.

/// Category bit flags
pub mod category {
    pub const NONE: u32 = 0;
    pub const PLAYER: u32 = 1 << 0;
    pub const OBSTACLE: u32 = 1 << 1;
    pub const POWER_UP: u32 = 1 << 2;
    pub const BOUNDARY: u32 = 1 << 3;
}

/// Contact mask for a given category (which categories it reports contacts with)
pub const fn contact_mask(category: u32) -> u32 {
    match category {
        category::PLAYER => category::OBSTACLE | category::POWER_UP | category::BOUNDARY,
        category::OBSTACLE | category::POWER_UP | category::BOUNDARY => category::PLAYER,
        _ => category::NONE,
    }
}

/// Whether two categories should be tested against each other
#[inline]
pub const fn should_test(a: u32, b: u32) -> bool {
    contact_mask(a) & b != 0 && contact_mask(b) & a != 0
}
