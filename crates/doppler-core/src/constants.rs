/// Propagation speed of every wavefront in distance units per second.
pub const SOUND_SPEED: f32 = 340.0;

/// Number of wavefronts that may be alive at the same time.
pub const WAVE_CAPACITY: usize = 500;

/// Radius past which a wavefront has left the visible region and is retired.
pub const RETIREMENT_DISTANCE: f32 = 800.0;

/// Length of one perception window in seconds.
pub const AGGREGATION_INTERVAL: f32 = 0.1;

/// Lead (in distance units) a wavefront must have past the observer before it
/// counts as confirmed-crossed.
pub const CROSSING_MARGIN: f32 = 5.0;

/// Pixels drawn per simulated distance unit.
pub const PIXELS_PER_UNIT: f32 = 3.0;

/// Perceived frequency for a window in which `count` wavefronts were heard.
pub fn frequency_from_count(count: u32, interval: f32) -> f32 {
    count as f32 * (1.0 / interval)
}

/// Loudness proxy derived from the floored radius of the closest newly
/// heard wavefront, clamped to [0, 1].
pub fn volume_from_radius(nearest_radius: f32) -> f32 {
    (1.0 / (4.0 * nearest_radius)).clamp(0.0, 1.0)
}

/// On-screen ring radius for a wavefront of the given simulated radius.
///
/// The `/π` divisor is purely a visual compression so rings stay on screen
/// long enough to watch them pass the observer.
pub fn ring_radius(radius: f32, scale: f32) -> f32 {
    scale * (1.0 + radius / std::f32::consts::PI)
}
