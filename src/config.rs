//! Compile-time physics constants. Per spec.md §6 these are rebuild-only: there
//! is no runtime mechanism for overriding them, matching the original `sph.c`
//! preprocessor constants.

/// Tank width (x-extent of the global box).
pub const B: f64 = 1.0;
/// Tank height (y-extent of the global box).
pub const T: f64 = 0.6;
/// Initial length of the fluid column along x.
pub const L: f64 = 0.6;
/// Initial particle spacing.
pub const DELTA: f64 = 0.02;
/// Smoothing length.
pub const H: f64 = DELTA * 1.3;
/// Interaction scale factor: the kernel cuts off at q = r/h = 3, so the
/// interaction radius is `SCALE_K * H`.
pub const SCALE_K: f64 = 3.0;
/// Reference (rest) density of the fluid.
pub const RHO_0: f64 = 1000.0;
/// Speed of sound used in the Tait equation of state.
pub const SOUND_SPEED: f64 = 10.0;
/// Gravitational acceleration.
pub const GRAVITY: f64 = 9.81;
/// Neighbor count below which a field particle is treated as being on the
/// free surface (`int_force`, named `free_surface` in the original source).
pub const FREE_SURFACE_THRESHOLD: usize = 15;
/// Neighbor count below which a virtual particle's density correction is
/// skipped in favor of resetting to reference density (`correction`). This
/// threshold of 10 is literal in the original source, distinct from
/// `FREE_SURFACE_THRESHOLD`.
pub const VIRTUAL_NEIGHBOR_FLOOR: usize = 10;
/// Boundary distance for virtual mirror generation (`1.55 * h` in the source).
pub const MIRROR_BOUNDARY_FACTOR: f64 = 1.55;

/// Fixed integration time step. Adaptive/variable time stepping is an
/// explicit non-goal (spec.md §1), so this is a single compile-time
/// constant rather than a CFL-recomputed value, chosen small enough to be
/// stable for `SOUND_SPEED`/`H` above.
pub const DT: f64 = 1e-4;

pub const DEFAULT_MIN_ITERATION: u64 = 0;
pub const DEFAULT_MAX_ITERATION: u64 = 200;
pub const DEFAULT_CHECKPOINT_FREQUENCY: u64 = 50;

/// Interaction radius `R = scale_k * h`.
pub fn interaction_radius() -> f64 {
    SCALE_K * H
}

/// Pressure from density via the Tait equation of state.
pub fn tait_pressure(rho: f64) -> f64 {
    SOUND_SPEED * SOUND_SPEED * RHO_0 * ((rho / RHO_0).powi(7) - 1.0) / 7.0
}
