//! D2Q9 lattice geometry: weights, direction vectors, and the index
//! permutation used by bounce-back.
//!
//! Direction layout (index 0 is rest):
//! ```text
//! 6 2 5
//!  \|/
//! 3-0-1
//!  /|\
//! 7 4 8
//! ```

/// Rest weight.
pub const W0: f32 = 4.0 / 9.0;
/// Axial (N/E/S/W) weight.
pub const W1: f32 = 1.0 / 9.0;
/// Diagonal (NE/NW/SW/SE) weight.
pub const W2: f32 = 1.0 / 36.0;

/// Per-direction equilibrium weight, indexed 0..=8.
pub const WEIGHTS: [f32; 9] = [W0, W1, W1, W1, W1, W2, W2, W2, W2];

/// Per-direction unit lattice vector (e_x, e_y), indexed 0..=8.
pub const DIRECTIONS: [(f32, f32); 9] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (0.0, 1.0),
    (-1.0, 0.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (-1.0, 1.0),
    (-1.0, -1.0),
    (1.0, -1.0),
];

/// Opposite-direction permutation used by `rebound` (1<->3, 2<->4, 5<->7, 6<->8).
pub const OPPOSITE: [usize; 9] = [0, 3, 4, 1, 2, 7, 8, 5, 6];

/// Speed of sound squared for the D2Q9 lattice.
pub const CS2: f32 = 1.0 / 3.0;

/// Equilibrium population vector for density `rho` at rest (u = 0).
#[inline]
pub fn equilibrium_at_rest(rho: f32) -> [f32; 9] {
    let mut s = [0.0f32; 9];
    for k in 0..9 {
        s[k] = WEIGHTS[k] * rho;
    }
    s
}
