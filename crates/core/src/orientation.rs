//! Unit vectors and rotations in inclination/declination form.
//!
//! Angles are in degrees. Inclination is measured from the horizontal
//! (positive down, toward +z) and declination clockwise from +x toward +y,
//! the usual geomagnetic convention with x north, y east, z down.

/// Intensity, inclination and declination of a 3-component vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    pub intensity: f64,
    /// Degrees.
    pub inclination: f64,
    /// Degrees.
    pub declination: f64,
}

/// Cartesian unit vector with inclination `inc` and declination `dec`.
pub fn unit_vector(inc: f64, dec: f64) -> [f64; 3] {
    let (sin_i, cos_i) = inc.to_radians().sin_cos();
    let (sin_d, cos_d) = dec.to_radians().sin_cos();
    [cos_i * cos_d, cos_i * sin_d, sin_i]
}

/// Convert a vector to intensity, inclination and declination.
///
/// Returns `None` for the zero vector, which has no direction.
pub fn direction(vector: &[f64; 3]) -> Option<Direction> {
    let [x, y, z] = *vector;
    let intensity = (x * x + y * y + z * z).sqrt();
    if intensity == 0.0 {
        return None;
    }
    // clamp guards asin against |z| slightly above intensity from roundoff
    let sin_i = (z / intensity).clamp(-1.0, 1.0);
    Some(Direction {
        intensity,
        inclination: sin_i.asin().to_degrees(),
        declination: y.atan2(x).to_degrees(),
    })
}

/// Rotation taking `unit_vector(inc, dec)` to `unit_vector(inc + d_inc, dec + d_dec)`.
///
/// The matrix is `Rz(dec + d_dec) · T(d_inc) · Rz(-dec)`: turn the vector
/// onto the x-z plane, tilt it by `d_inc` within that plane, then turn it
/// to the new declination. The result is orthonormal with determinant 1
/// and does not depend on the starting inclination.
pub fn rotation_matrix(_inc: f64, dec: f64, d_inc: f64, d_dec: f64) -> [[f64; 3]; 3] {
    let (sin_d, cos_d) = dec.to_radians().sin_cos();
    let (sin_di, cos_di) = d_inc.to_radians().sin_cos();
    let (sin_dd, cos_dd) = (dec + d_dec).to_radians().sin_cos();

    [
        [
            sin_dd * sin_d + cos_dd * cos_di * cos_d,
            -sin_dd * cos_d + cos_dd * cos_di * sin_d,
            -cos_dd * sin_di,
        ],
        [
            -cos_dd * sin_d + sin_dd * cos_di * cos_d,
            cos_dd * cos_d + sin_dd * cos_di * sin_d,
            -sin_dd * sin_di,
        ],
        [sin_di * cos_d, sin_di * sin_d, cos_di],
    ]
}

/// Apply a rotation matrix to a vector.
#[inline]
pub fn rotate(rotation: &[[f64; 3]; 3], v: &[f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for i in 0..3 {
        out[i] = rotation[i][0] * v[0] + rotation[i][1] * v[1] + rotation[i][2] * v[2];
    }
    out
}
