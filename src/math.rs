use crate::error::{RenderError, RenderResult};
use rand::{Rng, RngCore};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, Neg, Sub};

/// Squared lengths at or below this are rejected when sampling the unit ball,
/// so the subsequent normalization never divides by a vanishing length.
const BALL_REJECT_EPS: f64 = 1e-160;

/// A 3-component vector, read as a spatial vector, a point, a direction or a
/// linear RGB color depending on where it flows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub type Point3 = Vector3;
pub type Color = Vector3;

impl Vector3 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Black, the origin, and the starting value of every radiance sum.
    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// White; the attenuation of a clear dielectric.
    #[inline(always)]
    pub const fn ones() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// World up, the default camera `vup`.
    #[inline(always)]
    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    /// Squared Euclidean length. Skips the sqrt where only a comparison is
    /// needed, as in unit-ball rejection sampling.
    #[inline(always)]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Euclidean length.
    #[inline(always)]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction.
    ///
    /// A zero-length input yields non-finite components; use
    /// [`Vector3::try_normalized`] wherever the input is not guaranteed
    /// non-zero by construction.
    #[inline(always)]
    pub fn normalized(self) -> Self {
        debug_assert!(
            self.length_squared() > 0.0,
            "normalize called on a zero-length vector"
        );
        self / self.length()
    }

    /// Checked normalization for inputs that come from outside the renderer.
    /// Zero-length or non-finite input reports `DegenerateVector` with
    /// `context` naming the offending quantity.
    pub fn try_normalized(self, context: &'static str) -> RenderResult<Self> {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Ok(self / len)
        } else {
            Err(RenderError::DegenerateVector { context })
        }
    }

    /// Inner product. Drives the sphere quadratic, front-face tests, and the
    /// cosine terms of reflection and refraction.
    #[inline(always)]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Right-handed cross product, used to build the camera's `u, v, w` basis.
    #[inline(always)]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Mirror `self` about the surface normal `n`: `v - 2·dot(v, n)·n`.
    #[inline(always)]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * 2.0 * self.dot(normal)
    }

    /// Snell refraction of a unit direction through a surface with unit
    /// `normal` facing the incoming side. `eta_ratio` is incident index over
    /// transmitted index. Returns `None` under total internal reflection.
    #[inline]
    pub fn refract(self, normal: Self, eta_ratio: f64) -> Option<Self> {
        let cos_theta = (-self).dot(normal).min(1.0);
        let r_perp = (self + normal * cos_theta) * eta_ratio;
        let discriminant = 1.0 - r_perp.length_squared();
        if discriminant < 0.0 {
            return None;
        }
        let r_parallel = normal * -(discriminant.sqrt());
        Some(r_perp + r_parallel)
    }

    /// Component-wise product, used to tint a color by an attenuation.
    #[inline(always)]
    pub fn hadamard(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    /// `self·(1-t) + other·t`
    #[inline(always)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }

    /// Clamps each component to `[0, 1]` before a color is quantized to 8 bits.
    #[inline(always)]
    pub fn clamp01(self) -> Self {
        Self::new(
            self.x.clamp(0.0, 1.0),
            self.y.clamp(0.0, 1.0),
            self.z.clamp(0.0, 1.0),
        )
    }

    /// True when every component is within 1e-8 of zero. Catches Lambertian
    /// scatter directions that would otherwise normalize to NaN.
    #[inline(always)]
    pub fn near_zero(self) -> bool {
        const EPS: f64 = 1e-8;
        self.x.abs() < EPS && self.y.abs() < EPS && self.z.abs() < EPS
    }

    /// Uniform sample inside the unit ball, rejection-sampled from `[-1,1]^3`.
    /// Samples too close to the origin are discarded as well.
    pub fn random_in_unit_ball(rng: &mut dyn RngCore) -> Self {
        loop {
            let v = Self::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let len_sq = v.length_squared();
            if BALL_REJECT_EPS < len_sq && len_sq <= 1.0 {
                return v;
            }
        }
    }

    /// Uniformly distributed direction on the unit sphere. Offsets the normal
    /// in Lambertian scatter and perturbs metal reflections by `fuzz`.
    pub fn random_unit_vector(rng: &mut dyn RngCore) -> Self {
        let v = Self::random_in_unit_ball(rng);
        v / v.length()
    }

    /// Unit-sphere sample flipped into the hemisphere around `normal`. A
    /// uniform-hemisphere reference for the cosine-weighted Lambertian lobe.
    #[cfg(test)]
    pub fn random_on_hemisphere(normal: Self, rng: &mut dyn RngCore) -> Self {
        let on_sphere = Self::random_unit_vector(rng);
        if on_sphere.dot(normal) > 0.0 {
            on_sphere
        } else {
            -on_sphere
        }
    }

    /// Uniform sample in the unit disk on the z = 0 plane, used to spread ray
    /// origins across the camera lens for defocus blur.
    pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Self {
        loop {
            let v = Self::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0);
            if v.length_squared() < 1.0 {
                return v;
            }
        }
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Neg for Vector3 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vector3 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t)
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;
    #[inline(always)]
    fn mul(self, v: Vector3) -> Vector3 {
        v * self
    }
}

impl Div<f64> for Vector3 {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: f64) -> Self {
        Self::new(self.x / t, self.y / t, self.z / t)
    }
}

impl DivAssign<f64> for Vector3 {
    #[inline(always)]
    fn div_assign(&mut self, t: f64) {
        *self = *self / t;
    }
}

// ─── Ray ────────────────────────────────────────────────────────────────────

/// `R(t) = origin + t · direction`. The direction is not required to be unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Ray {
    #[inline(always)]
    pub const fn new(origin: Point3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t`; positive `t` lies ahead of the origin.
    #[inline(always)]
    pub fn at(self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}
