use crate::math::*;
use crate::scene::HitRecord;
use rand::{Rng, RngCore};

/// Surface response to an incoming ray. The set is closed: every variant is
/// handled by an exhaustive match in [`Material::scatter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Ideal diffuse reflector.
    Lambertian { albedo: Color },
    /// Specular reflector; `fuzz` in `[0, 1]` blurs the reflection.
    Metal { albedo: Color, fuzz: f64 },
    /// Clear refractive surface. `refraction_index` is the ratio of the
    /// material's index over that of the surrounding medium.
    Dielectric { refraction_index: f64 },
}

/// The bounced ray and the color weight applied to whatever it brings back.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    pub scattered: Ray,
    pub attenuation: Color,
}

impl Material {
    pub const fn lambertian(albedo: Color) -> Self {
        Material::Lambertian { albedo }
    }

    pub fn metal(albedo: Color, fuzz: f64) -> Self {
        let clamped = fuzz.clamp(0.0, 1.0);
        if clamped != fuzz {
            log::warn!("metal fuzz {fuzz} outside [0, 1], clamped to {clamped}");
        }
        Material::Metal {
            albedo,
            fuzz: clamped,
        }
    }

    pub fn dielectric(refraction_index: f64) -> Self {
        if refraction_index <= 0.0 {
            log::warn!("non-positive refraction index {refraction_index}, using 1.0");
            return Material::Dielectric {
                refraction_index: 1.0,
            };
        }
        Material::Dielectric { refraction_index }
    }

    /// Scatters `ray` at `hit`. `None` means the ray was absorbed, which the
    /// integrator treats the same as a black attenuation.
    pub fn scatter(
        &self,
        ray: &Ray,
        hit: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match *self {
            Material::Lambertian { albedo } => {
                let mut direction = hit.normal + Vector3::random_unit_vector(rng);
                if direction.near_zero() {
                    direction = hit.normal;
                }
                Some(ScatterResult {
                    scattered: Ray::new(hit.point, direction),
                    attenuation: albedo,
                })
            }
            Material::Metal { albedo, fuzz } => {
                let reflected = ray.direction.reflect(hit.normal).normalized();
                let direction = reflected + fuzz * Vector3::random_unit_vector(rng);
                if direction.dot(hit.normal) < 0.0 {
                    return None;
                }
                Some(ScatterResult {
                    scattered: Ray::new(hit.point, direction),
                    attenuation: albedo,
                })
            }
            Material::Dielectric { refraction_index } => {
                let eta_ratio = if hit.front_face {
                    1.0 / refraction_index
                } else {
                    refraction_index
                };
                let unit_dir = ray.direction.normalized();
                let cos_theta = (-unit_dir).dot(hit.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                let cannot_refract = eta_ratio * sin_theta > 1.0;
                let direction = if cannot_refract
                    || reflectance(cos_theta, refraction_index) > rng.gen::<f64>()
                {
                    unit_dir.reflect(hit.normal)
                } else {
                    unit_dir
                        .refract(hit.normal, eta_ratio)
                        .unwrap_or_else(|| unit_dir.reflect(hit.normal))
                };

                Some(ScatterResult {
                    scattered: Ray::new(hit.point, direction),
                    attenuation: Color::ones(),
                })
            }
        }
    }
}

/// Schlick's approximation of Fresnel reflectance.
pub fn reflectance(cosine: f64, refraction_index: f64) -> f64 {
    let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
