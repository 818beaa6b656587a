use crate::error::{RenderError, RenderResult};
use crate::material::Material;
use crate::math::*;

/// Index into a [`Scene`]'s material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialId(pub usize);

// ─── Hit Record ─────────────────────────────────────────────────────────────

/// Result of a successful intersection query. `normal` is unit length and
/// always faces the incoming ray; `front_face` records whether that is the
/// geometric outward normal or its negation.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    pub point: Point3,
    pub normal: Vector3,
    pub t: f64,
    pub front_face: bool,
    pub material: MaterialId,
}

impl HitRecord {
    fn new(
        ray: &Ray,
        t: f64,
        point: Point3,
        outward_normal: Vector3,
        material: MaterialId,
    ) -> Self {
        let front_face = ray.direction.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };
        Self {
            point,
            normal,
            t,
            front_face,
            material,
        }
    }
}

// ─── Hittable Trait ─────────────────────────────────────────────────────────

pub trait Hittable {
    /// Nearest intersection with `t` strictly inside `(t_min, t_max)`.
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord>;
}

// ─── Sphere ─────────────────────────────────────────────────────────────────

/// A sphere referencing a material in the owning scene.
///
/// A negative radius keeps the same surface but turns the outward normal
/// inward, which is how hollow glass shells are modelled.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub center: Point3,
    pub radius: f64,
    pub material: MaterialId,
}

impl Sphere {
    pub const fn new(center: Point3, radius: f64, material: MaterialId) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let oc = self.center - ray.origin;
        let a = ray.direction.dot(ray.direction);
        let b = (-2.0 * ray.direction).dot(oc);
        let c = oc.dot(oc) - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let in_range = |t: f64| t_min < t && t < t_max;
        let mut root = (-b - sqrtd) / (2.0 * a);
        if !in_range(root) {
            root = (-b + sqrtd) / (2.0 * a);
            if !in_range(root) {
                return None;
            }
        }

        let point = ray.at(root);
        // Dividing by the signed radius (rather than renormalizing) is what
        // flips the normal for negative-radius spheres.
        let outward_normal = (point - self.center) / self.radius;
        Some(HitRecord::new(ray, root, point, outward_normal, self.material))
    }
}

// ─── Scene ──────────────────────────────────────────────────────────────────

/// An immutable, ordered list of spheres plus the materials they share.
#[derive(Debug, Clone)]
pub struct Scene {
    spheres: Vec<Sphere>,
    materials: Vec<Material>,
}

impl Scene {
    /// Builds a scene, rejecting any sphere whose material index is out of
    /// range so that lookups while rendering cannot fail.
    pub fn new(spheres: Vec<Sphere>, materials: Vec<Material>) -> RenderResult<Self> {
        for (i, sphere) in spheres.iter().enumerate() {
            if sphere.material.0 >= materials.len() {
                return Err(RenderError::MissingMaterial {
                    sphere: i,
                    index: sphere.material.0,
                    count: materials.len(),
                });
            }
        }
        Ok(Self { spheres, materials })
    }

    #[inline]
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }
}

impl Hittable for Scene {
    /// Linear scan in insertion order. On equal `t` the earlier sphere wins,
    /// since later candidates must be strictly closer than the current best.
    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;
        let mut closest_so_far = t_max;
        for sphere in &self.spheres {
            if let Some(hit) = sphere.hit(ray, t_min, closest_so_far) {
                closest_so_far = hit.t;
                closest = Some(hit);
            }
        }
        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn grey() -> Material {
        Material::lambertian(Color::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_sphere_hit_along_axis() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, MaterialId(0));
        let ray = Ray::new(Point3::zero(), Vector3::new(0.0, 0.0, -1.0));
        let hit = sphere.hit(&ray, 0.0, f64::INFINITY).unwrap();
        assert!((hit.t - 0.5).abs() < 1e-12);
        assert!(hit.front_face);
        assert_eq!(hit.normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, MaterialId(0));
        let ray = Ray::new(Point3::zero(), Vector3::unit_y());
        assert!(sphere.hit(&ray, 0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_interval_is_exclusive() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, MaterialId(0));
        let ray = Ray::new(Point3::zero(), Vector3::new(0.0, 0.0, -1.0));
        // Near root excluded by t_max, far root at 1.5 is also out of range.
        assert!(sphere.hit(&ray, 0.0, 0.5).is_none());
        // Near root excluded by t_min, so the far root is reported.
        let hit = sphere.hit(&ray, 0.5, f64::INFINITY).unwrap();
        assert!((hit.t - 1.5).abs() < 1e-12);
        assert!(!hit.front_face);
    }

    #[test]
    fn test_inside_hit_normal_faces_ray() {
        let sphere = Sphere::new(Point3::zero(), 2.0, MaterialId(0));
        let ray = Ray::new(Point3::zero(), Vector3::new(1.0, 0.0, 0.0));
        let hit = sphere.hit(&ray, 0.0, f64::INFINITY).unwrap();
        assert!(!hit.front_face);
        assert_eq!(hit.normal, Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_negative_radius_inverts_normal() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -1.0), -0.5, MaterialId(0));
        let ray = Ray::new(Point3::zero(), Vector3::new(0.0, 0.0, -1.0));
        let hit = sphere.hit(&ray, 0.0, f64::INFINITY).unwrap();
        assert!((hit.t - 0.5).abs() < 1e-12);
        // Outward normal points into the sphere, so the ray hits its back face.
        assert!(!hit.front_face);
        assert_eq!(hit.normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_random_hits_lie_on_surface_and_face_ray() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let center = Point3::new(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
            );
            let radius = rng.gen_range(0.1..2.0);
            let sphere = Sphere::new(center, radius, MaterialId(0));
            let origin = Point3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            let ray = Ray::new(origin, (center - origin) + Vector3::random_in_unit_ball(&mut rng));
            if let Some(hit) = sphere.hit(&ray, 0.0, f64::INFINITY) {
                assert!(((hit.point - center).length() - radius).abs() < 1e-7);
                assert!(ray.direction.dot(hit.normal) <= 0.0);
                assert!((hit.normal.length() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_scene_returns_nearest() {
        let spheres = vec![
            Sphere::new(Point3::new(0.0, 0.0, -5.0), 0.5, MaterialId(0)),
            Sphere::new(Point3::new(0.0, 0.0, -2.0), 0.5, MaterialId(1)),
        ];
        let scene = Scene::new(spheres, vec![grey(), grey()]).unwrap();
        let ray = Ray::new(Point3::zero(), Vector3::new(0.0, 0.0, -1.0));
        let hit = scene.hit(&ray, 0.0, f64::INFINITY).unwrap();
        assert_eq!(hit.material, MaterialId(1));
        assert!((hit.t - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_scene_tie_keeps_first() {
        let spheres = vec![
            Sphere::new(Point3::new(0.0, 0.0, -2.0), 0.5, MaterialId(1)),
            Sphere::new(Point3::new(0.0, 0.0, -2.0), 0.5, MaterialId(0)),
        ];
        let scene = Scene::new(spheres, vec![grey(), grey()]).unwrap();
        let ray = Ray::new(Point3::zero(), Vector3::new(0.0, 0.0, -1.0));
        let hit = scene.hit(&ray, 0.0, f64::INFINITY).unwrap();
        assert_eq!(hit.material, MaterialId(1));
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = Scene::new(Vec::new(), Vec::new()).unwrap();
        let ray = Ray::new(Point3::zero(), Vector3::unit_y());
        assert!(scene.hit(&ray, 0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_missing_material_rejected() {
        let spheres = vec![Sphere::new(Point3::zero(), 1.0, MaterialId(2))];
        let err = Scene::new(spheres, vec![grey()]).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingMaterial {
                sphere: 0,
                index: 2,
                count: 1
            }
        ));
    }
}
