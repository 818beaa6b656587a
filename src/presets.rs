use crate::camera::CameraConfig;
use crate::error::RenderResult;
use crate::material::Material;
use crate::math::*;
use crate::scene::{MaterialId, Scene, Sphere};
use rand::{Rng, RngCore};

/// Incrementally assembles the sphere and material tables of a [`Scene`].
#[derive(Default)]
struct SceneBuilder {
    spheres: Vec<Sphere>,
    materials: Vec<Material>,
}

impl SceneBuilder {
    fn material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    fn sphere(&mut self, center: Point3, radius: f64, material: MaterialId) {
        self.spheres.push(Sphere::new(center, radius, material));
    }

    fn build(self) -> RenderResult<Scene> {
        Scene::new(self.spheres, self.materials)
    }
}

/// Built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenePreset {
    /// A Lambertian ground sphere and a single mirror-finish metal sphere.
    Minimal,
    /// Diffuse, hollow glass, and brushed metal spheres side by side.
    Materials,
    /// Three large spheres surrounded by a field of small random ones,
    /// seen through a lens with shallow depth of field.
    Showcase,
}

impl ScenePreset {
    pub fn name(self) -> &'static str {
        match self {
            ScenePreset::Minimal => "Minimal",
            ScenePreset::Materials => "Materials",
            ScenePreset::Showcase => "Showcase",
        }
    }

    /// Builds the scene and its camera placement. The image size in the
    /// returned camera config is left at its default for the caller to set.
    /// `rng` is only consumed by presets with randomized layouts.
    pub fn build(self, rng: &mut dyn RngCore) -> RenderResult<(Scene, CameraConfig)> {
        match self {
            ScenePreset::Minimal => build_minimal(),
            ScenePreset::Materials => build_materials(),
            ScenePreset::Showcase => build_showcase(rng),
        }
    }
}

fn build_minimal() -> RenderResult<(Scene, CameraConfig)> {
    let mut scene = SceneBuilder::default();
    let ground = scene.material(Material::lambertian(Color::new(0.8, 0.8, 0.0)));
    let chrome = scene.material(Material::metal(Color::new(0.8, 0.8, 0.8), 0.0));

    scene.sphere(Point3::new(0.0, -100.5, -1.0), 100.0, ground);
    scene.sphere(Point3::new(0.0, 0.0, -1.0), 0.5, chrome);

    Ok((scene.build()?, CameraConfig::default()))
}

fn build_materials() -> RenderResult<(Scene, CameraConfig)> {
    let mut scene = SceneBuilder::default();
    let ground = scene.material(Material::lambertian(Color::new(0.8, 0.8, 0.0)));
    let center = scene.material(Material::lambertian(Color::new(0.1, 0.2, 0.5)));
    let glass = scene.material(Material::dielectric(1.5));
    let gold = scene.material(Material::metal(Color::new(0.8, 0.6, 0.2), 0.3));

    scene.sphere(Point3::new(0.0, -100.5, -1.0), 100.0, ground);
    scene.sphere(Point3::new(0.0, 0.0, -1.2), 0.5, center);
    scene.sphere(Point3::new(-1.0, 0.0, -1.0), 0.5, glass);
    // Hollow shell: the inner surface faces inward.
    scene.sphere(Point3::new(-1.0, 0.0, -1.0), -0.4, glass);
    scene.sphere(Point3::new(1.0, 0.0, -1.0), 0.5, gold);

    let camera = CameraConfig {
        look_from: Point3::new(-2.0, 2.0, 1.0),
        look_at: Point3::new(0.0, 0.0, -1.0),
        vfov_degrees: 20.0,
        focus_dist: 3.4,
        defocus_angle_degrees: 10.0,
        ..Default::default()
    };
    Ok((scene.build()?, camera))
}

fn build_showcase(rng: &mut dyn RngCore) -> RenderResult<(Scene, CameraConfig)> {
    let mut scene = SceneBuilder::default();
    let ground = scene.material(Material::lambertian(Color::new(0.5, 0.5, 0.5)));
    scene.sphere(Point3::new(0.0, -1000.0, 0.0), 1000.0, ground);

    let glass = scene.material(Material::dielectric(1.5));
    for a in -11..11 {
        for b in -11..11 {
            let center = Point3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat: f64 = rng.gen();
            let material = if choose_mat < 0.8 {
                let albedo = Color::new(rng.gen(), rng.gen(), rng.gen())
                    .hadamard(Color::new(rng.gen(), rng.gen(), rng.gen()));
                scene.material(Material::lambertian(albedo))
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                    rng.gen_range(0.5..1.0),
                );
                let fuzz = rng.gen_range(0.0..0.5);
                scene.material(Material::metal(albedo, fuzz))
            } else {
                glass
            };
            scene.sphere(center, 0.2, material);
        }
    }

    let diffuse = scene.material(Material::lambertian(Color::new(0.4, 0.2, 0.1)));
    let metal = scene.material(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0));
    scene.sphere(Point3::new(0.0, 1.0, 0.0), 1.0, glass);
    scene.sphere(Point3::new(-4.0, 1.0, 0.0), 1.0, diffuse);
    scene.sphere(Point3::new(4.0, 1.0, 0.0), 1.0, metal);

    let camera = CameraConfig {
        look_from: Point3::new(13.0, 2.0, 3.0),
        look_at: Point3::zero(),
        vfov_degrees: 20.0,
        focus_dist: 10.0,
        defocus_angle_degrees: 0.6,
        ..Default::default()
    };
    Ok((scene.build()?, camera))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_all_presets_build() {
        let mut rng = StdRng::seed_from_u64(0);
        for preset in [ScenePreset::Minimal, ScenePreset::Materials, ScenePreset::Showcase] {
            let (scene, camera) = preset.build(&mut rng).unwrap();
            assert!(!scene.spheres().is_empty(), "{}", preset.name());
            assert!(Camera::new(&camera).is_ok(), "{}", preset.name());
        }
    }

    #[test]
    fn test_minimal_is_two_spheres() {
        let (scene, _) = ScenePreset::Minimal
            .build(&mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(scene.spheres().len(), 2);
        assert_eq!(scene.spheres()[0].radius, 100.0);
        assert_eq!(
            scene.material(scene.spheres()[1].material),
            &Material::Metal {
                albedo: Color::new(0.8, 0.8, 0.8),
                fuzz: 0.0
            }
        );
    }

    #[test]
    fn test_showcase_is_seed_stable() {
        let (a, _) = ScenePreset::Showcase
            .build(&mut StdRng::seed_from_u64(5))
            .unwrap();
        let (b, _) = ScenePreset::Showcase
            .build(&mut StdRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(a.spheres(), b.spheres());
        assert_eq!(a.materials(), b.materials());
    }

    #[test]
    fn test_materials_has_hollow_glass() {
        let (scene, _) = ScenePreset::Materials
            .build(&mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(scene.spheres().iter().any(|s| s.radius < 0.0));
    }
}
