use crate::error::{RenderError, RenderResult};
use crate::math::*;
use rand::{Rng, RngCore};

/// Thin-lens pinhole camera. All derived state is computed once in
/// [`Camera::new`] and never changes afterwards.
///
/// Pixel `(0, 0)` is the top-left corner of the image; `x` grows to the
/// right along `u` and `y` grows downward along `-v`. With a positive
/// defocus angle, ray origins are spread over a disk around the camera
/// position so that only the plane at `focus_dist` is sharp.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,
    center: Point3,
    pixel00: Point3,
    pixel_delta_u: Vector3,
    pixel_delta_v: Vector3,
    u: Vector3,
    v: Vector3,
    w: Vector3,
    defocus_angle: f64,
    defocus_disk_u: Vector3,
    defocus_disk_v: Vector3,
}

/// User-facing camera parameters.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub image_width: u32,
    pub image_height: u32,
    pub look_from: Point3,
    pub look_at: Point3,
    pub vup: Vector3,
    pub vfov_degrees: f64,
    /// Distance from `look_from` to the plane of perfect focus.
    pub focus_dist: f64,
    /// Cone angle of rays through each pixel; `0` disables depth of field.
    pub defocus_angle_degrees: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            image_height: 225,
            look_from: Point3::zero(),
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vector3::unit_y(),
            vfov_degrees: 90.0,
            focus_dist: 1.0,
            defocus_angle_degrees: 0.0,
        }
    }
}

impl Camera {
    /// Derives the viewport and lens state. The orthonormal basis is:
    ///   w = normalize(look_from - look_at)   (points backward, away from scene)
    ///   u = normalize(vup × w)               (points right)
    ///   v = w × u                            (points up)
    ///
    /// Fails when the image is empty, when `look_from == look_at`, or when
    /// `vup` is parallel to the view direction.
    pub fn new(config: &CameraConfig) -> RenderResult<Self> {
        let (width, height) = (config.image_width, config.image_height);
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }

        let theta = config.vfov_degrees.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_dist;
        let viewport_width = viewport_height * (width as f64 / height as f64);

        let w = (config.look_from - config.look_at).try_normalized("camera view direction")?;
        let u = config.vup.cross(w).try_normalized("camera up vector")?;
        let v = w.cross(u);

        let viewport_u = u * viewport_width;
        let viewport_v = -v * viewport_height;
        let pixel_delta_u = viewport_u / width as f64;
        let pixel_delta_v = viewport_v / height as f64;

        let upper_left =
            config.look_from - w * config.focus_dist - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00 = upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius =
            config.focus_dist * (config.defocus_angle_degrees / 2.0).to_radians().tan();

        log::debug!("camera basis u={u} v={v} w={w}, pixel00={pixel00}");

        Ok(Camera {
            image_width: width,
            image_height: height,
            center: config.look_from,
            pixel00,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_angle: config.defocus_angle_degrees,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        })
    }

    /// Generates a jittered primary ray through pixel `(x, y)`.
    pub fn get_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let offset_x = rng.gen::<f64>() - 0.5;
        let offset_y = rng.gen::<f64>() - 0.5;
        let pixel_sample = self.pixel00
            + self.pixel_delta_u * (x as f64 + offset_x)
            + self.pixel_delta_v * (y as f64 + offset_y);

        let origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };
        Ray::new(origin, pixel_sample - origin)
    }

    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Point3 {
        let p = Vector3::random_in_unit_disk(rng);
        self.center + self.defocus_disk_u * p.x + self.defocus_disk_v * p.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(width: u32, height: u32) -> CameraConfig {
        CameraConfig {
            image_width: width,
            image_height: height,
            ..Default::default()
        }
    }

    #[test]
    fn test_camera_basis() {
        let camera = Camera::new(&config(100, 100)).unwrap();
        assert_eq!(camera.center, Point3::zero());
        assert!((camera.w - Vector3::new(0.0, 0.0, 1.0)).length() < 1e-12);
        assert!((camera.u - Vector3::new(1.0, 0.0, 0.0)).length() < 1e-12);
        assert!((camera.v - Vector3::unit_y()).length() < 1e-12);
    }

    #[test]
    fn test_configure_is_idempotent() {
        let cfg = CameraConfig {
            image_width: 320,
            image_height: 180,
            look_from: Point3::new(13.0, 2.0, 3.0),
            look_at: Point3::zero(),
            vup: Vector3::unit_y(),
            vfov_degrees: 20.0,
            focus_dist: 10.0,
            defocus_angle_degrees: 0.6,
        };
        let a = Camera::new(&cfg).unwrap();
        let b = Camera::new(&cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_view_rejected() {
        let cfg = CameraConfig {
            look_at: Point3::zero(),
            ..config(10, 10)
        };
        assert!(matches!(
            Camera::new(&cfg),
            Err(RenderError::DegenerateVector { .. })
        ));

        let cfg = CameraConfig {
            vup: Vector3::new(0.0, 0.0, 1.0),
            ..config(10, 10)
        };
        assert!(matches!(
            Camera::new(&cfg),
            Err(RenderError::DegenerateVector { .. })
        ));
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(matches!(
            Camera::new(&config(0, 10)),
            Err(RenderError::InvalidDimensions { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = Camera::new(&config(101, 101)).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let ray = camera.get_ray(50, 50, &mut rng);
        assert_eq!(ray.origin, Point3::zero());
        assert!(ray.direction.z < 0.0);
        // Jitter is at most half a pixel.
        let half_pixel = 2.0 / 101.0 * 0.5;
        assert!(ray.direction.x.abs() <= half_pixel + 1e-12);
        assert!(ray.direction.y.abs() <= half_pixel + 1e-12);
    }

    #[test]
    fn test_top_left_pixel_is_up_and_left() {
        let camera = Camera::new(&config(100, 100)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let ray = camera.get_ray(0, 0, &mut rng);
        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.y > 0.0);
    }

    #[test]
    fn test_defocus_origin_within_disk() {
        let cfg = CameraConfig {
            focus_dist: 2.0,
            defocus_angle_degrees: 10.0,
            ..config(50, 50)
        };
        let camera = Camera::new(&cfg).unwrap();
        let radius = 2.0 * (5.0f64).to_radians().tan();
        let mut rng = StdRng::seed_from_u64(9);
        let mut moved = false;
        for _ in 0..100 {
            let ray = camera.get_ray(25, 25, &mut rng);
            assert!(ray.origin.length() <= radius + 1e-12);
            assert_eq!(ray.origin.z, 0.0);
            moved |= ray.origin != Point3::zero();
        }
        assert!(moved);
    }
}
