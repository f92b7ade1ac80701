//! Integration tests for the scene controller.
//!
//! A recording backend stands in for the GPU: it keeps the CPU particle
//! buffer of each shape and logs every create, release and present, so
//! rebuild behaviour and the per-frame transform can be checked end to end.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use whorl::particles::{self, ShapeParams};
use whorl::scene::{orbit_distance, FrameOutcome, FrameView};
use whorl::time::ManualClock;
use whorl::{
    ParamKey, ParameterStore, Parameters, ParticleBuffer, RebuildPolicy, RenderBackend,
    SceneController, ShaderError, ShapeRenderer, Viewport,
};

// ============================================================================
// Recording backend
// ============================================================================

#[derive(Debug, Default)]
struct Log {
    created: Vec<u32>,
    released: Vec<u32>,
    live: usize,
    presents: usize,
}

struct RecordedShape {
    particles: ParticleBuffer,
    uniforms: ShapeParams,
}

impl ShapeRenderer for RecordedShape {
    fn particle_count(&self) -> u32 {
        self.particles.len() as u32
    }

    fn render(&mut self, time: f32, time_scale: f32, angle_number: f32) {
        self.uniforms = ShapeParams {
            elapsed_time: time,
            time_scale,
            angle_number,
        };
    }
}

struct RecordingBackend {
    viewport: Viewport,
    rng: StdRng,
    log: Rc<RefCell<Log>>,
}

impl RenderBackend for RecordingBackend {
    type Shape = RecordedShape;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create_shape(
        &mut self,
        particle_count: u32,
        _viewport: Viewport,
    ) -> Result<RecordedShape, ShaderError> {
        let mut log = self.log.borrow_mut();
        log.created.push(particle_count);
        log.live += 1;
        Ok(RecordedShape {
            particles: ParticleBuffer::new(particle_count, &mut self.rng),
            uniforms: ShapeParams {
                elapsed_time: 0.0,
                time_scale: 0.0,
                angle_number: 0.0,
            },
        })
    }

    fn release_shape(&mut self, shape: RecordedShape) {
        let mut log = self.log.borrow_mut();
        log.released.push(shape.particle_count());
        log.live -= 1;
    }

    fn present(
        &mut self,
        _shape: &mut RecordedShape,
        _view: &FrameView<'_>,
    ) -> Result<(), wgpu::SurfaceError> {
        self.log.borrow_mut().presents += 1;
        Ok(())
    }
}

type Controller = SceneController<RecordingBackend, Rc<ManualClock>>;

fn setup(
    params: Parameters,
    policy: RebuildPolicy,
    viewport: Viewport,
) -> (Controller, Rc<RefCell<Log>>, Rc<ManualClock>) {
    let log = Rc::new(RefCell::new(Log::default()));
    let backend = RecordingBackend {
        viewport,
        rng: StdRng::seed_from_u64(7),
        log: log.clone(),
    };
    let clock = Rc::new(ManualClock::new(0.0));
    let store = ParameterStore::with_values(params);
    let controller = SceneController::new(backend, clock.clone(), store, policy);
    (controller, log, clock)
}

fn default_setup() -> (Controller, Rc<RefCell<Log>>, Rc<ManualClock>) {
    setup(Parameters::default(), RebuildPolicy::Always, Viewport::new(800, 600))
}

// ============================================================================
// Rebuilds
// ============================================================================

#[test]
fn test_particle_count_change_replaces_shape() {
    let (mut ctl, log, _) = default_setup();
    assert_eq!(ctl.frame().unwrap(), FrameOutcome::Drawn);
    assert_eq!(ctl.rebuild_count(), 1);

    let stored = ctl.params_mut().set(ParamKey::ParticleCount, 500.0);
    assert_eq!(stored, 500.0);
    ctl.frame().unwrap();

    assert_eq!(ctl.rebuild_count(), 2);
    let log = log.borrow();
    assert_eq!(log.created, vec![6000, 500]);
    assert_eq!(log.released, vec![6000]);
    assert_eq!(log.live, 1);
    assert_eq!(ctl.shape().unwrap().particle_count(), 500);
}

#[test]
fn test_out_of_range_count_is_clamped_before_rebuild() {
    let (mut ctl, log, _) = default_setup();
    ctl.frame().unwrap();

    ctl.params_mut().set(ParamKey::ParticleCount, 10.0);
    ctl.frame().unwrap();

    assert_eq!(log.borrow().created.last(), Some(&100));
}

#[test]
fn test_slider_drag_rebuilds_once_with_last_value() {
    let (mut ctl, log, _) = default_setup();
    ctl.frame().unwrap();

    for count in [6100.0, 6200.0, 6300.0, 6400.0] {
        ctl.params_mut().set(ParamKey::ParticleCount, count);
    }
    ctl.frame().unwrap();
    ctl.frame().unwrap();

    assert_eq!(ctl.rebuild_count(), 2);
    assert_eq!(log.borrow().created, vec![6000, 6400]);
}

#[test]
fn test_only_one_shape_alive_across_many_rebuilds() {
    let (mut ctl, log, _) = default_setup();
    for i in 1..=20 {
        ctl.params_mut().set(ParamKey::ParticleCount, (i * 100) as f32);
        ctl.frame().unwrap();
        assert_eq!(log.borrow().live, 1);
    }
    drop(ctl);
    assert_eq!(log.borrow().live, 0);
}

#[test]
fn test_resize_moves_camera_out() {
    let (mut ctl, _, _) = default_setup();
    ctl.frame().unwrap();
    let tan35 = 35.0f32.to_radians().tan();
    assert!((ctl.orbit_distance().unwrap() - 300.0 / tan35).abs() < 1e-3);

    ctl.backend_mut().viewport = Viewport::new(800, 900);
    ctl.request_resize();
    ctl.frame().unwrap();

    let d = ctl.orbit_distance().unwrap();
    assert!((d - 450.0 / tan35).abs() < 1e-3);
    assert_eq!(d, orbit_distance(900));
    assert!((ctl.camera().unwrap().far - 5.0 * d).abs() < 1e-2);
}

#[test]
fn test_structural_only_policy() {
    let (mut ctl, log, _) = setup(
        Parameters::default(),
        RebuildPolicy::StructuralOnly,
        Viewport::new(800, 600),
    );
    ctl.frame().unwrap();

    ctl.params_mut().set(ParamKey::TimeScale, 0.5);
    ctl.params_mut().set(ParamKey::AngleNumber, 30.0);
    ctl.frame().unwrap();
    assert_eq!(ctl.rebuild_count(), 1);

    let u = ctl.shape().unwrap().uniforms;
    assert_eq!(u.time_scale, 0.5);
    assert_eq!(u.angle_number, 30.0);

    ctl.params_mut().set(ParamKey::ParticleCount, 1200.0);
    ctl.frame().unwrap();
    assert_eq!(log.borrow().created, vec![6000, 1200]);
}

// ============================================================================
// Per-frame transform
// ============================================================================

#[test]
fn test_frame_pushes_parameters_for_transform() {
    let params = Parameters {
        particle_count: 500,
        time_scale: 0.01,
        angle_number: 90.0,
    };
    let (mut ctl, log, clock) = setup(params, RebuildPolicy::Always, Viewport::new(800, 600));
    clock.set(10.0);
    ctl.frame().unwrap();
    assert_eq!(log.borrow().presents, 1);

    let shape = ctl.shape().unwrap();
    assert_eq!(shape.particle_count(), 500);
    let u = shape.uniforms;
    assert_eq!(u.elapsed_time, 10.0);
    assert!((u.time_scale - 0.01).abs() < 1e-7);
    assert_eq!(u.angle_number, 90.0);

    let base = Vec3::from(shape.particles.positions()[250].position);
    assert_eq!(base, Vec3::new(0.0, 0.0, 250.0));

    // Same formula, evaluated in f64.
    let rad = std::f64::consts::PI / 180.0;
    let z = 250.0f64;
    let r = rad * z * 0.05;
    let angle = rad * z * (90.0f64 - 10.0 * 0.01).abs();
    let (x, y) = (angle.cos() * r, angle.sin() * r);
    let z_wave = ((x * x + y * y).sqrt() - 10.0).sin() * 3.0;
    let expected = Vec3::new(x as f32, y as f32, z_wave as f32);

    let got = particles::transform(base, &u);
    assert!((got - expected).length() < 1e-3, "got {got:?}, expected {expected:?}");
}

#[test]
fn test_first_particle_stays_at_origin() {
    let (mut ctl, _, clock) = default_setup();
    clock.set(0.0);
    ctl.frame().unwrap();

    let shape = ctl.shape().unwrap();
    let base = Vec3::from(shape.particles.positions()[0].position);
    assert_eq!(particles::transform(base, &shape.uniforms), Vec3::ZERO);
}

#[test]
fn test_camera_follows_orbit_path() {
    let (mut ctl, _, clock) = default_setup();
    ctl.frame().unwrap();
    let d = ctl.orbit_distance().unwrap();

    for step in 1..50 {
        let t = step as f32 * 0.9;
        let a = 0.1 * t;
        clock.set(t);
        ctl.frame().unwrap();
        let p = ctl.camera().unwrap().position;
        let expected = Vec3::new((-a).cos(), a.sin(), (-a).sin()) * d;
        assert!((p - expected).length() < d * 1e-5, "t={t} p={p:?}");
        assert!((p.length() - d * (1.0 + a.sin() * a.sin()).sqrt()).abs() < d * 1e-5);
    }

    // A quarter turn of the trig path at an 800x600 viewport.
    clock.set(7.853982);
    ctl.frame().unwrap();
    let p = ctl.camera().unwrap().position;
    assert!((p - Vec3::new(302.96, 302.96, -302.96)).length() < 0.05, "p={p:?}");
    assert!((p.length() - 524.74).abs() < 0.05);
}

#[test]
fn test_loop_keeps_one_frame_pending() {
    let (mut ctl, log, _) = default_setup();
    for _ in 0..10 {
        assert_eq!(ctl.frame().unwrap(), FrameOutcome::Drawn);
        assert!(ctl.render_loop().pending().is_some());
    }
    assert_eq!(log.borrow().presents, 10);
}
