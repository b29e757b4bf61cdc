//! Light accumulation engine

mod instant;
mod materials;

// Re-export
pub use instant::{SCATTER_TILE_SIZE, SUMMARY_WIDTH};
pub use materials::MaterialCache;

use crate::common::{Float, Timestamp};
use crate::error::Result;
use crate::gpu::Device;
use crate::id::{IdRegistry, ObjectId};
use crate::light::LightSource;
use crate::scene::{Color, Scene};
use crate::summary::{Summarizer, Timestep};
use instant::InstantSummary;
use materials::SwappedScene;
use std::collections::BTreeMap;

/// Attributes the light reaching a scene to its tracked objects.
///
/// Every tracked object is painted with a colour encoding its ID, the scene
/// is rendered once per light sample and the rendered ID buffers are reduced
/// on the GPU to per-ID totals. Totals of consecutive `calculate()` calls are
/// buffered on the GPU and read back in blocks.
///
/// One engine owns one device and must not be used from several threads at
/// once.
pub struct Photosynthesis<D: Device> {
    /// The device.
    device: D,

    /// Issued IDs.
    registry: IdRegistry,

    /// Derived ID materials.
    materials: MaterialCache,

    /// Time series reduction.
    summarizer: Summarizer,

    /// Immediate mode reduction.
    instant: InstantSummary,
}

impl<D: Device> Photosynthesis<D> {
    /// Returns a new engine using the most precise data format the device
    /// can render into.
    ///
    /// * `device` - The device.
    pub fn new(device: D) -> Result<Self> {
        let format = device.capabilities().data_format()?;
        Ok(Self {
            device,
            registry: IdRegistry::new(),
            materials: MaterialCache::new(),
            summarizer: Summarizer::new(format),
            instant: InstantSummary::new(format),
        })
    }

    /// Returns the device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Returns the device for light sources and resource management.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Returns a fresh object ID.
    pub fn next_id(&mut self) -> Result<ObjectId> {
        self.registry.next_id()
    }

    /// Returns the ID colour of an object, or black if it is untracked.
    ///
    /// * `id` - The object ID.
    pub fn color_for(&mut self, id: Option<ObjectId>) -> Color {
        self.registry.color_for(id)
    }

    /// Returns the number of issued IDs.
    pub fn id_count(&self) -> u32 {
        self.registry.count()
    }

    /// Returns the IDs of the current block layout.
    pub fn tracked_ids(&self) -> &[ObjectId] {
        self.summarizer.ids()
    }

    /// Returns the summarizer.
    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    /// Renders `scene` with every light and records the per-ID totals as one
    /// timestep labelled `time`.
    ///
    /// The display materials of the scene are restored before this returns,
    /// also on failure.
    ///
    /// * `time`   - Timestamp of the timestep.
    /// * `scene`  - The scene.
    /// * `lights` - Light sources; none records zeros.
    pub fn calculate(
        &mut self,
        time: Timestamp,
        scene: &mut dyn Scene,
        lights: &mut [&mut dyn LightSource],
    ) -> Result<()> {
        let (swapped, ids) = SwappedScene::install(scene, &mut self.registry, &mut self.materials);

        let ids: Vec<ObjectId> = ids.into_iter().collect();
        self.summarizer.reconfigure(&mut self.device, &ids)?;

        for light in lights.iter_mut() {
            if let Err(e) = light.render(&mut self.device, swapped.scene(), &mut self.summarizer) {
                self.summarizer.abort_timestep();
                return Err(e);
            }
        }
        drop(swapped);

        self.summarizer.end_timestep(&mut self.device, time)
    }

    /// Renders `scene` with every light and returns the per-ID totals
    /// immediately, bypassing the time series.
    ///
    /// * `scene`  - The scene.
    /// * `lights` - Light sources.
    pub fn measure(
        &mut self,
        scene: &mut dyn Scene,
        lights: &mut [&mut dyn LightSource],
    ) -> Result<BTreeMap<ObjectId, Float>> {
        let (swapped, ids) = SwappedScene::install(scene, &mut self.registry, &mut self.materials);

        self.instant.begin(&mut self.device, self.registry.count())?;
        for light in lights.iter_mut() {
            light.render(&mut self.device, swapped.scene(), &mut self.instant)?;
        }
        drop(swapped);

        self.instant.read(&mut self.device, ids)
    }

    /// Switches the block layout to `ids`, flushing buffered timesteps
    /// first if the layout changes. `calculate()` does this automatically.
    ///
    /// * `ids` - Tracked IDs.
    pub fn reconfigure(&mut self, ids: &[ObjectId]) -> Result<()> {
        self.summarizer.reconfigure(&mut self.device, ids)
    }

    /// Reads buffered timesteps back into the series.
    pub fn flush(&mut self) -> Result<()> {
        self.summarizer.flush(&mut self.device)
    }

    /// Flushes and returns every timestep since the last
    /// `clear_timesteps()`.
    pub fn timesteps(&mut self) -> Result<&[Timestep]> {
        self.summarizer.timesteps(&mut self.device)
    }

    /// Removes and returns the flushed series.
    pub fn clear_timesteps(&mut self) -> Vec<Timestep> {
        self.summarizer.clear_timesteps()
    }

    /// Flushes, releases every per-ID resource and invalidates all issued
    /// IDs. Resources are released even if the flush fails.
    pub fn clear(&mut self) -> Result<()> {
        let flushed = self.summarizer.flush(&mut self.device);
        self.summarizer.release(&mut self.device);
        self.instant.release(&mut self.device);
        self.registry.clear();
        self.materials.clear();
        debug!("Engine cleared");
        flushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::geometry::point3;
    use crate::gpu::{DeviceCapabilities, SoftwareDevice};
    use crate::scene::fixtures::*;
    use crate::scene::{ArcMaterial, Material, Renderable, Shading, Side};
    use crate::summary::BLOCK_TIMESTEPS;
    use float_cmp::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::Arc;

    /// Checks what lights see, optionally adds a sample and optionally fails.
    struct Probe {
        sample: Option<TestSun>,
        failure: Option<Error>,
        panic: bool,
        seen: Vec<(Shading, Side, Color)>,
        background: Option<Color>,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                sample: None,
                failure: None,
                panic: false,
                seen: vec![],
                background: None,
            }
        }
    }

    impl LightSource for Probe {
        fn render(
            &mut self,
            device: &mut dyn Device,
            scene: &dyn Scene,
            accumulator: &mut dyn crate::light::LightAccumulator,
        ) -> Result<()> {
            self.background = Some(scene.background());
            if let Some(sun) = self.sample.as_mut() {
                sun.render(device, scene, accumulator)?;
                sun.release(device);
            }
            scene.visit_visible(&mut |o| {
                let m = o.material();
                self.seen.push((m.shading, m.side, m.color));
            });
            if self.panic {
                panic!("probe panicked");
            }
            match self.failure.take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    fn engine() -> Photosynthesis<SoftwareDevice> {
        Photosynthesis::new(SoftwareDevice::new()).unwrap()
    }

    fn lit_scene(
        engine: &mut Photosynthesis<SoftwareDevice>,
        n: usize,
    ) -> (TestScene, Vec<ObjectId>) {
        let mut quads = vec![];
        let mut ids = vec![];
        for i in 0..n {
            let id = engine.next_id().unwrap();
            ids.push(id);
            quads.push(
                Quad::horizontal(point3(i as Float - 1.5, 0.0, 0.0), 0.5)
                    .with_id(id)
                    .with_material(Material::lit("leaf", Color::WHITE).with_map("leaf.png")),
            );
        }
        let mut scene = TestScene::new(quads);
        scene.background = Color::WHITE;
        (scene, ids)
    }

    fn materials_of(scene: &TestScene) -> Vec<ArcMaterial> {
        scene.objects.iter().map(|o| o.material()).collect()
    }

    fn assert_restored(scene: &TestScene, before: &[ArcMaterial]) {
        assert_eq!(scene.background, Color::WHITE);
        for (object, original) in scene.objects.iter().zip(before.iter()) {
            assert!(Arc::ptr_eq(&object.material, original));
        }
    }

    #[test]
    fn lights_see_id_materials_only() {
        let mut engine = engine();
        let (mut scene, ids) = lit_scene(&mut engine, 2);
        let mut probe = Probe::new();

        engine.calculate(0.0, &mut scene, &mut [&mut probe]).unwrap();

        assert_eq!(probe.background, Some(Color::BLACK));
        let expected: Vec<(Shading, Side, Color)> = ids
            .iter()
            .map(|id| (Shading::Unlit, Side::Double, crate::id::encode_id(*id)))
            .collect();
        assert_eq!(probe.seen, expected);
    }

    #[test]
    fn materials_are_restored_after_success() {
        let mut engine = engine();
        let (mut scene, _) = lit_scene(&mut engine, 3);
        let before = materials_of(&scene);
        let mut sun = TestSun::overhead(4.0, 32);

        engine.calculate(0.0, &mut scene, &mut [&mut sun]).unwrap();
        assert_restored(&scene, &before);

        engine.measure(&mut scene, &mut [&mut sun]).unwrap();
        assert_restored(&scene, &before);
    }

    #[test]
    fn materials_are_restored_after_failure() {
        let mut engine = engine();
        let (mut scene, _) = lit_scene(&mut engine, 3);
        let before = materials_of(&scene);
        let mut probe = Probe::new();
        probe.failure = Some(Error::Device(String::from("driver failure")));

        let result = engine.calculate(0.0, &mut scene, &mut [&mut probe]);
        assert_eq!(result, Err(Error::Device(String::from("driver failure"))));
        assert_restored(&scene, &before);
    }

    #[test]
    fn failed_calculation_leaves_no_light_behind() {
        let mut engine = engine();
        let id = engine.next_id().unwrap();
        let quad = Quad::horizontal(point3(0.0, 0.0, 0.0), 1.0).with_id(id);
        let mut scene = TestScene::new(vec![quad]);
        let mut probe = Probe::new();
        probe.sample = Some(TestSun::overhead(2.0, 32));
        probe.failure = Some(Error::Device(String::from("driver failure")));

        assert!(engine.calculate(0.0, &mut scene, &mut [&mut probe]).is_err());
        assert_eq!(engine.summarizer().pending_count(), 0);

        let mut sun = TestSun::overhead(2.0, 32);
        engine.calculate(1.0, &mut scene, &mut [&mut sun]).unwrap();

        let series = engine.timesteps().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].0, 1.0);
        assert!(approx_eq!(Float, series[0].1[&id], 1.0, epsilon = 0.001), "{}", series[0].1[&id]);
    }

    #[test]
    fn materials_are_restored_after_panic() {
        let mut engine = engine();
        let (mut scene, _) = lit_scene(&mut engine, 3);
        let before = materials_of(&scene);
        let mut probe = Probe::new();
        probe.panic = true;

        let result = catch_unwind(AssertUnwindSafe(|| {
            engine.calculate(0.0, &mut scene, &mut [&mut probe])
        }));
        assert!(result.is_err());
        assert_restored(&scene, &before);
    }

    #[test]
    fn materials_are_restored_after_context_loss() {
        let mut engine = engine();
        let (mut scene, _) = lit_scene(&mut engine, 2);
        let before = materials_of(&scene);
        let mut sun = TestSun::overhead(4.0, 32);
        engine.calculate(0.0, &mut scene, &mut [&mut sun]).unwrap();

        engine.device_mut().lose_context();
        assert_eq!(
            engine.calculate(1.0, &mut scene, &mut [&mut sun]),
            Err(Error::ContextLost)
        );
        assert_restored(&scene, &before);
        assert_eq!(engine.flush(), Err(Error::ContextLost));
    }

    #[test]
    fn ring_buffer_holds_one_block_of_timesteps() {
        let mut engine = engine();
        let (mut scene, ids) = lit_scene(&mut engine, 1);
        let mut sun = TestSun::overhead(4.0, 16);

        for step in 0..BLOCK_TIMESTEPS {
            engine
                .calculate(100.0 + step as Timestamp, &mut scene, &mut [&mut sun])
                .unwrap();
        }
        let series = engine.timesteps().unwrap();
        assert_eq!(series.len(), BLOCK_TIMESTEPS);
        for (i, (time, values)) in series.iter().enumerate() {
            assert_eq!(*time, 100.0 + i as Timestamp);
            assert!(approx_eq!(Float, values[&ids[0]], 0.25, epsilon = 0.001));
        }

        engine.calculate(1000.0, &mut scene, &mut [&mut sun]).unwrap();
        assert_eq!(engine.timesteps().unwrap().len(), BLOCK_TIMESTEPS + 1);
    }

    #[test]
    fn new_objects_flush_earlier_timesteps() {
        let mut engine = engine();
        let (mut scene, ids) = lit_scene(&mut engine, 1);
        let mut sun = TestSun::overhead(4.0, 32);
        for step in 0..3 {
            engine
                .calculate(step as Timestamp, &mut scene, &mut [&mut sun])
                .unwrap();
        }

        let id = engine.next_id().unwrap();
        scene
            .objects
            .push(Quad::horizontal(point3(1.0, 0.0, 1.0), 0.5).with_id(id));
        engine.calculate(3.0, &mut scene, &mut [&mut sun]).unwrap();
        assert_eq!(engine.summarizer().pending_count(), 1);
        assert_eq!(engine.tracked_ids(), &[ids[0], id]);

        let series = engine.clear_timesteps();
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|(_, v)| v.len() == 1));

        let series = engine.timesteps().unwrap();
        assert_eq!(series.len(), 1);
        assert!(approx_eq!(Float, series[0].1[&id], 0.25, epsilon = 0.001));
        assert!(approx_eq!(Float, series[0].1[&ids[0]], 0.25, epsilon = 0.001));
    }

    #[test]
    fn night_records_zeros() {
        let mut engine = engine();
        let (mut scene, ids) = lit_scene(&mut engine, 2);
        let mut sun = TestSun::overhead(4.0, 32);

        engine.calculate(0.0, &mut scene, &mut [&mut sun]).unwrap();
        engine.calculate(1.0, &mut scene, &mut []).unwrap();

        let series = engine.timesteps().unwrap();
        for id in ids.iter() {
            assert!(series[0].1[id] > 0.2);
            assert_eq!(series[1].1[id], 0.0);
        }
    }

    #[test]
    fn area_is_independent_of_resolution() {
        for res in [32, 64, 100, 300] {
            let mut engine = engine();
            let id = engine.next_id().unwrap();
            let quad = Quad::horizontal(point3(0.0, 0.0, 0.0), 1.0).with_id(id);
            let mut scene = TestScene::new(vec![quad]);
            let mut sun = TestSun::overhead(2.0, res);

            engine.calculate(0.0, &mut scene, &mut [&mut sun]).unwrap();

            let value = engine.timesteps().unwrap()[0].1[&id];
            assert!(approx_eq!(Float, value, 1.0, epsilon = 0.001), "{res}: {value}");
        }
    }

    #[test]
    fn measure_agrees_with_calculate() {
        let mut engine = engine();
        let (mut scene, ids) = lit_scene(&mut engine, 4);
        let mut sun = TestSun::overhead(4.0, 64);

        let measured = engine.measure(&mut scene, &mut [&mut sun]).unwrap();
        engine.calculate(0.0, &mut scene, &mut [&mut sun]).unwrap();
        let calculated = engine.timesteps().unwrap()[0].1.clone();

        assert_eq!(measured.len(), ids.len());
        for id in ids.iter() {
            assert!(approx_eq!(Float, measured[id], calculated[id], epsilon = 0.001));
            assert!(approx_eq!(Float, measured[id], 0.25, epsilon = 0.001));
        }
        assert!(engine.summarizer().pending_count() == 0);
    }

    #[test]
    fn measure_handles_ids_beyond_one_summary_row() {
        let mut engine = engine();
        for _ in 0..299 {
            engine.next_id().unwrap();
        }
        let id = engine.next_id().unwrap();
        assert_eq!(id.get(), 300);
        let quad = Quad::horizontal(point3(0.0, 0.0, 0.0), 1.0).with_id(id);
        let mut scene = TestScene::new(vec![quad]);
        let mut sun = TestSun::overhead(2.0, 600);

        // 90000 additive blends into one f32 texel.
        let measured = engine.measure(&mut scene, &mut [&mut sun]).unwrap();
        assert!(approx_eq!(Float, measured[&id], 1.0, epsilon = 0.01));
    }

    #[test]
    fn clear_releases_resources_and_ids() {
        let mut engine = engine();
        let (mut scene, _) = lit_scene(&mut engine, 2);
        let mut sun = TestSun::overhead(4.0, 32);
        engine.calculate(0.0, &mut scene, &mut [&mut sun]).unwrap();
        engine.measure(&mut scene, &mut [&mut sun]).unwrap();

        engine.clear().unwrap();
        sun.release(engine.device_mut());
        assert_eq!(engine.device().texture_count(), 0);
        assert_eq!(engine.id_count(), 0);
        assert_eq!(engine.timesteps().unwrap().len(), 1);
        assert_eq!(engine.next_id().unwrap().get(), 1);
    }

    #[test]
    fn devices_without_float_targets_are_refused() {
        let device = SoftwareDevice::with_capabilities(DeviceCapabilities {
            float_render_targets: false,
            half_float_render_targets: false,
            max_texture_size: 1024,
        });
        assert!(matches!(
            Photosynthesis::new(device),
            Err(Error::UnsupportedFormat)
        ));
    }
}
