//! CPU reference device

mod raster;
mod surface;

use super::*;
use raster::rasterize;
use std::collections::HashMap;
use surface::Surface;

/// Default largest texture side length.
pub const SOFTWARE_MAX_TEXTURE_SIZE: u32 = 4096;

/// A `Device` that executes everything on the CPU. Fragment programs run in
/// parallel across output rows.
pub struct SoftwareDevice {
    /// Reported render target support.
    capabilities: DeviceCapabilities,

    /// Number of worker threads for fragment programs.
    threads: usize,

    /// Next texture name.
    next_handle: u64,

    /// Live textures.
    textures: HashMap<TextureHandle, Surface>,

    /// Set between `lose_context()` and `restore_context()`.
    context_lost: bool,
}

impl SoftwareDevice {
    /// Returns a device with full float support.
    pub fn new() -> Self {
        Self::with_capabilities(DeviceCapabilities {
            float_render_targets: true,
            half_float_render_targets: true,
            max_texture_size: SOFTWARE_MAX_TEXTURE_SIZE,
        })
    }

    /// Returns a device reporting the given capabilities.
    ///
    /// * `capabilities` - Render target support.
    pub fn with_capabilities(capabilities: DeviceCapabilities) -> Self {
        Self {
            capabilities,
            threads: num_cpus::get(),
            next_handle: 1,
            textures: HashMap::new(),
            context_lost: false,
        }
    }

    /// Returns the device using `threads` worker threads.
    ///
    /// * `threads` - Thread count; at least 1 is used.
    pub fn with_threads(self, threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            ..self
        }
    }

    /// Simulates loss of the rendering context. All textures are released.
    pub fn lose_context(&mut self) {
        warn!("Rendering context lost, {} textures released", self.textures.len());
        self.textures.clear();
        self.context_lost = true;
    }

    /// Makes the device usable again. Textures lost with the context stay
    /// lost.
    pub fn restore_context(&mut self) {
        info!("Rendering context restored");
        self.context_lost = false;
    }

    /// Returns the number of live textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn check_context(&self) -> Result<()> {
        if self.context_lost {
            Err(Error::ContextLost)
        } else {
            Ok(())
        }
    }

    fn surface(&self, texture: TextureHandle) -> Result<&Surface> {
        self.check_context()?;
        self.textures.get(&texture).ok_or(Error::UnknownTexture(texture))
    }

    fn surface_mut(&mut self, texture: TextureHandle) -> Result<&mut Surface> {
        self.check_context()?;
        self.textures
            .get_mut(&texture)
            .ok_or(Error::UnknownTexture(texture))
    }

    /// Collects the input textures of a program drawing into `target`.
    fn inputs(&self, target: TextureHandle, handles: Vec<TextureHandle>) -> Result<Inputs<'_>> {
        self.surface(target)?;
        let mut surfaces = Vec::with_capacity(handles.len());
        for handle in handles {
            if handle == target {
                return Err(Error::FeedbackLoop(target));
            }
            surfaces.push((handle, self.surface(handle)?));
        }
        Ok(Inputs { surfaces })
    }

    /// Evaluates a fragment program for every texel. Rows are handed to
    /// worker threads through a bounded channel.
    fn shade_rows(
        &self,
        program: &dyn FragmentProgram,
        inputs: &Inputs<'_>,
        width: u32,
        height: u32,
    ) -> Result<Vec<(u32, Vec<Float>)>> {
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        crossbeam::scope(|scope| -> Result<()> {
            let (tx, rx) = crossbeam_channel::bounded(self.threads);

            // Spawn worker threads.
            for _ in 0..self.threads {
                let rxc = rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move |_| {
                    for y in rxc.iter() {
                        let row: Vec<Float> =
                            (0..width).map(|x| program.shade(x, y, inputs)).collect();
                        if result_tx.send((y, row)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(rx); // Each worker holds its own clone.

            // Send work.
            for y in 0..height {
                tx.send(y)
                    .map_err(|e| Error::Device(format!("fragment worker queue closed: {e}")))?;
            }
            Ok(())
        })
        .map_err(|_| Error::Device(String::from("fragment worker panicked")))??;

        drop(result_tx);
        let rows: Vec<(u32, Vec<Float>)> = result_rx.iter().collect();
        if rows.len() != height as usize {
            return Err(Error::Device(format!(
                "fragment workers shaded {} of {} rows",
                rows.len(),
                height
            )));
        }
        Ok(rows)
    }
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for SoftwareDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn is_context_lost(&self) -> bool {
        self.context_lost
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<TextureHandle> {
        self.check_context()?;

        let max = self.capabilities.max_texture_size;
        if desc.width == 0 || desc.height == 0 {
            return Err(Error::InvalidTarget(format!(
                "empty texture {}x{}",
                desc.width, desc.height
            )));
        }
        if desc.width > max || desc.height > max {
            return Err(Error::TextureTooLarge {
                width: desc.width,
                height: desc.height,
                max,
            });
        }
        let supported = match desc.format {
            TextureFormat::Rgba8Unorm => true,
            TextureFormat::Rgba32Float | TextureFormat::R32Float => {
                self.capabilities.float_render_targets
            }
            TextureFormat::R16Float => self.capabilities.half_float_render_targets,
        };
        if !supported {
            return Err(Error::UnsupportedFormat);
        }

        let handle = TextureHandle::new(self.next_handle);
        self.next_handle += 1;
        self.textures.insert(handle, Surface::new(desc));
        Ok(handle)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
    }

    fn texture_size(&self, texture: TextureHandle) -> Result<(u32, u32)> {
        let surface = self.surface(texture)?;
        Ok((surface.width, surface.height))
    }

    fn clear(&mut self, target: TextureHandle, color: [Float; 4]) -> Result<()> {
        self.surface_mut(target)?.fill(color);
        Ok(())
    }

    fn render_scene(
        &mut self,
        scene: &dyn Scene,
        projection: &OrthographicProjection,
        target: TextureHandle,
    ) -> Result<()> {
        let surface = self.surface_mut(target)?;
        if surface.format.channels() != 4 {
            return Err(Error::InvalidTarget(format!(
                "scenes need an RGBA target, not {:?}",
                surface.format
            )));
        }
        let res = projection.resolution();
        if surface.width != res || surface.height != res {
            return Err(Error::InvalidTarget(format!(
                "projection resolution {} does not match target {}x{}",
                res, surface.width, surface.height
            )));
        }
        rasterize(scene, projection, surface);
        Ok(())
    }

    fn draw_fragments(
        &mut self,
        target: TextureHandle,
        program: &dyn FragmentProgram,
    ) -> Result<()> {
        let (width, height) = self.texture_size(target)?;
        let rows = {
            let inputs = self.inputs(target, program.inputs())?;
            self.shade_rows(program, &inputs, width, height)?
        };

        let surface = self.surface_mut(target)?;
        for (y, row) in rows {
            for (x, value) in row.into_iter().enumerate() {
                surface.write(x as u32, y, [value, 0.0, 0.0, 1.0]);
            }
        }
        Ok(())
    }

    fn draw_points(
        &mut self,
        target: TextureHandle,
        program: &dyn PointProgram,
        count: usize,
        blend: BlendMode,
    ) -> Result<()> {
        let points: Vec<PointOutput> = {
            let inputs = self.inputs(target, program.inputs())?;
            (0..count)
                .filter_map(|i| program.vertex(i, &inputs))
                .collect()
        };

        let surface = self.surface_mut(target)?;
        for point in points {
            if point.x >= surface.width || point.y >= surface.height {
                continue;
            }
            let value = match blend {
                BlendMode::Replace => point.value,
                BlendMode::Additive => {
                    point.value + surface.texel(point.x as i64, point.y as i64)[0]
                }
            };
            surface.write(point.x, point.y, [value, 0.0, 0.0, 1.0]);
        }
        Ok(())
    }

    fn read_pixels(&mut self, texture: TextureHandle, buf: &mut [Float]) -> Result<()> {
        self.surface(texture)?.read(buf)
    }
}

/// The input textures of one draw call.
struct Inputs<'a> {
    surfaces: Vec<(TextureHandle, &'a Surface)>,
}

impl TexelSource for Inputs<'_> {
    fn fetch(&self, texture: TextureHandle, x: i64, y: i64) -> [Float; 4] {
        self.surfaces
            .iter()
            .find(|(h, _)| *h == texture)
            .map_or([0.0; 4], |(_, s)| s.texel(x, y))
    }

    fn size(&self, texture: TextureHandle) -> (u32, u32) {
        self.surfaces
            .iter()
            .find(|(h, _)| *h == texture)
            .map_or((0, 0), |(_, s)| (s.width, s.height))
    }
}
