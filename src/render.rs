use crate::constants::{
    CLEAR_COLOR, FLOWER_PETALS, FLOWER_PETAL_LENGTH, FLOWER_STEM_HEIGHT, FOG_COLOR, GROUND_COLOR,
    GROUND_SEGMENTS, HOVER_BRIGHTEN, WILT_DARKEN,
};
use garden_core::constants::GARDEN_RADIUS;
use garden_core::mesh::{self, MeshVertex};
use garden_core::{Camera, PlacedFlower};
use std::mem::size_of;
use wgpu::util::DeviceExt;
use web_sys as web;

const GARDEN_WGSL: &str = include_str!("../shaders/garden.wgsl");
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;
const INITIAL_INSTANCES: usize = 64;

const MESH_ATTRS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32];
const INSTANCE_ATTRS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![3 => Float32x4, 4 => Float32x4, 5 => Float32x4];
const GROUND_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    fog_color: [f32; 4],
    ground_color: [f32; 4],
    fog: [f32; 4], // near, far, time, unused
}

impl Globals {
    fn new(camera: &Camera, fog_near: f32, fog_far: f32, time: f32) -> Self {
        let rgba = |[r, g, b]: [f32; 3]| [r, g, b, 1.0];
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: camera.eye.extend(1.0).to_array(),
            fog_color: rgba(FOG_COLOR),
            ground_color: rgba(GROUND_COLOR),
            fog: [fog_near, fog_far.max(fog_near + 0.01), time, 0.0],
        }
    }
}

/// Per-flower GPU data; one instance per placed flower.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FlowerInstance {
    offset_scale: [f32; 4],
    color: [f32; 4], // rgb + brightness
    tilt: [f32; 4],  // direction, amount, rotation phase, unused
}

impl FlowerInstance {
    pub fn from_placed(flower: &PlacedFlower, highlighted: bool) -> Self {
        let mut brightness = if flower.alive { 1.0 } else { WILT_DARKEN };
        if highlighted {
            brightness *= HOVER_BRIGHTEN;
        }
        let p = flower.position;
        let [r, g, b] = flower.color;
        Self {
            offset_scale: [p.x, p.y, p.z, flower.scale],
            color: [r, g, b, brightness],
            tilt: [
                flower.tilt_direction,
                flower.tilt_amount,
                flower.rotation_phase,
                0.0,
            ],
        }
    }
}

fn vertex_layout<'b>(
    stride: usize,
    step_mode: wgpu::VertexStepMode,
    attributes: &'b [wgpu::VertexAttribute],
) -> wgpu::VertexBufferLayout<'b> {
    wgpu::VertexBufferLayout {
        array_stride: stride as u64,
        step_mode,
        attributes,
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    };
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("garden_depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&Default::default())
}

/// Prefers an sRGB format so palette colors read the same on every browser.
fn pick_surface_format(caps: &wgpu::SurfaceCapabilities) -> Option<wgpu::TextureFormat> {
    caps.formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first().copied())
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("flower_instances"),
        size: (capacity.max(1) * size_of::<FlowerInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn static_vertex_buffer(device: &wgpu::Device, label: &str, bytes: &[u8]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytes,
        usage: wgpu::BufferUsages::VERTEX,
    })
}

/// Uniform buffer plus the bind group both garden pipelines share.
struct GlobalsBinding {
    buffer: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    group: wgpu::BindGroup,
}

impl GlobalsBinding {
    fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("garden_globals"),
            size: size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("garden_globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(size_of::<Globals>() as u64),
                },
                count: None,
            }],
        });
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("garden_globals_group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            buffer,
            layout,
            group,
        }
    }
}

/// Builds one depth-tested pipeline from a vertex/fragment entry pair of the garden shader.
struct PipelineBuilder<'d> {
    device: &'d wgpu::Device,
    layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    format: wgpu::TextureFormat,
}

impl<'d> PipelineBuilder<'d> {
    fn new(
        device: &'d wgpu::Device,
        globals: &GlobalsBinding,
        format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("garden_shader"),
            source: wgpu::ShaderSource::Wgsl(GARDEN_WGSL.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("garden_layout"),
            bind_group_layouts: &[&globals.layout],
            push_constant_ranges: &[],
        });
        Self {
            device,
            layout,
            shader,
            format,
        }
    }

    fn build(
        &self,
        label: &str,
        vs: &str,
        fs: &str,
        buffers: &[wgpu::VertexBufferLayout<'_>],
    ) -> wgpu::RenderPipeline {
        let target = wgpu::ColorTargetState::from(self.format);
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&self.layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some(vs),
                    buffers,
                    compilation_options: Default::default(),
                },
                // no culling: petals are single quads seen from both sides
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some(fs),
                    targets: &[Some(target)],
                    compilation_options: Default::default(),
                }),
                cache: None,
                multiview: None,
            })
    }
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    flower_pipeline: wgpu::RenderPipeline,
    ground_pipeline: wgpu::RenderPipeline,
    globals: GlobalsBinding,

    mesh_vb: wgpu::Buffer,
    mesh_vertices: u32,
    ground_vb: wgpu::Buffer,
    ground_vertices: u32,
    instance_vb: wgpu::Buffer,
    instance_capacity: usize,

    elapsed_sec: f32,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let (width, height) = (canvas.width().max(1), canvas.height().max(1));

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("no WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("garden_device"),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!("request_device failed: {e:?}"))?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_surface_format(&caps)
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, width, height);

        let globals = GlobalsBinding::new(&device);
        let builder = PipelineBuilder::new(&device, &globals, format);
        let flower_pipeline = builder.build(
            "flower_pipeline",
            "vs_flower",
            "fs_flower",
            &[
                vertex_layout(
                    size_of::<MeshVertex>(),
                    wgpu::VertexStepMode::Vertex,
                    &MESH_ATTRS,
                ),
                vertex_layout(
                    size_of::<FlowerInstance>(),
                    wgpu::VertexStepMode::Instance,
                    &INSTANCE_ATTRS,
                ),
            ],
        );
        let ground_pipeline = builder.build(
            "ground_pipeline",
            "vs_ground",
            "fs_ground",
            &[vertex_layout(
                size_of::<[f32; 3]>(),
                wgpu::VertexStepMode::Vertex,
                &GROUND_ATTRS,
            )],
        );

        let flower_mesh =
            mesh::flower_or_placeholder(FLOWER_PETALS, FLOWER_STEM_HEIGHT, FLOWER_PETAL_LENGTH);
        let mesh_vb = static_vertex_buffer(
            &device,
            "flower_mesh",
            bytemuck::cast_slice(&flower_mesh.vertices),
        );
        let ground = mesh::ground_disk(GARDEN_RADIUS, GROUND_SEGMENTS);
        let ground_vb = static_vertex_buffer(&device, "ground_disk", bytemuck::cast_slice(&ground));
        let instance_vb = create_instance_buffer(&device, INITIAL_INSTANCES);

        log::info!(
            "[gpu] ready {width}x{height} format={format:?} flower_vertices={}",
            flower_mesh.vertex_count()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            flower_pipeline,
            ground_pipeline,
            globals,
            mesh_vb,
            mesh_vertices: flower_mesh.vertex_count(),
            ground_vb,
            ground_vertices: ground.len() as u32,
            instance_vb,
            instance_capacity: INITIAL_INSTANCES,
            elapsed_sec: 0.0,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size() {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    /// Reconfigure after `SurfaceError::Lost`/`Outdated`.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn upload_instances(&mut self, instances: &[FlowerInstance]) {
        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().next_power_of_two();
            self.instance_vb = create_instance_buffer(&self.device, self.instance_capacity);
            log::debug!("[gpu] instance buffer grown to {}", self.instance_capacity);
        }
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_vb, 0, bytemuck::cast_slice(instances));
        }
    }

    pub fn render(
        &mut self,
        dt_sec: f32,
        camera: &Camera,
        fog_near: f32,
        fog_far: f32,
        instances: &[FlowerInstance],
    ) -> Result<(), wgpu::SurfaceError> {
        self.elapsed_sec += dt_sec.max(0.0);
        self.upload_instances(instances);
        let globals = Globals::new(camera, fog_near, fog_far, self.elapsed_sec);
        self.queue
            .write_buffer(&self.globals.buffer, 0, bytemuck::bytes_of(&globals));

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("garden_frame"),
            });
        let [r, g, b] = CLEAR_COLOR.map(f64::from);
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("garden_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.globals.group, &[]);

            pass.set_pipeline(&self.ground_pipeline);
            pass.set_vertex_buffer(0, self.ground_vb.slice(..));
            pass.draw(0..self.ground_vertices, 0..1);

            if !instances.is_empty() {
                pass.set_pipeline(&self.flower_pipeline);
                pass.set_vertex_buffer(0, self.mesh_vb.slice(..));
                pass.set_vertex_buffer(1, self.instance_vb.slice(..));
                pass.draw(0..self.mesh_vertices, 0..instances.len() as u32);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
