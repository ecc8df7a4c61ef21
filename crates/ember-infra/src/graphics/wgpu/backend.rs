// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Device bring-up and presentation on top of `wgpu`.
//!
//! Adapter and device requests are futures. Natively they are resolved with
//! `pollster` inside the request call, so the completion is delivered
//! synchronously. On the web they are spawned on the browser's microtask queue
//! and complete on a later turn of the event loop.

use ember_core::backend::{
    AdapterOptions, AdapterReport, DeviceDescriptor, DeviceReport, FrameChainDescriptor,
    GraphicsBackend, PipelineDescriptor,
};
use ember_core::diagnostics::{BackendEvent, DiagnosticSender};
use ember_core::{BackendError, Completion, EmberWindowHandle, FrameError};
use std::future::Future;
use std::sync::Arc;

use super::conversions::{alpha_blending, backend_name, error_kind, IntoWgpu};
use super::recorder::WgpuRecorder;

/// The logical device and its default queue.
#[derive(Debug, Clone)]
pub struct WgpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// A configured surface, kept together with its configuration so it can be
/// reconfigured when it is lost or outdated.
#[derive(Debug)]
pub struct WgpuFrameChain {
    surface: Arc<wgpu::Surface<'static>>,
    config: wgpu::SurfaceConfiguration,
}

impl WgpuFrameChain {
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        self.config.present_mode
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

/// The surface texture of the current frame and a view to render into.
#[derive(Debug)]
pub struct WgpuFrame {
    pub(crate) texture: wgpu::SurfaceTexture,
    pub(crate) view: wgpu::TextureView,
}

/// The `wgpu` graphics backend.
#[derive(Debug, Default)]
pub struct WgpuBackend {}

impl WgpuBackend {
    pub fn new() -> Self {
        Self {}
    }
}

/// Drives a request future to completion.
#[cfg(not(target_arch = "wasm32"))]
fn spawn_request<F: Future<Output = ()> + 'static>(request: F) {
    pollster::block_on(request);
}

#[cfg(target_arch = "wasm32")]
fn spawn_request<F: Future<Output = ()> + 'static>(request: F) {
    wasm_bindgen_futures::spawn_local(request);
}

/// Runs `build` inside a validation error scope and returns the first error raised.
#[cfg(not(target_arch = "wasm32"))]
fn with_validation_scope<T>(
    device: &wgpu::Device,
    build: impl FnOnce() -> T,
) -> (T, Option<wgpu::Error>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    let error = pollster::block_on(device.pop_error_scope());
    (value, error)
}

/// Scopes cannot be awaited here on the web; errors reach the uncaptured-error
/// observer instead.
#[cfg(target_arch = "wasm32")]
fn with_validation_scope<T>(
    _device: &wgpu::Device,
    build: impl FnOnce() -> T,
) -> (T, Option<wgpu::Error>) {
    (build(), None)
}

/// The preferred format when the surface supports it, otherwise the first
/// supported one. An empty list means the surface cannot present from this adapter.
fn choose_format(
    supported: &[wgpu::TextureFormat],
    preferred: wgpu::TextureFormat,
) -> Result<wgpu::TextureFormat, BackendError> {
    let format = supported
        .iter()
        .copied()
        .find(|f| *f == preferred)
        .or_else(|| supported.first().copied())
        .ok_or_else(|| {
            BackendError::FrameChainCreation(
                "the surface is not compatible with the adapter".to_string(),
            )
        })?;
    if format != preferred {
        log::warn!("Surface does not support {preferred:?}, using {format:?}.");
    }
    Ok(format)
}

fn choose_present_mode(
    supported: &[wgpu::PresentMode],
    requested: wgpu::PresentMode,
) -> wgpu::PresentMode {
    if supported.contains(&requested) {
        requested
    } else {
        log::warn!("Present mode {requested:?} unsupported, falling back to Fifo.");
        wgpu::PresentMode::Fifo // Fifo is guaranteed to be supported
    }
}

fn device_limits(adapter: &wgpu::Adapter) -> wgpu::Limits {
    if cfg!(target_arch = "wasm32") {
        // WebGL2 cannot offer the full default limits.
        wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
    } else {
        wgpu::Limits::default()
    }
}

impl GraphicsBackend for WgpuBackend {
    type Target = EmberWindowHandle;
    type Instance = wgpu::Instance;
    type Surface = Arc<wgpu::Surface<'static>>;
    type Adapter = wgpu::Adapter;
    type Device = WgpuDevice;
    type Pipeline = wgpu::RenderPipeline;
    type FrameChain = WgpuFrameChain;
    type Frame = WgpuFrame;
    type Commands = wgpu::CommandBuffer;
    type Recorder = WgpuRecorder;

    fn name(&self) -> &str {
        "wgpu"
    }

    fn create_instance(&mut self) -> Result<wgpu::Instance, BackendError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());
        log::debug!("WGPU instance created.");
        Ok(instance)
    }

    fn create_surface(
        &mut self,
        instance: &wgpu::Instance,
        target: &EmberWindowHandle,
    ) -> Result<Self::Surface, BackendError> {
        let surface = instance
            .create_surface(Arc::clone(target))
            .map_err(|e| BackendError::SurfaceCreation(e.to_string()))?;
        Ok(Arc::new(surface))
    }

    fn request_adapter(
        &mut self,
        instance: &wgpu::Instance,
        surface: &Self::Surface,
        options: &AdapterOptions,
        completion: Completion<wgpu::Adapter>,
    ) {
        let instance = instance.clone();
        let surface = Arc::clone(surface);
        let power_preference = options.power_preference.into_wgpu();
        let force_fallback_adapter = options.force_fallback_adapter;

        spawn_request(async move {
            let result = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference,
                    force_fallback_adapter,
                    compatible_surface: Some(&surface),
                })
                .await
                .map_err(|e| e.to_string());
            completion.complete(result);
        });
    }

    fn request_device(
        &mut self,
        adapter: &wgpu::Adapter,
        descriptor: &DeviceDescriptor,
        completion: Completion<WgpuDevice>,
    ) {
        let adapter = adapter.clone();
        let label = descriptor.label.clone();
        let required_limits = device_limits(&adapter);
        // wgpu creates exactly one queue and does not label it.
        log::debug!(
            "Default queue \"{}\" is created with the device.",
            descriptor.default_queue_label
        );

        spawn_request(async move {
            let result = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some(&label),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: wgpu::MemoryHints::default(),
                    trace: wgpu::Trace::default(),
                })
                .await
                .map(|(device, queue)| WgpuDevice { device, queue })
                .map_err(|e| e.to_string());
            completion.complete(result);
        });
    }

    fn adapter_report(&self, adapter: &wgpu::Adapter) -> AdapterReport {
        let info = adapter.get_info();
        AdapterReport {
            name: info.name,
            vendor_id: info.vendor,
            device_id: info.device,
            device_type: format!("{:?}", info.device_type),
            backend: backend_name(info.backend).to_string(),
            driver: info.driver,
            driver_info: info.driver_info,
        }
    }

    fn device_report(&self, device: &WgpuDevice) -> DeviceReport {
        let limits = device.device.limits();
        DeviceReport {
            max_texture_dimension_1d: limits.max_texture_dimension_1d,
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
            max_texture_dimension_3d: limits.max_texture_dimension_3d,
            max_bind_groups: limits.max_bind_groups,
        }
    }

    fn install_observers(&mut self, device: &WgpuDevice, diagnostics: DiagnosticSender) {
        let errors = diagnostics.clone();
        device.device.on_uncaptured_error(Box::new(move |error| {
            errors.report(BackendEvent::UncapturedError {
                kind: error_kind(&error).to_string(),
                message: error.to_string(),
            });
        }));

        // wgpu routes its own logging through the `log` facade; device loss is
        // the one message it reports through a callback.
        let lost = diagnostics.clone();
        device
            .device
            .set_device_lost_callback(move |reason, message| {
                lost.report(BackendEvent::Log {
                    level: match reason {
                        wgpu::DeviceLostReason::Destroyed => log::Level::Debug,
                        _ => log::Level::Error,
                    },
                    message: format!("Device lost ({reason:?}): {message}"),
                });
            });

        device.queue.on_submitted_work_done(move || {
            diagnostics.report(BackendEvent::QueueWorkDone);
        });
    }

    fn create_frame_chain(
        &mut self,
        adapter: &wgpu::Adapter,
        device: &WgpuDevice,
        surface: &Self::Surface,
        descriptor: &FrameChainDescriptor,
    ) -> Result<WgpuFrameChain, BackendError> {
        let caps = surface.get_capabilities(adapter);

        let format = choose_format(&caps.formats, descriptor.preferred_format.into_wgpu())?;
        let present_mode =
            choose_present_mode(&caps.present_modes, descriptor.present_mode.into_wgpu());

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: descriptor.width.max(1),
            height: descriptor.height.max(1),
            present_mode,
            desired_maximum_frame_latency: 2,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device.device, &config);

        Ok(WgpuFrameChain {
            surface: Arc::clone(surface),
            config,
        })
    }

    fn create_pipeline(
        &mut self,
        device: &WgpuDevice,
        chain: &WgpuFrameChain,
        descriptor: &PipelineDescriptor<'_>,
    ) -> Result<wgpu::RenderPipeline, BackendError> {
        let device = &device.device;

        let (pipeline, error) = with_validation_scope(device, || {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(descriptor.shader_label),
                source: wgpu::ShaderSource::Wgsl(descriptor.shader_source.into()),
            });

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(descriptor.label),
                layout: None,
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some(descriptor.vertex_entry_point),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &[],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some(descriptor.fragment_entry_point),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: chain.format(),
                        blend: Some(alpha_blending()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            })
        });

        if let Some(error) = error {
            return Err(BackendError::PipelineCreation {
                label: descriptor.label.to_string(),
                details: error.to_string(),
            });
        }

        Ok(pipeline)
    }

    fn acquire_frame(
        &mut self,
        device: &WgpuDevice,
        chain: &mut WgpuFrameChain,
    ) -> Result<WgpuFrame, FrameError> {
        match chain.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(WgpuFrame { texture, view })
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring.");
                chain.surface.configure(&device.device, &chain.config);
                Err(FrameError::Outdated)
            }
            Err(wgpu::SurfaceError::Timeout) => Err(FrameError::Timeout),
            Err(e) => Err(FrameError::AcquisitionFailed(e.to_string())),
        }
    }

    fn create_recorder(&mut self, device: &WgpuDevice, label: &str) -> WgpuRecorder {
        WgpuRecorder::new(
            device
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) }),
        )
    }

    fn submit(&mut self, device: &WgpuDevice, commands: wgpu::CommandBuffer) {
        device.queue.submit(std::iter::once(commands));
    }

    fn present(&mut self, frame: WgpuFrame) {
        let WgpuFrame { texture, view } = frame;
        drop(view);
        texture.present();
    }

    fn tick(&mut self, device: &WgpuDevice) {
        if let Err(e) = device.device.poll(wgpu::PollType::Poll) {
            log::warn!("Device poll failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_format_is_used_when_supported() {
        let supported = [
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
        ];
        let format = choose_format(&supported, wgpu::TextureFormat::Bgra8Unorm).unwrap();
        assert_eq!(format, wgpu::TextureFormat::Bgra8Unorm);
    }

    #[test]
    fn first_supported_format_wins_when_preferred_is_missing() {
        let supported = [
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureFormat::Rgba8Unorm,
        ];
        let format = choose_format(&supported, wgpu::TextureFormat::Bgra8Unorm).unwrap();
        assert_eq!(format, wgpu::TextureFormat::Rgba8UnormSrgb);
    }

    #[test]
    fn no_supported_format_fails_frame_chain_creation() {
        let result = choose_format(&[], wgpu::TextureFormat::Bgra8Unorm);
        assert!(matches!(result, Err(BackendError::FrameChainCreation(_))));
    }

    #[test]
    fn supported_present_mode_is_kept() {
        let supported = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox];
        assert_eq!(
            choose_present_mode(&supported, wgpu::PresentMode::Mailbox),
            wgpu::PresentMode::Mailbox
        );
    }

    #[test]
    fn unsupported_present_mode_falls_back_to_fifo() {
        let supported = [wgpu::PresentMode::Fifo];
        assert_eq!(
            choose_present_mode(&supported, wgpu::PresentMode::Immediate),
            wgpu::PresentMode::Fifo
        );
    }
}
