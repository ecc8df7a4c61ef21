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

use ember_core::backend::{ClearColor, FrameRecorder};
use std::ops::Range;

use super::backend::WgpuFrame;
use super::conversions::IntoWgpu;

/// Records one frame into a `wgpu::CommandEncoder`.
///
/// The open render pass has its encoder lifetime erased so it can live next to
/// the encoder; wgpu keeps the encoder locked until the pass is dropped.
pub struct WgpuRecorder {
    encoder: wgpu::CommandEncoder,
    pass: Option<wgpu::RenderPass<'static>>,
}

impl WgpuRecorder {
    pub(crate) fn new(encoder: wgpu::CommandEncoder) -> Self {
        Self {
            encoder,
            pass: None,
        }
    }
}

impl FrameRecorder for WgpuRecorder {
    type Frame = WgpuFrame;
    type Pipeline = wgpu::RenderPipeline;
    type Commands = wgpu::CommandBuffer;

    fn begin_render_pass(&mut self, target: &WgpuFrame, label: &str, clear: ClearColor) {
        if self.pass.is_some() {
            log::warn!("WgpuRecorder: a render pass is already open, ending it.");
            self.pass = None;
        }
        let pass = self
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.into_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime();
        self.pass = Some(pass);
    }

    fn set_pipeline(&mut self, pipeline: &wgpu::RenderPipeline) {
        match self.pass.as_mut() {
            Some(pass) => pass.set_pipeline(pipeline),
            None => log::warn!("WgpuRecorder: set_pipeline called outside a render pass."),
        }
    }

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        match self.pass.as_mut() {
            Some(pass) => pass.draw(vertices, instances),
            None => log::warn!("WgpuRecorder: draw called outside a render pass."),
        }
    }

    fn end_render_pass(&mut self) {
        // Dropping the pass ends it and unlocks the encoder.
        self.pass = None;
    }

    fn finish(mut self) -> wgpu::CommandBuffer {
        self.pass = None;
        self.encoder.finish()
    }
}
