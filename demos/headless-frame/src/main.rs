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

//! Renders a few textured frames against the headless recording driver.
//!
//! Usage: `headless-frame [config.json]`. Without a config the defaults apply.

use anyhow::{Context, Result};
use ren3d_core::logging;
use ren3d_core::math::Rgba8;
use ren3d_core::renderer::api::command::{
    BindShaderStageCommand, BindTextureCommand, BindVertexInputCommand, BlendFactor,
    BlendingCommand, BlendingFuncCommand, ClearCommand, CommandBufferParams, CommandQueue,
    DepthTestCommand, DrawIndexedCommand, PrimitiveTopology, SetUniformCommand, ViewportCommand,
};
use ren3d_core::renderer::api::core::{max_mipmap_count, DeviceCreateParams, DeviceKind};
use ren3d_core::renderer::api::resource::{
    BufferDescriptor, BufferKind, BufferUsage, PixelFormat, ShaderDescriptor,
    ShaderInputBinding, ShaderKind, ShaderStageDescriptor, Texture2dDescriptor, UniformKind,
    UniformValue, VertexAttribute, VertexAttributeFormat, VertexAttributeSource,
    VertexInputDescriptor,
};
use ren3d_core::renderer::RenderDevice;
use ren3d_core::tasks::TaskPool;
use ren3d_infra::{GlDeviceFactory, HeadlessContextProvider};
use serde::{Deserialize, Serialize};
use std::fs;

const VERTEX_SOURCE: &str = "attribute vec3 a_position;\n\
    attribute vec2 a_uv;\n\
    varying vec2 v_uv;\n\
    uniform mat4 u_mvp;\n\
    void main() { v_uv = a_uv; gl_Position = u_mvp * vec4(a_position, 1.0); }";

const FRAGMENT_SOURCE: &str = "varying vec2 v_uv;\n\
    uniform sampler2D u_texture;\n\
    uniform vec4 u_tint;\n\
    void main() { gl_FragColor = texture2D(u_texture, v_uv) * u_tint; }";

const TEXTURE_SIZE: u32 = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct DemoConfig {
    device: DeviceCreateParams,
    fallback: Vec<DeviceKind>,
    frames: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            device: DeviceCreateParams::default(),
            fallback: DeviceKind::ALL.to_vec(),
            frames: 3,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    uv: [f32; 2],
}

fn load_config() -> Result<DemoConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(DemoConfig::default());
    };
    let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
}

fn checkerboard(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(PixelFormat::Rgba8Unorm.image_size(size, size));
    for y in 0..size {
        for x in 0..size {
            let color = if (x / 8 + y / 8) % 2 == 0 {
                Rgba8::WHITE
            } else {
                Rgba8::rgb(96, 64, 32)
            };
            pixels.extend_from_slice(bytemuck::bytes_of(&color));
        }
    }
    pixels
}

fn quad() -> (Vec<Vertex>, Vec<u16>) {
    let vertices = vec![
        Vertex {
            position: [-1.0, -1.0, 0.0],
            uv: [0.0, 0.0],
        },
        Vertex {
            position: [1.0, -1.0, 0.0],
            uv: [1.0, 0.0],
        },
        Vertex {
            position: [1.0, 1.0, 0.0],
            uv: [1.0, 1.0],
        },
        Vertex {
            position: [-1.0, 1.0, 0.0],
            uv: [0.0, 1.0],
        },
    ];
    (vertices, vec![0, 1, 2, 2, 3, 0])
}

fn main() -> Result<()> {
    logging::init("info");
    let config = load_config()?;

    // Asset preparation runs on the pool while the device comes up.
    let mut pool = TaskPool::new(2)?;
    let texels = pool.spawn(|| checkerboard(TEXTURE_SIZE))?;
    let mesh = pool.spawn(quad)?;

    let mut factory = GlDeviceFactory::new(HeadlessContextProvider::new());
    let selection = factory.create_with_fallback(&config.device, &config.fallback)?;
    log::info!(
        "Selected {} after trying {:?} in {} ms",
        selection.kind,
        selection.attempted,
        selection.selection_time_ms
    );
    let mut device = selection.device;

    let texels = texels.wait()?;
    let (vertices, indices) = mesh.wait()?;
    pool.shutdown();

    let texture = device.create_texture_2d(&Texture2dDescriptor {
        pixel_format: PixelFormat::Rgba8Unorm,
        width: TEXTURE_SIZE,
        height: TEXTURE_SIZE,
        mipmap_count: max_mipmap_count(TEXTURE_SIZE, TEXTURE_SIZE),
        data: Some(&texels),
    })?;
    device.generate_mipmaps(texture)?;

    let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
    let index_bytes: &[u8] = bytemuck::cast_slice(&indices);
    let vertex_buffer = device.create_buffer(&BufferDescriptor {
        kind: BufferKind::Vertex,
        usage: BufferUsage::StaticDraw,
        size: vertex_bytes.len(),
        data: Some(vertex_bytes),
    })?;
    let index_buffer = device.create_buffer(&BufferDescriptor {
        kind: BufferKind::Index,
        usage: BufferUsage::StaticDraw,
        size: index_bytes.len(),
        data: Some(index_bytes),
    })?;

    let stride = std::mem::size_of::<Vertex>();
    let attributes = [
        VertexAttribute {
            location: 0,
            source: VertexAttributeSource::Buffer {
                format: VertexAttributeFormat::Rgb32Sfloat,
                vertex_buffer,
                offset: 0,
                stride,
            },
        },
        VertexAttribute {
            location: 1,
            source: VertexAttributeSource::Buffer {
                format: VertexAttributeFormat::Rg32Sfloat,
                vertex_buffer,
                offset: 12,
                stride,
            },
        },
    ];
    let vertex_input = device.create_vertex_input(&VertexInputDescriptor {
        index_buffer: Some(index_buffer),
        attributes: &attributes,
    })?;

    let vertex_shader = device.create_shader(&ShaderDescriptor {
        kind: ShaderKind::Vertex,
        source: VERTEX_SOURCE,
    })?;
    let fragment_shader = device.create_shader(&ShaderDescriptor {
        kind: ShaderKind::Fragment,
        source: FRAGMENT_SOURCE,
    })?;
    let stage = device.create_shader_stage(&ShaderStageDescriptor {
        vertex_shader,
        fragment_shader,
        input_bindings: &[
            ShaderInputBinding {
                name: "a_position",
                location: 0,
            },
            ShaderInputBinding {
                name: "a_uv",
                location: 1,
            },
        ],
    })?;
    // Linked stages keep their own copy of the code.
    device.destroy_shader(vertex_shader);
    device.destroy_shader(fragment_shader);

    let mvp = device.find_uniform(stage, "u_mvp", UniformKind::Mat4)?;
    let tint = device.find_uniform(stage, "u_tint", UniformKind::Vec4)?;
    let sampler_unit = device.find_uniform(stage, "u_texture", UniformKind::Sampler2d)?;

    let size = config.device.window.size;
    let mut queue = CommandQueue::new();
    for frame in 0..config.frames {
        let fade = 1.0 - frame as f32 / config.frames.max(1) as f32;
        let mut identity = [0.0_f32; 16];
        for i in 0..4 {
            identity[i * 5] = 1.0;
        }

        let mut buffer = queue.acquire(CommandBufferParams::default());
        buffer
            .begin_write()
            .write(ClearCommand {
                color: Rgba8::rgb(16, 16, 24),
            })
            .write(ViewportCommand {
                x: 0,
                y: 0,
                width: i32::try_from(size.width)?,
                height: i32::try_from(size.height)?,
                min_depth: 0.0,
                max_depth: 1.0,
            })
            .write(DepthTestCommand { enabled: true })
            .write(BlendingCommand { enabled: true })
            .write(BlendingFuncCommand {
                src_factor: BlendFactor::SrcAlpha,
                dst_factor: BlendFactor::OneMinusSrcAlpha,
            })
            .write(BindTextureCommand {
                texture: Some(texture),
            })
            .write(BindVertexInputCommand {
                vertex_input: Some(vertex_input),
            })
            .write(BindShaderStageCommand {
                shader_stage: Some(stage),
            })
            .write(SetUniformCommand {
                uniform: mvp,
                value: UniformValue::Mat4(identity),
            })
            .write(SetUniformCommand {
                uniform: tint,
                value: UniformValue::Vec4([1.0, 1.0, 1.0, fade]),
            })
            .write(SetUniformCommand {
                uniform: sampler_unit,
                value: UniformValue::Sampler2d(0),
            })
            .write(DrawIndexedCommand {
                topology: PrimitiveTopology::TriangleList,
                vertex_count: indices.len(),
                index_byte_depth: std::mem::size_of::<u16>(),
                index_buffer_offset: 0,
                index_offset: 0,
            });
        queue.enqueue(buffer);

        device.submit_commands(&mut queue)?;
        device.present()?;
        let stats = device.stats();
        log::info!(
            "Frame {}: {} command(s), {} draw call(s), {} index(es)",
            stats.frame_number,
            stats.commands_executed,
            stats.draw_calls,
            stats.indices_submitted
        );
    }

    if let Some(gl) = factory.provider().last_gl() {
        log::info!(
            "Recorded {} native call(s), {} live object(s) before teardown",
            gl.calls().len(),
            gl.total_live_objects()
        );
    }
    Ok(())
}
