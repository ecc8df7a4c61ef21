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

//! The fixed shader drawing the validation triangle.

/// Name of the vertex stage entry point in [`TRIANGLE_WGSL`].
pub const VERTEX_ENTRY_POINT: &str = "vs_main";

/// Name of the fragment stage entry point in [`TRIANGLE_WGSL`].
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// WGSL source for a red triangle whose vertices are derived from the vertex index,
/// so the draw needs no vertex buffer.
pub const TRIANGLE_WGSL: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
    );
    return vec4<f32>(positions[index], 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_are_declared_with_their_stage() {
        assert!(TRIANGLE_WGSL.contains(&format!("@vertex\nfn {VERTEX_ENTRY_POINT}(")));
        assert!(TRIANGLE_WGSL.contains(&format!("@fragment\nfn {FRAGMENT_ENTRY_POINT}(")));
    }
}
