use super::error::ShaderError;
use egui_glow::glow;

const VERTEX_SHADER_SOURCE: &str = r#"
    out vec2 v_uv;
    out vec2 fragTexCoord;
    out vec4 fragColor;

    const vec2 verts[4] = vec2[4](
        vec2(-1.0, -1.0), vec2(1.0, -1.0),
        vec2(-1.0, 1.0),  vec2(1.0, 1.0)
    );

    void main() {
        vec2 pos = verts[gl_VertexID];
        v_uv = pos * 0.5 + 0.5;
        fragTexCoord = vec2(v_uv.x, 1.0 - v_uv.y);
        fragColor = vec4(1.0);
        gl_Position = vec4(pos, 0.0, 1.0);
    }
"#;

/// Draws the texture unchanged; used when no valid program is selected.
const PASSTHROUGH_FRAGMENT_SOURCE: &str = r#"
    in vec2 fragTexCoord;
    in vec4 fragColor;

    uniform sampler2D texture0;
    uniform vec4 colDiffuse;

    out vec4 finalColor;

    void main() {
        finalColor = texture(texture0, fragTexCoord) * colDiffuse * fragColor;
    }
"#;

/// A linked program plus the vertex array it draws the quad with.
#[derive(Debug, Clone, Copy)]
pub struct ShaderRenderer {
    pub program: glow::Program,
    pub vertex_array: glow::VertexArray,
}

impl ShaderRenderer {
    pub fn new(gl: &glow::Context, fragment_shader_source: &str) -> Result<Self, ShaderError> {
        use glow::HasContext as _;

        let version = egui_glow::ShaderVersion::get(gl).version_declaration();

        // SAFETY: All OpenGL calls are made with a valid context.
        // Error handling ensures resources are cleaned up on failure.
        unsafe {
            let program = gl.create_program().map_err(ShaderError::Resource)?;

            let shader_sources = [
                (glow::VERTEX_SHADER, with_version(VERTEX_SHADER_SOURCE, version)),
                (glow::FRAGMENT_SHADER, with_version(fragment_shader_source, version)),
            ];

            let mut shaders = Vec::with_capacity(shader_sources.len());

            for (shader_type, shader_source) in shader_sources.iter() {
                let shader = match gl.create_shader(*shader_type) {
                    Ok(shader) => shader,
                    Err(e) => {
                        delete_shaders(gl, program, &shaders);
                        gl.delete_program(program);
                        return Err(ShaderError::Resource(e));
                    }
                };

                gl.shader_source(shader, shader_source);
                gl.compile_shader(shader);

                if !gl.get_shader_compile_status(shader) {
                    let info_log = gl.get_shader_info_log(shader);
                    gl.delete_shader(shader);
                    delete_shaders(gl, program, &shaders);
                    gl.delete_program(program);
                    return Err(ShaderError::Compile(info_log));
                }

                gl.attach_shader(program, shader);
                shaders.push(shader);
            }

            gl.link_program(program);
            let linked = gl.get_program_link_status(program);
            let info_log = if linked { String::new() } else { gl.get_program_info_log(program) };

            // Shader objects are not needed once the program is linked (or failed to).
            delete_shaders(gl, program, &shaders);

            if !linked {
                gl.delete_program(program);
                return Err(ShaderError::Link(info_log));
            }

            let vertex_array = match gl.create_vertex_array() {
                Ok(vertex_array) => vertex_array,
                Err(e) => {
                    gl.delete_program(program);
                    return Err(ShaderError::Resource(e));
                }
            };

            Ok(Self { program, vertex_array })
        }
    }

    pub fn passthrough(gl: &glow::Context) -> Result<Self, ShaderError> {
        Self::new(gl, PASSTHROUGH_FRAGMENT_SOURCE)
    }

    pub fn destroy(&self, gl: &glow::Context) {
        use glow::HasContext as _;
        // SAFETY: Deleting resources that were created with the same context.
        unsafe {
            gl.delete_program(self.program);
            gl.delete_vertex_array(self.vertex_array);
        }
    }

    pub fn paint(&self, gl: &glow::Context, time: f32, size: egui::Vec2, texture: Option<glow::Texture>) {
        use glow::HasContext as _;
        // SAFETY: Rendering with a valid OpenGL context and program.
        // All uniform locations are queried before use.
        unsafe {
            gl.use_program(Some(self.program));

            if let Some(texture) = texture {
                gl.active_texture(glow::TEXTURE0);
                gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            }
            if let Some(loc) = gl.get_uniform_location(self.program, "texture0") {
                gl.uniform_1_i32(Some(&loc), 0);
            }
            if let Some(loc) = gl.get_uniform_location(self.program, "colDiffuse") {
                gl.uniform_4_f32(Some(&loc), 1.0, 1.0, 1.0, 1.0);
            }
            if let Some(loc) = gl.get_uniform_location(self.program, "u_time") {
                gl.uniform_1_f32(Some(&loc), time);
            }
            if let Some(loc) = gl.get_uniform_location(self.program, "u_resolution") {
                gl.uniform_2_f32(Some(&loc), size.x, size.y);
            }

            gl.bind_vertex_array(Some(self.vertex_array));
            gl.draw_arrays(glow::TRIANGLE_STRIP, 0, 4);

            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }
}

unsafe fn delete_shaders(gl: &glow::Context, program: glow::Program, shaders: &[glow::Shader]) {
    use glow::HasContext as _;
    for &shader in shaders {
        unsafe {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }
    }
}

/// Sources that bring their own `#version` line are used as-is; everything
/// else gets the context's version declaration prepended.
pub fn with_version(source: &str, version_declaration: &str) -> String {
    if source.trim_start().starts_with("#version") {
        source.to_string()
    } else {
        format!("{}\n{}", version_declaration, source)
    }
}
