macro_rules! scene_uniforms {
    () => {
        r#"
struct SceneUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal: mat3x4<f32>,
    light_color: vec4<f32>,
    light_position: vec4<f32>,
    camera_position: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> scene: SceneUniforms;
"#
    };
}

pub const HOURGLASS_VERTEX: &str = concat!(
    scene_uniforms!(),
    r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) frag_position: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = scene.model * vec4<f32>(input.position, 1.0);
    out.clip_position = scene.projection * scene.view * world_position;

    let normal_matrix = mat3x3<f32>(
        scene.normal[0].xyz,
        scene.normal[1].xyz,
        scene.normal[2].xyz
    );
    out.normal = normal_matrix * input.normal;
    out.color = input.color;
    out.frag_position = world_position.xyz;
    return out;
}
"#
);

pub const HOURGLASS_FRAGMENT: &str = concat!(
    scene_uniforms!(),
    r#"
struct FragmentInput {
    @location(0) normal: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) frag_position: vec3<f32>,
}

@fragment
fn fs_main(input: FragmentInput) -> @location(0) vec4<f32> {
    let light_color = scene.light_color.rgb;

    let ka = 0.5;
    let ambient = ka * light_color;

    let kd = 1.0;
    let n = normalize(input.normal);
    let l = normalize(scene.light_position.xyz - input.frag_position);
    let diffuse = kd * max(dot(n, l), 0.0) * light_color;

    let ks = 1.0;
    let v = normalize(scene.camera_position.xyz - input.frag_position);
    let r = reflect(-l, n);
    let specular = ks * pow(max(dot(v, r), 0.0), 3.0) * light_color;

    let lit = (ambient + diffuse + specular) * input.color;
    return vec4<f32>(lit, 0.5);
}
"#
);

pub const GRID_VERTEX: &str = concat!(
    scene_uniforms!(),
    r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = scene.projection * scene.view * vec4<f32>(input.position, 1.0);
    out.color = input.color;
    return out;
}
"#
);

pub const GRID_FRAGMENT: &str = r#"
@fragment
fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(color, 1.0);
}
"#;
