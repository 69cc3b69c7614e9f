use std::fs;
use std::rc::Rc;
use std::time::{Duration, Instant};

use proctex::{FixedRatio, HeadlessFactory, SceneHandle, TextureBase, TextureRecord};
use tempfile::TempDir;
use texconfig::TextureConfig;

const CONFIG: &str = r#"
version = 1

[clock]
reference_frame = "10ms"

[defaults]
brightness = 0.4

[textures.embers]
size = 64
octaves = 4
animation_speed_x = 2.0
animation_speed_y = 0.0
"#;

#[test]
fn loads_config_from_disk_and_builds_textures() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("textures.toml");
    fs::write(&path, CONFIG).unwrap();

    let config = TextureConfig::load(&path).expect("load config");
    let clock = Rc::new(config.frame_clock());
    let scene: SceneHandle = Some(clock.clone());

    let preset = config.preset("embers").expect("embers preset");
    let mut texture = preset.build(scene, &HeadlessFactory).expect("build texture");
    assert_eq!(texture.name(), "embers");
    assert_eq!(texture.base().descriptor().size, 64);
    assert_eq!(texture.parameters.brightness, 0.4);

    // Construction ticked once at ratio 1.0 with the preset's speeds.
    let before = texture.time_offset();
    assert!((before[0] - 0.002).abs() < 1e-9);
    assert_eq!(before[1], 0.0);
    assert_eq!(texture.base().uniforms().float("brightness"), Some(0.4));
    assert_eq!(texture.base().uniforms().int("octaves"), Some(4));

    let start = Instant::now();
    clock.begin_frame(start);
    clock.begin_frame(start + Duration::from_millis(20));
    texture.render(false);
    let after = texture.time_offset();
    assert!((after[0] - before[0] - 0.004).abs() < 1e-9);
    assert_eq!(after[1], 0.0);

    let record = TextureRecord::from_json(&texture.serialize().to_json()).unwrap();
    assert_eq!(record.i32("octaves"), Some(4));
    assert_eq!(record.f32("animationSpeedFactorX"), Some(2.0));
}

#[test]
fn motionless_preset_starts_with_its_own_uniforms() {
    let config = TextureConfig::from_toml_str(
        r#"
version = 1

[textures.still]
brightness = 0.9
animation_speed_x = 0.0
animation_speed_y = 0.0
"#,
    )
    .unwrap();
    let preset = config.preset("still").unwrap();
    let scene: SceneHandle = Some(Rc::new(FixedRatio(1.0)));
    let texture = preset.build(scene, &HeadlessFactory).unwrap();

    assert_eq!(texture.time_offset(), [0.0, 0.0]);
    let uniforms = texture.base().uniforms();
    assert_eq!(uniforms.float("brightness"), Some(0.9));
    assert_eq!(uniforms.vector2("timeScale"), Some([0.0, 0.0]));
}

#[test]
fn load_reports_missing_file_with_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = TextureConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
}

#[test]
fn load_reports_invalid_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "version = 1\n[textures.x]\nbrightness = 3.0\n").unwrap();
    let err = TextureConfig::load(&path).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("bad.toml"));
    assert!(message.contains("brightness"));
}
