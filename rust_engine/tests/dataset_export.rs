//! 数据集导出端到端测试

use std::io::Read;

use avatar_capture::animation::AnimationPlayer;
use avatar_capture::dataset::{LoraDataGenerator, LoraRequest};
use avatar_capture::model::{mannequin, CharacterModel};
use avatar_capture::{CaptureConfig, Result};

/// 保持静止姿态的播放器
struct RestPosePlayer;

impl AnimationPlayer for RestPosePlayer {
    fn load_animation(&mut self, _model: &mut CharacterModel, location: &str, _time: f32) -> Result<()> {
        assert!(location.starts_with("anim/"), "unexpected location {}", location);
        Ok(())
    }
}

const MANIFEST: &str = r#"{
    "assetsLocation": "",
    "animationsDirectory": "anim",
    "backgroundGrayscale": 0.8,
    "backgroundDescription": "simple grey background",
    "width": 48,
    "height": 64,
    "dataCollection": [
        {"animationPath": "idle.glb", "cameraFrame": "closeup", "cameraPosition": "front", "description": "portrait"},
        {"animationPath": "idle.glb", "animationFrame": 30, "cameraFrame": "cowboy", "cameraPosition": "left", "description": "side view"},
        {"animationPath": "walk.glb", "animationTime": 0.5, "description": "full body"}
    ]
}"#;

#[test]
fn test_export_zip_with_three_items() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("manifest.json");
    std::fs::write(&manifest_path, MANIFEST).unwrap();

    let mut generator =
        LoraDataGenerator::new(CaptureConfig::default()).with_player(Box::new(RestPosePlayer));
    let mut character = mannequin();
    let mut request = LoraRequest::new(manifest_path.to_str().unwrap());
    request.output_dir = dir.path().to_path_buf();

    let report = generator.generate(&mut character, &request, None).unwrap();
    assert_eq!(report.entry_count, 6);
    let zip_path = report.zip_path.unwrap();
    assert_eq!(zip_path, dir.path().join("lora_zip.zip"));

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&zip_path).unwrap()).unwrap();
    assert_eq!(archive.len(), 6);

    let descriptions = ["portrait", "side view", "full body"];
    for (i, description) in descriptions.iter().enumerate() {
        let name = format!("lora_Data/{:04}", i + 1);

        let mut caption = String::new();
        archive
            .by_name(&format!("{}.txt", name))
            .unwrap()
            .read_to_string(&mut caption)
            .unwrap();
        assert!(caption.contains(description));
        assert!(caption.contains("simple grey background"));
        assert!(caption.starts_with("anata "));

        let mut png = Vec::new();
        archive
            .by_name(&format!("{}.png", name))
            .unwrap()
            .read_to_end(&mut png)
            .unwrap();
        let image = image::load_from_memory(&png).unwrap();
        assert_eq!((image.width(), image.height()), (48, 64));
    }
}

#[test]
fn test_custom_zip_and_folder_names() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("manifest.json");
    std::fs::write(&manifest_path, MANIFEST).unwrap();

    let mut config = CaptureConfig::default();
    config.trigger_word = "ohwx".to_string();
    let mut generator = LoraDataGenerator::new(config).with_player(Box::new(RestPosePlayer));
    let mut character = mannequin();

    let request = LoraRequest {
        manifest: manifest_path.to_str().unwrap().to_string(),
        name: Some("avatar_set".to_string()),
        zip_name: Some("export".to_string()),
        output_dir: dir.path().to_path_buf(),
    };
    let report = generator.generate(&mut character, &request, None).unwrap();
    let zip_path = report.zip_path.unwrap();
    assert!(zip_path.ends_with("export.zip"));

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&zip_path).unwrap()).unwrap();
    let mut caption = String::new();
    archive
        .by_name("avatar_set/0003.txt")
        .unwrap()
        .read_to_string(&mut caption)
        .unwrap();
    assert_eq!(caption, "ohwx full body simple grey background");
}
