//! 数据集生成

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use super::{ArchiveWriter, Manifest, ZipArchive};
use crate::animation::{AnimationPlayer, GltfAnimationPlayer};
use crate::capture::{Background, CaptureSession, Renderer, SoftwareRenderer};
use crate::config::CaptureConfig;
use crate::fetch::fetch_text;
use crate::model::CharacterModel;
use crate::Result;

/// 生成请求
#[derive(Clone, Debug)]
pub struct LoraRequest {
    /// 清单位置（文件路径或 URL）
    pub manifest: String,
    /// 归档内目录名，缺省取配置中的 `dataset_folder`
    pub name: Option<String>,
    /// zip 文件名（不含扩展名），缺省取配置中的 `zip_name`
    pub zip_name: Option<String>,
    /// 自行创建 zip 时的输出目录
    pub output_dir: PathBuf,
}

impl LoraRequest {
    pub fn new(manifest: impl Into<String>) -> Self {
        Self {
            manifest: manifest.into(),
            name: None,
            zip_name: None,
            output_dir: PathBuf::from("."),
        }
    }
}

/// 生成结果
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoraReport {
    /// 写入的条目数（图片与文本各算一条）
    pub entry_count: usize,
    /// 生成器自行创建的 zip 路径
    pub zip_path: Option<PathBuf>,
}

/// LoRA 数据集生成器
pub struct LoraDataGenerator {
    config: CaptureConfig,
    renderer: Box<dyn Renderer>,
    player: Box<dyn AnimationPlayer>,
}

impl LoraDataGenerator {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            renderer: Box::new(SoftwareRenderer::new()),
            player: Box::new(GltfAnimationPlayer::new()),
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_player(mut self, player: Box<dyn AnimationPlayer>) -> Self {
        self.player = player;
        self
    }

    /// 生成数据集
    ///
    /// 提供 `archive` 时写入其中；否则在 `output_dir` 下创建 `<zip_name>.zip`。
    /// 清单或动画获取失败时中止；清单没有 `dataCollection` 时不写任何内容。
    pub fn generate(
        &mut self,
        character: &mut CharacterModel,
        request: &LoraRequest,
        archive: Option<&mut dyn ArchiveWriter>,
    ) -> Result<LoraReport> {
        let manifest = Manifest::from_json(&fetch_text(&request.manifest)?)?;
        if manifest.data_collection.is_none() {
            log::warn!("Manifest {} has no dataCollection, nothing to export", request.manifest);
            return Ok(LoraReport::default());
        }

        match archive {
            Some(archive) => {
                let entry_count = self.write_items(character, &manifest, request, archive)?;
                Ok(LoraReport {
                    entry_count,
                    zip_path: None,
                })
            }
            None => {
                let zip_name = request
                    .zip_name
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(self.config.zip_name.as_str());
                let zip_path = request.output_dir.join(format!("{}.zip", zip_name));

                let mut zip = ZipArchive::new(BufWriter::new(File::create(&zip_path)?));
                let entry_count = self.write_items(character, &manifest, request, &mut zip)?;
                zip.finish()?.flush()?;

                log::info!("Saved LoRA dataset to {}", zip_path.display());
                Ok(LoraReport {
                    entry_count,
                    zip_path: Some(zip_path),
                })
            }
        }
    }

    fn write_items(
        &mut self,
        character: &mut CharacterModel,
        manifest: &Manifest,
        request: &LoraRequest,
        archive: &mut dyn ArchiveWriter,
    ) -> Result<usize> {
        let folder = request
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(self.config.dataset_folder.as_str())
            .to_string();

        let background = Background::grayscale(manifest.background_grayscale);
        let mut session = CaptureSession::begin_with_background(character, &self.config, background)?;

        let mut entry_count = 0;
        for (index, item) in manifest.items().iter().enumerate() {
            let save_name = format!("{:04}", index + 1);
            let time = item.time(self.config.animation_fps)?;
            let location = manifest.animation_location(item);
            self.player.load_animation(session.character_mut(), &location, time)?;

            let camera = session.frame_preset(item.shot_preset(), item.camera_bias())?;
            let png = session.capture_png(self.renderer.as_mut(), &camera, manifest.width, manifest.height)?;
            archive.add_entry(&folder, &save_name, "png", &png)?;

            let caption = manifest.caption(&self.config.trigger_word, item);
            archive.add_entry(&folder, &save_name, "txt", caption.as_bytes())?;
            entry_count += 2;

            log::debug!("Captured {} ({} at {:.3}s)", save_name, location, time);
        }

        log::info!(
            "Exported {} dataset items into '{}'",
            manifest.items().len(),
            folder
        );
        Ok(entry_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MemoryArchive;
    use crate::model::mannequin;
    use std::sync::{Arc, Mutex};

    /// 记录加载请求，不改变姿态
    struct RecordingPlayer(Arc<Mutex<Vec<(String, f32)>>>);

    impl AnimationPlayer for RecordingPlayer {
        fn load_animation(&mut self, _model: &mut CharacterModel, location: &str, time: f32) -> Result<()> {
            self.0.lock().unwrap().push((location.to_string(), time));
            Ok(())
        }
    }

    fn write_manifest(dir: &std::path::Path, json: &str) -> String {
        let path = dir.join("manifest.json");
        std::fs::write(&path, json).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_generate_into_memory_archive() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(
            dir.path(),
            r#"{
                "animationsDirectory": "anim",
                "backgroundDescription": "grey studio",
                "width": 32, "height": 32,
                "dataCollection": [
                    {"animationPath": "idle.glb", "animationTime": 0.25, "cameraFrame": "closeup", "description": "smiling"},
                    {"animationPath": "walk.glb", "animationFrame": 15, "cameraFrame": "full", "description": "walking"}
                ]
            }"#,
        );

        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut generator = LoraDataGenerator::new(CaptureConfig::default())
            .with_player(Box::new(RecordingPlayer(Arc::clone(&calls))));
        let mut model = mannequin();
        let mut archive = MemoryArchive::new();

        let mut request = LoraRequest::new(manifest);
        request.name = Some("set_a".to_string());
        let report = generator.generate(&mut model, &request, Some(&mut archive)).unwrap();

        assert_eq!(report.entry_count, 4);
        assert_eq!(report.zip_path, None);
        assert_eq!(
            archive.names(),
            vec!["set_a/0001.png", "set_a/0001.txt", "set_a/0002.png", "set_a/0002.txt"]
        );
        assert_eq!(archive.get("set_a/0002.txt"), Some(&b"anata walking grey studio"[..]));

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0], ("anim/idle.glb".to_string(), 0.25));
        assert_eq!(calls[1].0, "anim/walk.glb");
        assert!((calls[1].1 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_manifest_aborts() {
        let mut generator = LoraDataGenerator::new(CaptureConfig::default());
        let mut model = mannequin();
        let mut archive = MemoryArchive::new();
        let result = generator.generate(
            &mut model,
            &LoraRequest::new("/nonexistent/manifest.json"),
            Some(&mut archive),
        );
        assert!(matches!(result, Err(crate::CaptureError::Fetch(_))));
        assert!(archive.is_empty());
    }

    #[test]
    fn test_animation_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path(), r#"{"dataCollection": [{"animationPath": "missing.glb"}]}"#);
        let mut generator = LoraDataGenerator::new(CaptureConfig::default());
        let mut model = mannequin();
        let mut archive = MemoryArchive::new();
        assert!(generator
            .generate(&mut model, &LoraRequest::new(manifest), Some(&mut archive))
            .is_err());
    }

    #[test]
    fn test_no_data_collection_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path(), r#"{"width": 64}"#);
        let mut generator = LoraDataGenerator::new(CaptureConfig::default());
        let mut model = mannequin();

        let mut request = LoraRequest::new(manifest);
        request.output_dir = dir.path().to_path_buf();
        let report = generator.generate(&mut model, &request, None).unwrap();
        assert_eq!(report, LoraReport::default());
        assert!(!dir.path().join("lora_zip.zip").exists());
    }

    #[test]
    fn test_huge_animation_frame_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(
            dir.path(),
            r#"{"dataCollection": [{"animationPath": "idle.glb", "animationFrame": 1e39}]}"#,
        );
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut generator = LoraDataGenerator::new(CaptureConfig::default())
            .with_player(Box::new(RecordingPlayer(Arc::clone(&calls))));
        let mut model = mannequin();
        let mut archive = MemoryArchive::new();

        let result = generator.generate(&mut model, &LoraRequest::new(manifest), Some(&mut archive));
        assert!(matches!(result, Err(crate::CaptureError::Manifest(_))));
        assert!(calls.lock().unwrap().is_empty());
        assert!(archive.is_empty());
    }
}
