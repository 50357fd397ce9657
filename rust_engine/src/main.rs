use std::path::PathBuf;

use anyhow::{Context, Result};
use avatar_capture::animation::{AnimationPlayer, GltfAnimationPlayer};
use avatar_capture::bounds::compute_offsets;
use avatar_capture::capture::{load_background_image, Background, CaptureSession, SoftwareRenderer};
use avatar_capture::config::{self, CaptureConfig};
use avatar_capture::dataset::{LoraDataGenerator, LoraRequest};
use avatar_capture::framing::ShotPreset;
use avatar_capture::model::{load_gltf, mannequin, CharacterModel};
use avatar_capture::prefs::{AtlasKind, MergeOptions, PreferenceStore};
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;

#[derive(Parser, Debug)]
#[command(name = "avatar-capture", version, about = "Avatar framing, screenshots and LoRA dataset export")]
struct Cli {
    /// JSON capture config (missing fields use defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print rest-pose bone offsets
    Offsets {
        /// glTF/GLB character; the built-in mannequin when omitted
        #[arg(long)]
        model: Option<PathBuf>,
        #[arg(long)]
        min_weight: Option<f32>,
    },
    /// Frame a preset shot and write a PNG
    Shot {
        #[arg(long)]
        model: Option<PathBuf>,
        #[arg(long, default_value = "full")]
        preset: String,
        /// front, back, left, right or x,y,z
        #[arg(long, default_value = "front")]
        bias: String,
        /// glTF/GLB animation applied before framing
        #[arg(long)]
        animation: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        time: f32,
        /// Grayscale value 0..1 or an image path/URL
        #[arg(long)]
        background: Option<String>,
        #[arg(long, default_value_t = 512)]
        width: u32,
        #[arg(long, default_value_t = 512)]
        height: u32,
        #[arg(long, default_value = "shot.png")]
        out: PathBuf,
    },
    /// Export a LoRA dataset zip from a manifest
    Dataset {
        /// Manifest path or URL
        manifest: String,
        #[arg(long)]
        model: Option<PathBuf>,
        /// Folder name inside the archive
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        zip_name: Option<String>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Show or edit merge option preferences
    Prefs {
        #[arg(long, default_value = "preferences.json")]
        store: PathBuf,
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    NextMode,
    PrevMode,
    SetAtlas { kind: AtlasArg, level: i64 },
    DropDownload {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AtlasArg {
    Std,
    StdTransp,
    Mtoon,
    MtoonTransp,
}

impl From<AtlasArg> for AtlasKind {
    fn from(arg: AtlasArg) -> Self {
        match arg {
            AtlasArg::Std => AtlasKind::StandardOpaque,
            AtlasArg::StdTransp => AtlasKind::StandardTransparent,
            AtlasArg::Mtoon => AtlasKind::MToonOpaque,
            AtlasArg::MtoonTransp => AtlasKind::MToonTransparent,
        }
    }
}

fn load_character(path: Option<&PathBuf>) -> Result<CharacterModel> {
    match path {
        Some(path) => load_gltf(path).with_context(|| format!("load character {}", path.display())),
        None => Ok(mannequin()),
    }
}

fn parse_bias(text: &str) -> Result<Vec3> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() == 3 {
        let mut v = [0.0f32; 3];
        for (slot, part) in v.iter_mut().zip(&parts) {
            *slot = part.parse().with_context(|| format!("invalid bias component '{}'", part))?;
        }
        return Ok(Vec3::from(v));
    }
    Ok(avatar_capture::dataset::CameraBias::Named(text.to_string()).to_vec3())
}

fn parse_background(text: &str) -> Result<Background> {
    match text.parse::<f32>() {
        Ok(value) => Ok(Background::grayscale(value)),
        Err(_) => Ok(load_background_image(text)?),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        config::set_config(config::load_config(path)?);
    }
    let config: CaptureConfig = config::get_config();

    match cli.cmd {
        Command::Offsets { model, min_weight } => {
            let mut character = load_character(model.as_ref())?;
            let min_weight = min_weight.unwrap_or(config.min_weight);
            let offsets = compute_offsets(&mut character, &config.offset_bones, min_weight)?;
            println!("Bone offsets for '{}' (min weight {:.2}):", character.name, min_weight);
            for (name, offset) in offsets.iter() {
                if offset.is_empty() {
                    println!("  {:<16} (no vertices)", name);
                } else {
                    println!("  {:<16} min={:.3} max={:.3}", name, offset.min, offset.max);
                }
            }
        }
        Command::Shot { model, preset, bias, animation, time, background, width, height, out } => {
            let mut character = load_character(model.as_ref())?;
            let preset: ShotPreset = preset.parse()?;
            let bias = parse_bias(&bias)?;

            let mut session = CaptureSession::begin(&mut character, &config)?;
            if let Some(location) = &animation {
                GltfAnimationPlayer::new().load_animation(session.character_mut(), location, time)?;
            }
            if let Some(background) = &background {
                session.set_background(parse_background(background)?);
            }

            let camera = session.frame_preset(preset, bias)?;
            let png = session.capture_png(&mut SoftwareRenderer::new(), &camera, width, height)?;
            std::fs::write(&out, png).with_context(|| format!("write {}", out.display()))?;
            println!(
                "Wrote {} shot ({}x{}) to {} from camera at {:.3}",
                preset, width, height, out.display(), camera.position
            );
        }
        Command::Dataset { manifest, model, name, zip_name, out_dir } => {
            let mut character = load_character(model.as_ref())?;
            let request = LoraRequest {
                manifest,
                name,
                zip_name,
                output_dir: out_dir,
            };
            let report = LoraDataGenerator::new(config).generate(&mut character, &request, None)?;
            match report.zip_path {
                Some(path) => println!("Wrote {} entries to {}", report.entry_count, path.display()),
                None => println!("Manifest has no dataCollection, nothing written"),
            }
        }
        Command::Prefs { store, action } => {
            let mut store = PreferenceStore::open(&store)?;
            let mut options = MergeOptions::load(&store);
            if let Some(action) = action {
                match action {
                    PrefsAction::NextMode => {
                        options.next_mode();
                    }
                    PrefsAction::PrevMode => {
                        options.prev_mode();
                    }
                    PrefsAction::SetAtlas { kind, level } => {
                        if !(0..=8).contains(&level) {
                            log::warn!("Atlas level {} clamped to 0..=8", level);
                        }
                        options.set_atlas_size(kind.into(), level);
                    }
                    PrefsAction::DropDownload { enabled } => options.drop_download = enabled,
                }
                options.save(&mut store)?;
            }

            println!("Merge mode: {}", options.mode);
            for kind in AtlasKind::ALL {
                let visible = match kind {
                    AtlasKind::StandardOpaque | AtlasKind::StandardTransparent => options.shows_standard(),
                    AtlasKind::MToonOpaque | AtlasKind::MToonTransparent => options.shows_mtoon(),
                };
                if visible {
                    println!(
                        "  {:<40} level {} ({}px)",
                        kind.key(),
                        options.atlas_size(kind),
                        options.atlas_resolution(kind)
                    );
                }
            }
            println!("Download on drop: {}", options.drop_download);
        }
    }

    Ok(())
}
