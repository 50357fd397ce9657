//! 角色模型

mod loader;
mod mannequin;
mod runtime;

pub use loader::{load_gltf, load_gltf_slice};
pub use mannequin::{mannequin, MANNEQUIN_BONES};
pub use runtime::CharacterModel;
