//! 截图会话、背景与渲染器

mod background;
mod renderer;
mod session;

pub use background::{decode_background, load_background_image, Background};
pub use renderer::{encode_png, Renderer, SoftwareRenderer};
pub use session::CaptureSession;
