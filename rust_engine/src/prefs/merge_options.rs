//! 合并与图集选项

use std::fmt;

use super::PreferenceStore;
use crate::Result;

const KEY_ATLAS_STD: &str = "mergeOptions_atlas_std_size";
const KEY_ATLAS_STD_TRANSP: &str = "mergeOptions_atlas_std_transp_size";
const KEY_ATLAS_MTOON: &str = "mergeOptions_atlas_mtoon_size";
const KEY_ATLAS_MTOON_TRANSP: &str = "mergeOptions_atlas_mtoon_transp_size";
const KEY_DROP_DOWNLOAD: &str = "mergeOptions_drop_download";
const KEY_SEL_OPTION: &str = "mergeOptions_sel_option";

/// 图集尺寸等级默认值
pub const DEFAULT_ATLAS_LEVEL: u8 = 6;
/// 图集尺寸等级上限
pub const MAX_ATLAS_LEVEL: u8 = 8;

/// 尺寸等级对应的图集边长：1~8 对应 128~16384，其余为 4096
pub fn atlas_resolution(level: u8) -> u32 {
    match level {
        1..=8 => 64 << level,
        _ => 4096,
    }
}

/// 合并方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeMode {
    #[default]
    Standard,
    MToon,
    KeepBoth,
}

impl MergeMode {
    pub const ALL: [MergeMode; 3] = [MergeMode::Standard, MergeMode::MToon, MergeMode::KeepBoth];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            MergeMode::Standard => "Merge to Standard",
            MergeMode::MToon => "Merge to MToon",
            MergeMode::KeepBoth => "Keep Both",
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 四种图集
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtlasKind {
    StandardOpaque,
    StandardTransparent,
    MToonOpaque,
    MToonTransparent,
}

impl AtlasKind {
    pub const ALL: [AtlasKind; 4] = [
        AtlasKind::StandardOpaque,
        AtlasKind::StandardTransparent,
        AtlasKind::MToonOpaque,
        AtlasKind::MToonTransparent,
    ];

    pub fn key(self) -> &'static str {
        match self {
            AtlasKind::StandardOpaque => KEY_ATLAS_STD,
            AtlasKind::StandardTransparent => KEY_ATLAS_STD_TRANSP,
            AtlasKind::MToonOpaque => KEY_ATLAS_MTOON,
            AtlasKind::MToonTransparent => KEY_ATLAS_MTOON_TRANSP,
        }
    }
}

/// 合并选项
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOptions {
    pub atlas_std: u8,
    pub atlas_std_transp: u8,
    pub atlas_mtoon: u8,
    pub atlas_mtoon_transp: u8,
    pub drop_download: bool,
    pub mode: MergeMode,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            atlas_std: DEFAULT_ATLAS_LEVEL,
            atlas_std_transp: DEFAULT_ATLAS_LEVEL,
            atlas_mtoon: DEFAULT_ATLAS_LEVEL,
            atlas_mtoon_transp: DEFAULT_ATLAS_LEVEL,
            drop_download: false,
            mode: MergeMode::Standard,
        }
    }
}

impl MergeOptions {
    /// 从存储读取；缺失、为 0 或无法解析的值取默认
    pub fn load(store: &PreferenceStore) -> Self {
        let level = |key: &str| {
            store
                .get(key)
                .and_then(|v| v.as_i64())
                .filter(|&v| v != 0)
                .map(clamp_level)
                .unwrap_or(DEFAULT_ATLAS_LEVEL)
        };
        let mode = store
            .get(KEY_SEL_OPTION)
            .and_then(|v| v.as_u64())
            .and_then(|i| MergeMode::from_index(i as usize))
            .unwrap_or_default();

        Self {
            atlas_std: level(KEY_ATLAS_STD),
            atlas_std_transp: level(KEY_ATLAS_STD_TRANSP),
            atlas_mtoon: level(KEY_ATLAS_MTOON),
            atlas_mtoon_transp: level(KEY_ATLAS_MTOON_TRANSP),
            drop_download: store
                .get(KEY_DROP_DOWNLOAD)
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            mode,
        }
    }

    pub fn save(&self, store: &mut PreferenceStore) -> Result<()> {
        for kind in AtlasKind::ALL {
            store.set(kind.key(), self.atlas_size(kind))?;
        }
        store.set(KEY_DROP_DOWNLOAD, self.drop_download)?;
        store.set(KEY_SEL_OPTION, self.mode.index() as u64)?;
        Ok(())
    }

    pub fn atlas_size(&self, kind: AtlasKind) -> u8 {
        match kind {
            AtlasKind::StandardOpaque => self.atlas_std,
            AtlasKind::StandardTransparent => self.atlas_std_transp,
            AtlasKind::MToonOpaque => self.atlas_mtoon,
            AtlasKind::MToonTransparent => self.atlas_mtoon_transp,
        }
    }

    /// 设置尺寸等级，超出 0~8 时截断
    pub fn set_atlas_size(&mut self, kind: AtlasKind, value: i64) {
        let level = clamp_level(value);
        match kind {
            AtlasKind::StandardOpaque => self.atlas_std = level,
            AtlasKind::StandardTransparent => self.atlas_std_transp = level,
            AtlasKind::MToonOpaque => self.atlas_mtoon = level,
            AtlasKind::MToonTransparent => self.atlas_mtoon_transp = level,
        }
    }

    pub fn atlas_resolution(&self, kind: AtlasKind) -> u32 {
        atlas_resolution(self.atlas_size(kind))
    }

    pub fn next_mode(&mut self) -> MergeMode {
        self.mode = self.mode.next();
        self.mode
    }

    pub fn prev_mode(&mut self) -> MergeMode {
        self.mode = self.mode.prev();
        self.mode
    }

    /// 标准材质图集选项是否可见
    pub fn shows_standard(&self) -> bool {
        matches!(self.mode, MergeMode::Standard | MergeMode::KeepBoth)
    }

    /// MToon 图集选项是否可见
    pub fn shows_mtoon(&self) -> bool {
        matches!(self.mode, MergeMode::MToon | MergeMode::KeepBoth)
    }
}

fn clamp_level(value: i64) -> u8 {
    value.clamp(0, MAX_ATLAS_LEVEL as i64) as u8
}
