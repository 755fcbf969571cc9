//! User-visible notices and their localized text

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use uvpaint_config::Language;

/// Message identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeKey {
    FillOutsideUv,
    NoIslandData,
    SymmetryEditingBlocksPaint,
    DegenerateAxis,
    NoCanvas,
    EditsCleared,
    /// Carries the filled pixel count as `{0}`
    IslandFilled,
}

impl NoticeKey {
    pub const ALL: [NoticeKey; 7] = [
        NoticeKey::FillOutsideUv,
        NoticeKey::NoIslandData,
        NoticeKey::SymmetryEditingBlocksPaint,
        NoticeKey::DegenerateAxis,
        NoticeKey::NoCanvas,
        NoticeKey::EditsCleared,
        NoticeKey::IslandFilled,
    ];

    pub fn level(self) -> NoticeLevel {
        match self {
            NoticeKey::FillOutsideUv
            | NoticeKey::NoIslandData
            | NoticeKey::SymmetryEditingBlocksPaint
            | NoticeKey::DegenerateAxis => NoticeLevel::Warning,
            NoticeKey::NoCanvas => NoticeLevel::Error,
            NoticeKey::EditsCleared | NoticeKey::IslandFilled => NoticeLevel::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A notice raised by the last operation, for the host to display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub key: NoticeKey,
    pub level: NoticeLevel,
    /// Substituted for `{0}` in the text
    pub count: Option<usize>,
}

impl Notice {
    pub fn new(key: NoticeKey) -> Self {
        Self {
            key,
            level: key.level(),
            count: None,
        }
    }

    pub fn with_count(key: NoticeKey, count: usize) -> Self {
        Self {
            count: Some(count),
            ..Self::new(key)
        }
    }

    /// Localized text with the count substituted
    pub fn text(&self, language: Language) -> String {
        let template = message(self.key, language);
        match self.count {
            Some(count) => template.replace("{0}", &count.to_string()),
            None => template.to_string(),
        }
    }
}

type MessageTable = HashMap<(NoticeKey, Language), &'static str>;

fn table() -> &'static MessageTable {
    static TABLE: OnceLock<MessageTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        use Language::{Chinese, English, Japanese};
        use NoticeKey::*;

        let entries: [(NoticeKey, [&'static str; 3]); 7] = [
            (
                FillOutsideUv,
                [
                    "点击位置不在网格 UV 覆盖区域内，无法填充。",
                    "クリック位置はUVカバー領域外のため塗りつぶせません。",
                    "Click position is outside UV coverage; cannot fill.",
                ],
            ),
            (
                NoIslandData,
                [
                    "没有可用的 UV 孤岛数据，无法填充。",
                    "UVアイランドのデータがないため塗りつぶせません。",
                    "No UV island data available; cannot fill.",
                ],
            ),
            (
                SymmetryEditingBlocksPaint,
                [
                    "正在调整对称轴，已暂时禁用绘画。请先锁定或关闭对称模式。",
                    "対称軸を編集中です。ペイントは一時的に無効です。先に軸をロックするか対称モードを無効にしてください。",
                    "Symmetry axis is being edited. Painting is temporarily disabled. Please lock the axis or disable symmetry first.",
                ],
            ),
            (
                DegenerateAxis,
                [
                    "对称轴两端点重合，镜像已跳过。",
                    "対称軸の端点が重なっているため、ミラーをスキップしました。",
                    "Symmetry axis endpoints coincide; mirroring skipped.",
                ],
            ),
            (
                NoCanvas,
                [
                    "没有可绘制的画布。",
                    "ペイント可能なキャンバスがありません。",
                    "No canvas to paint on.",
                ],
            ),
            (
                EditsCleared,
                [
                    "已清除未保存的绘制，恢复为原始纹理。",
                    "未保存の描画をクリアし、元のテクスチャに戻しました。",
                    "Cleared unsaved edits and reverted to the original texture.",
                ],
            ),
            (
                IslandFilled,
                [
                    "已处理孤岛像素：{0}",
                    "アイランドのピクセルを処理しました：{0}",
                    "Island pixels processed: {0}",
                ],
            ),
        ];

        let mut table = HashMap::with_capacity(entries.len() * Language::ALL.len());
        for (key, [zh, ja, en]) in entries {
            table.insert((key, Chinese), zh);
            table.insert((key, Japanese), ja);
            table.insert((key, English), en);
        }
        table
    })
}

/// Raw (unsubstituted) text for a key
pub fn message(key: NoticeKey, language: Language) -> &'static str {
    table().get(&(key, language)).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_has_every_language() {
        for key in NoticeKey::ALL {
            for language in Language::ALL {
                assert!(!message(key, language).is_empty(), "{:?} {:?}", key, language);
            }
        }
    }

    #[test]
    fn test_count_substitution() {
        let notice = Notice::with_count(NoticeKey::IslandFilled, 1600);
        assert_eq!(notice.text(Language::English), "Island pixels processed: 1600");
        assert_eq!(notice.level, NoticeLevel::Info);
    }

    #[test]
    fn test_levels() {
        assert_eq!(Notice::new(NoticeKey::FillOutsideUv).level, NoticeLevel::Warning);
        assert_eq!(Notice::new(NoticeKey::NoCanvas).level, NoticeLevel::Error);
    }

    #[test]
    fn test_default_language_is_chinese() {
        let text = Notice::new(NoticeKey::FillOutsideUv).text(Language::default());
        assert!(text.contains("UV"));
        assert_ne!(text, Notice::new(NoticeKey::FillOutsideUv).text(Language::English));
    }
}
