//! Typed settings schema and the locale string table.
//!
//! The upstream settings surface is a fixed schema, so it is modeled as a
//! plain struct with typed fields instead of a stringly key-value store.
//! Translations are a static locale-keyed table resolved once at startup.

use serde::{Deserialize, Serialize};

/// Sort order for favorite listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteOrder {
    /// Order by the time the comic was favorited.
    #[default]
    AddTime,
    /// Order by the comic's latest update.
    UpdateTime,
}

impl FavoriteOrder {
    /// Query-parameter value the API expects.
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::AddTime => "add_time",
            Self::UpdateTime => "update_time",
        }
    }
}

/// Adapter settings, fixed schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Zero-based index into the active API domain list. Out-of-range
    /// values resolve to index 0 at lookup time.
    pub api_domain_index: usize,
    /// One-based image line number sent as `img_shunt` to the API.
    pub image_stream_index: u8,
    /// Whether `init` refreshes the domain list before first use.
    pub refresh_domains_on_start: bool,
    /// Favorite listing order.
    pub favorite_order: FavoriteOrder,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            api_domain_index: 0,
            image_stream_index: 1,
            refresh_domains_on_start: true,
            favorite_order: FavoriteOrder::AddTime,
        }
    }
}

/// Supported display locales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    /// Simplified Chinese.
    #[default]
    ZhCn,
    /// Traditional Chinese.
    ZhTw,
}

const ZH_CN: &[(&str, &str)] = &[
    ("刷新域名列表", "刷新域名列表"),
    ("刷新", "刷新"),
    ("启动时刷新域名", "启动时刷新域名"),
    ("API域名线路", "API域名线路"),
    ("图片线路", "图片线路"),
    ("收藏排序", "收藏排序"),
    ("添加时间", "添加时间"),
    ("更新时间", "更新时间"),
    ("全部", "全部"),
    ("更新成功", "更新成功"),
    ("更新失败", "更新失败"),
    ("使用内置域名", "使用内置域名"),
    ("线路", "线路"),
];

const ZH_TW: &[(&str, &str)] = &[
    ("刷新域名列表", "刷新域名列表"),
    ("刷新", "刷新"),
    ("启动时刷新域名", "啟動時刷新域名"),
    ("API域名线路", "API域名線路"),
    ("图片线路", "圖片線路"),
    ("收藏排序", "收藏排序"),
    ("添加时间", "添加時間"),
    ("更新时间", "更新時間"),
    ("全部", "全部"),
    ("更新成功", "更新成功"),
    ("更新失败", "更新失敗"),
    ("使用内置域名", "使用內置域名"),
    ("线路", "線路"),
];

/// Locale-resolved string table.
///
/// Unknown keys fall through to the key itself, matching the upstream
/// translation behavior.
#[derive(Debug, Clone, Copy)]
pub struct StringTable {
    entries: &'static [(&'static str, &'static str)],
}

impl StringTable {
    /// Resolves the table for a locale.
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        let entries = match locale {
            Locale::ZhCn => ZH_CN,
            Locale::ZhTw => ZH_TW,
        };
        Self { entries }
    }

    /// Looks up a translation, returning the key when absent.
    #[must_use]
    pub fn get<'a>(&self, key: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map_or(key, |(_, v)| v)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = SourceSettings::default();
        assert_eq!(settings.api_domain_index, 0);
        assert_eq!(settings.image_stream_index, 1);
        assert!(settings.refresh_domains_on_start);
        assert_eq!(settings.favorite_order, FavoriteOrder::AddTime);
    }

    #[test]
    fn test_favorite_order_params() {
        assert_eq!(FavoriteOrder::AddTime.as_param(), "add_time");
        assert_eq!(FavoriteOrder::UpdateTime.as_param(), "update_time");
    }

    #[test]
    fn test_string_table_locale_variants() {
        let cn = StringTable::new(Locale::ZhCn);
        let tw = StringTable::new(Locale::ZhTw);
        assert_eq!(cn.get("图片线路"), "图片线路");
        assert_eq!(tw.get("图片线路"), "圖片線路");
    }

    #[test]
    fn test_string_table_unknown_key_falls_through() {
        let cn = StringTable::new(Locale::ZhCn);
        assert_eq!(cn.get("no-such-key"), "no-such-key");
    }

    #[test]
    fn test_settings_serde_round_trip() {
        let settings = SourceSettings {
            api_domain_index: 2,
            image_stream_index: 3,
            refresh_domains_on_start: false,
            favorite_order: FavoriteOrder::UpdateTime,
        };
        let json = serde_json::to_string(&settings).expect("serializes");
        let back: SourceSettings = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, settings);
    }
}
