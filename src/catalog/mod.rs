//! Domain objects and parsers for the catalog endpoints.
//!
//! Everything here is data shaping: the decoded envelope substring comes in,
//! typed structs come out. Upstream JSON is loose (ids arrive as numbers or
//! strings, most fields are optional), so the wire structs lean on
//! `#[serde(default)]` and untagged enums before normalizing.

use serde::Deserialize;

use crate::client::ApiError;
use crate::domains::DomainSnapshot;
use crate::settings::StringTable;

/// List page size for category/search results.
pub const LIST_PAGE_SIZE: u64 = 30;
/// List page size for favorite listings.
pub const FAVORITE_PAGE_SIZE: u64 = 20;

const UNKNOWN_AUTHOR: &str = "未知作者";
const NO_DESCRIPTION: &str = "暂无简介";

/// A comic as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comic {
    /// Upstream comic id, stringified.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Author line shown under the title.
    pub subtitle: String,
    /// Cover image URL.
    pub cover: String,
    /// Category plus tag labels.
    pub tags: Vec<String>,
    /// Short description, possibly empty.
    pub description: String,
}

/// A chapter entry, ordered by upstream sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Upstream chapter id, stringified.
    pub id: String,
    /// Display title.
    pub title: String,
}

/// A named tag group on the detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup {
    /// Group label.
    pub name: String,
    /// Tag values.
    pub values: Vec<String>,
}

/// Full comic detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicDetails {
    /// Display title.
    pub title: String,
    /// Cover image URL.
    pub cover: String,
    /// Description, defaulted when the upstream omits it.
    pub description: String,
    /// Like count.
    pub likes_count: u64,
    /// Chapters in ascending sort order; never empty.
    pub chapters: Vec<Chapter>,
    /// Grouped tags (author, tags, region, status).
    pub tags: Vec<TagGroup>,
    /// Related comics.
    pub related: Vec<Comic>,
    /// Whether the current account has favorited the comic.
    pub is_favorite: bool,
    /// Last update date, `YYYY-MM-DD`.
    pub update_time: String,
}

/// One section of the explore/home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeSection {
    /// Section title.
    pub title: String,
    /// Section comics.
    pub comics: Vec<Comic>,
    /// Opaque view-more key (`category:<title>@<id>`).
    pub view_more: String,
}

/// A page of comics plus the total page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicPage {
    /// Comics on this page.
    pub comics: Vec<Comic>,
    /// Total page count derived from the upstream total.
    pub max_page: u64,
}

/// A favorite folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    /// Folder id; `"0"` is the synthetic all-favorites folder.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Favorite folder listing for a comic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteFolders {
    /// Available folders, the all-favorites folder first.
    pub folders: Vec<Folder>,
    /// Folder ids already containing the queried comic.
    pub favorited: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(i64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawComic {
    id: RawId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default)]
    title: String,
    id: Option<RawId>,
    #[serde(default)]
    list: Vec<RawComic>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    list: Vec<RawComic>,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    id: RawId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    sort: i64,
}

#[derive(Debug, Deserialize)]
struct RawDetail {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: Option<StringOrList>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    likes: Option<RawId>,
    #[serde(default)]
    chapters: Vec<RawChapter>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    related: Vec<RawComic>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    is_favorite: Option<bool>,
    #[serde(default)]
    update_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawFolder {
    id: RawId,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawFolderList {
    #[serde(default)]
    folders: Vec<RawFolder>,
    #[serde(default)]
    favorited: Vec<RawId>,
}

#[derive(Debug, Deserialize)]
struct RawChapterImages {
    #[serde(default)]
    images: Vec<String>,
}

fn malformed(context: &str, error: &serde_json::Error) -> ApiError {
    ApiError::malformed(format!("{context}: {error}"))
}

fn shape_comic(raw: RawComic, snapshot: &DomainSnapshot) -> Comic {
    let id = raw.id.into_string();
    let mut tags = Vec::new();
    if let Some(category) = raw.category.filter(|c| !c.is_empty()) {
        tags.push(category);
    }
    tags.extend(raw.tags);
    Comic {
        cover: snapshot.cover_url(&id),
        id,
        title: raw.title,
        subtitle: raw
            .author
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        tags,
        description: raw.desc.unwrap_or_default(),
    }
}

/// Parses the home page sections.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] when the JSON does not match.
pub fn parse_home(json: &str, snapshot: &DomainSnapshot) -> Result<Vec<HomeSection>, ApiError> {
    let sections: Vec<RawSection> =
        serde_json::from_str(json).map_err(|e| malformed("home sections", &e))?;
    Ok(sections
        .into_iter()
        .map(|section| {
            let id = section.id.map(RawId::into_string).unwrap_or_default();
            HomeSection {
                view_more: format!("category:{}@{}", section.title, id),
                comics: section
                    .list
                    .into_iter()
                    .map(|c| shape_comic(c, snapshot))
                    .collect(),
                title: section.title,
            }
        })
        .collect())
}

/// Parses a `{total, list}` page of comics.
///
/// `page_size` drives the `max_page = ceil(total / page_size)` computation.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] when the JSON does not match.
pub fn parse_comic_page(
    json: &str,
    snapshot: &DomainSnapshot,
    page_size: u64,
) -> Result<ComicPage, ApiError> {
    let page: RawPage = serde_json::from_str(json).map_err(|e| malformed("comic page", &e))?;
    Ok(ComicPage {
        max_page: page.total.div_ceil(page_size),
        comics: page
            .list
            .into_iter()
            .map(|c| shape_comic(c, snapshot))
            .collect(),
    })
}

/// Parses the comic detail payload.
///
/// Chapters are sorted ascending by the upstream sort key; untitled chapters
/// become `第<sort>话`, and a detail with no chapters gets a synthetic
/// single chapter keyed by the comic id.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] when the JSON does not match.
pub fn parse_comic_details(
    json: &str,
    comic_id: &str,
    snapshot: &DomainSnapshot,
) -> Result<ComicDetails, ApiError> {
    let detail: RawDetail =
        serde_json::from_str(json).map_err(|e| malformed("comic detail", &e))?;

    let mut raw_chapters = detail.chapters;
    raw_chapters.sort_by_key(|c| c.sort);
    let mut chapters: Vec<Chapter> = raw_chapters
        .into_iter()
        .map(|c| Chapter {
            id: c.id.into_string(),
            title: c
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| format!("第{}话", c.sort)),
        })
        .collect();
    if chapters.is_empty() {
        chapters.push(Chapter {
            id: comic_id.to_string(),
            title: "第1话".to_string(),
        });
    }

    let likes_count = match detail.likes {
        Some(RawId::Num(n)) => u64::try_from(n).unwrap_or(0),
        Some(RawId::Text(s)) => s.parse().unwrap_or(0),
        None => 0,
    };

    let status = if detail.status == Some(1) {
        "连载中"
    } else {
        "已完结"
    };
    let tags = vec![
        TagGroup {
            name: "作者".to_string(),
            values: detail.author.map(StringOrList::into_vec).unwrap_or_default(),
        },
        TagGroup {
            name: "标签".to_string(),
            values: detail.tags,
        },
        TagGroup {
            name: "地区".to_string(),
            values: vec![detail.region.unwrap_or_else(|| "未知".to_string())],
        },
        TagGroup {
            name: "状态".to_string(),
            values: vec![status.to_string()],
        },
    ];

    Ok(ComicDetails {
        title: detail.title,
        cover: snapshot.cover_url(comic_id),
        description: detail
            .desc
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        likes_count,
        chapters,
        tags,
        related: detail
            .related
            .into_iter()
            .map(|c| shape_comic(c, snapshot))
            .collect(),
        is_favorite: detail.is_favorite.unwrap_or(false),
        update_time: detail.update_time.map_or_else(
            || "未知".to_string(),
            |secs| format_date(u64::try_from(secs).unwrap_or(0)),
        ),
    })
}

/// Parses a chapter image listing into full page URLs.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] when the JSON does not match.
pub fn parse_chapter_images(
    json: &str,
    comic_id: &str,
    chapter_id: &str,
    snapshot: &DomainSnapshot,
) -> Result<Vec<String>, ApiError> {
    let listing: RawChapterImages =
        serde_json::from_str(json).map_err(|e| malformed("chapter images", &e))?;
    Ok(listing
        .images
        .into_iter()
        .map(|name| snapshot.page_url(comic_id, chapter_id, &name))
        .collect())
}

/// Parses the favorite folder listing.
///
/// Folder `"0"` (all favorites, translated label) is always synthesized
/// first. `favorited` is emptied unless `for_comic` is set, matching the
/// upstream contract where folder membership only applies to a comic query.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] when the JSON does not match.
pub fn parse_favorite_folders(
    json: &str,
    for_comic: bool,
    strings: &StringTable,
) -> Result<FavoriteFolders, ApiError> {
    let raw: RawFolderList =
        serde_json::from_str(json).map_err(|e| malformed("favorite folders", &e))?;
    let mut folders = vec![Folder {
        id: "0".to_string(),
        name: strings.get("全部").to_string(),
    }];
    folders.extend(raw.folders.into_iter().map(|f| Folder {
        id: f.id.into_string(),
        name: f.name,
    }));
    Ok(FavoriteFolders {
        folders,
        favorited: if for_comic {
            raw.favorited.into_iter().map(RawId::into_string).collect()
        } else {
            Vec::new()
        },
    })
}

/// Formats Unix seconds as a UTC `YYYY-MM-DD` date.
///
/// Days-to-civil conversion, valid for the whole u64 range the API can
/// realistically send.
fn format_date(epoch_secs: u64) -> String {
    let days = i64::try_from(epoch_secs / 86_400).unwrap_or(0);
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };
    format!("{year:04}-{month:02}-{day:02}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::settings::{Locale, StringTable};

    fn snapshot() -> DomainSnapshot {
        DomainSnapshot::fallback()
    }

    #[test]
    fn test_format_date_known_values() {
        assert_eq!(format_date(0), "1970-01-01");
        assert_eq!(format_date(86_400), "1970-01-02");
        // 2023-11-14T22:13:20Z
        assert_eq!(format_date(1_700_000_000), "2023-11-14");
        // Leap day: 2024-02-29T12:00:00Z
        assert_eq!(format_date(1_709_208_000), "2024-02-29");
    }

    #[test]
    fn test_parse_home_sections() {
        let json = r#"[
            {"title":"热门推荐","id":7,"list":[
                {"id":12,"title":"某漫画","author":"某作者","category":"恋爱","tags":["校园"]}
            ]}
        ]"#;
        let sections = parse_home(json, &snapshot()).unwrap();
        assert_eq!(sections.len(), 1);
        let section = &sections[0];
        assert_eq!(section.title, "热门推荐");
        assert_eq!(section.view_more, "category:热门推荐@7");
        let comic = &section.comics[0];
        assert_eq!(comic.id, "12");
        assert_eq!(comic.subtitle, "某作者");
        assert_eq!(comic.tags, vec!["恋爱", "校园"]);
        assert_eq!(comic.cover, "https://img.rouman5.com/covers/12_cover.jpg");
    }

    #[test]
    fn test_parse_comic_page_max_page_rounds_up() {
        let json = r#"{"total":61,"list":[{"id":"9","title":"t"}]}"#;
        let page = parse_comic_page(json, &snapshot(), LIST_PAGE_SIZE).unwrap();
        assert_eq!(page.max_page, 3);
        assert_eq!(page.comics[0].subtitle, "未知作者");
    }

    #[test]
    fn test_parse_comic_page_rejects_non_json() {
        let err = parse_comic_page("", &snapshot(), LIST_PAGE_SIZE).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_detail_sorts_and_titles_chapters() {
        let json = r#"{
            "title":"标题","author":["甲","乙"],"likes":"1024",
            "chapters":[
                {"id":20002,"sort":2},
                {"id":20001,"title":"开端","sort":1}
            ],
            "tags":["热血"],"region":"日本","status":1,
            "is_favorite":true,"update_time":1700000000
        }"#;
        let detail = parse_comic_details(json, "55", &snapshot()).unwrap();
        assert_eq!(detail.chapters.len(), 2);
        assert_eq!(detail.chapters[0].id, "20001");
        assert_eq!(detail.chapters[0].title, "开端");
        assert_eq!(detail.chapters[1].title, "第2话");
        assert_eq!(detail.likes_count, 1024);
        assert!(detail.is_favorite);
        assert_eq!(detail.update_time, "2023-11-14");
        assert_eq!(detail.description, NO_DESCRIPTION);
        let status = detail.tags.iter().find(|g| g.name == "状态").unwrap();
        assert_eq!(status.values, vec!["连载中"]);
        let author = detail.tags.iter().find(|g| g.name == "作者").unwrap();
        assert_eq!(author.values, vec!["甲", "乙"]);
    }

    #[test]
    fn test_parse_detail_synthesizes_single_chapter() {
        let detail = parse_comic_details(r#"{"title":"t"}"#, "55", &snapshot()).unwrap();
        assert_eq!(detail.chapters.len(), 1);
        assert_eq!(detail.chapters[0].id, "55");
        assert_eq!(detail.chapters[0].title, "第1话");
        let status = detail.tags.iter().find(|g| g.name == "状态").unwrap();
        assert_eq!(status.values, vec!["已完结"]);
    }

    #[test]
    fn test_parse_chapter_images_builds_page_urls() {
        let json = r#"{"images":["0001.jpg","0002.jpg"]}"#;
        let images = parse_chapter_images(json, "42", "20000", &snapshot()).unwrap();
        assert_eq!(
            images,
            vec![
                "https://img.rouman5.com/comics/42/20000/0001.jpg",
                "https://img.rouman5.com/comics/42/20000/0002.jpg",
            ]
        );
    }

    #[test]
    fn test_parse_favorite_folders_synthesizes_all_folder() {
        let strings = StringTable::new(Locale::ZhCn);
        let json = r#"{"folders":[{"id":3,"name":"收藏夹A"}],"favorited":[3]}"#;
        let listing = parse_favorite_folders(json, true, &strings).unwrap();
        assert_eq!(listing.folders[0], Folder { id: "0".into(), name: "全部".into() });
        assert_eq!(listing.folders[1].id, "3");
        assert_eq!(listing.favorited, vec!["3"]);

        let without = parse_favorite_folders(json, false, &strings).unwrap();
        assert!(without.favorited.is_empty());
    }
}
