//! The Rouman5 adapter façade.
//!
//! [`RoumanSource`] owns the current [`DomainSnapshot`], the typed settings,
//! and the transport/UI collaborators, and exposes the catalog operations as
//! typed async methods. Domain refreshes produce snapshots that are
//! committed under the adapter's lock; nothing is process-global.

use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::catalog::{
    self, ComicDetails, ComicPage, FAVORITE_PAGE_SIZE, FavoriteFolders, HomeSection,
    LIST_PAGE_SIZE,
};
use crate::client::{ApiClient, ApiError, Clock, Session};
use crate::domains::{DomainRefreshOutcome, DomainSnapshot, parse_domain_list};
use crate::protocol;
use crate::scramble;
use crate::settings::{Locale, SourceSettings, StringTable};
use crate::transport::Transport;
use crate::ui::SourceUi;

use serde::Deserialize;

static COMIC_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+|rouman5\d+)$")
        .unwrap_or_else(|e| panic!("invalid static comic-id regex: {e}"))
});

/// Sort options accepted by category and search listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    New,
    /// Most popular first.
    Hot,
    /// Highest rated first.
    Score,
    /// Most recently updated first.
    Update,
}

impl SortOrder {
    /// Query-parameter value the API expects.
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Hot => "hot",
            Self::Score => "score",
            Self::Update => "update",
        }
    }
}

/// How a domain refresh is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Apply the result immediately.
    Silent,
    /// Stage the result and apply only on UI confirmation.
    Dialog,
}

/// Request instructions for a page image or thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Headers to attach to the image fetch.
    pub headers: Vec<(String, String)>,
    /// Band count for descrambling, when the image is scrambled. The
    /// renderer turns it into a recipe via [`scramble::band_layout`] once
    /// the image height is known.
    pub bands: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ImageHostSetting {
    #[serde(default)]
    img_host: Option<String>,
}

/// The Rouman5 content-source adapter.
pub struct RoumanSource {
    transport: Arc<dyn Transport>,
    client: ApiClient,
    ui: Arc<dyn SourceUi>,
    settings: SourceSettings,
    strings: StringTable,
    snapshot: RwLock<DomainSnapshot>,
    domain_list_url: String,
}

impl RoumanSource {
    /// Creates an adapter with default settings and simplified-Chinese
    /// strings.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, ui: Arc<dyn SourceUi>) -> Self {
        Self::with_config(transport, ui, SourceSettings::default(), Locale::ZhCn)
    }

    /// Creates an adapter with explicit settings and locale.
    #[must_use]
    pub fn with_config(
        transport: Arc<dyn Transport>,
        ui: Arc<dyn SourceUi>,
        settings: SourceSettings,
        locale: Locale,
    ) -> Self {
        Self {
            client: ApiClient::new(transport.clone()),
            transport,
            ui,
            settings,
            strings: StringTable::new(locale),
            snapshot: RwLock::new(DomainSnapshot::fallback()),
            domain_list_url: protocol::DOMAIN_LIST_URL.to_string(),
        }
    }

    /// Overrides the domain-list URL, for tests.
    #[must_use]
    pub fn with_domain_list_url(mut self, url: impl Into<String>) -> Self {
        self.domain_list_url = url.into();
        self
    }

    /// Pins the client clock, for tests that control envelope timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.client = ApiClient::with_clock(self.transport.clone(), clock);
        self
    }

    /// Returns a copy of the current domain snapshot.
    #[must_use]
    pub fn snapshot(&self) -> DomainSnapshot {
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Active API base URL per the configured domain index.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        self.snapshot().api_base_url(self.settings.api_domain_index)
    }

    /// True when `id` matches the comic-id shapes this source understands.
    #[must_use]
    pub fn is_valid_comic_id(id: &str) -> bool {
        COMIC_ID_RE.is_match(id)
    }

    fn commit(&self, snapshot: DomainSnapshot) {
        let mut guard = match self.snapshot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = snapshot;
    }

    /// Initializes the adapter: optionally refreshes the domain list, then
    /// the image host.
    ///
    /// Both refreshes degrade gracefully; `init` never fails the caller.
    pub async fn init(&self, session: &Session) {
        if self.settings.refresh_domains_on_start {
            self.refresh_api_domains(RefreshMode::Silent, session).await;
        }
        if let Err(error) = self.refresh_image_host(false, session).await {
            warn!(error = %error, "image host refresh failed during init");
        }
    }

    /// Refreshes the API domain list.
    ///
    /// Fetches and decrypts the remote list; any failure resolves to the
    /// built-in fallback servers. In [`RefreshMode::Silent`] the result is
    /// applied immediately; in [`RefreshMode::Dialog`] it is applied only
    /// when the UI confirms, followed by an announced image-host refresh.
    #[instrument(skip(self, session))]
    pub async fn refresh_api_domains(
        &self,
        mode: RefreshMode,
        session: &Session,
    ) -> DomainRefreshOutcome {
        let outcome = match self
            .transport
            .get(&self.domain_list_url, &protocol::base_headers())
            .await
        {
            Ok(response) if response.status == 200 => parse_domain_list(&response.body),
            Ok(response) => {
                debug!(status = response.status, "domain list fetch failed");
                DomainRefreshOutcome::failed()
            }
            Err(error) => {
                debug!(error = %error, "domain list fetch failed");
                DomainRefreshOutcome::failed()
            }
        };

        match mode {
            RefreshMode::Silent => {
                self.commit(self.snapshot().with_api_domains(outcome.servers().to_vec()));
            }
            RefreshMode::Dialog => {
                let (title, message) = self.refresh_dialog_text(&outcome);
                if self.ui.confirm(&title, &message).await {
                    self.commit(self.snapshot().with_api_domains(outcome.servers().to_vec()));
                    if let Err(error) = self.refresh_image_host(true, session).await {
                        warn!(error = %error, "image host refresh after domain update failed");
                    }
                }
            }
        }
        outcome
    }

    fn refresh_dialog_text(&self, outcome: &DomainRefreshOutcome) -> (String, String) {
        let (title, mut message) = if outcome.is_fetched() {
            (self.strings.get("更新成功").to_string(), "\n".to_string())
        } else {
            (
                self.strings.get("更新失败").to_string(),
                format!("{}:\n\n", self.strings.get("使用内置域名")),
            )
        };
        let line = self.strings.get("线路");
        for (i, server) in outcome.servers().iter().enumerate() {
            message.push_str(&format!("{line}{}:  {server}\n\n", i + 1));
        }
        (title, message)
    }

    /// Refreshes the image host for the configured image line.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the settings endpoint fails; the current
    /// image host is left untouched in that case.
    pub async fn refresh_image_host(
        &self,
        announce: bool,
        session: &Session,
    ) -> Result<(), ApiError> {
        let index = self.settings.image_stream_index;
        let url = format!("{}/api/setting?img_shunt={index}", self.api_base_url());
        let decoded = self.client.get(&url, session).await?;
        let setting: ImageHostSetting = serde_json::from_str(&decoded)
            .map_err(|e| ApiError::malformed(format!("image host setting: {e}")))?;

        if let Some(host) = setting.img_host.filter(|h| !h.is_empty()) {
            if announce {
                let label = self.strings.get("图片线路");
                self.ui.toast(&format!("{label} {index}:{host}"));
            }
            self.commit(self.snapshot().with_image_host(&host));
        }
        Ok(())
    }

    /// Loads the explore/home page sections.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport, status, or decode failure.
    pub async fn home(&self, page: u64, session: &Session) -> Result<Vec<HomeSection>, ApiError> {
        let url = format!("{}/api/home?page={page}", self.api_base_url());
        let decoded = self.client.get(&url, session).await?;
        catalog::parse_home(&decoded, &self.snapshot())
    }

    /// Loads a category listing.
    ///
    /// `param` defaults to the category name, mirroring the upstream
    /// contract where fixed categories pass a dedicated parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport, status, or decode failure.
    pub async fn category(
        &self,
        category: &str,
        param: Option<&str>,
        sort: SortOrder,
        page: u64,
        session: &Session,
    ) -> Result<ComicPage, ApiError> {
        let param = urlencoding::encode(param.unwrap_or(category)).into_owned();
        let url = format!(
            "{}/api/category?type={param}&sort={}&page={page}",
            self.api_base_url(),
            sort.as_param()
        );
        let decoded = self.client.get(&url, session).await?;
        catalog::parse_comic_page(&decoded, &self.snapshot(), LIST_PAGE_SIZE)
    }

    /// Loads a ranking listing (a category query with the `ranking` param).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport, status, or decode failure.
    pub async fn ranking(
        &self,
        sort: SortOrder,
        page: u64,
        session: &Session,
    ) -> Result<ComicPage, ApiError> {
        self.category("排行榜", Some("ranking"), sort, page, session)
            .await
    }

    /// Searches comics by keyword.
    ///
    /// The keyword is trimmed and URL-encoded with spaces as `+`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport, status, or decode failure.
    pub async fn search(
        &self,
        keyword: &str,
        sort: SortOrder,
        page: u64,
        session: &Session,
    ) -> Result<ComicPage, ApiError> {
        let keyword = urlencoding::encode(keyword.trim()).replace("%20", "+");
        let url = format!(
            "{}/api/search?keyword={keyword}&sort={}&page={page}",
            self.api_base_url(),
            sort.as_param()
        );
        let decoded = self.client.get(&url, session).await?;
        catalog::parse_comic_page(&decoded, &self.snapshot(), LIST_PAGE_SIZE)
    }

    /// Loads the comic detail page.
    ///
    /// Accepts both bare numeric ids and `rouman5`-prefixed ids.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport, status, or decode failure.
    pub async fn comic_detail(
        &self,
        id: &str,
        session: &Session,
    ) -> Result<ComicDetails, ApiError> {
        let id = id.strip_prefix("rouman5").unwrap_or(id);
        let url = format!("{}/api/comic/detail?id={id}", self.api_base_url());
        let decoded = self.client.get(&url, session).await?;
        catalog::parse_comic_details(&decoded, id, &self.snapshot())
    }

    /// Loads a chapter's page image URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport, status, or decode failure.
    pub async fn chapter_images(
        &self,
        comic_id: &str,
        chapter_id: &str,
        session: &Session,
    ) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/api/chapter/images?id={chapter_id}", self.api_base_url());
        let decoded = self.client.get(&url, session).await?;
        catalog::parse_chapter_images(&decoded, comic_id, chapter_id, &self.snapshot())
    }

    /// Adds or removes a favorite, optionally filing it into a folder.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport, status, or decode failure.
    pub async fn set_favorite(
        &self,
        comic_id: &str,
        folder_id: &str,
        adding: bool,
        session: &Session,
    ) -> Result<(), ApiError> {
        let base = self.api_base_url();
        if adding {
            self.client
                .post_form(
                    &format!("{base}/api/favorite/add"),
                    &format!("comic_id={comic_id}"),
                    session,
                )
                .await?;
            if folder_id != "0" {
                self.client
                    .post_form(
                        &format!("{base}/api/favorite/move"),
                        &format!("comic_id={comic_id}&folder_id={folder_id}"),
                        session,
                    )
                    .await?;
            }
        } else {
            self.client
                .post_form(
                    &format!("{base}/api/favorite/remove"),
                    &format!("comic_id={comic_id}"),
                    session,
                )
                .await?;
        }
        Ok(())
    }

    /// Lists favorite folders, with per-comic membership when `comic_id`
    /// is given.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport, status, or decode failure.
    pub async fn favorite_folders(
        &self,
        comic_id: Option<&str>,
        session: &Session,
    ) -> Result<FavoriteFolders, ApiError> {
        let url = format!("{}/api/favorite/folders", self.api_base_url());
        let decoded = self.client.get(&url, session).await?;
        catalog::parse_favorite_folders(&decoded, comic_id.is_some(), &self.strings)
    }

    /// Creates a favorite folder.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport, status, or decode failure.
    pub async fn create_folder(&self, name: &str, session: &Session) -> Result<(), ApiError> {
        let body = format!("name={}", urlencoding::encode(name));
        self.client
            .post_form(
                &format!("{}/api/favorite/create_folder", self.api_base_url()),
                &body,
                session,
            )
            .await?;
        Ok(())
    }

    /// Deletes a favorite folder.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport, status, or decode failure.
    pub async fn delete_folder(&self, folder_id: &str, session: &Session) -> Result<(), ApiError> {
        self.client
            .post_form(
                &format!("{}/api/favorite/delete_folder", self.api_base_url()),
                &format!("folder_id={folder_id}"),
                session,
            )
            .await?;
        Ok(())
    }

    /// Lists favorites in a folder, ordered per settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport, status, or decode failure.
    pub async fn favorites(
        &self,
        page: u64,
        folder_id: &str,
        session: &Session,
    ) -> Result<ComicPage, ApiError> {
        let order = self.settings.favorite_order.as_param();
        let url = format!(
            "{}/api/favorite/list?folder_id={folder_id}&page={page}&order={order}",
            self.api_base_url()
        );
        let decoded = self.client.get(&url, session).await?;
        catalog::parse_comic_page(&decoded, &self.snapshot(), FAVORITE_PAGE_SIZE)
    }

    /// Logs in and returns the authenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the login call fails; the session stays
    /// anonymous in that case.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let body = format!(
            "username={}&password={}",
            urlencoding::encode(username),
            urlencoding::encode(password)
        );
        self.client
            .post_form(
                &format!("{}/api/login", self.api_base_url()),
                &body,
                &Session::anonymous(),
            )
            .await?;
        Ok(Session::logged_in())
    }

    /// Logs out by dropping cookies for every active API domain.
    pub fn logout(&self) {
        self.client.clear_session(self.snapshot().api_domains());
    }

    /// Request instructions for a chapter page image.
    ///
    /// The comic id does not feed the scramble decision; only the episode id
    /// and filename do.
    #[must_use]
    pub fn page_image_request(
        &self,
        url: &str,
        _comic_id: &str,
        episode_id: &str,
    ) -> ImageRequest {
        let episode: u64 = episode_id.parse().unwrap_or(0);
        ImageRequest {
            headers: protocol::image_headers(),
            bands: scramble::scramble_bands(episode, url),
        }
    }

    /// Request instructions for a thumbnail; thumbnails are never
    /// descrambled.
    #[must_use]
    pub fn thumbnail_request(&self, _url: &str) -> ImageRequest {
        ImageRequest {
            headers: protocol::image_headers(),
            bands: None,
        }
    }
}

impl std::fmt::Debug for RoumanSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoumanSource")
            .field("settings", &self.settings)
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}
