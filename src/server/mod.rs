//! Page server
//!
//! Serves the listing page with per-view "load more" state, post pages with
//! time-based regeneration, and static files from the public directory.

mod sessions;

pub use sessions::SessionRegistry;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::cache::{Lookup, PageCache};
use crate::client::ContentClient;
use crate::config::Fallback;
use crate::flow::{DetailFlow, DetailState, ListingFlow, ListingPageState, LoadMore};
use crate::helpers::{session_url, url_for};
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Cache key of the listing's first page
const LISTING_KEY: &str = "/";

/// How often idle listing sessions and stale post pages are swept
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Server state shared by all handlers
pub struct AppState<C> {
    blog: Blog,
    listing: ListingFlow<C>,
    detail: DetailFlow<C>,
    renderer: TemplateRenderer,
    seeds: PageCache<ListingPageState>,
    posts: PageCache<DetailState>,
    sessions: SessionRegistry,
}

#[derive(Debug, Deserialize)]
struct HomeParams {
    session: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct LoadMoreForm {
    session: Option<Uuid>,
}

impl<C: ContentClient> AppState<C> {
    /// Wire flows, templates and caches for a client
    pub fn new(blog: &Blog, client: Arc<C>) -> Result<Self> {
        let locale = blog.config.locale()?;
        let renderer = TemplateRenderer::new(&blog.config, locale, locale.strings()?)?;

        Ok(Self {
            listing: blog.listing_flow(client.clone())?,
            detail: blog.detail_flow(client)?,
            renderer,
            seeds: PageCache::new(blog.config.revalidate.listing()),
            posts: PageCache::with_capacity(
                blog.config.revalidate.detail(),
                blog.config.server.page_cache_size,
            ),
            sessions: SessionRegistry::new(),
            blog: blog.clone(),
        })
    }

    /// Listing page: an existing view when `session` is known, otherwise the first page.
    ///
    /// A page view is only tracked once it loads more.
    pub async fn home_page(self: &Arc<Self>, session: Option<Uuid>) -> Response {
        if let Some(id) = session {
            if let Some(listing) = self.sessions.get(&id).await {
                if let Some(state) = listing.snapshot().await {
                    return self.html(StatusCode::OK, self.renderer.render_home(&state, Some(&id)));
                }
            }
        }

        match self.listing_seed().await {
            Ok(seed) => self.html(StatusCode::OK, self.renderer.render_home(&seed, None)),
            Err(e) => {
                tracing::error!("Failed to load the listing: {:#}", e);
                self.html(StatusCode::BAD_GATEWAY, self.renderer.render_unavailable())
            }
        }
    }

    /// Run "load more" for a page view and send the browser back to it.
    ///
    /// Without `session` a new page view starts from the first page.
    pub async fn load_more(self: &Arc<Self>, session: Option<Uuid>) -> Redirect {
        let home = url_for(&self.blog.config, "/");
        let (session, listing) = match session {
            Some(id) => match self.sessions.get(&id).await {
                Some(listing) => (id, listing),
                None => {
                    tracing::debug!("Unknown listing session {}", id);
                    return Redirect::to(&home);
                }
            },
            None => match self.listing_seed().await {
                Ok(seed) => self.sessions.create(seed).await,
                Err(e) => {
                    tracing::error!("Failed to load the listing: {:#}", e);
                    return Redirect::to(&home);
                }
            },
        };

        let outcome = self.listing.load_more(&listing).await;
        tracing::debug!("Load more for {}: {:?}", session, outcome);

        match outcome {
            LoadMore::Discarded => Redirect::to(&home),
            _ => Redirect::to(&session_url(&self.blog.config, &session)),
        }
    }

    /// Post page, generated on first request and regenerated when stale
    pub async fn post_page(self: &Arc<Self>, slug: &str) -> Response {
        match self.posts.lookup(slug).await {
            Lookup::Fresh(state) => self.render_detail(&state),
            Lookup::Stale(state) => {
                self.spawn_regenerate(slug).await;
                self.render_detail(&state)
            }
            Lookup::Missing => match self.blog.config.server.fallback {
                Fallback::Placeholder => {
                    self.spawn_regenerate(slug).await;
                    self.render_detail(&DetailState::Resolving)
                }
                Fallback::Blocking => match self.detail.state(slug).await {
                    Ok(state) => {
                        self.remember(slug, state.clone()).await;
                        self.render_detail(&state)
                    }
                    Err(e) => {
                        tracing::error!("Failed to generate post {}: {}", slug, e);
                        self.html(StatusCode::BAD_GATEWAY, self.renderer.render_unavailable())
                    }
                },
            },
        }
    }

    /// Generate the listing and the newest post pages ahead of the first request
    pub async fn prerender(&self) {
        match self.listing.first_page().await {
            Ok(seed) => self.seeds.store(LISTING_KEY, seed).await,
            Err(e) => tracing::warn!("Could not prerender the listing: {}", e),
        }

        let limit = self.blog.config.content.prerender_paths;
        match self.detail.known_paths(limit).await {
            Ok(paths) => {
                for slug in paths {
                    self.regenerate(&slug).await;
                }
                tracing::info!("Prerendered {} post pages", self.posts.len().await);
            }
            Err(e) => tracing::warn!("Could not list posts to prerender: {}", e),
        }
    }

    /// Drop listing views that have been idle too long and post pages
    /// nobody asked for since they went stale
    pub async fn sweep(&self) {
        let idle = Duration::from_secs(self.blog.config.server.session_idle_secs);
        self.sessions.sweep(idle).await;

        let dropped = self.posts.sweep(self.blog.config.revalidate.detail()).await;
        if dropped > 0 {
            tracing::debug!("Dropped {} stale post pages", dropped);
        }
    }

    async fn listing_seed(self: &Arc<Self>) -> Result<ListingPageState> {
        match self.seeds.lookup(LISTING_KEY).await {
            Lookup::Fresh(seed) => Ok(seed),
            Lookup::Stale(seed) => {
                if self.seeds.claim(LISTING_KEY).await {
                    let state = Arc::clone(self);
                    tokio::spawn(async move {
                        match state.listing.first_page().await {
                            Ok(seed) => state.seeds.store(LISTING_KEY, seed).await,
                            Err(e) => {
                                tracing::warn!("Failed to refresh the listing: {}", e);
                                state.seeds.release(LISTING_KEY).await;
                            }
                        }
                    });
                }
                Ok(seed)
            }
            Lookup::Missing => {
                let seed = self.listing.first_page().await?;
                self.seeds.store(LISTING_KEY, seed.clone()).await;
                Ok(seed)
            }
        }
    }

    async fn spawn_regenerate(self: &Arc<Self>, slug: &str) {
        if !self.posts.claim(slug).await {
            return;
        }
        let state = Arc::clone(self);
        let slug = slug.to_string();
        tokio::spawn(async move {
            state.generate(&slug).await;
        });
    }

    /// Claim and regenerate one post page in place
    async fn regenerate(&self, slug: &str) {
        if self.posts.claim(slug).await {
            self.generate(slug).await;
        }
    }

    /// Resolve a post into the cache; the caller holds the claim
    async fn generate(&self, slug: &str) {
        match self.detail.state(slug).await {
            Ok(state) => {
                tracing::debug!("Generated post page {}", slug);
                self.remember(slug, state).await;
            }
            Err(e) => {
                tracing::error!("Failed to generate post {}: {}", slug, e);
                match self.posts.lookup(slug).await {
                    // Keep serving the last good page
                    Lookup::Fresh(DetailState::Ready(_)) | Lookup::Stale(DetailState::Ready(_)) => {
                        self.posts.release(slug).await
                    }
                    _ => self.remember(slug, DetailState::Failed).await,
                }
            }
        }
    }

    /// Cache a post page; unknown and failed posts are retried sooner
    async fn remember(&self, slug: &str, state: DetailState) {
        match state {
            DetailState::Ready(_) => self.posts.store(slug, state).await,
            _ => {
                let ttl = self.blog.config.revalidate.missing();
                self.posts.store_for(slug, state, ttl).await
            }
        }
    }

    fn render_detail(&self, state: &DetailState) -> Response {
        match state {
            DetailState::Resolving => self.html(StatusCode::OK, self.renderer.render_resolving()),
            DetailState::Ready(post) => self.html(StatusCode::OK, self.renderer.render_post(post)),
            DetailState::NotFound => {
                self.html(StatusCode::NOT_FOUND, self.renderer.render_not_found())
            }
            DetailState::Failed => {
                self.html(StatusCode::BAD_GATEWAY, self.renderer.render_unavailable())
            }
        }
    }

    fn html(&self, status: StatusCode, rendered: Result<String>) -> Response {
        match rendered {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!("Template error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// Build the application router
pub fn router<C: ContentClient>(state: Arc<AppState<C>>) -> Router {
    let public_dir = state.blog.public_dir.clone();
    let root = state.blog.config.root.trim_end_matches('/').to_string();

    let app = Router::new()
        .route("/", get(home_handler::<C>))
        .route("/load-more", post(load_more_handler::<C>))
        .route("/post/:slug", get(post_handler::<C>))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state);

    let app = if root.is_empty() {
        app
    } else {
        Router::new().nest(&root, app)
    };

    app.layer(TraceLayer::new_for_http())
}

/// Start the page server
pub async fn start<C: ContentClient>(
    blog: &Blog,
    client: Arc<C>,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let state = Arc::new(AppState::new(blog, client)?);

    tracing::info!("Prerendering pages...");
    state.prerender().await;

    // Discard idle listing views
    let sweeper = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.sweep().await;
        }
    });

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, url_for(&blog.config, "/"));
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn home_handler<C: ContentClient>(
    State(state): State<Arc<AppState<C>>>,
    Query(params): Query<HomeParams>,
) -> Response {
    state.home_page(params.session).await
}

async fn load_more_handler<C: ContentClient>(
    State(state): State<Arc<AppState<C>>>,
    Form(form): Form<LoadMoreForm>,
) -> Redirect {
    state.load_more(form.session).await
}

async fn post_handler<C: ContentClient>(
    State(state): State<Arc<AppState<C>>>,
    Path(slug): Path<String>,
) -> Response {
    state.post_page(&slug).await
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
