//! The built-in icon discovery strategies, highest priority first.

use async_trait::async_trait;
use tracing::debug;

use crate::context::ResolveContext;
use crate::domain::registrable_domain;
use crate::error::FetchError;
use crate::markup::{find_img_src, find_link_icon, resolve_against};
use crate::strategy::{IconStrategy, StrategyKind};

// ============================================================================
// Favicon Probes
// ============================================================================

/// Probes `{scheme}://{host[:port]}/favicon.ico`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RootFavicon;

#[async_trait]
impl IconStrategy for RootFavicon {
    fn id(&self) -> &str {
        "favicon.root"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Probe
    }

    fn priority(&self) -> u32 {
        100
    }

    async fn resolve(&self, ctx: &ResolveContext) -> Result<Option<String>, FetchError> {
        let candidate = format!("{}/favicon.ico", ctx.origin());
        Ok(ctx.fetcher.probe(&candidate).await.then_some(candidate))
    }
}

/// Probes `{scheme}://{registrable_domain}/favicon.ico`, port dropped.
///
/// Skipped when the host already is its registrable domain.
#[derive(Debug, Default, Clone, Copy)]
pub struct DomainFavicon;

#[async_trait]
impl IconStrategy for DomainFavicon {
    fn id(&self) -> &str {
        "favicon.domain"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Probe
    }

    fn priority(&self) -> u32 {
        80
    }

    async fn resolve(&self, ctx: &ResolveContext) -> Result<Option<String>, FetchError> {
        let Some(host) = ctx.host() else {
            return Ok(None);
        };
        let domain = registrable_domain(host);
        if domain == host {
            debug!(host, "Host is its own registrable domain");
            return Ok(None);
        }

        let candidate = format!("{}://{}/favicon.ico", ctx.homepage.scheme(), domain);
        Ok(ctx.fetcher.probe(&candidate).await.then_some(candidate))
    }
}

// ============================================================================
// Homepage Scrapes
// ============================================================================

/// Uses the first `<link rel="icon">` of the homepage, without probing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkTag;

#[async_trait]
impl IconStrategy for LinkTag {
    fn id(&self) -> &str {
        "html.link"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Scrape
    }

    fn priority(&self) -> u32 {
        60
    }

    async fn resolve(&self, ctx: &ResolveContext) -> Result<Option<String>, FetchError> {
        let Some(html) = ctx.homepage_html().await else {
            return Ok(None);
        };
        Ok(find_link_icon(html).and_then(|href| resolve_against(&ctx.origin(), href)))
    }
}

/// Uses the first `<img>` of the homepage with a `.jpg`, `.png` or `.ico`
/// source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImgTag;

#[async_trait]
impl IconStrategy for ImgTag {
    fn id(&self) -> &str {
        "html.img"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Scrape
    }

    fn priority(&self) -> u32 {
        40
    }

    async fn resolve(&self, ctx: &ResolveContext) -> Result<Option<String>, FetchError> {
        let Some(html) = ctx.homepage_html().await else {
            return Ok(None);
        };
        Ok(find_img_src(html).and_then(|src| resolve_against(&ctx.origin(), src)))
    }
}

/// The default cascade.
pub fn default_strategies() -> Vec<Box<dyn IconStrategy>> {
    vec![
        Box::new(RootFavicon),
        Box::new(DomainFavicon),
        Box::new(LinkTag),
        Box::new(ImgTag),
    ]
}
