//! List posts from the content repository

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;

use crate::client::ContentClient;
use crate::flow::{ListingSession, LoadMore};
use crate::Blog;

/// Print the first listing page, or every page when `all` is set
pub async fn run<C: ContentClient, W: Write>(
    blog: &Blog,
    client: Arc<C>,
    all: bool,
    out: &mut W,
) -> Result<()> {
    let flow = blog.listing_flow(client)?;
    let first = flow.first_page().await?;
    let session = ListingSession::new(first);

    if all {
        loop {
            match flow.load_more(&session).await {
                LoadMore::Appended(n) => tracing::debug!("Loaded {} more posts", n),
                LoadMore::Exhausted(n) => {
                    tracing::debug!("Loaded {} more posts, no pages left", n);
                    break;
                }
                LoadMore::Failed => anyhow::bail!("Failed to load the next page"),
                _ => break,
            }
        }
    }

    let Some(state) = session.snapshot().await else {
        return Ok(());
    };

    writeln!(out, "Posts ({}):", state.results.len())?;
    for post in &state.results {
        writeln!(out, "  {} - {} [{}]", post.date, post.title, post.id)?;
        if !post.subtitle.is_empty() {
            writeln!(out, "      {}", post.subtitle)?;
        }
    }
    if state.can_load_more() {
        writeln!(out, "More posts available (use --all)")?;
    }

    Ok(())
}
