//! Show a single post

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;

use crate::client::ContentClient;
use crate::Blog;

/// Print a post with its sections
pub async fn run<C: ContentClient, W: Write>(
    blog: &Blog,
    client: Arc<C>,
    slug: &str,
    out: &mut W,
) -> Result<()> {
    let strings = blog.config.locale()?.strings()?;
    let post = blog.detail_flow(client)?.resolve(slug).await?;

    writeln!(out, "{}", post.title)?;
    if !post.subtitle.is_empty() {
        writeln!(out, "{}", post.subtitle)?;
    }
    writeln!(
        out,
        "{} | {} | {}",
        post.date,
        post.author,
        strings.reading_time(post.reading_time)
    )?;
    if let Some(banner) = &post.banner_url {
        writeln!(out, "Banner: {}", banner)?;
    }

    for section in &post.sections {
        writeln!(out)?;
        writeln!(out, "## {}", section.heading)?;
        for paragraph in &section.paragraphs {
            writeln!(out)?;
            writeln!(out, "{}", paragraph)?;
        }
    }

    Ok(())
}
