//! Built-in blog templates using the Tera template engine
//!
//! Templates are embedded in the binary. Components (header, post summary,
//! icons) are Tera macros in `components.html` and depend only on their arguments.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::DisplayPostDetail;
use crate::flow::ListingPageState;
use crate::helpers::{post_url, url_for};
use crate::i18n::{Locale, Strings};

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
    strings: Strings,
    home_url: String,
    logo_url: String,
    stylesheet_url: String,
    load_more_url: String,
}

/// Site-wide values available to every template
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub lang: String,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig, locale: Locale, strings: Strings) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("components.html", include_str!("blog/components.html")),
            ("layout.html", include_str!("blog/layout.html")),
            ("home.html", include_str!("blog/home.html")),
            ("post.html", include_str!("blog/post.html")),
            ("resolving.html", include_str!("blog/resolving.html")),
            ("message.html", include_str!("blog/message.html")),
        ])?;

        let link_config = config.clone();
        tera.register_filter(
            "post_url",
            move |value: &tera::Value,
                  _args: &HashMap<String, tera::Value>|
                  -> tera::Result<tera::Value> {
                let uid = tera::try_get_value!("post_url", "value", String, value);
                Ok(tera::Value::String(post_url(&link_config, &uid)))
            },
        );

        Ok(Self {
            tera,
            site: SiteData {
                title: config.title.clone(),
                lang: locale.tag().to_string(),
            },
            strings,
            home_url: url_for(config, "/"),
            logo_url: url_for(config, &config.logo),
            stylesheet_url: url_for(config, "css/style.css"),
            load_more_url: url_for(config, "load-more"),
        })
    }

    /// Listing page, for a page view that has loaded more when `session` is set
    pub fn render_home(
        &self,
        listing: &ListingPageState,
        session: Option<&uuid::Uuid>,
    ) -> Result<String> {
        let mut context = self.base_context();
        context.insert("listing", listing);
        context.insert("session", &session.map(|id| id.to_string()));
        context.insert("load_more_url", &self.load_more_url);
        self.render("home.html", &context)
    }

    /// Full post page
    pub fn render_post(&self, post: &DisplayPostDetail) -> Result<String> {
        let mut context = self.base_context();
        context.insert("post", post);
        context.insert("reading_time", &self.strings.reading_time(post.reading_time));
        self.render("post.html", &context)
    }

    /// Placeholder for a post page that is still being generated
    pub fn render_resolving(&self) -> Result<String> {
        self.render("resolving.html", &self.base_context())
    }

    /// Page for an unknown post
    pub fn render_not_found(&self) -> Result<String> {
        self.render_message(&self.strings.not_found)
    }

    /// Page for a backend failure
    pub fn render_unavailable(&self) -> Result<String> {
        self.render_message(&self.strings.unavailable)
    }

    fn render_message(&self, message: &str) -> Result<String> {
        let mut context = self.base_context();
        context.insert("message", message);
        self.render("message.html", &context)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("strings", &self.strings);
        context.insert("home_url", &self.home_url);
        context.insert("logo_url", &self.logo_url);
        context.insert("stylesheet_url", &self.stylesheet_url);
        context
    }

    /// Render a template with given context
    fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentSection, DisplayPostSummary};

    fn renderer() -> TemplateRenderer {
        let locale = Locale::PtBr;
        TemplateRenderer::new(&SiteConfig::default(), locale, locale.strings().unwrap()).unwrap()
    }

    fn summary(id: &str, title: &str) -> DisplayPostSummary {
        DisplayPostSummary {
            id: id.to_string(),
            date: "15 Mar 2021".to_string(),
            title: title.to_string(),
            subtitle: "Pensando em sincronização".to_string(),
            author: "Joseph Oliveira".to_string(),
        }
    }

    #[test]
    fn test_render_home_with_more() {
        let state = ListingPageState::new(
            vec![summary("hooks", "Como utilizar Hooks"), summary("cra", "Criando um app CRA")],
            Some("page2".to_string()),
        );
        let html = renderer().render_home(&state, Some(&uuid::Uuid::nil())).unwrap();

        assert!(html.contains("<title>Home | spacetraveling</title>"));
        assert!(html.contains(r#"href="/post/hooks""#));
        assert!(html.contains("Como utilizar Hooks"));
        assert!(html.contains("15 Mar 2021"));
        assert!(html.contains("Joseph Oliveira"));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains("00000000-0000-0000-0000-000000000000"));
        assert!(html.find("Como utilizar Hooks") < html.find("Criando um app CRA"));
    }

    #[test]
    fn test_render_home_exhausted() {
        let mut state = ListingPageState::new(vec![summary("hooks", "Hooks")], None);
        let html = renderer().render_home(&state, Some(&uuid::Uuid::nil())).unwrap();
        assert!(!html.contains("Carregar mais posts"));

        state.next_page = Some("page2".to_string());
        assert!(state.begin_load().is_some());
        let html = renderer().render_home(&state, Some(&uuid::Uuid::nil())).unwrap();
        assert!(html.contains("Carregando..."));
        assert!(!html.contains("Carregar mais posts"));
    }

    #[test]
    fn test_render_post() {
        let post = DisplayPostDetail {
            id: "hooks".to_string(),
            date: "15 Mar 2021".to_string(),
            title: "Como utilizar Hooks".to_string(),
            subtitle: String::new(),
            author: "Joseph Oliveira".to_string(),
            banner_url: None,
            sections: vec![
                ContentSection {
                    heading: "Intro".to_string(),
                    paragraphs: vec!["primeiro".to_string(), "segundo".to_string()],
                },
                ContentSection {
                    heading: "Fim".to_string(),
                    paragraphs: vec!["terceiro".to_string()],
                },
            ],
            reading_time: 4,
        };
        let html = renderer().render_post(&post).unwrap();

        assert!(html.contains("<title>Como utilizar Hooks | spacetraveling</title>"));
        assert!(html.contains("4 min"));
        assert!(!html.contains("class=\"banner\""));
        let order: Vec<_> = ["Intro", "primeiro", "segundo", "Fim", "terceiro"]
            .iter()
            .map(|s| html.find(s).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_render_home_without_session() {
        let state = ListingPageState::new(vec![summary("hooks", "Hooks")], Some("page2".to_string()));
        let html = renderer().render_home(&state, None).unwrap();
        assert!(html.contains("Carregar mais posts"));
        assert!(!html.contains(r#"name="session""#));
    }

    #[test]
    fn test_content_is_escaped() {
        let state = ListingPageState::new(vec![summary("x", "<script>alert(1)</script>")], None);
        let html = renderer().render_home(&state, Some(&uuid::Uuid::nil())).unwrap();
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_placeholders() {
        let r = renderer();
        assert!(r.render_resolving().unwrap().contains("http-equiv=\"refresh\""));
        assert!(r.render_not_found().unwrap().contains("Post não encontrado"));
        assert!(r.render_unavailable().unwrap().contains("Voltar para a home"));
    }
}
