//! Referral link creation
//!
//! A link ties a user to one banner variation. Its `html` is the embed code
//! the affiliate pastes into their site; it points at the referral redirect.

use crate::api::routing::get_router;
use crate::errors::{AffiliatesError, Result};
use crate::storage::{Banner, BannerKind, Link, NewLink, SeaOrmStorage, Variation};
use crate::utils::escape_html;

/// Path of the referral redirect for a link id
pub fn referral_path(link_id: i64) -> String {
    get_router()
        .reverse("links.referral", &[("pk", link_id.to_string())])
        .unwrap_or_else(|| format!("/link/{}/", link_id))
}

/// Embed code for a banner variation
pub fn render_link_html(banner: &Banner, variation: &Variation, href: &str) -> String {
    let href = escape_html(href);
    let alt = escape_html(&banner.name);
    let attr = |v: &Option<String>| escape_html(v.as_deref().unwrap_or_default());

    match banner.kind {
        BannerKind::Image => format!(
            r#"<a href="{}"><img src="{}" alt="{}"></a>"#,
            href,
            attr(&variation.image),
            alt
        ),
        BannerKind::Text => format!(r#"<a href="{}">{}</a>"#, href, attr(&variation.text)),
        BannerKind::FirefoxUpgrade => format!(
            r#"<a href="{}"><img src="{}" data-upgrade-src="{}" alt="{}"></a>"#,
            href,
            attr(&variation.image),
            attr(&variation.upgrade_image),
            alt
        ),
    }
}

/// Create a link for `user_id` on `variation`, rendering its embed code
/// against `base_url` (scheme and host, no trailing slash).
pub async fn create_referral_link(
    storage: &SeaOrmStorage,
    user_id: i64,
    banner: &Banner,
    variation: &Variation,
    base_url: &str,
) -> Result<Link> {
    if variation.banner_id != banner.id {
        return Err(AffiliatesError::validation(format!(
            "Variation {} does not belong to banner {}",
            variation.id, banner.id
        )));
    }

    let new = NewLink {
        user_id,
        banner_id: banner.id,
        banner_variation_id: variation.id,
    };
    storage
        .create_link(new, |link_id| {
            let href = format!("{}{}", base_url, referral_path(link_id));
            render_link_html(banner, variation, &href)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn banner(kind: BannerKind) -> Banner {
        Banner {
            id: 3,
            kind,
            name: "Fast & Free".to_string(),
            category_id: 1,
            destination: "https://www.mozilla.org/firefox/".to_string(),
            visible: true,
            created: Utc::now(),
            modified: Utc::now(),
        }
    }

    #[test]
    fn test_referral_path() {
        assert_eq!(referral_path(12), "/link/12/");
    }

    #[test]
    fn test_image_html() {
        let variation = Variation {
            id: 1,
            banner_id: 3,
            color: Some("blue".to_string()),
            locale: "en-US".to_string(),
            image: Some("/media/blue.png".to_string()),
            ..Default::default()
        };
        let html = render_link_html(&banner(BannerKind::Image), &variation, "http://x/link/1/");
        assert_eq!(
            html,
            r#"<a href="http://x/link/1/"><img src="/media/blue.png" alt="Fast &amp; Free"></a>"#
        );
    }

    #[test]
    fn test_text_html_is_escaped() {
        let variation = Variation {
            id: 1,
            banner_id: 3,
            locale: "en-US".to_string(),
            text: Some("<b>Get Firefox</b>".to_string()),
            ..Default::default()
        };
        let html = render_link_html(&banner(BannerKind::Text), &variation, "/link/1/");
        assert_eq!(
            html,
            r#"<a href="/link/1/">&lt;b&gt;Get Firefox&lt;/b&gt;</a>"#
        );
    }

    #[test]
    fn test_upgrade_html_has_both_images() {
        let variation = Variation {
            id: 1,
            banner_id: 3,
            color: Some("red".to_string()),
            locale: "de".to_string(),
            image: Some("a.png".to_string()),
            upgrade_image: Some("b.png".to_string()),
            ..Default::default()
        };
        let html = render_link_html(&banner(BannerKind::FirefoxUpgrade), &variation, "/l/");
        assert!(html.contains(r#"src="a.png""#));
        assert!(html.contains(r#"data-upgrade-src="b.png""#));
    }
}
