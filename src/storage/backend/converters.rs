//! 实体 Model 与领域模型之间的转换

use std::str::FromStr;

use migration::entities::{
    banner, banner_instance, category, firefox_upgrade_banner_variation, image_banner_variation,
    leaderboard_standing, legacy_banner, legacy_banner_image, link, text_banner_variation, user,
    user_profile,
};

use crate::errors::{AffiliatesError, Result};
use crate::storage::models::{
    Banner, BannerInstance, BannerKind, Category, LegacyBanner, LegacyBannerImage, Link, Standing,
    User, UserProfile, Variation,
};

pub fn model_to_user(m: user::Model) -> User {
    User {
        id: m.id,
        username: m.username,
        email: m.email,
        is_active: m.is_active,
        date_joined: m.date_joined,
    }
}

pub fn model_to_profile(m: user_profile::Model) -> UserProfile {
    UserProfile {
        user_id: m.user_id,
        display_name: m.display_name,
        last_visit: m.last_visit,
    }
}

pub fn model_to_category(m: category::Model) -> Category {
    Category {
        id: m.id,
        name: m.name,
        parent_id: m.parent_id,
    }
}

pub fn model_to_banner(m: banner::Model) -> Result<Banner> {
    let kind = BannerKind::from_str(&m.kind).map_err(|_| {
        AffiliatesError::database_operation(format!(
            "Banner {} has unknown kind '{}'",
            m.id, m.kind
        ))
    })?;
    Ok(Banner {
        id: m.id,
        kind,
        name: m.name,
        category_id: m.category_id,
        destination: m.destination,
        visible: m.visible,
        created: m.created,
        modified: m.modified,
    })
}

pub fn image_variation(m: image_banner_variation::Model) -> Variation {
    Variation {
        id: m.id,
        banner_id: m.banner_id,
        color: Some(m.color),
        locale: m.locale,
        image: Some(m.image),
        ..Default::default()
    }
}

pub fn text_variation(m: text_banner_variation::Model) -> Variation {
    Variation {
        id: m.id,
        banner_id: m.banner_id,
        locale: m.locale,
        text: Some(m.text),
        ..Default::default()
    }
}

pub fn upgrade_variation(m: firefox_upgrade_banner_variation::Model) -> Variation {
    Variation {
        id: m.id,
        banner_id: m.banner_id,
        color: Some(m.color),
        locale: m.locale,
        image: Some(m.image),
        upgrade_image: Some(m.upgrade_image),
        text: None,
    }
}

pub fn model_to_link(m: link::Model) -> Link {
    Link {
        id: m.id,
        user_id: m.user_id,
        banner_id: m.banner_id,
        banner_variation_id: m.banner_variation_id,
        html: m.html,
        aggregate_link_clicks: m.aggregate_link_clicks,
        aggregate_firefox_downloads: m.aggregate_firefox_downloads,
        created: m.created,
        modified: m.modified,
    }
}

pub fn model_to_standing(m: leaderboard_standing::Model) -> Standing {
    Standing {
        ranking: m.ranking,
        user_id: m.user_id,
        metric: m.metric,
        value: m.value,
    }
}

pub fn model_to_instance(m: banner_instance::Model) -> BannerInstance {
    BannerInstance {
        id: m.id,
        user_id: m.user_id,
        badge_id: m.badge_id,
        image_id: m.image_id,
        clicks: m.clicks,
        created: m.created,
    }
}

pub fn model_to_legacy_banner(m: legacy_banner::Model) -> LegacyBanner {
    LegacyBanner {
        id: m.id,
        name: m.name,
        href: m.href,
    }
}

pub fn model_to_legacy_image(m: legacy_banner_image::Model) -> LegacyBannerImage {
    LegacyBannerImage {
        id: m.id,
        banner_id: m.banner_id,
        color: m.color,
        locale: m.locale,
        image: m.image,
    }
}
