//! Model admin registrations
//!
//! Declares, per editable model, which columns the list shows, which fields
//! the detail form has, which of them are read-only, what `?q=` searches and
//! which variation fields are edited inline.

use serde_json::{Value, json};

use crate::storage::{Banner, BannerKind, Category, CategoryNode, Variation};

use super::types::{AdminDetail, AdminInlineRows, AdminRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminModel {
    Category,
    Banner(BannerKind),
}

#[derive(Debug)]
pub struct InlineAdmin {
    pub model: &'static str,
    pub fields: &'static [&'static str],
    /// Blank rows offered for new entries
    pub extra: usize,
}

#[derive(Debug)]
pub struct ModelAdmin {
    pub slug: &'static str,
    pub model: AdminModel,
    pub list_display: &'static [&'static str],
    pub fields: &'static [&'static str],
    pub readonly_fields: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub inline: Option<InlineAdmin>,
}

const BANNER_FIELDS: &[&str] = &[
    "name",
    "category",
    "destination",
    "visible",
    "created",
    "modified",
];
const TEXT_BANNER_FIELDS: &[&str] = &[
    "name",
    "category",
    "visible",
    "destination",
    "created",
    "modified",
];
const BANNER_READONLY: &[&str] = &["created", "modified"];
const BANNER_SEARCH: &[&str] = &["name", "destination", "category__name"];

pub static MODEL_ADMINS: [ModelAdmin; 4] = [
    ModelAdmin {
        slug: "categories",
        model: AdminModel::Category,
        list_display: &["name", "link_clicks"],
        fields: &["name", "parent"],
        readonly_fields: &[],
        search_fields: &[],
        inline: None,
    },
    ModelAdmin {
        slug: "image_banners",
        model: AdminModel::Banner(BannerKind::Image),
        list_display: &["name", "category", "destination", "visible", "link_clicks"],
        fields: BANNER_FIELDS,
        readonly_fields: BANNER_READONLY,
        search_fields: BANNER_SEARCH,
        inline: Some(InlineAdmin {
            model: "image_banner_variations",
            fields: &["color", "locale", "image"],
            extra: 0,
        }),
    },
    ModelAdmin {
        slug: "text_banners",
        model: AdminModel::Banner(BannerKind::Text),
        list_display: &["name", "category", "visible", "destination", "link_clicks"],
        fields: TEXT_BANNER_FIELDS,
        readonly_fields: BANNER_READONLY,
        search_fields: BANNER_SEARCH,
        inline: Some(InlineAdmin {
            model: "text_banner_variations",
            fields: &["locale", "text"],
            extra: 0,
        }),
    },
    ModelAdmin {
        slug: "firefox_upgrade_banners",
        model: AdminModel::Banner(BannerKind::FirefoxUpgrade),
        list_display: &["name", "category", "destination", "visible", "link_clicks"],
        fields: BANNER_FIELDS,
        readonly_fields: BANNER_READONLY,
        search_fields: BANNER_SEARCH,
        inline: Some(InlineAdmin {
            model: "firefox_upgrade_banner_variations",
            fields: &["color", "locale", "image", "upgrade_image"],
            extra: 0,
        }),
    },
];

pub fn find_model_admin(slug: &str) -> Option<&'static ModelAdmin> {
    MODEL_ADMINS.iter().find(|admin| admin.slug == slug)
}

fn project(columns: &[&str], value: impl Fn(&str) -> Value) -> AdminRow {
    let mut row = AdminRow::new();
    for column in columns {
        row.insert((*column).to_string(), value(column));
    }
    row
}

fn banner_value(banner: &Banner, category_name: &str, link_clicks: i64, column: &str) -> Value {
    match column {
        "id" => json!(banner.id),
        "name" => json!(banner.name),
        "category" => json!({ "id": banner.category_id, "name": category_name }),
        "destination" => json!(banner.destination),
        "visible" => json!(banner.visible),
        "created" => json!(banner.created),
        "modified" => json!(banner.modified),
        "link_clicks" => json!(link_clicks),
        _ => Value::Null,
    }
}

fn variation_value(variation: &Variation, column: &str) -> Value {
    match column {
        "id" => json!(variation.id),
        "color" => json!(variation.color),
        "locale" => json!(variation.locale),
        "image" => json!(variation.image),
        "text" => json!(variation.text),
        "upgrade_image" => json!(variation.upgrade_image),
        _ => Value::Null,
    }
}

impl ModelAdmin {
    pub fn banner_kind(&self) -> Option<BannerKind> {
        match self.model {
            AdminModel::Banner(kind) => Some(kind),
            AdminModel::Category => None,
        }
    }

    /// 列表行总是带上 id，便于跳转详情
    fn with_id(&self) -> Vec<&'static str> {
        std::iter::once("id")
            .chain(self.list_display.iter().copied())
            .collect()
    }

    pub fn banner_row(&self, banner: &Banner, category_name: &str, link_clicks: i64) -> AdminRow {
        project(&self.with_id(), |c| banner_value(banner, category_name, link_clicks, c))
    }

    pub fn category_row(&self, node: &CategoryNode) -> AdminRow {
        let mut row = project(&self.with_id(), |c| match c {
            "id" => json!(node.id),
            "name" => json!(node.name),
            "link_clicks" => json!(node.link_clicks),
            _ => Value::Null,
        });
        row.insert("depth".to_string(), json!(node.depth));
        row.insert("parent_id".to_string(), json!(node.parent_id));
        row
    }

    pub fn category_detail(&self, category: &Category) -> AdminDetail {
        let mut fields = project(self.fields, |c| match c {
            "name" => json!(category.name),
            "parent" => json!(category.parent_id),
            _ => Value::Null,
        });
        fields.insert("id".to_string(), json!(category.id));
        AdminDetail {
            model: self.slug,
            fields,
            readonly_fields: self.readonly_fields,
            inline: None,
        }
    }

    pub fn banner_detail(
        &self,
        banner: &Banner,
        category_name: &str,
        link_clicks: i64,
        variations: &[Variation],
    ) -> AdminDetail {
        let mut fields = project(self.fields, |c| {
            banner_value(banner, category_name, link_clicks, c)
        });
        fields.insert("id".to_string(), json!(banner.id));

        let inline = self.inline.as_ref().map(|inline| {
            let columns: Vec<&str> = std::iter::once("id")
                .chain(inline.fields.iter().copied())
                .collect();
            AdminInlineRows {
                model: inline.model,
                fields: inline.fields,
                extra: inline.extra,
                rows: variations
                    .iter()
                    .map(|v| project(&columns, |c| variation_value(v, c)))
                    .collect(),
            }
        });

        AdminDetail {
            model: self.slug,
            fields,
            readonly_fields: self.readonly_fields,
            inline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn banner() -> Banner {
        Banner {
            id: 5,
            kind: BannerKind::Text,
            name: "Spread the word".to_string(),
            category_id: 2,
            destination: "https://www.mozilla.org/".to_string(),
            visible: true,
            created: Utc::now(),
            modified: Utc::now(),
        }
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(
            find_model_admin("text_banners").unwrap().banner_kind(),
            Some(BannerKind::Text)
        );
        assert_eq!(
            find_model_admin("categories").unwrap().model,
            AdminModel::Category
        );
        assert!(find_model_admin("users").is_none());
    }

    #[test]
    fn test_banner_admins_share_form_layout() {
        for admin in MODEL_ADMINS.iter().filter(|a| a.banner_kind().is_some()) {
            assert_eq!(admin.readonly_fields, &["created", "modified"]);
            assert_eq!(admin.search_fields, &["name", "destination", "category__name"]);
            assert_eq!(admin.inline.as_ref().unwrap().extra, 0);
        }
    }

    #[test]
    fn test_text_banner_form_puts_visible_before_destination() {
        let fields = |slug: &str| find_model_admin(slug).unwrap().fields;
        assert_eq!(
            fields("text_banners"),
            &["name", "category", "visible", "destination", "created", "modified"]
        );
        assert_eq!(
            fields("image_banners"),
            &["name", "category", "destination", "visible", "created", "modified"]
        );
        assert_eq!(fields("firefox_upgrade_banners"), fields("image_banners"));

        let detail = find_model_admin("text_banners")
            .unwrap()
            .banner_detail(&banner(), "Firefox", 0, &[]);
        let keys: Vec<&str> = detail.fields.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["name", "category", "visible", "destination", "created", "modified", "id"]
        );
    }

    #[test]
    fn test_list_row_follows_list_display_order() {
        let admin = find_model_admin("text_banners").unwrap();
        let row = admin.banner_row(&banner(), "Firefox", 12);
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["id", "name", "category", "visible", "destination", "link_clicks"]
        );
        assert_eq!(row["link_clicks"], json!(12));
        assert_eq!(row["category"]["name"], json!("Firefox"));
    }

    #[test]
    fn test_detail_inline_fields() {
        let admin = find_model_admin("text_banners").unwrap();
        let variations = vec![Variation {
            id: 9,
            banner_id: 5,
            locale: "fr".to_string(),
            text: Some("Téléchargez Firefox".to_string()),
            ..Default::default()
        }];
        let detail = admin.banner_detail(&banner(), "Firefox", 0, &variations);

        assert!(detail.fields.contains_key("created"));
        assert!(!detail.fields.contains_key("link_clicks"));
        let inline = detail.inline.unwrap();
        assert_eq!(inline.model, "text_banner_variations");
        assert_eq!(inline.extra, 0);
        let keys: Vec<&str> = inline.rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "locale", "text"]);
    }
}
