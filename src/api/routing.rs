//! Named URL routes
//!
//! Patterns use `{name}` placeholders that only match digits (primary keys).
//! The same table drives path resolution for the middleware, reverse lookups
//! for redirects, and the actix resource patterns.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use actix_web::http::Method;

static ROUTER: OnceLock<Router> = OnceLock::new();

/// Process-wide route table
pub fn get_router() -> &'static Router {
    ROUTER.get_or_init(Router::affiliates)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
pub struct Route {
    pub name: &'static str,
    pub pattern: &'static str,
    pub methods: &'static [Method],
    segments: Vec<Segment>,
}

impl Route {
    fn new(name: &'static str, pattern: &'static str, methods: &'static [Method]) -> Self {
        let segments = split_path(pattern)
            .map(|raw| match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(param) => Segment::Param(param.to_string()),
                None => Segment::Literal(raw.to_string()),
            })
            .collect();
        Self {
            name,
            pattern,
            methods,
            segments,
        }
    }

    /// 路径参数名，按出现顺序
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(p) => Some(p.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    /// actix resource 模式，参数限定为数字
    pub fn actix_pattern(&self) -> String {
        let body: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Literal(l) => l.clone(),
                Segment::Param(p) => format!("{{{}:\\d+}}", p),
            })
            .collect();
        format!("/{}", body.join("/"))
    }

    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let mut parts = split_path(path);
        let mut kwargs = BTreeMap::new();
        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(l) if l == part => {}
                Segment::Param(p) if is_digits(part) => {
                    kwargs.insert(p.clone(), part.to_string());
                }
                _ => return None,
            }
        }
        if parts.next().is_some() {
            return None;
        }
        Some(kwargs)
    }
}

/// 把 `/a/b/` 拆成 `["a", "b", ""]`；结尾的空段用来区分有无末尾斜杠
fn split_path(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Result of a successful resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverMatch {
    pub view_name: String,
    /// Unnamed captures. Every route in the table names its parameters, so
    /// this stays empty and captures land in `kwargs`.
    pub args: Vec<String>,
    pub kwargs: BTreeMap<String, String>,
}

impl ResolverMatch {
    /// Parse a keyword argument as a primary key
    pub fn kwarg_id(&self, name: &str) -> Option<i64> {
        self.kwargs.get(name).and_then(|v| v.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver404 {
    pub path: String,
}

impl fmt::Display for Resolver404 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No route matches path '{}'", self.path)
    }
}

impl std::error::Error for Resolver404 {}

#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

const GET: &[Method] = &[Method::GET];
const GET_POST: &[Method] = &[Method::GET, Method::POST];

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: &'static str, pattern: &'static str, methods: &'static [Method]) -> Self {
        self.routes.push(Route::new(name, pattern, methods));
        self
    }

    /// The service's route table
    pub fn affiliates() -> Self {
        Self::new()
            .add("banners.generator.categories", "/generator/categories/", GET)
            .add(
                "banners.generator.banners",
                "/generator/categories/{category_pk}/",
                GET,
            )
            .add(
                "banners.generator.image_banner.customize",
                "/generator/image_banners/{pk}/customize/",
                GET_POST,
            )
            .add(
                "banners.generator.text_banner.customize",
                "/generator/text_banners/{pk}/customize/",
                GET_POST,
            )
            .add(
                "banners.generator.firefox_upgrade_banner.customize",
                "/generator/firefox_upgrade_banners/{pk}/customize/",
                GET_POST,
            )
            .add("links.referral", "/link/{pk}/", GET)
            .add("banners.link", "/link/banner/{banner_instance_id}/", GET)
            .add(
                "banners.link.old",
                "/link/{user_id}/{banner_id}/{banner_img_id}/",
                GET,
            )
            .add("banners.customize", "/banners/{banner_pk}/customize/", GET_POST)
            .add("leaderboard", "/leaderboard/", GET)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// First route (in table order) matching `path`
    pub fn resolve(&self, path: &str) -> Result<ResolverMatch, Resolver404> {
        self.routes
            .iter()
            .find_map(|route| {
                route.matches(path).map(|kwargs| ResolverMatch {
                    view_name: route.name.to_string(),
                    args: Vec::new(),
                    kwargs,
                })
            })
            .ok_or_else(|| Resolver404 {
                path: path.to_string(),
            })
    }

    /// Build the path of a named route. Every parameter must be supplied
    /// and be numeric; extra keys are rejected.
    pub fn reverse(&self, name: &str, kwargs: &[(&str, String)]) -> Option<String> {
        let route = self.route(name)?;
        if kwargs.len() != route.params().count() {
            return None;
        }

        let mut parts = Vec::with_capacity(route.segments.len());
        for segment in &route.segments {
            match segment {
                Segment::Literal(l) => parts.push(l.clone()),
                Segment::Param(p) => {
                    let value = kwargs.iter().find(|(k, _)| *k == p.as_str()).map(|(_, v)| v)?;
                    if !is_digits(value) {
                        return None;
                    }
                    parts.push(value.clone());
                }
            }
        }
        Some(format!("/{}", parts.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_referral() {
        let m = get_router().resolve("/link/42/").unwrap();
        assert_eq!(m.view_name, "links.referral");
        assert_eq!(m.kwarg_id("pk"), Some(42));
        assert!(m.args.is_empty());
    }

    #[test]
    fn test_resolve_legacy_routes() {
        let router = get_router();

        let m = router.resolve("/link/banner/7/").unwrap();
        assert_eq!(m.view_name, "banners.link");
        assert_eq!(m.kwarg_id("banner_instance_id"), Some(7));

        let m = router.resolve("/link/1/2/3/").unwrap();
        assert_eq!(m.view_name, "banners.link.old");
        assert_eq!(m.kwarg_id("user_id"), Some(1));
        assert_eq!(m.kwarg_id("banner_id"), Some(2));
        assert_eq!(m.kwarg_id("banner_img_id"), Some(3));
    }

    #[test]
    fn test_resolve_generator_routes() {
        let router = get_router();
        assert_eq!(
            router.resolve("/generator/categories/").unwrap().view_name,
            "banners.generator.categories"
        );
        let m = router.resolve("/generator/categories/5/").unwrap();
        assert_eq!(m.view_name, "banners.generator.banners");
        assert_eq!(m.kwarg_id("category_pk"), Some(5));
        assert_eq!(
            router
                .resolve("/generator/firefox_upgrade_banners/3/customize/")
                .unwrap()
                .view_name,
            "banners.generator.firefox_upgrade_banner.customize"
        );
    }

    #[test]
    fn test_resolve_rejects_non_matching_paths() {
        let router = get_router();
        for path in [
            "/link/abc/",
            "/link/42",
            "/link/",
            "/link/1/2/",
            "/link/-1/",
            "/unknown/",
            "/generator/categories/5/extra/",
        ] {
            let err = router.resolve(path).unwrap_err();
            assert_eq!(err.path, path);
        }
    }

    #[test]
    fn test_reverse() {
        let router = get_router();
        assert_eq!(
            router.reverse("links.referral", &[("pk", "9".to_string())]),
            Some("/link/9/".to_string())
        );
        assert_eq!(
            router.reverse(
                "banners.link.old",
                &[
                    ("banner_img_id", "3".to_string()),
                    ("user_id", "1".to_string()),
                    ("banner_id", "2".to_string()),
                ]
            ),
            Some("/link/1/2/3/".to_string())
        );
        assert_eq!(
            router.reverse("leaderboard", &[]),
            Some("/leaderboard/".to_string())
        );
    }

    #[test]
    fn test_reverse_rejects_bad_arguments() {
        let router = get_router();
        assert_eq!(router.reverse("links.referral", &[]), None);
        assert_eq!(
            router.reverse("links.referral", &[("pk", "x".to_string())]),
            None
        );
        assert_eq!(
            router.reverse("links.referral", &[("id", "1".to_string())]),
            None
        );
        assert_eq!(router.reverse("nope", &[]), None);
    }

    #[test]
    fn test_reverse_then_resolve_every_route() {
        let router = get_router();
        for route in router.routes() {
            let kwargs: Vec<(&str, String)> = route.params().map(|p| (p, "1".to_string())).collect();
            let path = router.reverse(route.name, &kwargs).unwrap();
            assert_eq!(router.resolve(&path).unwrap().view_name, route.name);
        }
    }

    #[test]
    fn test_actix_pattern() {
        let route = get_router().route("banners.link.old").unwrap();
        assert_eq!(
            route.actix_pattern(),
            r"/link/{user_id:\d+}/{banner_id:\d+}/{banner_img_id:\d+}/"
        );
        assert!(route.allows(&Method::GET));
        assert!(!route.allows(&Method::POST));
    }
}
