// ── Host discovery ──
//
// Turns router rules from an upstream routing API into HTTP forwards.

use pangosync_api::Router;
use tracing::debug;

use crate::config::DiscoverySite;
use crate::control_plane::RouterSource;
use crate::model::HttpForward;

const HOST_MATCHER: &str = "Host(`";

/// Split a hostname into `(subdomain, domain)`.
///
/// The last two labels are the domain; everything before them is the
/// subdomain. No public-suffix handling: `a.example.co.uk` yields
/// `("a.example", "co.uk")`.
pub fn split_hostname(host: &str) -> (String, String) {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return (String::new(), host.to_owned());
    }
    let cut = labels.len() - 2;
    (labels[..cut].join("."), labels[cut..].join("."))
}

/// The hostname inside the first ``Host(`...`)`` matcher in a rule.
pub fn extract_host(rule: &str) -> Option<&str> {
    let start = rule.find(HOST_MATCHER)? + HOST_MATCHER.len();
    let rest = &rule[start..];
    let end = rest.find('`')?;
    let host = &rest[..end];
    (!host.is_empty()).then_some(host)
}

/// Whitelisted, de-duplicated hostnames from a router listing, in first-seen order.
pub fn hosts_from_routers(routers: &[Router], whitelist: &[String]) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();
    for router in routers {
        if !whitelist.iter().any(|w| router.rule.contains(w.as_str())) {
            continue;
        }
        let Some(host) = extract_host(&router.rule) else {
            debug!(rule = %router.rule, "rule has no Host matcher");
            continue;
        };
        if !hosts.iter().any(|h| h == host) {
            hosts.push(host.to_owned());
        }
    }
    hosts
}

/// Build the forward a discovered hostname maps to.
pub fn forward_for_host(site: &DiscoverySite, host: &str) -> HttpForward {
    let (subdomain, domain) = split_hostname(host);
    HttpForward {
        subdomain,
        domain,
        site_name: site.site_name.clone(),
        target_host: site.target_host.clone(),
        target_port: site.target_port,
        target_method: site.target_method,
    }
}

/// Fetch routers from `source` and return the site's discovered hostnames.
pub async fn discover_hosts<R: RouterSource>(
    site: &DiscoverySite,
    source: &R,
) -> Result<Vec<String>, pangosync_api::Error> {
    let routers = source.list_routers().await?;
    debug!(site = %site.site_name, routers = routers.len(), "fetched routers");
    Ok(hosts_from_routers(&routers, &site.host_whitelist))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HttpMethod;

    fn router(rule: &str) -> Router {
        Router {
            rule: rule.into(),
            ..Router::default()
        }
    }

    #[test]
    fn splits_multi_label_subdomain() {
        assert_eq!(
            split_hostname("api.svc.example.com"),
            ("api.svc".to_owned(), "example.com".to_owned())
        );
    }

    #[test]
    fn apex_has_empty_subdomain() {
        assert_eq!(split_hostname("example.com"), (String::new(), "example.com".to_owned()));
        assert_eq!(split_hostname("localhost"), (String::new(), "localhost".to_owned()));
    }

    #[test]
    fn extracts_host_anywhere_in_rule() {
        assert_eq!(extract_host("Host(`a.example.com`)"), Some("a.example.com"));
        assert_eq!(
            extract_host("PathPrefix(`/api`) && Host(`b.example.com`)"),
            Some("b.example.com")
        );
        assert_eq!(extract_host("PathPrefix(`/api`)"), None);
        assert_eq!(extract_host("Host(`unterminated"), None);
    }

    #[test]
    fn filters_by_whitelist_and_dedupes_in_order() {
        let routers = vec![
            router("Host(`b.example.com`)"),
            router("Host(`a.example.com`)"),
            router("Host(`b.example.com`) && PathPrefix(`/x`)"),
            router("Host(`c.other.org`)"),
            router("PathPrefix(`/example.com`)"),
        ];
        let hosts = hosts_from_routers(&routers, &["example.com".to_owned()]);
        assert_eq!(hosts, vec!["b.example.com", "a.example.com"]);
    }

    #[test]
    fn empty_whitelist_keeps_nothing() {
        let routers = vec![router("Host(`a.example.com`)")];
        assert!(hosts_from_routers(&routers, &[]).is_empty());
    }

    #[test]
    fn forward_takes_site_target() {
        let site = DiscoverySite {
            site_name: "site-a".into(),
            target_host: "10.0.0.5".into(),
            target_port: 443,
            target_method: HttpMethod::Https,
            host_whitelist: vec![],
        };
        let fwd = forward_for_host(&site, "api.svc.example.com");
        assert_eq!(fwd.subdomain, "api.svc");
        assert_eq!(fwd.domain, "example.com");
        assert_eq!(fwd.fqdn(), "api.svc.example.com");
        assert_eq!(fwd.target_port, 443);
    }
}
