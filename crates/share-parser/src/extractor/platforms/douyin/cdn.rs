use url::Url;

/// Douyin play hosts known to be reachable from outside the platform's own
/// network. Other edges in the pool regularly refuse end-user connections.
pub(crate) static ALLOWED_CDN_HOSTS: &[&str] = &[
    "v93.douyinvod.com",
    "v5-che.douyinvod.com",
    "v6-qos-hourly.douyinvod.com",
    "v26-che.douyinvod.com",
    "v6-cold.douyinvod.com",
    "v83-x.douyinvod.com",
    "v5-coldb.douyinvod.com",
    "v3-z.douyinvod.com",
    "v1-x.douyinvod.com",
    "v6-ab-e1.douyinvod.com",
    "v5-abtest.douyinvod.com",
    "v9-che.douyinvod.com",
    "v83-y.douyinvod.com",
    "v5-litea.douyinvod.com",
    "v3-che.douyinvod.com",
    "v29-cold.douyinvod.com",
    "v5-lite.douyinvod.com",
    "v29-qos-control.douyinvod.com",
    "v5-gdgz.douyinvod.com",
    "v5-ttcp-a.douyinvod.com",
    "v3-b.douyinvod.com",
    "v9-z-qos-control.douyinvod.com",
    "v9-x-qos-hourly.douyinvod.com",
    "v9-chc.douyinvod.com",
    "v9-qos-hourly.douyinvod.com",
    "v5-ttcp-b.douyinvod.com",
    "v6-z-qos-control.douyinvod.com",
    "v5-dlyd.douyinvod.com",
    "v5-coldy.douyinvod.com",
    "v3-c.douyinvod.com",
    "v5-jbwl.douyinvod.com",
    "v26-0015c002.douyinvod.com",
    "v5-gdwy.douyinvod.com",
    "v3-d.douyinvod.com",
    "v3-p.douyinvod.com",
    "v5-gdhy.douyinvod.com",
    "v26-cold.douyinvod.com",
    "v5-lite-a.douyinvod.com",
    "v5-i.douyinvod.com",
    "v5-g.douyinvod.com",
    "v26-qos-daily.douyinvod.com",
    "v5-dash.douyinvod.com",
    "v5-h.douyinvod.com",
    "v5-f.douyinvod.com",
    "v3-a.douyinvod.com",
    "v83.douyinvod.com",
    "v5-cold.douyinvod.com",
    "v3-y.douyinvod.com",
    "v26-x.douyinvod.com",
    "v27-ipv6.douyinvod.com",
    "v9-ipv6.douyinvod.com",
    "v5-yacu.douyinvod.com",
    "v29-ipv6.douyinvod.com",
    "v26-coldf.douyinvod.com",
    "v5.douyinvod.com",
    "v11.douyinvod.com",
    "v6-z.douyinvod.com",
    "v1.douyinvod.com",
    "v9-y.douyinvod.com",
    "v9-z.douyinvod.com",
    "v9.douyinvod.com",
    "v3-x.douyinvod.com",
    "v6-y.douyinvod.com",
    "v3-ipv6.douyinvod.com",
    "v5-e.douyinvod.com",
    "v3.douyinvod.com",
    "v6-ipv6.douyinvod.com",
    "v9-x.douyinvod.com",
    "v6-p.douyinvod.com",
    "v1-2p.douyinvod.com",
    "v1-p.douyinvod.com",
    "v1-ipv6.douyinvod.com",
    "v24.douyinvod.com",
    "v1-dy.douyinvod.com",
    "v6.douyinvod.com",
    "v6-x.douyinvod.com",
    "v26-ipv6.douyinvod.com",
    "v27.douyinvod.com",
    "v92.douyinvod.com",
    "v95.douyinvod.com",
    "douyinvod.com",
    "v26.douyinvod.com",
    "v29.douyinvod.com",
];

/// Whether the host of `video_url` contains an allow-listed entry.
///
/// Matching is by containment, so the bare `douyinvod.com` entry admits any
/// subdomain of it.
pub fn is_allowed_cdn_url(video_url: &str) -> bool {
    if video_url.is_empty() {
        return false;
    }

    let Ok(url) = Url::parse(video_url) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };

    ALLOWED_CDN_HOSTS.iter().any(|allowed| host.contains(allowed))
}
